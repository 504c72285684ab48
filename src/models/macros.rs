//! Shared macro totals
//!
//! Integer energy/protein/carb/fat values used at every aggregation level
//! (ingredient, recipe, serving, day).

use serde::{Deserialize, Serialize};

/// Round half up: `floor(x + 0.5)`.
///
/// NaN collapses to 0 through the saturating float-to-int cast.
pub fn round_half_up(x: f64) -> i64 {
    (x + 0.5).floor() as i64
}

/// Energy in kcal plus protein, carbohydrate and fat in grams
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Macros {
    pub kcal: i64,
    pub protein_g: i64,
    pub carb_g: i64,
    pub fat_g: i64,
}

impl Macros {
    pub const fn new(kcal: i64, protein_g: i64, carb_g: i64, fat_g: i64) -> Self {
        Self {
            kcal,
            protein_g,
            carb_g,
            fat_g,
        }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::zero()
    }

    /// Multiply every field by `factor`, rounding each one on its own
    pub fn scaled(&self, factor: f64) -> Self {
        self.map(|v| v * factor)
    }

    /// Divide every field by `divisor`, rounding each one on its own
    pub fn divided(&self, divisor: f64) -> Self {
        self.map(|v| v / divisor)
    }

    fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            kcal: round_half_up(f(self.kcal as f64)),
            protein_g: round_half_up(f(self.protein_g as f64)),
            carb_g: round_half_up(f(self.carb_g as f64)),
            fat_g: round_half_up(f(self.fat_g as f64)),
        }
    }
}

/// Saturates at the `i64` bounds, like `round_half_up`
impl std::ops::Add for Macros {
    type Output = Macros;

    fn add(self, other: Macros) -> Macros {
        Macros {
            kcal: self.kcal.saturating_add(other.kcal),
            protein_g: self.protein_g.saturating_add(other.protein_g),
            carb_g: self.carb_g.saturating_add(other.carb_g),
            fat_g: self.fat_g.saturating_add(other.fat_g),
        }
    }
}

impl std::ops::AddAssign for Macros {
    fn add_assign(&mut self, other: Macros) {
        *self = *self + other;
    }
}

impl std::iter::Sum for Macros {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Macros::zero(), |acc, m| acc + m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(2.5), 3);
        assert_eq!(round_half_up(2.4999), 2);
        assert_eq!(round_half_up(0.0), 0);
        assert_eq!(round_half_up(-0.5), 0);
        assert_eq!(round_half_up(-1.6), -2);
        assert_eq!(round_half_up(f64::NAN), 0);
    }

    #[test]
    fn test_scaled_rounds_each_field() {
        let m = Macros::new(100, 15, 7, 3);
        assert_eq!(m.scaled(1.5), Macros::new(150, 23, 11, 5));
    }

    #[test]
    fn test_divided_rounds_half_up() {
        let m = Macros::new(261, 5, 56, 1);
        assert_eq!(m.divided(2.0), Macros::new(131, 3, 28, 1));
    }

    #[test]
    fn test_sum() {
        let total: Macros = vec![Macros::new(1, 2, 3, 4), Macros::new(10, 20, 30, 40)]
            .into_iter()
            .sum();
        assert_eq!(total, Macros::new(11, 22, 33, 44));
        assert!(std::iter::empty::<Macros>().sum::<Macros>().is_zero());
    }

    #[test]
    fn test_add_saturates() {
        let huge = Macros::new(1, 0, 0, 0).scaled(1e300);
        assert_eq!(huge.kcal, i64::MAX);

        let mut total = huge + huge;
        assert_eq!(total.kcal, i64::MAX);
        total += Macros::new(i64::MIN, 0, 0, i64::MIN);
        assert_eq!(total, Macros::new(-1, 0, 0, i64::MIN));
    }
}
