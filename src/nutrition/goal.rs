//! Goal evaluation: day totals against targets

use serde::Serialize;

use super::energy::EnergyTargets;
use crate::models::Macros;

/// Lowest share of the target that still counts as on target
pub const LOWER_BAND: f64 = 0.85;
/// Highest share of the target that still counts as on target
pub const UPPER_BAND: f64 = 1.05;

/// True when `kcal` is within [85%, 105%] of a positive target
pub fn is_on_target(kcal: i64, target_kcal: i64) -> bool {
    if target_kcal <= 0 {
        return false;
    }
    let kcal = kcal as f64;
    let target = target_kcal as f64;
    kcal >= LOWER_BAND * target && kcal <= UPPER_BAND * target
}

/// Consumed vs target for one macro
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Progress {
    pub consumed: i64,
    pub target: i64,
    /// consumed / target, `None` for a zero target
    pub ratio: Option<f64>,
}

impl Progress {
    pub fn new(consumed: i64, target: i64) -> Self {
        let ratio = (target > 0).then(|| consumed as f64 / target as f64);
        Self {
            consumed,
            target,
            ratio,
        }
    }

    pub fn remaining(&self) -> i64 {
        self.target.saturating_sub(self.consumed)
    }
}

/// A day's totals lined up with the profile targets
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MacroProgress {
    pub kcal: Progress,
    pub protein_g: Progress,
    pub carb_g: Progress,
    pub fat_g: Progress,
    pub on_target: bool,
}

impl MacroProgress {
    pub fn new(totals: Macros, targets: &EnergyTargets) -> Self {
        Self {
            kcal: Progress::new(totals.kcal, targets.target_kcal),
            protein_g: Progress::new(totals.protein_g, targets.protein_g),
            carb_g: Progress::new(totals.carb_g, targets.carb_g),
            fat_g: Progress::new(totals.fat_g, targets.fat_g),
            on_target: is_on_target(totals.kcal, targets.target_kcal),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_edges_are_inclusive() {
        assert!(is_on_target(1700, 2000));
        assert!(is_on_target(2100, 2000));
        assert!(!is_on_target(1699, 2000));
        assert!(!is_on_target(2101, 2000));
    }

    #[test]
    fn test_zero_target_is_never_on_target() {
        for kcal in [0, 1, 500, 5000] {
            assert!(!is_on_target(kcal, 0));
        }
        assert!(!is_on_target(0, -100));
    }

    #[test]
    fn test_macro_progress() {
        let targets = EnergyTargets {
            target_kcal: 2594,
            protein_g: 140,
            carb_g: 383,
            fat_g: 56,
        };
        let progress = MacroProgress::new(Macros::new(2300, 150, 300, 60), &targets);
        assert!(progress.on_target);
        assert_eq!(progress.protein_g.remaining(), -10);
        assert_eq!(progress.fat_g.ratio, Some(60.0 / 56.0));

        let nothing = MacroProgress::new(Macros::zero(), &EnergyTargets {
            target_kcal: 0,
            protein_g: 0,
            carb_g: 0,
            fat_g: 0,
        });
        assert!(!nothing.on_target);
        assert_eq!(nothing.kcal.ratio, None);
    }

    #[test]
    fn test_remaining_saturates() {
        assert_eq!(Progress::new(i64::MAX, -10).remaining(), i64::MIN);
        assert_eq!(Progress::new(i64::MIN, 10).remaining(), i64::MAX);
    }
}
