//! Daily energy and macro targets from a profile

use serde::{Deserialize, Serialize};

use crate::models::{round_half_up, Goal, Macros, Profile, Sex};

/// Atwater factors, kcal per gram
pub const KCAL_PER_G_PROTEIN: f64 = 4.0;
pub const KCAL_PER_G_CARB: f64 = 4.0;
pub const KCAL_PER_G_FAT: f64 = 9.0;

/// Bounds on the daily cut/bulk adjustment, in kcal
pub const MIN_ADJUSTMENT_KCAL: f64 = 200.0;
pub const MAX_ADJUSTMENT_KCAL: f64 = 700.0;

/// One kg of body mass is about 7000 kcal, spread over 7 days
const KCAL_PER_KG_PER_DAY: f64 = 7000.0 / 7.0;

/// Daily targets for a profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnergyTargets {
    pub target_kcal: i64,
    pub protein_g: i64,
    pub carb_g: i64,
    pub fat_g: i64,
}

impl EnergyTargets {
    pub fn as_macros(&self) -> Macros {
        Macros::new(self.target_kcal, self.protein_g, self.carb_g, self.fat_g)
    }
}

/// Mifflin-St Jeor basal metabolic rate, in kcal/day
pub fn basal_metabolic_rate(profile: &Profile) -> f64 {
    let sex_offset = match profile.sex {
        Sex::Male => 5.0,
        Sex::Female => -161.0,
    };
    10.0 * profile.weight_kg + 6.25 * profile.height_cm - 5.0 * profile.age as f64 + sex_offset
}

/// Signed kcal/day added to the TDEE for the profile's goal
pub fn daily_adjustment(profile: &Profile) -> f64 {
    let magnitude = (profile.rate_per_week_kg.abs() * KCAL_PER_KG_PER_DAY)
        .clamp(MIN_ADJUSTMENT_KCAL, MAX_ADJUSTMENT_KCAL);
    match profile.goal {
        Goal::Maintain => 0.0,
        Goal::Cut => -magnitude,
        Goal::Bulk => magnitude,
    }
}

/// Energy target plus protein/fat from g/kg and the remainder as carbs
pub fn compute_energy_targets(profile: &Profile) -> EnergyTargets {
    let tdee = basal_metabolic_rate(profile) * profile.activity.multiplier();
    let target_kcal = round_half_up(tdee + daily_adjustment(profile));

    let protein_g = round_half_up(profile.protein_per_kg * profile.weight_kg);
    let fat_g = round_half_up(profile.fat_per_kg * profile.weight_kg);

    let remaining = target_kcal as f64
        - protein_g as f64 * KCAL_PER_G_PROTEIN
        - fat_g as f64 * KCAL_PER_G_FAT;
    let carb_g = round_half_up(remaining / KCAL_PER_G_CARB).max(0);

    EnergyTargets {
        target_kcal,
        protein_g,
        carb_g,
        fat_g,
    }
}
