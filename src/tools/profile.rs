//! Profile MCP Tools
//!
//! Read and edit the physiological profile, and derive its daily targets.

use serde::Serialize;

use crate::db::Database;
use crate::models::{Profile, ProfileUpdate};
use crate::nutrition::{basal_metabolic_rate, compute_energy_targets, daily_adjustment, EnergyTargets};

/// Response for get_profile / update_profile
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub profile: Profile,
    pub targets: EnergyTargets,
}

/// Response for get_energy_targets
#[derive(Debug, Serialize)]
pub struct EnergyTargetsResponse {
    pub bmr: f64,
    pub tdee: f64,
    pub adjustment_kcal: f64,
    pub targets: EnergyTargets,
}

/// Get the profile with its current targets
pub fn get_profile(db: &Database) -> Result<ProfileResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let profile = Profile::get(&conn).map_err(|e| format!("Failed to load profile: {}", e))?;
    let targets = compute_energy_targets(&profile);
    Ok(ProfileResponse { profile, targets })
}

/// Apply a partial profile edit
pub fn update_profile(db: &Database, data: ProfileUpdate) -> Result<ProfileResponse, String> {
    let numbers = [
        ("height_cm", data.height_cm),
        ("weight_kg", data.weight_kg),
        ("rate_per_week_kg", data.rate_per_week_kg),
        ("protein_per_kg", data.protein_per_kg),
        ("fat_per_kg", data.fat_per_kg),
    ];
    for (field, value) in numbers {
        if let Some(v) = value {
            if !v.is_finite() {
                return Err(format!("{} must be a number", field));
            }
            // rate is a magnitude; the goal carries the sign
            if v < 0.0 && field != "rate_per_week_kg" {
                return Err(format!("{} cannot be negative", field));
            }
        }
    }

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let profile = Profile::update(&conn, &data).map_err(|e| format!("Failed to update profile: {}", e))?;
    tracing::info!(goal = profile.goal.as_str(), weight_kg = profile.weight_kg, "profile updated");

    let targets = compute_energy_targets(&profile);
    Ok(ProfileResponse { profile, targets })
}

/// Break the targets down into BMR, TDEE and goal adjustment
pub fn get_energy_targets(db: &Database) -> Result<EnergyTargetsResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let profile = Profile::get(&conn).map_err(|e| format!("Failed to load profile: {}", e))?;

    let bmr = basal_metabolic_rate(&profile);
    Ok(EnergyTargetsResponse {
        bmr,
        tdee: bmr * profile.activity.multiplier(),
        adjustment_kcal: daily_adjustment(&profile),
        targets: compute_energy_targets(&profile),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ActivityLevel, Goal};

    #[test]
    fn test_default_profile_targets() {
        let db = Database::open_in_memory().unwrap();
        let response = get_profile(&db).unwrap();
        assert_eq!(response.profile, Profile::default());
        assert_eq!(response.targets.target_kcal, 2594);
    }

    #[test]
    fn test_update_rejects_negative_weight() {
        let db = Database::open_in_memory().unwrap();
        let err = update_profile(
            &db,
            ProfileUpdate {
                weight_kg: Some(-70.0),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(err.contains("weight_kg"));
    }

    #[test]
    fn test_update_then_targets() {
        let db = Database::open_in_memory().unwrap();
        update_profile(
            &db,
            ProfileUpdate {
                goal: Some(Goal::Bulk),
                rate_per_week_kg: Some(0.25),
                activity: Some(ActivityLevel::Active),
                ..Default::default()
            },
        )
        .unwrap();

        let targets = get_energy_targets(&db).unwrap();
        assert_eq!(targets.bmr, 1673.75);
        assert_eq!(targets.adjustment_kcal, 250.0);
        // 1673.75 * 1.725 + 250 = 3137.21875
        assert_eq!(targets.targets.target_kcal, 3137);
    }
}
