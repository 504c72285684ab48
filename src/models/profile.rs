//! Profile model
//!
//! The single physiological profile that drives the energy targets.

use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Deserializer, Serialize};

use crate::db::DbResult;

/// Biological sex, as used by Mifflin-St Jeor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
pub enum Sex {
    #[default]
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
}

impl Sex {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Male => "M",
            Sex::Female => "F",
        }
    }

    /// Lenient parse: anything other than F/female reads as male
    pub fn from_str(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "f" | "female" | "femme" => Sex::Female,
            _ => Sex::Male,
        }
    }
}

impl<'de> Deserialize<'de> for Sex {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Sex::from_str(&s))
    }
}

/// Activity level, mapped to a TDEE multiplier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    #[default]
    Moderate,
    Active,
    Very,
}

impl ActivityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "sedentary",
            ActivityLevel::Light => "light",
            ActivityLevel::Moderate => "moderate",
            ActivityLevel::Active => "active",
            ActivityLevel::Very => "very",
        }
    }

    /// Unknown levels fall back to moderate
    pub fn from_str(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "sedentary" => ActivityLevel::Sedentary,
            "light" => ActivityLevel::Light,
            "active" => ActivityLevel::Active,
            "very" => ActivityLevel::Very,
            _ => ActivityLevel::Moderate,
        }
    }

    pub fn multiplier(&self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::Active => 1.725,
            ActivityLevel::Very => 1.9,
        }
    }
}

impl<'de> Deserialize<'de> for ActivityLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(ActivityLevel::from_str(&s))
    }
}

/// Body-mass goal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Goal {
    #[default]
    Maintain,
    Cut,
    Bulk,
}

impl Goal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Goal::Maintain => "maintain",
            Goal::Cut => "cut",
            Goal::Bulk => "bulk",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "cut" => Goal::Cut,
            "bulk" => Goal::Bulk,
            _ => Goal::Maintain,
        }
    }
}

/// Physiological profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub age: u32,
    pub sex: Sex,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub activity: ActivityLevel,
    pub goal: Goal,
    pub rate_per_week_kg: f64,
    pub protein_per_kg: f64,
    pub fat_per_kg: f64,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            age: 25,
            sex: Sex::Male,
            height_cm: 175.0,
            weight_kg: 70.0,
            activity: ActivityLevel::Moderate,
            goal: Goal::Maintain,
            rate_per_week_kg: 0.0,
            protein_per_kg: 2.0,
            fat_per_kg: 0.8,
        }
    }
}

/// Partial profile edit
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub age: Option<u32>,
    pub sex: Option<Sex>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub activity: Option<ActivityLevel>,
    pub goal: Option<Goal>,
    pub rate_per_week_kg: Option<f64>,
    pub protein_per_kg: Option<f64>,
    pub fat_per_kg: Option<f64>,
}

impl ProfileUpdate {
    pub fn apply(&self, profile: &mut Profile) {
        macro_rules! set {
            ($field:ident) => {
                if let Some(v) = self.$field {
                    profile.$field = v;
                }
            };
        }

        set!(age);
        set!(sex);
        set!(height_cm);
        set!(weight_kg);
        set!(activity);
        set!(goal);
        set!(rate_per_week_kg);
        set!(protein_per_kg);
        set!(fat_per_kg);
    }
}

impl Profile {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            age: row.get("age")?,
            sex: Sex::from_str(&row.get::<_, String>("sex")?),
            height_cm: row.get("height_cm")?,
            weight_kg: row.get("weight_kg")?,
            activity: ActivityLevel::from_str(&row.get::<_, String>("activity")?),
            goal: Goal::from_str(&row.get::<_, String>("goal")?),
            rate_per_week_kg: row.get("rate_per_week_kg")?,
            protein_per_kg: row.get("protein_per_kg")?,
            fat_per_kg: row.get("fat_per_kg")?,
        })
    }

    /// Stored profile, or the default one when none was saved yet
    pub fn get(conn: &Connection) -> DbResult<Self> {
        let mut stmt = conn.prepare("SELECT * FROM profile WHERE id = 1")?;
        let stored = stmt.query_row([], Self::from_row).optional()?;
        Ok(stored.unwrap_or_default())
    }

    /// Save the profile (upsert of the single row)
    pub fn set(conn: &Connection, profile: &Profile) -> DbResult<()> {
        conn.execute(
            r#"
            INSERT INTO profile (
                id, age, sex, height_cm, weight_kg, activity, goal,
                rate_per_week_kg, protein_per_kg, fat_per_kg
            ) VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ON CONFLICT(id) DO UPDATE SET
                age = excluded.age,
                sex = excluded.sex,
                height_cm = excluded.height_cm,
                weight_kg = excluded.weight_kg,
                activity = excluded.activity,
                goal = excluded.goal,
                rate_per_week_kg = excluded.rate_per_week_kg,
                protein_per_kg = excluded.protein_per_kg,
                fat_per_kg = excluded.fat_per_kg,
                updated_at = datetime('now')
            "#,
            params![
                profile.age,
                profile.sex.as_str(),
                profile.height_cm,
                profile.weight_kg,
                profile.activity.as_str(),
                profile.goal.as_str(),
                profile.rate_per_week_kg,
                profile.protein_per_kg,
                profile.fat_per_kg,
            ],
        )?;
        Ok(())
    }

    /// Apply a partial edit to the stored profile and save it
    pub fn update(conn: &Connection, data: &ProfileUpdate) -> DbResult<Self> {
        let mut profile = Self::get(conn)?;
        data.apply(&mut profile);
        Self::set(conn, &profile)?;
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    #[test]
    fn test_lenient_enum_parsing() {
        assert_eq!(ActivityLevel::from_str("VERY"), ActivityLevel::Very);
        assert_eq!(ActivityLevel::from_str("couch"), ActivityLevel::Moderate);
        assert_eq!(Sex::from_str("F"), Sex::Female);
        assert_eq!(Sex::from_str("H"), Sex::Male);
        assert_eq!(Goal::from_str("bulk"), Goal::Bulk);
        assert_eq!(Goal::from_str(""), Goal::Maintain);
    }

    #[test]
    fn test_profile_json_round_trip_is_lenient() {
        let json = r#"{
            "age": 31, "sex": "F", "height_cm": 165.0, "weight_kg": 60.0,
            "activity": "extreme", "goal": "cut", "rate_per_week_kg": 0.5,
            "protein_per_kg": 1.8, "fat_per_kg": 0.9
        }"#;
        let profile: Profile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.sex, Sex::Female);
        assert_eq!(profile.activity, ActivityLevel::Moderate);
        assert_eq!(profile.goal, Goal::Cut);

        let out = serde_json::to_value(&profile).unwrap();
        assert_eq!(out["sex"], "F");
        assert_eq!(out["activity"], "moderate");
    }

    #[test]
    fn test_get_defaults_then_update() {
        let db = Database::open_in_memory().unwrap();
        db.with_conn(|conn| {
            assert_eq!(Profile::get(conn)?, Profile::default());

            let updated = Profile::update(
                conn,
                &ProfileUpdate {
                    weight_kg: Some(82.5),
                    goal: Some(Goal::Cut),
                    ..Default::default()
                },
            )?;
            assert_eq!(updated.weight_kg, 82.5);
            assert_eq!(updated.height_cm, 175.0);

            let stored = Profile::get(conn)?;
            assert_eq!(stored, updated);
            Ok(())
        })
        .unwrap();
    }
}
