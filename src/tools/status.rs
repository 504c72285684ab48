//! Status Tool
//!
//! Runtime status of the service plus the usage guide served to clients.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;
use crate::db::Database;
use crate::models::{DayLog, FoodItem, Recipe};

/// How to drive the nutrition tools
pub const NUTRITION_INSTRUCTIONS: &str = r#"
# Discipline Nutrition Guide

## Model

1. **Food items** hold nutrition per 100 g (or 100 ml): kcal, protein, carbs, fat.
   Nine common foods are preloaded (riz, poulet, oeuf, avoine, banane, brocoli,
   huile-olive, pates, thon).
2. **Recipes** are lists of (food, grams) plus a number of servings.
   A recipe's per-serving macros are its totals divided by its servings.
3. **Days** hold four slots (breakfast, lunch, dinner, snack). Each entry is a
   recipe and a number of portions (servings eaten).
4. **Profile** (age, sex, height, weight, activity, goal, rate, protein and fat
   per kg) gives the daily targets.

## Typical flow

1. `list_food_items` with a `query` to find ingredients. Add missing ones with
   `add_food_item` (name required, kcal > 0, values per 100 g).
2. `create_recipe` with a name and servings, then `add_recipe_ingredient` for
   each food with its weight in grams.
3. `log_meal` with the recipe id. Date defaults to today, slot to lunch,
   portions to 1.
4. `get_dashboard` to compare the day against the targets.

## Rules

- Every value is rounded to whole numbers, line by line. A recipe total is the
  sum of its rounded lines.
- Editing a food changes every recipe that uses it.
- Deleting a food or recipe keeps old references. They show up by raw id and
  count as zero (`missing_foods`, `stale_entries`).
- Meal entries cannot be removed once logged.
- A day is on target when its kcal is between 85% and 105% of the target.

## Goals

- `maintain`: target = TDEE.
- `cut` / `bulk`: TDEE minus / plus `rate_per_week_kg × 1000` kcal,
  kept between 200 and 700 kcal.

Dates use ISO format: YYYY-MM-DD.
"#;

/// Runtime status of the service
#[derive(Debug, Clone, Serialize)]
pub struct DisciplineStatus {
    pub build: BuildInfo,

    /// Database information
    pub database_path: String,
    pub database_size_bytes: Option<u64>,
    pub food_items: i64,
    pub recipes: i64,
    pub logged_days: i64,

    /// Process information
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

/// Status tracker for collecting runtime information
pub struct StatusTracker {
    start_time: Instant,
    database_path: PathBuf,
}

impl StatusTracker {
    pub fn new(database_path: PathBuf) -> Self {
        Self {
            start_time: Instant::now(),
            database_path,
        }
    }

    /// Get the current status
    pub fn get_status(&self, db: &Database) -> Result<DisciplineStatus, String> {
        let database_size_bytes = std::fs::metadata(&self.database_path)
            .ok()
            .map(|m| m.len());

        let (food_items, recipes, logged_days) = db
            .with_conn(|conn| {
                Ok((
                    FoodItem::count(conn)?,
                    Recipe::count(conn)?,
                    DayLog::count(conn)?,
                ))
            })
            .map_err(|e| format!("Database error: {}", e))?;

        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        Ok(DisciplineStatus {
            build: BuildInfo::current(),
            database_path: self.database_path.display().to_string(),
            database_size_bytes,
            food_items,
            recipes,
            logged_days,
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecipeCreate;
    use crate::tools::days::log_meal;
    use crate::tools::recipes::create_recipe;

    #[test]
    fn test_status_counts() {
        let db = Database::open_in_memory().unwrap();
        let tracker = StatusTracker::new(PathBuf::from(":memory:"));
        let status = tracker.get_status(&db).unwrap();
        assert_eq!(status.food_items, 9);
        assert_eq!(status.recipes, 0);
        assert_eq!(status.logged_days, 0);
        assert_eq!(status.database_size_bytes, None);
        assert_eq!(status.process_id, std::process::id());
        assert_eq!(status.build.schema_version, crate::db::migrations::SCHEMA_VERSION);
    }

    #[test]
    fn test_status_counts_rows() {
        let db = Database::open_in_memory().unwrap();
        let recipe = create_recipe(
            &db,
            RecipeCreate {
                name: "Bol".to_string(),
                servings: 1,
            },
        )
        .unwrap();
        log_meal(&db, Some("2024-06-01"), None, &recipe.id, None).unwrap();
        log_meal(&db, Some("2024-06-01"), Some("dinner"), &recipe.id, None).unwrap();
        log_meal(&db, Some("2024-06-02"), None, &recipe.id, None).unwrap();

        let status = StatusTracker::new(PathBuf::from(":memory:")).get_status(&db).unwrap();
        assert_eq!(status.recipes, 1);
        assert_eq!(status.logged_days, 2);
    }
}
