//! Dashboard Tool
//!
//! A day's totals against the profile targets.

use serde::Serialize;

use super::parse_date;
use crate::db::Database;
use crate::models::{DayLog, FoodItem, Profile, Recipe, DATE_FORMAT};
use crate::nutrition::{compute_energy_targets, day_totals, EnergyTargets, MacroProgress};

/// Response for get_dashboard
#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub date: String,
    pub targets: EnergyTargets,
    pub progress: MacroProgress,
    pub entry_count: usize,
}

/// Progress of `date` (default today) towards the daily targets
pub fn get_dashboard(db: &Database, date: Option<&str>) -> Result<DashboardResponse, String> {
    let date = parse_date(date)?;
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let profile = Profile::get(&conn).map_err(|e| format!("Failed to load profile: {}", e))?;
    let day = DayLog::load(&conn, date).map_err(|e| format!("Failed to load day: {}", e))?;
    let foods = FoodItem::load_catalog(&conn)
        .map_err(|e| format!("Failed to load foods: {}", e))?;
    let recipes = Recipe::load_catalog(&conn)
        .map_err(|e| format!("Failed to load recipes: {}", e))?;

    let targets = compute_energy_targets(&profile);
    let totals = day_totals(&day, &recipes, &foods);

    Ok(DashboardResponse {
        date: date.format(DATE_FORMAT).to_string(),
        targets,
        progress: MacroProgress::new(totals, &targets),
        entry_count: day.meals.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Ingredient, RecipeCreate};
    use crate::tools::days::log_meal;

    #[test]
    fn test_empty_day_is_off_target() {
        let db = Database::open_in_memory().unwrap();
        let dashboard = get_dashboard(&db, Some("2024-02-29")).unwrap();
        assert_eq!(dashboard.targets.target_kcal, 2594);
        assert_eq!(dashboard.progress.kcal.consumed, 0);
        assert!(!dashboard.progress.on_target);
    }

    #[test]
    fn test_full_day_is_on_target() {
        let db = Database::open_in_memory().unwrap();
        // 500 g avoine: 1945 kcal; 300 g pates: 471 kcal
        let id = db
            .with_conn(|conn| {
                let recipe = Recipe::create(
                    conn,
                    &RecipeCreate {
                        name: "Grosse journee".to_string(),
                        servings: 1,
                    },
                )?;
                Recipe::add_ingredient(conn, &recipe.id, &Ingredient::new("avoine", 500.0))?;
                Recipe::add_ingredient(conn, &recipe.id, &Ingredient::new("pates", 300.0))?;
                Ok(recipe.id)
            })
            .unwrap();
        log_meal(&db, Some("2024-03-01"), Some("dinner"), &id, None).unwrap();

        let dashboard = get_dashboard(&db, Some("2024-03-01")).unwrap();
        assert_eq!(dashboard.progress.kcal.consumed, 2416);
        assert!(dashboard.progress.on_target);
        assert_eq!(dashboard.entry_count, 1);
    }
}
