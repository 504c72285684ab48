//! Day and Meal Entry MCP Tools
//!
//! Tools for logging meals and reading day totals.

use chrono::NaiveDate;
use serde::Serialize;

use super::{parse_date, parse_slot};
use crate::db::Database;
use crate::models::{DayLog, FoodItem, Macros, MealEntry, MealSlot, Profile, Recipe, DATE_FORMAT};
use crate::nutrition::{compute_energy_targets, day_breakdown, day_totals, is_on_target};

/// Response for log_meal
#[derive(Debug, Serialize)]
pub struct LogMealResponse {
    pub date: String,
    pub slot: MealSlot,
    pub recipe_id: String,
    pub recipe_name: String,
    pub portions: f64,
    pub contribution: Macros,
    pub day_totals: Macros,
}

/// One logged entry in a day view
#[derive(Debug, Serialize)]
pub struct EntryView {
    pub recipe_id: String,
    /// Recipe name, or the raw id when the recipe was deleted
    pub label: String,
    pub portions: f64,
    pub macros: Option<Macros>,
}

/// Entries organized by slot
#[derive(Debug, Default, Serialize)]
pub struct SlotEntries {
    pub breakfast: Vec<EntryView>,
    pub lunch: Vec<EntryView>,
    pub dinner: Vec<EntryView>,
    pub snack: Vec<EntryView>,
}

impl SlotEntries {
    fn slot_mut(&mut self, slot: MealSlot) -> &mut Vec<EntryView> {
        match slot {
            MealSlot::Breakfast => &mut self.breakfast,
            MealSlot::Lunch => &mut self.lunch,
            MealSlot::Dinner => &mut self.dinner,
            MealSlot::Snack => &mut self.snack,
        }
    }
}

/// Day with its entries and totals
#[derive(Debug, Serialize)]
pub struct DayDetail {
    pub date: String,
    pub meals: SlotEntries,
    pub totals: Macros,
    pub entry_count: usize,
    /// Entries whose recipe no longer exists
    pub stale_entries: usize,
}

/// Day summary for listing
#[derive(Debug, Serialize)]
pub struct DaySummary {
    pub date: String,
    pub totals: Macros,
    pub entry_count: usize,
    pub on_target: bool,
}

/// Response for list_days
#[derive(Debug, Serialize)]
pub struct ListDaysResponse {
    pub days: Vec<DaySummary>,
    pub total: usize,
    pub target_kcal: i64,
}

/// Log a portion of a recipe. Date defaults to today, slot to lunch, portions to 1.
pub fn log_meal(
    db: &Database,
    date: Option<&str>,
    slot: Option<&str>,
    recipe_id: &str,
    portions: Option<f64>,
) -> Result<LogMealResponse, String> {
    let date = parse_date(date)?;
    let slot = parse_slot(slot)?;
    let portions = portions.unwrap_or(1.0);
    if !portions.is_finite() || portions <= 0.0 {
        return Err("portions must be greater than 0".to_string());
    }

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let recipe = Recipe::get_by_id(&conn, recipe_id)
        .map_err(|e| format!("Database error checking recipe: {}", e))?
        .ok_or_else(|| format!("Recipe not found with id: {}", recipe_id))?;

    let entry = MealEntry::new(recipe_id, portions);
    DayLog::add_entry(&conn, date, slot, &entry)
        .map_err(|e| format!("Failed to log meal: {}", e))?;

    let foods = FoodItem::load_catalog(&conn)
        .map_err(|e| format!("Failed to load foods: {}", e))?;
    let recipes = Recipe::load_catalog(&conn)
        .map_err(|e| format!("Failed to load recipes: {}", e))?;
    let day = DayLog::load(&conn, date).map_err(|e| format!("Failed to load day: {}", e))?;

    let contribution = crate::nutrition::resolve_entry(&entry, &recipes, &foods).unwrap_or_default();

    Ok(LogMealResponse {
        date: date.format(DATE_FORMAT).to_string(),
        slot,
        recipe_id: recipe.id,
        recipe_name: recipe.name,
        portions,
        contribution,
        day_totals: day_totals(&day, &recipes, &foods),
    })
}

/// Get a day with per-entry contributions. A day with nothing logged comes back empty.
pub fn get_day(db: &Database, date: Option<&str>) -> Result<DayDetail, String> {
    let date = parse_date(date)?;
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let day = DayLog::load(&conn, date).map_err(|e| format!("Failed to load day: {}", e))?;
    let foods = FoodItem::load_catalog(&conn)
        .map_err(|e| format!("Failed to load foods: {}", e))?;
    let recipes = Recipe::load_catalog(&conn)
        .map_err(|e| format!("Failed to load recipes: {}", e))?;

    let mut meals = SlotEntries::default();
    let mut stale_entries = 0;
    for line in day_breakdown(&day, &recipes, &foods) {
        if line.macros.is_none() {
            stale_entries += 1;
        }
        meals.slot_mut(line.slot).push(EntryView {
            recipe_id: line.entry.recipe_id.clone(),
            label: line.recipe_name.unwrap_or(&line.entry.recipe_id).to_string(),
            portions: line.entry.portions,
            macros: line.macros,
        });
    }

    if stale_entries > 0 {
        tracing::debug!(date = %date, stale_entries, "day references deleted recipes");
    }

    Ok(DayDetail {
        date: date.format(DATE_FORMAT).to_string(),
        totals: day_totals(&day, &recipes, &foods),
        entry_count: day.meals.len(),
        meals,
        stale_entries,
    })
}

/// List logged days, newest first, with their totals
pub fn list_days(db: &Database) -> Result<ListDaysResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let dates: Vec<NaiveDate> = DayLog::list_dates(&conn)
        .map_err(|e| format!("Failed to list days: {}", e))?;
    let foods = FoodItem::load_catalog(&conn)
        .map_err(|e| format!("Failed to load foods: {}", e))?;
    let recipes = Recipe::load_catalog(&conn)
        .map_err(|e| format!("Failed to load recipes: {}", e))?;
    let profile = Profile::get(&conn).map_err(|e| format!("Failed to load profile: {}", e))?;
    let target_kcal = compute_energy_targets(&profile).target_kcal;

    let mut days = Vec::with_capacity(dates.len());
    for date in dates {
        let day = DayLog::load(&conn, date).map_err(|e| format!("Failed to load day: {}", e))?;
        let totals = day_totals(&day, &recipes, &foods);
        days.push(DaySummary {
            date: date.format(DATE_FORMAT).to_string(),
            totals,
            entry_count: day.meals.len(),
            on_target: is_on_target(totals.kcal, target_kcal),
        });
    }

    let total = days.len();
    Ok(ListDaysResponse {
        days,
        total,
        target_kcal,
    })
}
