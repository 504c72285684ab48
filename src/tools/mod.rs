//! Discipline Tools module
//!
//! Tool implementations behind the MCP server: validate input, load records
//! from the store, run the nutrition core and shape the response.

pub mod dashboard;
pub mod days;
pub mod food_items;
pub mod profile;
pub mod recipes;
pub mod status;

use chrono::NaiveDate;

use crate::models::{MealSlot, DATE_FORMAT};

/// Parse a YYYY-MM-DD date, defaulting to today (local time)
pub fn parse_date(date: Option<&str>) -> Result<NaiveDate, String> {
    match date.map(str::trim).filter(|d| !d.is_empty()) {
        Some(d) => NaiveDate::parse_from_str(d, DATE_FORMAT)
            .map_err(|_| format!("Invalid date '{}', expected YYYY-MM-DD", d)),
        None => Ok(chrono::Local::now().date_naive()),
    }
}

/// Parse a meal slot, defaulting to lunch
pub fn parse_slot(slot: Option<&str>) -> Result<MealSlot, String> {
    match slot.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => MealSlot::parse(s)
            .ok_or_else(|| format!("Invalid slot '{}', expected breakfast, lunch, dinner or snack", s)),
        None => Ok(MealSlot::Lunch),
    }
}
