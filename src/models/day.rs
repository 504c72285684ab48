//! Day log model
//!
//! Per-date meal log: four slots, each an ordered list of recipe portions.
//! Days are created lazily the first time something is logged on them.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};

/// Storage format of day keys
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Meal slot of a day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealSlot {
    Breakfast,
    Lunch,
    Dinner,
    #[serde(alias = "snacks")]
    Snack,
}

impl MealSlot {
    pub const ALL: [MealSlot; 4] = [
        MealSlot::Breakfast,
        MealSlot::Lunch,
        MealSlot::Dinner,
        MealSlot::Snack,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MealSlot::Breakfast => "breakfast",
            MealSlot::Lunch => "lunch",
            MealSlot::Dinner => "dinner",
            MealSlot::Snack => "snack",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "breakfast" => Some(MealSlot::Breakfast),
            "lunch" => Some(MealSlot::Lunch),
            "dinner" => Some(MealSlot::Dinner),
            "snack" | "snacks" => Some(MealSlot::Snack),
            _ => None,
        }
    }
}

impl std::fmt::Display for MealSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_portions() -> f64 {
    1.0
}

/// A logged portion of a recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealEntry {
    pub recipe_id: String,
    #[serde(default = "default_portions")]
    pub portions: f64,
}

impl MealEntry {
    pub fn new(recipe_id: impl Into<String>, portions: f64) -> Self {
        Self {
            recipe_id: recipe_id.into(),
            portions,
        }
    }
}

/// The four slots of a day, in display order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DayMeals {
    #[serde(default)]
    pub breakfast: Vec<MealEntry>,
    #[serde(default)]
    pub lunch: Vec<MealEntry>,
    #[serde(default)]
    pub dinner: Vec<MealEntry>,
    #[serde(default, alias = "snacks")]
    pub snack: Vec<MealEntry>,
}

impl DayMeals {
    pub fn slot(&self, slot: MealSlot) -> &[MealEntry] {
        match slot {
            MealSlot::Breakfast => &self.breakfast,
            MealSlot::Lunch => &self.lunch,
            MealSlot::Dinner => &self.dinner,
            MealSlot::Snack => &self.snack,
        }
    }

    pub fn slot_mut(&mut self, slot: MealSlot) -> &mut Vec<MealEntry> {
        match slot {
            MealSlot::Breakfast => &mut self.breakfast,
            MealSlot::Lunch => &mut self.lunch,
            MealSlot::Dinner => &mut self.dinner,
            MealSlot::Snack => &mut self.snack,
        }
    }

    /// Every entry with its slot, slot by slot in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (MealSlot, &MealEntry)> + '_ {
        MealSlot::ALL
            .into_iter()
            .flat_map(move |slot| self.slot(slot).iter().map(move |entry| (slot, entry)))
    }

    pub fn len(&self) -> usize {
        MealSlot::ALL.iter().map(|s| self.slot(*s).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One calendar day of logged meals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayLog {
    pub date: NaiveDate,
    pub meals: DayMeals,
}

/// In-memory date -> day map
#[derive(Debug, Clone, Default)]
pub struct DayLogBook {
    days: BTreeMap<NaiveDate, DayLog>,
}

impl DayLog {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            meals: DayMeals::default(),
        }
    }

    /// Append `entry` to the end of `slot`
    pub fn push(&mut self, slot: MealSlot, entry: MealEntry) {
        self.meals.slot_mut(slot).push(entry);
    }

    /// Get the stored day, if anything was ever logged on it
    pub fn get_by_date(conn: &Connection, date: NaiveDate) -> DbResult<Option<Self>> {
        let key = date.format(DATE_FORMAT).to_string();
        let found = conn
            .query_row("SELECT 1 FROM days WHERE date = ?1", [&key], |_| Ok(()))
            .optional()?;
        if found.is_none() {
            return Ok(None);
        }
        Self::load(conn, date).map(Some)
    }

    /// Load the day's entries; a day never logged comes back empty
    pub fn load(conn: &Connection, date: NaiveDate) -> DbResult<Self> {
        let key = date.format(DATE_FORMAT).to_string();
        let mut stmt = conn.prepare(
            "SELECT slot, recipe_id, portions FROM meal_entries WHERE date = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map([&key], |row| {
            Ok((
                row.get::<_, String>(0)?,
                MealEntry {
                    recipe_id: row.get(1)?,
                    portions: row.get(2)?,
                },
            ))
        })?;

        let mut day = DayLog::new(date);
        for row in rows {
            let (slot, entry) = row?;
            let slot = MealSlot::parse(&slot)
                .ok_or_else(|| DbError::InvalidValue(format!("meal slot '{}' on {}", slot, key)))?;
            day.push(slot, entry);
        }
        Ok(day)
    }

    /// Get the day, creating its row if needed
    pub fn get_or_create(conn: &Connection, date: NaiveDate) -> DbResult<Self> {
        let key = date.format(DATE_FORMAT).to_string();
        conn.execute("INSERT OR IGNORE INTO days (date) VALUES (?1)", [&key])?;
        Self::load(conn, date)
    }

    /// Append a meal entry, creating the day if absent
    pub fn add_entry(conn: &Connection, date: NaiveDate, slot: MealSlot, entry: &MealEntry) -> DbResult<()> {
        let key = date.format(DATE_FORMAT).to_string();
        conn.execute("INSERT OR IGNORE INTO days (date) VALUES (?1)", [&key])?;
        conn.execute(
            "INSERT INTO meal_entries (date, slot, recipe_id, portions) VALUES (?1, ?2, ?3, ?4)",
            params![key, slot.as_str(), entry.recipe_id, entry.portions],
        )?;
        tracing::debug!(date = %key, slot = %slot, recipe_id = %entry.recipe_id, "meal entry logged");
        Ok(())
    }

    pub fn count(conn: &Connection) -> DbResult<i64> {
        Ok(conn.query_row("SELECT COUNT(*) FROM days", [], |row| row.get(0))?)
    }

    /// Every date with a day row, newest first
    pub fn list_dates(conn: &Connection) -> DbResult<Vec<NaiveDate>> {
        let mut stmt = conn.prepare("SELECT date FROM days ORDER BY date DESC")?;
        let keys = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        keys.iter()
            .map(|key| {
                NaiveDate::parse_from_str(key, DATE_FORMAT)
                    .map_err(|e| DbError::InvalidValue(format!("day key '{}': {}", key, e)))
            })
            .collect()
    }
}

impl DayLogBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, date: NaiveDate) -> Option<&DayLog> {
        self.days.get(&date)
    }

    pub fn get_or_create(&mut self, date: NaiveDate) -> &mut DayLog {
        self.days.entry(date).or_insert_with(|| DayLog::new(date))
    }

    /// Append to `slot` of `date`, creating the day first if needed
    pub fn add_entry(&mut self, date: NaiveDate, slot: MealSlot, entry: MealEntry) {
        self.get_or_create(date).push(slot, entry);
    }

    /// Dates in ascending order
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.days.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    #[test]
    fn test_slot_parsing() {
        assert_eq!(MealSlot::parse("Lunch"), Some(MealSlot::Lunch));
        assert_eq!(MealSlot::parse("snacks"), Some(MealSlot::Snack));
        assert_eq!(MealSlot::parse("brunch"), None);
        let slot: MealSlot = serde_json::from_str("\"snacks\"").unwrap();
        assert_eq!(slot, MealSlot::Snack);
    }

    #[test]
    fn test_meal_entry_portions_default_to_one() {
        let entry: MealEntry = serde_json::from_str(r#"{"recipe_id": "r-bol"}"#).unwrap();
        assert_eq!(entry.portions, 1.0);
    }

    #[test]
    fn test_book_creates_days_lazily() {
        let mut book = DayLogBook::new();
        let d = date("2024-03-02");
        assert!(book.get(d).is_none());

        book.add_entry(d, MealSlot::Dinner, MealEntry::new("r-a", 1.0));
        book.add_entry(d, MealSlot::Breakfast, MealEntry::new("r-b", 2.0));
        book.add_entry(d, MealSlot::Dinner, MealEntry::new("r-c", 0.5));

        let day = book.get(d).unwrap();
        assert_eq!(day.meals.len(), 3);
        let order: Vec<&str> = day.meals.iter().map(|(_, e)| e.recipe_id.as_str()).collect();
        assert_eq!(order, vec!["r-b", "r-a", "r-c"]);
        assert_eq!(book.len(), 1);
    }

    #[test]
    fn test_add_entry_and_load() {
        let db = Database::open_in_memory().unwrap();
        let d = date("2024-05-10");
        db.with_conn(|conn| {
            assert!(DayLog::get_by_date(conn, d)?.is_none());
            assert!(DayLog::load(conn, d)?.meals.is_empty());

            DayLog::add_entry(conn, d, MealSlot::Lunch, &MealEntry::new("r-bol", 1.0))?;
            DayLog::add_entry(conn, d, MealSlot::Lunch, &MealEntry::new("r-salade", 0.5))?;
            DayLog::add_entry(conn, d, MealSlot::Snack, &MealEntry::new("r-gone", 2.0))?;

            let day = DayLog::get_by_date(conn, d)?.unwrap();
            assert_eq!(day.meals.lunch.len(), 2);
            assert_eq!(day.meals.lunch[1], MealEntry::new("r-salade", 0.5));
            assert_eq!(day.meals.snack.len(), 1);
            assert_eq!(DayLog::count(conn)?, 1);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_list_dates_newest_first() {
        let db = Database::open_in_memory().unwrap();
        db.with_conn(|conn| {
            DayLog::get_or_create(conn, date("2024-01-01"))?;
            DayLog::get_or_create(conn, date("2024-02-01"))?;
            DayLog::get_or_create(conn, date("2024-01-01"))?;
            assert_eq!(
                DayLog::list_dates(conn)?,
                vec![date("2024-02-01"), date("2024-01-01")]
            );
            Ok(())
        })
        .unwrap();
    }
}
