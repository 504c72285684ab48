//! Day log aggregation

use chrono::NaiveDate;
use serde::Serialize;

use super::composer::scaled_by_portions;
use crate::models::{DayLog, DayLogBook, FoodCatalog, Macros, MealEntry, MealSlot, RecipeCatalog};

/// Portions as counted: non-positive or non-finite values read as one
pub fn effective_portions(portions: f64) -> f64 {
    if portions.is_finite() && portions > 0.0 {
        portions
    } else {
        1.0
    }
}

/// Contribution of one entry, or `None` when its recipe no longer exists
pub fn resolve_entry(entry: &MealEntry, recipes: &RecipeCatalog, foods: &FoodCatalog) -> Option<Macros> {
    recipes
        .get(&entry.recipe_id)
        .map(|recipe| scaled_by_portions(recipe, foods, effective_portions(entry.portions)))
}

/// Everything eaten on the day; stale entries count as zero
pub fn day_totals(day: &DayLog, recipes: &RecipeCatalog, foods: &FoodCatalog) -> Macros {
    day.meals
        .iter()
        .map(|(_, entry)| resolve_entry(entry, recipes, foods).unwrap_or_default())
        .sum()
}

/// One logged entry with its slot and contribution
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryContribution<'a> {
    pub slot: MealSlot,
    pub entry: &'a MealEntry,
    pub recipe_name: Option<&'a str>,
    pub macros: Option<Macros>,
}

/// Per-entry view of a day, slot by slot
pub fn day_breakdown<'a>(
    day: &'a DayLog,
    recipes: &'a RecipeCatalog,
    foods: &FoodCatalog,
) -> Vec<EntryContribution<'a>> {
    day.meals
        .iter()
        .map(|(slot, entry)| EntryContribution {
            slot,
            entry,
            recipe_name: recipes.get(&entry.recipe_id).map(|r| r.name.as_str()),
            macros: resolve_entry(entry, recipes, foods),
        })
        .collect()
}

/// Append an entry to `book`, creating the day when absent
pub fn add_entry(book: &mut DayLogBook, date: NaiveDate, slot: MealSlot, recipe_id: &str, portions: f64) {
    book.add_entry(date, slot, MealEntry::new(recipe_id, portions));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FoodItem, Ingredient, Per100, Recipe};

    fn foods() -> FoodCatalog {
        vec![
            // 100 g -> 100 kcal, 10 p, 10 c, 2 f
            FoodItem::new("base", "Base", Per100::new(100.0, 10.0, 10.0, 2.0)),
            FoodItem::new("riz", "Riz blanc cuit", Per100::new(130.0, 2.4, 28.0, 0.3)),
        ]
        .into_iter()
        .collect()
    }

    fn recipes() -> RecipeCatalog {
        vec![
            Recipe::new("r1", "Base", 1).with_items(vec![Ingredient::new("base", 100.0)]),
            Recipe::new("r-riz", "Riz", 2).with_items(vec![Ingredient::new("riz", 200.0)]),
        ]
        .into_iter()
        .collect()
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn test_empty_day_is_zero() {
        assert!(day_totals(&DayLog::new(day()), &recipes(), &foods()).is_zero());
    }

    #[test]
    fn test_two_portions_double_the_serving() {
        let mut book = DayLogBook::new();
        add_entry(&mut book, day(), MealSlot::Lunch, "r1", 2.0);
        let totals = day_totals(book.get(day()).unwrap(), &recipes(), &foods());
        assert_eq!(totals, Macros::new(200, 20, 20, 4));
    }

    #[test]
    fn test_deleted_recipe_contributes_zero() {
        let mut book = DayLogBook::new();
        add_entry(&mut book, day(), MealSlot::Dinner, "r-deleted", 3.0);
        add_entry(&mut book, day(), MealSlot::Snack, "r1", 1.0);
        let log = book.get(day()).unwrap();

        assert_eq!(resolve_entry(&log.meals.dinner[0], &recipes(), &foods()), None);
        assert_eq!(day_totals(log, &recipes(), &foods()), Macros::new(100, 10, 10, 2));
    }

    #[test]
    fn test_totals_do_not_depend_on_slot_order() {
        let mut a = DayLog::new(day());
        a.push(MealSlot::Breakfast, MealEntry::new("r1", 1.0));
        a.push(MealSlot::Dinner, MealEntry::new("r-riz", 0.5));

        let mut b = DayLog::new(day());
        b.push(MealSlot::Snack, MealEntry::new("r-riz", 0.5));
        b.push(MealSlot::Lunch, MealEntry::new("r1", 1.0));

        assert_eq!(day_totals(&a, &recipes(), &foods()), day_totals(&b, &recipes(), &foods()));
    }

    #[test]
    fn test_huge_portions_saturate() {
        let mut log = DayLog::new(day());
        log.push(MealSlot::Lunch, MealEntry::new("r1", 1e300));
        log.push(MealSlot::Dinner, MealEntry::new("r1", 1e300));
        let totals = day_totals(&log, &recipes(), &foods());
        assert_eq!(totals.kcal, i64::MAX);
        assert_eq!(totals.fat_g, i64::MAX);
    }

    #[test]
    fn test_bad_portions_read_as_one() {
        assert_eq!(effective_portions(0.0), 1.0);
        assert_eq!(effective_portions(-2.0), 1.0);
        assert_eq!(effective_portions(f64::NAN), 1.0);
        assert_eq!(effective_portions(0.5), 0.5);
    }

    #[test]
    fn test_breakdown_keeps_stale_entries_visible() {
        let mut log = DayLog::new(day());
        log.push(MealSlot::Lunch, MealEntry::new("r1", 1.0));
        log.push(MealSlot::Breakfast, MealEntry::new("r-gone", 1.0));
        let recipes = recipes();

        let lines = day_breakdown(&log, &recipes, &foods());
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].slot, MealSlot::Breakfast);
        assert_eq!(lines[0].recipe_name, None);
        assert_eq!(lines[0].macros, None);
        assert_eq!(lines[1].recipe_name, Some("Base"));
        assert_eq!(lines[1].macros, Some(Macros::new(100, 10, 10, 2)));
    }
}
