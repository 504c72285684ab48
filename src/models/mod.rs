//! Data models
//!
//! Rust structs for the nutrition records and their SQLite mapping.

mod catalog;
mod day;
mod food_item;
mod ids;
mod macros;
mod profile;
mod recipe;

pub use catalog::{Catalog, FoodCatalog, Keyed, RecipeCatalog};
pub use day::{DayLog, DayLogBook, DayMeals, MealEntry, MealSlot, DATE_FORMAT};
pub use food_item::{default_foods, FoodItem, FoodItemCreate, FoodItemUpdate, Per100};
pub use ids::slugify;
pub use macros::{round_half_up, Macros};
pub use profile::{ActivityLevel, Goal, Profile, ProfileUpdate, Sex};
pub use recipe::{Ingredient, Recipe, RecipeCreate, RecipeUpdate};
