//! Database migrations
//!
//! Schema creation and seeding of the default food catalog.

use rusqlite::Connection;

use super::connection::DbResult;
use crate::models::{default_foods, FoodItem};

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// Run all migrations to bring the database up to the current schema version
pub fn run_migrations(conn: &Connection) -> DbResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    let current_version = get_schema_version(conn)?;

    if current_version < 1 {
        migrate_v1(conn)?;
        conn.execute("INSERT INTO schema_migrations (version) VALUES (1)", [])?;
        tracing::info!("applied schema migration v1");
    }

    Ok(())
}

/// Migration v1: Initial schema
fn migrate_v1(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        r#"
        -- ============================================
        -- PROFILE
        -- Single row, id = 1
        -- ============================================
        CREATE TABLE profile (
            id INTEGER PRIMARY KEY CHECK(id = 1),
            age INTEGER NOT NULL,
            sex TEXT NOT NULL CHECK(sex IN ('M', 'F')),
            height_cm REAL NOT NULL,
            weight_kg REAL NOT NULL,
            activity TEXT NOT NULL,
            goal TEXT NOT NULL,
            rate_per_week_kg REAL NOT NULL DEFAULT 0,
            protein_per_kg REAL NOT NULL,
            fat_per_kg REAL NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- ============================================
        -- FOOD ITEMS
        -- Nutrition per 100 g (or ml)
        -- ============================================
        CREATE TABLE food_items (
            id TEXT PRIMARY KEY,                 -- slug of the name, e.g. "huile-olive"
            name TEXT NOT NULL,
            kcal REAL NOT NULL DEFAULT 0,
            protein_g REAL NOT NULL DEFAULT 0,
            carb_g REAL NOT NULL DEFAULT 0,
            fat_g REAL NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_food_items_name ON food_items(name);

        -- ============================================
        -- RECIPES
        -- ============================================
        CREATE TABLE recipes (
            id TEXT PRIMARY KEY,                 -- "r-" + slug
            name TEXT NOT NULL,
            servings INTEGER NOT NULL DEFAULT 1,
            photo BLOB,                          -- JPEG, already resized
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_recipes_name ON recipes(name);

        -- ============================================
        -- RECIPE INGREDIENTS
        -- Ordered by id. food_id is not a foreign key: a deleted
        -- food leaves a stale line that counts as zero.
        -- ============================================
        CREATE TABLE recipe_ingredients (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            recipe_id TEXT NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
            food_id TEXT NOT NULL,
            grams REAL NOT NULL
        );

        CREATE INDEX idx_recipe_ingredients_recipe ON recipe_ingredients(recipe_id);
        CREATE INDEX idx_recipe_ingredients_food ON recipe_ingredients(food_id);

        -- ============================================
        -- DAYS
        -- ============================================
        CREATE TABLE days (
            date TEXT PRIMARY KEY,               -- ISO date: "2025-01-09"
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- ============================================
        -- MEAL ENTRIES
        -- recipe_id is not a foreign key: deleting a recipe
        -- leaves past entries in place.
        -- ============================================
        CREATE TABLE meal_entries (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            date TEXT NOT NULL REFERENCES days(date) ON DELETE CASCADE,
            slot TEXT NOT NULL CHECK(slot IN ('breakfast', 'lunch', 'dinner', 'snack')),
            recipe_id TEXT NOT NULL,
            portions REAL NOT NULL DEFAULT 1.0,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_meal_entries_date ON meal_entries(date);
        CREATE INDEX idx_meal_entries_recipe ON meal_entries(recipe_id);
        "#,
    )?;

    for food in default_foods() {
        FoodItem::insert(conn, &food)?;
    }

    Ok(())
}

/// Get the current schema version
pub fn get_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);
    Ok(version)
}

/// Check if the database needs migration
pub fn needs_migration(conn: &Connection) -> DbResult<bool> {
    let current = get_schema_version(conn)?;
    Ok(current < SCHEMA_VERSION)
}
