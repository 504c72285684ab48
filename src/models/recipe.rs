//! Recipe model
//!
//! A recipe is an ordered list of weighted ingredients plus a serving count.
//! Ingredients reference foods by id, so edits to a food flow into every
//! recipe using it.

use std::collections::HashMap;

use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;
use super::ids::{slugify, unique_id};
use super::RecipeCatalog;

/// One weighed ingredient of a recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub food_id: String,
    pub grams: f64,
}

impl Ingredient {
    pub fn new(food_id: impl Into<String>, grams: f64) -> Self {
        Self {
            food_id: food_id.into(),
            grams,
        }
    }
}

/// A recipe with its ingredients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: String,
    pub name: String,
    pub servings: u32,
    pub items: Vec<Ingredient>,
    /// Encoded JPEG, see [`crate::photo::prepare_recipe_photo`]
    #[serde(skip)]
    pub photo: Option<Vec<u8>>,
}

/// Data for creating a new recipe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeCreate {
    pub name: String,
    #[serde(default = "default_servings")]
    pub servings: u32,
}

fn default_servings() -> u32 {
    1
}

/// Data for updating a recipe
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecipeUpdate {
    pub name: Option<String>,
    pub servings: Option<u32>,
}

impl Recipe {
    /// A draft recipe with no ingredients
    pub fn new(id: impl Into<String>, name: impl Into<String>, servings: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            servings,
            items: Vec::new(),
            photo: None,
        }
    }

    pub fn with_items(mut self, items: Vec<Ingredient>) -> Self {
        self.items = items;
        self
    }

    /// Servings used as a divisor; zero reads as one
    pub fn effective_servings(&self) -> u32 {
        self.servings.max(1)
    }

    pub fn has_photo(&self) -> bool {
        self.photo.is_some()
    }

    pub fn push_ingredient(&mut self, ingredient: Ingredient) {
        self.items.push(ingredient);
    }

    /// Take out the ingredient at `index`, if there is one
    pub fn take_ingredient(&mut self, index: usize) -> Option<Ingredient> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    /// Build from a `recipes` row; ingredients are attached separately
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            servings: row.get("servings")?,
            items: Vec::new(),
            photo: row.get("photo")?,
        })
    }

    fn load_items(conn: &Connection, recipe_id: &str) -> DbResult<Vec<Ingredient>> {
        let mut stmt = conn.prepare(
            "SELECT food_id, grams FROM recipe_ingredients WHERE recipe_id = ?1 ORDER BY id",
        )?;
        let items = stmt
            .query_map([recipe_id], |row| {
                Ok(Ingredient {
                    food_id: row.get(0)?,
                    grams: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }

    /// Insert a new empty recipe, deriving a unique id from its name
    pub fn create(conn: &Connection, data: &RecipeCreate) -> DbResult<Self> {
        let base = format!("r-{}", slugify(&data.name));
        let id = unique_id(conn, "recipes", &base)?;

        conn.execute(
            "INSERT INTO recipes (id, name, servings) VALUES (?1, ?2, ?3)",
            params![id, data.name, data.servings],
        )?;

        tracing::debug!(id = %id, "recipe created");
        Ok(Recipe::new(id, data.name.clone(), data.servings))
    }

    /// Get a recipe with its ingredients
    pub fn get_by_id(conn: &Connection, id: &str) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM recipes WHERE id = ?1")?;
        let recipe = stmt.query_row([id], Self::from_row).optional()?;

        match recipe {
            Some(recipe) => {
                let items = Self::load_items(conn, &recipe.id)?;
                Ok(Some(recipe.with_items(items)))
            }
            None => Ok(None),
        }
    }

    pub fn count(conn: &Connection) -> DbResult<i64> {
        Ok(conn.query_row("SELECT COUNT(*) FROM recipes", [], |row| row.get(0))?)
    }

    /// List every recipe with its ingredients, ordered by name
    pub fn list(conn: &Connection) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM recipes ORDER BY name COLLATE NOCASE ASC")?;
        let mut recipes = stmt
            .query_map([], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        let mut stmt = conn.prepare(
            "SELECT recipe_id, food_id, grams FROM recipe_ingredients ORDER BY id",
        )?;
        let mut by_recipe: HashMap<String, Vec<Ingredient>> = HashMap::new();
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                Ingredient {
                    food_id: row.get(1)?,
                    grams: row.get(2)?,
                },
            ))
        })?;
        for row in rows {
            let (recipe_id, ingredient) = row?;
            by_recipe.entry(recipe_id).or_default().push(ingredient);
        }

        for recipe in &mut recipes {
            recipe.items = by_recipe.remove(&recipe.id).unwrap_or_default();
        }
        Ok(recipes)
    }

    /// Rename or re-serve a recipe
    pub fn update(conn: &Connection, id: &str, data: &RecipeUpdate) -> DbResult<Option<Self>> {
        let Some(mut recipe) = Self::get_by_id(conn, id)? else {
            return Ok(None);
        };
        if let Some(ref name) = data.name {
            recipe.name = name.clone();
        }
        if let Some(servings) = data.servings {
            recipe.servings = servings;
        }

        conn.execute(
            "UPDATE recipes SET name = ?1, servings = ?2, updated_at = datetime('now') WHERE id = ?3",
            params![recipe.name, recipe.servings, id],
        )?;
        Ok(Some(recipe))
    }

    /// Append an ingredient. Returns false when the recipe does not exist.
    pub fn add_ingredient(conn: &Connection, recipe_id: &str, ingredient: &Ingredient) -> DbResult<bool> {
        if !Self::exists(conn, recipe_id)? {
            return Ok(false);
        }
        conn.execute(
            "INSERT INTO recipe_ingredients (recipe_id, food_id, grams) VALUES (?1, ?2, ?3)",
            params![recipe_id, ingredient.food_id, ingredient.grams],
        )?;
        Self::touch(conn, recipe_id)?;
        Ok(true)
    }

    /// Remove the ingredient at `index` (insertion order)
    pub fn remove_ingredient(conn: &Connection, recipe_id: &str, index: usize) -> DbResult<Option<Ingredient>> {
        let mut stmt = conn.prepare(
            "SELECT id, food_id, grams FROM recipe_ingredients WHERE recipe_id = ?1 ORDER BY id LIMIT 1 OFFSET ?2",
        )?;
        let found = stmt
            .query_row(params![recipe_id, index as i64], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    Ingredient {
                        food_id: row.get(1)?,
                        grams: row.get(2)?,
                    },
                ))
            })
            .optional()?;

        match found {
            Some((row_id, ingredient)) => {
                conn.execute("DELETE FROM recipe_ingredients WHERE id = ?1", [row_id])?;
                Self::touch(conn, recipe_id)?;
                Ok(Some(ingredient))
            }
            None => Ok(None),
        }
    }

    /// Replace (or clear) the recipe photo
    pub fn set_photo(conn: &Connection, recipe_id: &str, photo: Option<&[u8]>) -> DbResult<bool> {
        let rows = conn.execute(
            "UPDATE recipes SET photo = ?1, updated_at = datetime('now') WHERE id = ?2",
            params![photo, recipe_id],
        )?;
        Ok(rows > 0)
    }

    /// Delete a recipe and its ingredients. Meal entries keep their stale id.
    pub fn delete(conn: &Connection, id: &str) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM recipes WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }

    pub fn exists(conn: &Connection, id: &str) -> DbResult<bool> {
        let found = conn
            .query_row("SELECT 1 FROM recipes WHERE id = ?1", [id], |_| Ok(()))
            .optional()?;
        Ok(found.is_some())
    }

    /// Number of meal entries logged against this recipe
    pub fn get_times_logged(conn: &Connection, id: &str) -> DbResult<i64> {
        Ok(conn.query_row(
            "SELECT COUNT(*) FROM meal_entries WHERE recipe_id = ?1",
            [id],
            |row| row.get(0),
        )?)
    }

    /// Load every recipe for the nutrition core
    pub fn load_catalog(conn: &Connection) -> DbResult<RecipeCatalog> {
        Ok(Self::list(conn)?.into_iter().collect())
    }

    fn touch(conn: &Connection, id: &str) -> DbResult<()> {
        conn.execute(
            "UPDATE recipes SET updated_at = datetime('now') WHERE id = ?1",
            [id],
        )?;
        Ok(())
    }
}
