//! Food Item model
//!
//! A catalog food with its nutrition per 100 g (or 100 ml).

use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};
use super::ids::{slugify, unique_id};
use super::{round_half_up, FoodCatalog, Macros};

/// Nutrition normalized to 100 units of a food
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Per100 {
    pub kcal: f64,
    pub protein_g: f64,
    pub carb_g: f64,
    pub fat_g: f64,
}

impl Per100 {
    pub const fn new(kcal: f64, protein_g: f64, carb_g: f64, fat_g: f64) -> Self {
        Self {
            kcal,
            protein_g,
            carb_g,
            fat_g,
        }
    }

    /// Macros for `grams` of the food, each field rounded on its own
    pub fn for_grams(&self, grams: f64) -> Macros {
        let ratio = grams / 100.0;
        Macros {
            kcal: round_half_up(self.kcal * ratio),
            protein_g: round_half_up(self.protein_g * ratio),
            carb_g: round_half_up(self.carb_g * ratio),
            fat_g: round_half_up(self.fat_g * ratio),
        }
    }

    pub fn is_valid(&self) -> bool {
        [self.kcal, self.protein_g, self.carb_g, self.fat_g]
            .iter()
            .all(|v| v.is_finite() && *v >= 0.0)
    }
}

/// A food item with nutritional information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodItem {
    pub id: String,
    pub name: String,
    pub per100: Per100,
}

/// Data for creating a new food item (the id is derived from the name)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodItemCreate {
    pub name: String,
    pub per100: Per100,
}

/// Data for updating a food item
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FoodItemUpdate {
    pub name: Option<String>,
    pub kcal: Option<f64>,
    pub protein_g: Option<f64>,
    pub carb_g: Option<f64>,
    pub fat_g: Option<f64>,
}

impl FoodItemUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.kcal.is_none()
            && self.protein_g.is_none()
            && self.carb_g.is_none()
            && self.fat_g.is_none()
    }

    /// Apply the set fields onto `item`
    pub fn apply(&self, item: &mut FoodItem) {
        if let Some(ref name) = self.name {
            item.name = name.clone();
        }
        if let Some(v) = self.kcal {
            item.per100.kcal = v;
        }
        if let Some(v) = self.protein_g {
            item.per100.protein_g = v;
        }
        if let Some(v) = self.carb_g {
            item.per100.carb_g = v;
        }
        if let Some(v) = self.fat_g {
            item.per100.fat_g = v;
        }
    }
}

/// The catalog every fresh database starts with
pub fn default_foods() -> Vec<FoodItem> {
    vec![
        FoodItem::new("riz", "Riz blanc cuit", Per100::new(130.0, 2.4, 28.0, 0.3)),
        FoodItem::new("poulet", "Poulet (blanc)", Per100::new(165.0, 31.0, 0.0, 3.6)),
        FoodItem::new("oeuf", "Œuf", Per100::new(143.0, 13.0, 1.1, 10.3)),
        FoodItem::new("avoine", "Flocons d'avoine", Per100::new(389.0, 16.9, 66.0, 6.9)),
        FoodItem::new("banane", "Banane", Per100::new(89.0, 1.1, 23.0, 0.3)),
        FoodItem::new("brocoli", "Brocoli", Per100::new(34.0, 2.8, 7.0, 0.4)),
        FoodItem::new("huile-olive", "Huile d'olive", Per100::new(884.0, 0.0, 0.0, 100.0)),
        FoodItem::new("pates", "Pâtes cuites", Per100::new(157.0, 5.8, 30.0, 0.9)),
        FoodItem::new("thon", "Thon au naturel", Per100::new(132.0, 29.0, 0.0, 1.0)),
    ]
}

impl FoodItem {
    pub fn new(id: impl Into<String>, name: impl Into<String>, per100: Per100) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            per100,
        }
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            per100: Per100 {
                kcal: row.get("kcal")?,
                protein_g: row.get("protein_g")?,
                carb_g: row.get("carb_g")?,
                fat_g: row.get("fat_g")?,
            },
        })
    }

    /// Insert a food item with an explicit id
    pub fn insert(conn: &Connection, item: &FoodItem) -> DbResult<()> {
        conn.execute(
            r#"
            INSERT INTO food_items (id, name, kcal, protein_g, carb_g, fat_g)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                item.id,
                item.name,
                item.per100.kcal,
                item.per100.protein_g,
                item.per100.carb_g,
                item.per100.fat_g,
            ],
        )?;
        Ok(())
    }

    /// Insert a new food item, deriving a unique id from its name
    pub fn create(conn: &Connection, data: &FoodItemCreate) -> DbResult<Self> {
        let id = unique_id(conn, "food_items", &slugify(&data.name))?;
        let item = FoodItem::new(id, data.name.clone(), data.per100);
        Self::insert(conn, &item)?;
        tracing::debug!(id = %item.id, "food item created");
        Ok(item)
    }

    /// Get a food item by ID
    pub fn get_by_id(conn: &Connection, id: &str) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM food_items WHERE id = ?1")?;
        Ok(stmt.query_row([id], Self::from_row).optional()?)
    }

    /// List food items by name, optionally filtered by a case-insensitive substring
    pub fn list(conn: &Connection, query: Option<&str>) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM food_items ORDER BY name COLLATE NOCASE ASC")?;
        let items = stmt
            .query_map([], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        // Filtered here rather than with LIKE, which only folds ASCII case
        let items = match query.map(|q| q.trim().to_lowercase()) {
            Some(q) if !q.is_empty() => items
                .into_iter()
                .filter(|item| item.name.to_lowercase().contains(&q))
                .collect(),
            _ => items,
        };
        Ok(items)
    }

    /// Update a food item. Recipes pick up the change on their next read.
    pub fn update(conn: &Connection, id: &str, data: &FoodItemUpdate) -> DbResult<Option<Self>> {
        let Some(mut item) = Self::get_by_id(conn, id)? else {
            return Ok(None);
        };
        if data.is_empty() {
            return Ok(Some(item));
        }

        data.apply(&mut item);
        if !item.per100.is_valid() {
            return Err(DbError::InvalidValue(format!(
                "food item {} would have negative or non-finite nutrition",
                id
            )));
        }

        conn.execute(
            r#"
            UPDATE food_items SET
                name = ?1, kcal = ?2, protein_g = ?3, carb_g = ?4, fat_g = ?5,
                updated_at = datetime('now')
            WHERE id = ?6
            "#,
            params![
                item.name,
                item.per100.kcal,
                item.per100.protein_g,
                item.per100.carb_g,
                item.per100.fat_g,
                id,
            ],
        )?;
        Ok(Some(item))
    }

    /// Delete a food item. Ingredients referencing it are left in place.
    pub fn delete(conn: &Connection, id: &str) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM food_items WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }

    pub fn count(conn: &Connection) -> DbResult<i64> {
        Ok(conn.query_row("SELECT COUNT(*) FROM food_items", [], |row| row.get(0))?)
    }

    /// Names of the recipes that use this food item
    pub fn get_used_in_recipes(conn: &Connection, id: &str) -> DbResult<Vec<String>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT DISTINCT r.name FROM recipes r
            INNER JOIN recipe_ingredients ri ON r.id = ri.recipe_id
            WHERE ri.food_id = ?1
            ORDER BY r.name
            "#,
        )?;

        let names = stmt
            .query_map([id], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(names)
    }

    /// Load the whole catalog for the nutrition core
    pub fn load_catalog(conn: &Connection) -> DbResult<FoodCatalog> {
        Ok(Self::list(conn, None)?.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    #[test]
    fn test_for_grams_rounds_each_field() {
        let riz = Per100::new(130.0, 2.4, 28.0, 0.3);
        assert_eq!(riz.for_grams(200.0), Macros::new(260, 5, 56, 1));
        assert_eq!(riz.for_grams(0.0), Macros::zero());
        assert_eq!(riz.for_grams(50.0), Macros::new(65, 1, 14, 0));
    }

    #[test]
    fn test_per100_validity() {
        assert!(Per100::new(0.0, 0.0, 0.0, 0.0).is_valid());
        assert!(!Per100::new(-1.0, 0.0, 0.0, 0.0).is_valid());
        assert!(!Per100::new(f64::NAN, 0.0, 0.0, 0.0).is_valid());
    }

    #[test]
    fn test_seeded_catalog() {
        let db = Database::open_in_memory().unwrap();
        let catalog = db.with_conn(FoodItem::load_catalog).unwrap();
        assert_eq!(catalog.len(), default_foods().len());
        let poulet = catalog.get("poulet").unwrap();
        assert_eq!(poulet.per100.protein_g, 31.0);
    }

    #[test]
    fn test_create_update_delete() {
        let db = Database::open_in_memory().unwrap();
        db.with_conn(|conn| {
            let created = FoodItem::create(
                conn,
                &FoodItemCreate {
                    name: "Skyr nature".to_string(),
                    per100: Per100::new(63.0, 11.0, 4.0, 0.2),
                },
            )?;
            assert_eq!(created.id, "skyr-nature");

            let update = FoodItemUpdate {
                kcal: Some(60.0),
                ..Default::default()
            };
            let updated = FoodItem::update(conn, "skyr-nature", &update)?.unwrap();
            assert_eq!(updated.per100.kcal, 60.0);
            assert_eq!(updated.per100.protein_g, 11.0);

            let bad = FoodItemUpdate {
                fat_g: Some(-2.0),
                ..Default::default()
            };
            assert!(FoodItem::update(conn, "skyr-nature", &bad).is_err());

            assert!(FoodItem::update(conn, "missing", &update)?.is_none());
            assert!(FoodItem::delete(conn, "skyr-nature")?);
            assert!(!FoodItem::delete(conn, "skyr-nature")?);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_list_filters_case_insensitively() {
        let db = Database::open_in_memory().unwrap();
        let hits = db.with_conn(|conn| FoodItem::list(conn, Some("ŒUF"))).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "oeuf");

        let all = db.with_conn(|conn| FoodItem::list(conn, Some("  "))).unwrap();
        assert_eq!(all.len(), default_foods().len());
    }
}
