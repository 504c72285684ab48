//! Food Item MCP Tools
//!
//! Tools for managing the food catalog.

use serde::Serialize;

use crate::db::Database;
use crate::models::{FoodItem, FoodItemCreate, FoodItemUpdate, Per100};

/// Response for list_food_items
#[derive(Debug, Serialize)]
pub struct ListFoodItemsResponse {
    pub items: Vec<FoodItem>,
    pub total: usize,
}

/// Full food item detail response
#[derive(Debug, Serialize)]
pub struct FoodItemDetail {
    #[serde(flatten)]
    pub item: FoodItem,
    pub used_in_recipes: Vec<String>,
}

/// Response for update_food_item
#[derive(Debug, Serialize)]
pub struct UpdateFoodItemResponse {
    pub item: FoodItem,
    /// Recipes whose totals change with this edit
    pub affected_recipes: Vec<String>,
}

/// Response for delete_food_item
#[derive(Debug, Serialize)]
pub struct DeleteFoodItemResponse {
    pub success: bool,
    pub deleted_id: String,
    /// Recipes left with a stale ingredient line
    pub stale_in_recipes: Vec<String>,
}

fn validate_per100(per100: &Per100) -> Result<(), String> {
    let fields = [
        ("kcal", per100.kcal),
        ("protein_g", per100.protein_g),
        ("carb_g", per100.carb_g),
        ("fat_g", per100.fat_g),
    ];
    for (field, value) in fields {
        if !value.is_finite() {
            return Err(format!("{} must be a number", field));
        }
        if value < 0.0 {
            return Err(format!("{} cannot be negative", field));
        }
    }
    Ok(())
}

/// Add a new food item
pub fn add_food_item(db: &Database, data: FoodItemCreate) -> Result<FoodItem, String> {
    let name = data.name.trim();
    if name.is_empty() {
        return Err("Food item name cannot be empty".to_string());
    }
    validate_per100(&data.per100)?;
    if data.per100.kcal <= 0.0 {
        return Err("kcal must be greater than 0".to_string());
    }

    let data = FoodItemCreate {
        name: name.to_string(),
        per100: data.per100,
    };

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let item = FoodItem::create(&conn, &data)
        .map_err(|e| format!("Failed to create food item: {}", e))?;

    tracing::info!(id = %item.id, "food item added");
    Ok(item)
}

/// List food items, optionally filtered by name (case-insensitive)
pub fn list_food_items(db: &Database, query: Option<&str>) -> Result<ListFoodItemsResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let items = FoodItem::list(&conn, query)
        .map_err(|e| format!("Failed to list food items: {}", e))?;
    let total = items.len();
    Ok(ListFoodItemsResponse { items, total })
}

/// Get a food item by ID with the recipes using it
pub fn get_food_item(db: &Database, id: &str) -> Result<Option<FoodItemDetail>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let item = FoodItem::get_by_id(&conn, id)
        .map_err(|e| format!("Failed to get food item: {}", e))?;

    match item {
        Some(item) => {
            let used_in_recipes = FoodItem::get_used_in_recipes(&conn, id)
                .map_err(|e| format!("Failed to get recipe usage: {}", e))?;
            Ok(Some(FoodItemDetail { item, used_in_recipes }))
        }
        None => Ok(None),
    }
}

/// Update a food item. Every recipe using it picks up the new values.
pub fn update_food_item(db: &Database, id: &str, data: FoodItemUpdate) -> Result<UpdateFoodItemResponse, String> {
    if let Some(ref name) = data.name {
        if name.trim().is_empty() {
            return Err("Food item name cannot be empty".to_string());
        }
    }

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let updated = FoodItem::update(&conn, id, &data)
        .map_err(|e| format!("Failed to update food item: {}", e))?;

    match updated {
        Some(item) => {
            let affected_recipes = FoodItem::get_used_in_recipes(&conn, id)
                .map_err(|e| format!("Failed to get recipe usage: {}", e))?;
            Ok(UpdateFoodItemResponse { item, affected_recipes })
        }
        None => Err(format!("Food item not found with id: {}", id)),
    }
}

/// Delete a food item. Recipe lines referencing it stay and count as zero.
pub fn delete_food_item(db: &Database, id: &str) -> Result<DeleteFoodItemResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let stale_in_recipes = FoodItem::get_used_in_recipes(&conn, id)
        .map_err(|e| format!("Failed to get recipe usage: {}", e))?;

    let deleted = FoodItem::delete(&conn, id)
        .map_err(|e| format!("Failed to delete food item: {}", e))?;
    if !deleted {
        return Err(format!("Food item not found with id: {}", id));
    }

    if !stale_in_recipes.is_empty() {
        tracing::warn!(id, recipes = stale_in_recipes.len(), "deleted food item still referenced by recipes");
    }

    Ok(DeleteFoodItemResponse {
        success: true,
        deleted_id: id.to_string(),
        stale_in_recipes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Ingredient, Recipe, RecipeCreate};

    fn skyr() -> FoodItemCreate {
        FoodItemCreate {
            name: "  Skyr  ".to_string(),
            per100: Per100::new(63.0, 11.0, 4.0, 0.2),
        }
    }

    #[test]
    fn test_add_validates_input() {
        let db = Database::open_in_memory().unwrap();

        let mut empty = skyr();
        empty.name = "   ".to_string();
        assert!(add_food_item(&db, empty).is_err());

        let mut zero = skyr();
        zero.per100.kcal = 0.0;
        assert!(add_food_item(&db, zero).is_err());

        let mut negative = skyr();
        negative.per100.fat_g = -1.0;
        assert!(add_food_item(&db, negative).unwrap_err().contains("fat_g"));

        let item = add_food_item(&db, skyr()).unwrap();
        assert_eq!(item.id, "skyr");
        assert_eq!(item.name, "Skyr");
    }

    #[test]
    fn test_list_filter() {
        let db = Database::open_in_memory().unwrap();
        let all = list_food_items(&db, None).unwrap();
        assert_eq!(all.total, 9);

        let hits = list_food_items(&db, Some("pou")).unwrap();
        assert_eq!(hits.total, 1);
        assert_eq!(hits.items[0].id, "poulet");
    }

    #[test]
    fn test_update_reports_affected_recipes() {
        let db = Database::open_in_memory().unwrap();
        db.with_conn(|conn| {
            let recipe = Recipe::create(
                conn,
                &RecipeCreate {
                    name: "Bol".to_string(),
                    servings: 1,
                },
            )?;
            Recipe::add_ingredient(conn, &recipe.id, &Ingredient::new("riz", 150.0))?;
            Ok(())
        })
        .unwrap();

        let response = update_food_item(
            &db,
            "riz",
            FoodItemUpdate {
                kcal: Some(120.0),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(response.item.per100.kcal, 120.0);
        assert_eq!(response.affected_recipes, vec!["Bol".to_string()]);

        assert!(update_food_item(&db, "nope", FoodItemUpdate::default()).is_err());
    }

    #[test]
    fn test_delete_leaves_stale_lines() {
        let db = Database::open_in_memory().unwrap();
        db.with_conn(|conn| {
            let recipe = Recipe::create(
                conn,
                &RecipeCreate {
                    name: "Omelette".to_string(),
                    servings: 1,
                },
            )?;
            Recipe::add_ingredient(conn, &recipe.id, &Ingredient::new("oeuf", 120.0))?;
            Ok(())
        })
        .unwrap();

        let response = delete_food_item(&db, "oeuf").unwrap();
        assert_eq!(response.stale_in_recipes, vec!["Omelette".to_string()]);
        assert!(get_food_item(&db, "oeuf").unwrap().is_none());
        assert!(delete_food_item(&db, "oeuf").is_err());
    }
}
