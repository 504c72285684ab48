//! Recipe MCP Tools
//!
//! Tools for composing recipes from catalog foods.

use std::path::Path;

use serde::Serialize;

use crate::db::Database;
use crate::models::{FoodCatalog, FoodItem, Ingredient, Macros, Recipe, RecipeCreate, RecipeUpdate};
use crate::nutrition::{ingredient_breakdown, per_serving, recipe_totals};
use crate::photo::prepare_recipe_photo;

/// Summary of a recipe for list results
#[derive(Debug, Serialize)]
pub struct RecipeSummary {
    pub id: String,
    pub name: String,
    pub servings: u32,
    pub ingredient_count: usize,
    pub per_serving: Macros,
    pub has_photo: bool,
}

impl RecipeSummary {
    fn new(recipe: &Recipe, foods: &FoodCatalog) -> Self {
        Self {
            id: recipe.id.clone(),
            name: recipe.name.clone(),
            servings: recipe.servings,
            ingredient_count: recipe.items.len(),
            per_serving: per_serving(recipe, foods),
            has_photo: recipe.has_photo(),
        }
    }
}

/// One ingredient line of a recipe detail
#[derive(Debug, Serialize)]
pub struct IngredientView {
    pub index: usize,
    pub food_id: String,
    /// Food name, or the raw id when the food was deleted
    pub label: String,
    pub grams: f64,
    pub macros: Option<Macros>,
}

/// Full recipe detail response
#[derive(Debug, Serialize)]
pub struct RecipeDetail {
    pub id: String,
    pub name: String,
    pub servings: u32,
    pub ingredients: Vec<IngredientView>,
    pub totals: Macros,
    pub per_serving: Macros,
    pub has_photo: bool,
    pub times_logged: i64,
    pub missing_foods: usize,
}

/// Response for list_recipes
#[derive(Debug, Serialize)]
pub struct ListRecipesResponse {
    pub recipes: Vec<RecipeSummary>,
    pub total: usize,
}

/// Response for delete_recipe
#[derive(Debug, Serialize)]
pub struct DeleteRecipeResponse {
    pub success: bool,
    pub deleted_id: String,
    /// Logged entries that now point at nothing
    pub stale_meal_entries: i64,
}

/// Response for attach_recipe_photo
#[derive(Debug, Serialize)]
pub struct AttachPhotoResponse {
    pub success: bool,
    pub recipe_id: String,
    pub stored_bytes: usize,
}

fn validate_servings(servings: u32) -> Result<(), String> {
    if servings == 0 {
        return Err("servings must be at least 1".to_string());
    }
    Ok(())
}

/// Create an empty recipe
pub fn create_recipe(db: &Database, data: RecipeCreate) -> Result<RecipeSummary, String> {
    let name = data.name.trim();
    if name.is_empty() {
        return Err("Recipe name cannot be empty".to_string());
    }
    validate_servings(data.servings)?;

    let data = RecipeCreate {
        name: name.to_string(),
        servings: data.servings,
    };

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let recipe = Recipe::create(&conn, &data)
        .map_err(|e| format!("Failed to create recipe: {}", e))?;

    tracing::info!(id = %recipe.id, "recipe created");
    Ok(RecipeSummary::new(&recipe, &FoodCatalog::new()))
}

/// Get a recipe with its ingredient lines and totals
pub fn get_recipe(db: &Database, id: &str) -> Result<Option<RecipeDetail>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let Some(recipe) = Recipe::get_by_id(&conn, id)
        .map_err(|e| format!("Failed to get recipe: {}", e))?
    else {
        return Ok(None);
    };

    let foods = FoodItem::load_catalog(&conn)
        .map_err(|e| format!("Failed to load foods: {}", e))?;
    let times_logged = Recipe::get_times_logged(&conn, id)
        .map_err(|e| format!("Failed to count meal entries: {}", e))?;

    let ingredients: Vec<IngredientView> = ingredient_breakdown(&recipe, &foods)
        .into_iter()
        .map(|line| IngredientView {
            index: line.index,
            food_id: line.ingredient.food_id.clone(),
            label: line
                .food_name
                .unwrap_or(line.ingredient.food_id.as_str())
                .to_string(),
            grams: line.ingredient.grams,
            macros: line.macros,
        })
        .collect();

    let missing_foods = ingredients.iter().filter(|i| i.macros.is_none()).count();
    if missing_foods > 0 {
        tracing::debug!(id, missing_foods, "recipe references deleted foods");
    }

    Ok(Some(RecipeDetail {
        totals: recipe_totals(&recipe, &foods),
        per_serving: per_serving(&recipe, &foods),
        id: recipe.id,
        name: recipe.name,
        servings: recipe.servings,
        has_photo: recipe.photo.is_some(),
        ingredients,
        times_logged,
        missing_foods,
    }))
}

/// List every recipe with its per-serving macros
pub fn list_recipes(db: &Database) -> Result<ListRecipesResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let recipes = Recipe::list(&conn).map_err(|e| format!("Failed to list recipes: {}", e))?;
    let foods = FoodItem::load_catalog(&conn)
        .map_err(|e| format!("Failed to load foods: {}", e))?;

    let recipes: Vec<RecipeSummary> = recipes.iter().map(|r| RecipeSummary::new(r, &foods)).collect();
    let total = recipes.len();
    Ok(ListRecipesResponse { recipes, total })
}

/// Rename a recipe or change its serving count
pub fn update_recipe(db: &Database, id: &str, data: RecipeUpdate) -> Result<RecipeSummary, String> {
    if let Some(ref name) = data.name {
        if name.trim().is_empty() {
            return Err("Recipe name cannot be empty".to_string());
        }
    }
    if let Some(servings) = data.servings {
        validate_servings(servings)?;
    }

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let recipe = Recipe::update(&conn, id, &data)
        .map_err(|e| format!("Failed to update recipe: {}", e))?
        .ok_or_else(|| format!("Recipe not found with id: {}", id))?;
    let foods = FoodItem::load_catalog(&conn)
        .map_err(|e| format!("Failed to load foods: {}", e))?;

    Ok(RecipeSummary::new(&recipe, &foods))
}

/// Append a weighed food to a recipe
pub fn add_ingredient(db: &Database, recipe_id: &str, food_id: &str, grams: f64) -> Result<RecipeDetail, String> {
    if !grams.is_finite() || grams < 0.0 {
        return Err("grams must be a non-negative number".to_string());
    }

    {
        let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

        let food = FoodItem::get_by_id(&conn, food_id)
            .map_err(|e| format!("Failed to get food item: {}", e))?;
        if food.is_none() {
            return Err(format!("Food item not found with id: {}", food_id));
        }

        let added = Recipe::add_ingredient(&conn, recipe_id, &Ingredient::new(food_id, grams))
            .map_err(|e| format!("Failed to add ingredient: {}", e))?;
        if !added {
            return Err(format!("Recipe not found with id: {}", recipe_id));
        }
    }

    get_recipe(db, recipe_id)?.ok_or_else(|| format!("Recipe not found with id: {}", recipe_id))
}

/// Remove the ingredient at `index` (0-based, in insertion order)
pub fn remove_ingredient(db: &Database, recipe_id: &str, index: usize) -> Result<RecipeDetail, String> {
    {
        let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

        if !Recipe::exists(&conn, recipe_id).map_err(|e| format!("Database error: {}", e))? {
            return Err(format!("Recipe not found with id: {}", recipe_id));
        }

        let removed = Recipe::remove_ingredient(&conn, recipe_id, index)
            .map_err(|e| format!("Failed to remove ingredient: {}", e))?;
        if removed.is_none() {
            return Err(format!("Recipe {} has no ingredient at index {}", recipe_id, index));
        }
    }

    get_recipe(db, recipe_id)?.ok_or_else(|| format!("Recipe not found with id: {}", recipe_id))
}

/// Delete a recipe. Meal entries logged against it are kept and count as zero.
pub fn delete_recipe(db: &Database, id: &str) -> Result<DeleteRecipeResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let stale_meal_entries = Recipe::get_times_logged(&conn, id)
        .map_err(|e| format!("Failed to count meal entries: {}", e))?;

    let deleted = Recipe::delete(&conn, id).map_err(|e| format!("Failed to delete recipe: {}", e))?;
    if !deleted {
        return Err(format!("Recipe not found with id: {}", id));
    }

    if stale_meal_entries > 0 {
        tracing::warn!(id, stale_meal_entries, "deleted recipe still referenced by meal entries");
    }

    Ok(DeleteRecipeResponse {
        success: true,
        deleted_id: id.to_string(),
        stale_meal_entries,
    })
}

/// Resize an image file and store it as the recipe photo
pub fn attach_recipe_photo(db: &Database, recipe_id: &str, path: &Path) -> Result<AttachPhotoResponse, String> {
    let bytes = std::fs::read(path).map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    let photo = prepare_recipe_photo(&bytes).map_err(|e| format!("Failed to prepare photo: {}", e))?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let stored = Recipe::set_photo(&conn, recipe_id, Some(photo.as_slice()))
        .map_err(|e| format!("Failed to store photo: {}", e))?;
    if !stored {
        return Err(format!("Recipe not found with id: {}", recipe_id));
    }

    Ok(AttachPhotoResponse {
        success: true,
        recipe_id: recipe_id.to_string(),
        stored_bytes: photo.len(),
    })
}

/// Drop the recipe photo
pub fn clear_recipe_photo(db: &Database, recipe_id: &str) -> Result<bool, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let cleared = Recipe::set_photo(&conn, recipe_id, None)
        .map_err(|e| format!("Failed to clear photo: {}", e))?;
    if !cleared {
        return Err(format!("Recipe not found with id: {}", recipe_id));
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::food_items::delete_food_item;

    fn bol(db: &Database) -> String {
        create_recipe(
            db,
            RecipeCreate {
                name: "Bol riz".to_string(),
                servings: 2,
            },
        )
        .unwrap()
        .id
    }

    #[test]
    fn test_create_validation() {
        let db = Database::open_in_memory().unwrap();
        let no_name = RecipeCreate {
            name: " ".to_string(),
            servings: 1,
        };
        assert!(create_recipe(&db, no_name).is_err());
        let no_servings = RecipeCreate {
            name: "Bol".to_string(),
            servings: 0,
        };
        assert!(create_recipe(&db, no_servings).is_err());
    }

    #[test]
    fn test_rice_bowl_detail() {
        let db = Database::open_in_memory().unwrap();
        let id = bol(&db);

        let detail = add_ingredient(&db, &id, "riz", 200.0).unwrap();
        assert_eq!(detail.totals, Macros::new(260, 5, 56, 1));
        assert_eq!(detail.per_serving, Macros::new(130, 3, 28, 1));
        assert_eq!(detail.ingredients[0].label, "Riz blanc cuit");
        assert_eq!(detail.missing_foods, 0);
    }

    #[test]
    fn test_add_ingredient_validation() {
        let db = Database::open_in_memory().unwrap();
        let id = bol(&db);
        assert!(add_ingredient(&db, &id, "riz", -5.0).is_err());
        assert!(add_ingredient(&db, &id, "riz", f64::INFINITY).is_err());
        assert!(add_ingredient(&db, &id, "caviar", 10.0).is_err());
        assert!(add_ingredient(&db, "r-missing", "riz", 10.0).is_err());
    }

    #[test]
    fn test_huge_grams_stay_readable() {
        let db = Database::open_in_memory().unwrap();
        let id = bol(&db);
        add_ingredient(&db, &id, "riz", 1e300).unwrap();
        let detail = add_ingredient(&db, &id, "riz", 1e300).unwrap();
        assert_eq!(detail.totals.kcal, i64::MAX);

        assert!(get_recipe(&db, &id).unwrap().is_some());
        assert_eq!(list_recipes(&db).unwrap().total, 1);
    }

    #[test]
    fn test_deleted_food_shows_raw_id() {
        let db = Database::open_in_memory().unwrap();
        let id = bol(&db);
        add_ingredient(&db, &id, "riz", 200.0).unwrap();
        add_ingredient(&db, &id, "thon", 100.0).unwrap();
        delete_food_item(&db, "thon").unwrap();

        let detail = get_recipe(&db, &id).unwrap().unwrap();
        assert_eq!(detail.missing_foods, 1);
        assert_eq!(detail.ingredients[1].label, "thon");
        assert_eq!(detail.ingredients[1].macros, None);
        assert_eq!(detail.totals, Macros::new(260, 5, 56, 1));
    }

    #[test]
    fn test_remove_ingredient_by_index() {
        let db = Database::open_in_memory().unwrap();
        let id = bol(&db);
        add_ingredient(&db, &id, "riz", 200.0).unwrap();
        add_ingredient(&db, &id, "brocoli", 100.0).unwrap();

        let detail = remove_ingredient(&db, &id, 0).unwrap();
        assert_eq!(detail.ingredients.len(), 1);
        assert_eq!(detail.ingredients[0].food_id, "brocoli");
        assert!(remove_ingredient(&db, &id, 3).is_err());
    }

    #[test]
    fn test_update_and_list() {
        let db = Database::open_in_memory().unwrap();
        let id = bol(&db);
        add_ingredient(&db, &id, "riz", 200.0).unwrap();

        let summary = update_recipe(
            &db,
            &id,
            RecipeUpdate {
                servings: Some(1),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(summary.per_serving, Macros::new(260, 5, 56, 1));

        let bad = RecipeUpdate {
            servings: Some(0),
            ..Default::default()
        };
        assert!(update_recipe(&db, &id, bad).is_err());

        let list = list_recipes(&db).unwrap();
        assert_eq!(list.total, 1);
        assert_eq!(list.recipes[0].ingredient_count, 1);
    }

    #[test]
    fn test_attach_photo_from_file() {
        use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};

        let db = Database::open_in_memory().unwrap();
        let id = bol(&db);

        let path = std::env::temp_dir().join(format!("discipline-photo-{}.png", std::process::id()));
        let img = ImageBuffer::from_pixel(1000, 500, Rgb([200u8, 120, 40]));
        DynamicImage::ImageRgb8(img)
            .save_with_format(&path, ImageFormat::Png)
            .unwrap();

        let response = attach_recipe_photo(&db, &id, &path).unwrap();
        assert!(response.stored_bytes > 0);
        assert!(get_recipe(&db, &id).unwrap().unwrap().has_photo);

        assert!(clear_recipe_photo(&db, &id).unwrap());
        assert!(!get_recipe(&db, &id).unwrap().unwrap().has_photo);

        assert!(attach_recipe_photo(&db, "r-missing", &path).is_err());
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_delete_reports_stale_entries() {
        let db = Database::open_in_memory().unwrap();
        let id = bol(&db);
        crate::tools::days::log_meal(&db, None, None, &id, None).unwrap();

        let response = delete_recipe(&db, &id).unwrap();
        assert_eq!(response.stale_meal_entries, 1);
        assert!(get_recipe(&db, &id).unwrap().is_none());
    }
}
