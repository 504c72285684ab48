//! Discipline MCP Server Implementation
//!
//! Implements the MCP server with all nutrition tools.

use std::path::PathBuf;
use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::db::Database;
use crate::models::{
    ActivityLevel, FoodItemCreate, FoodItemUpdate, Goal, Per100, ProfileUpdate, RecipeCreate,
    RecipeUpdate, Sex,
};
use crate::tools::status::StatusTracker;
use crate::tools::{dashboard, days, food_items, profile, recipes};

/// Discipline MCP Service
#[derive(Clone)]
pub struct DisciplineService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    database: Database,
    tool_router: ToolRouter<DisciplineService>,
}

impl DisciplineService {
    pub fn new(database_path: PathBuf, database: Database) -> Self {
        Self {
            status_tracker: Arc::new(Mutex::new(StatusTracker::new(database_path))),
            database,
            tool_router: Self::tool_router(),
        }
    }
}

/// Serialize a tool response as pretty JSON text content
fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

fn tool_error(e: String) -> McpError {
    McpError::internal_error(e, None)
}

// ============================================================================
// Profile Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateProfileParams {
    pub age: Option<u32>,
    /// "M" or "F"
    pub sex: Option<String>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    /// sedentary, light, moderate, active or very
    pub activity: Option<String>,
    /// maintain, cut or bulk
    pub goal: Option<String>,
    pub rate_per_week_kg: Option<f64>,
    pub protein_per_kg: Option<f64>,
    pub fat_per_kg: Option<f64>,
}

// ============================================================================
// Food Item Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddFoodItemParams {
    pub name: String,
    /// kcal per 100 g
    pub kcal: f64,
    #[serde(default)]
    pub protein_g: f64,
    #[serde(default)]
    pub carb_g: f64,
    #[serde(default)]
    pub fat_g: f64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListFoodItemsParams {
    /// Case-insensitive name filter
    pub query: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct FoodItemIdParams {
    pub id: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateFoodItemParams {
    pub id: String,
    pub name: Option<String>,
    pub kcal: Option<f64>,
    pub protein_g: Option<f64>,
    pub carb_g: Option<f64>,
    pub fat_g: Option<f64>,
}

// ============================================================================
// Recipe Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CreateRecipeParams {
    pub name: String,
    #[serde(default = "default_servings")]
    pub servings: u32,
}

fn default_servings() -> u32 { 1 }

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RecipeIdParams {
    pub id: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateRecipeParams {
    pub id: String,
    pub name: Option<String>,
    pub servings: Option<u32>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddRecipeIngredientParams {
    pub recipe_id: String,
    pub food_id: String,
    pub grams: f64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RemoveRecipeIngredientParams {
    pub recipe_id: String,
    /// 0-based position in the ingredient list
    pub index: usize,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AttachRecipePhotoParams {
    pub recipe_id: String,
    /// Path to a PNG, JPEG, GIF, WebP or BMP file
    pub file_path: String,
}

// ============================================================================
// Day Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct LogMealParams {
    pub recipe_id: String,
    /// YYYY-MM-DD, defaults to today
    pub date: Option<String>,
    /// breakfast, lunch, dinner or snack; defaults to lunch
    pub slot: Option<String>,
    /// Servings eaten, defaults to 1
    pub portions: Option<f64>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DateParams {
    /// YYYY-MM-DD, defaults to today
    pub date: Option<String>,
}

// ============================================================================
// Tool Implementations
// ============================================================================

#[tool_router]
impl DisciplineService {
    // --- Status ---

    #[tool(description = "Get the current status of the service including build info, database status, and process information")]
    async fn discipline_status(&self) -> Result<CallToolResult, McpError> {
        let tracker = self.status_tracker.lock().await;
        let status = tracker.get_status(&self.database).map_err(tool_error)?;
        json_result(&status)
    }

    #[tool(description = "Get instructions for tracking nutrition: foods, recipes, meal logging and targets. Call this when starting a session.")]
    fn nutrition_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::NUTRITION_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(NUTRITION_INSTRUCTIONS)]))
    }

    // --- Profile ---

    #[tool(description = "Get the physiological profile and its daily energy/macro targets")]
    fn get_profile(&self) -> Result<CallToolResult, McpError> {
        let result = profile::get_profile(&self.database).map_err(tool_error)?;
        json_result(&result)
    }

    #[tool(description = "Update some fields of the profile. Returns the new profile and targets.")]
    fn update_profile(&self, Parameters(p): Parameters<UpdateProfileParams>) -> Result<CallToolResult, McpError> {
        let data = ProfileUpdate {
            age: p.age,
            sex: p.sex.as_deref().map(Sex::from_str),
            height_cm: p.height_cm,
            weight_kg: p.weight_kg,
            activity: p.activity.as_deref().map(ActivityLevel::from_str),
            goal: p.goal.as_deref().map(Goal::from_str),
            rate_per_week_kg: p.rate_per_week_kg,
            protein_per_kg: p.protein_per_kg,
            fat_per_kg: p.fat_per_kg,
        };
        let result = profile::update_profile(&self.database, data).map_err(tool_error)?;
        json_result(&result)
    }

    #[tool(description = "Explain the daily targets: BMR (Mifflin-St Jeor), TDEE, goal adjustment, and macro split")]
    fn get_energy_targets(&self) -> Result<CallToolResult, McpError> {
        let result = profile::get_energy_targets(&self.database).map_err(tool_error)?;
        json_result(&result)
    }

    // --- Food Items ---

    #[tool(description = "Add a food item with its nutrition per 100 g. The id is derived from the name.")]
    fn add_food_item(&self, Parameters(p): Parameters<AddFoodItemParams>) -> Result<CallToolResult, McpError> {
        let data = FoodItemCreate {
            name: p.name,
            per100: Per100::new(p.kcal, p.protein_g, p.carb_g, p.fat_g),
        };
        let result = food_items::add_food_item(&self.database, data).map_err(tool_error)?;
        json_result(&result)
    }

    #[tool(description = "List food items by name, optionally filtered by a case-insensitive query")]
    fn list_food_items(&self, Parameters(p): Parameters<ListFoodItemsParams>) -> Result<CallToolResult, McpError> {
        let result = food_items::list_food_items(&self.database, p.query.as_deref()).map_err(tool_error)?;
        json_result(&result)
    }

    #[tool(description = "Get a food item with the recipes that use it")]
    fn get_food_item(&self, Parameters(p): Parameters<FoodItemIdParams>) -> Result<CallToolResult, McpError> {
        let result = food_items::get_food_item(&self.database, &p.id).map_err(tool_error)?;
        match result {
            Some(item) => json_result(&item),
            None => json_result(&serde_json::json!({ "error": "Food item not found", "id": p.id })),
        }
    }

    #[tool(description = "Update a food item. Every recipe using it picks up the new values.")]
    fn update_food_item(&self, Parameters(p): Parameters<UpdateFoodItemParams>) -> Result<CallToolResult, McpError> {
        let data = FoodItemUpdate {
            name: p.name,
            kcal: p.kcal,
            protein_g: p.protein_g,
            carb_g: p.carb_g,
            fat_g: p.fat_g,
        };
        let result = food_items::update_food_item(&self.database, &p.id, data).map_err(tool_error)?;
        json_result(&result)
    }

    #[tool(description = "Delete a food item. Recipe lines using it remain and count as zero.")]
    fn delete_food_item(&self, Parameters(p): Parameters<FoodItemIdParams>) -> Result<CallToolResult, McpError> {
        let result = food_items::delete_food_item(&self.database, &p.id).map_err(tool_error)?;
        json_result(&result)
    }

    // --- Recipes ---

    #[tool(description = "Create an empty recipe (ingredients added separately)")]
    fn create_recipe(&self, Parameters(p): Parameters<CreateRecipeParams>) -> Result<CallToolResult, McpError> {
        let data = RecipeCreate {
            name: p.name,
            servings: p.servings,
        };
        let result = recipes::create_recipe(&self.database, data).map_err(tool_error)?;
        json_result(&result)
    }

    #[tool(description = "Get a recipe with its ingredient lines, totals and per-serving macros")]
    fn get_recipe(&self, Parameters(p): Parameters<RecipeIdParams>) -> Result<CallToolResult, McpError> {
        let result = recipes::get_recipe(&self.database, &p.id).map_err(tool_error)?;
        match result {
            Some(recipe) => json_result(&recipe),
            None => json_result(&serde_json::json!({ "error": "Recipe not found", "id": p.id })),
        }
    }

    #[tool(description = "List all recipes with their per-serving macros")]
    fn list_recipes(&self) -> Result<CallToolResult, McpError> {
        let result = recipes::list_recipes(&self.database).map_err(tool_error)?;
        json_result(&result)
    }

    #[tool(description = "Rename a recipe or change its number of servings")]
    fn update_recipe(&self, Parameters(p): Parameters<UpdateRecipeParams>) -> Result<CallToolResult, McpError> {
        let data = RecipeUpdate {
            name: p.name,
            servings: p.servings,
        };
        let result = recipes::update_recipe(&self.database, &p.id, data).map_err(tool_error)?;
        json_result(&result)
    }

    #[tool(description = "Delete a recipe. Meals already logged with it remain and count as zero.")]
    fn delete_recipe(&self, Parameters(p): Parameters<RecipeIdParams>) -> Result<CallToolResult, McpError> {
        let result = recipes::delete_recipe(&self.database, &p.id).map_err(tool_error)?;
        json_result(&result)
    }

    #[tool(description = "Append a food to a recipe with its weight in grams")]
    fn add_recipe_ingredient(&self, Parameters(p): Parameters<AddRecipeIngredientParams>) -> Result<CallToolResult, McpError> {
        let result = recipes::add_ingredient(&self.database, &p.recipe_id, &p.food_id, p.grams).map_err(tool_error)?;
        json_result(&result)
    }

    #[tool(description = "Remove the ingredient at a 0-based index from a recipe")]
    fn remove_recipe_ingredient(&self, Parameters(p): Parameters<RemoveRecipeIngredientParams>) -> Result<CallToolResult, McpError> {
        let result = recipes::remove_ingredient(&self.database, &p.recipe_id, p.index).map_err(tool_error)?;
        json_result(&result)
    }

    #[tool(description = "Attach a photo to a recipe from an image file. The image is resized to 800 px and stored as JPEG.")]
    fn attach_recipe_photo(&self, Parameters(p): Parameters<AttachRecipePhotoParams>) -> Result<CallToolResult, McpError> {
        let path = PathBuf::from(&p.file_path);
        let result = recipes::attach_recipe_photo(&self.database, &p.recipe_id, &path).map_err(tool_error)?;
        json_result(&result)
    }

    #[tool(description = "Remove the photo of a recipe")]
    fn clear_recipe_photo(&self, Parameters(p): Parameters<RecipeIdParams>) -> Result<CallToolResult, McpError> {
        let cleared = recipes::clear_recipe_photo(&self.database, &p.id).map_err(tool_error)?;
        json_result(&serde_json::json!({ "success": cleared, "recipe_id": p.id }))
    }

    // --- Days ---

    #[tool(description = "Log portions of a recipe on a day. Date defaults to today, slot to lunch, portions to 1. Entries cannot be removed.")]
    fn log_meal(&self, Parameters(p): Parameters<LogMealParams>) -> Result<CallToolResult, McpError> {
        let result = days::log_meal(&self.database, p.date.as_deref(), p.slot.as_deref(), &p.recipe_id, p.portions)
            .map_err(tool_error)?;
        json_result(&result)
    }

    #[tool(description = "Get a day's entries by slot with their macros and the day totals")]
    fn get_day(&self, Parameters(p): Parameters<DateParams>) -> Result<CallToolResult, McpError> {
        let result = days::get_day(&self.database, p.date.as_deref()).map_err(tool_error)?;
        json_result(&result)
    }

    #[tool(description = "List logged days, newest first, with totals and on-target flag")]
    fn list_days(&self) -> Result<CallToolResult, McpError> {
        let result = days::list_days(&self.database).map_err(tool_error)?;
        json_result(&result)
    }

    // --- Dashboard ---

    #[tool(description = "Compare a day's totals with the profile targets for kcal, protein, carbs and fat. on_target is true between 85% and 105% of the kcal target.")]
    fn get_dashboard(&self, Parameters(p): Parameters<DateParams>) -> Result<CallToolResult, McpError> {
        let result = dashboard::get_dashboard(&self.database, p.date.as_deref()).map_err(tool_error)?;
        json_result(&result)
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
impl ServerHandler for DisciplineService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "discipline".into(),
                version: crate::build_info::BuildInfo::current().version_label(),
                title: Some("Discipline Nutrition".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Discipline - nutrition targets, recipes and daily macro logging. \
                 IMPORTANT: Call nutrition_instructions first. \
                 Profile: get_profile/update_profile/get_energy_targets. \
                 Food: add/list/get/update/delete_food_item. \
                 Recipes: create/get/list/update/delete_recipe, add/remove_recipe_ingredient, \
                 attach/clear_recipe_photo. \
                 Days: log_meal/get_day/list_days. \
                 Dashboard: get_dashboard."
                    .into(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_info() {
        let db = Database::open_in_memory().unwrap();
        let service = DisciplineService::new(PathBuf::from(":memory:"), db);
        let info = service.get_info();
        assert_eq!(info.server_info.name, "discipline");
        assert!(info.capabilities.tools.is_some());
    }

    #[test]
    fn test_router_lists_tools() {
        let db = Database::open_in_memory().unwrap();
        let service = DisciplineService::new(PathBuf::from(":memory:"), db);
        let names: Vec<String> = service
            .tool_router
            .list_all()
            .into_iter()
            .map(|tool| tool.name.to_string())
            .collect();
        for expected in ["log_meal", "get_dashboard", "add_recipe_ingredient", "update_profile"] {
            assert!(names.iter().any(|n| n == expected), "missing tool {}", expected);
        }
    }
}
