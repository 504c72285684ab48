//! Recipe composer
//!
//! Ingredient -> recipe -> serving -> portion macros. Every level rounds each
//! field on its own; a recipe total is the sum of its already-rounded lines.

use serde::Serialize;

use crate::models::{FoodCatalog, Ingredient, Macros, Recipe};

/// Macros of one ingredient, or `None` when its food is not in the catalog
pub fn try_macros_of(ingredient: &Ingredient, foods: &FoodCatalog) -> Option<Macros> {
    foods
        .get(&ingredient.food_id)
        .map(|food| food.per100.for_grams(ingredient.grams))
}

/// Macros of one ingredient; a missing food counts as zero
pub fn macros_of(ingredient: &Ingredient, foods: &FoodCatalog) -> Macros {
    try_macros_of(ingredient, foods).unwrap_or_default()
}

/// Sum of the rounded ingredient macros
pub fn recipe_totals(recipe: &Recipe, foods: &FoodCatalog) -> Macros {
    recipe.items.iter().map(|item| macros_of(item, foods)).sum()
}

/// Totals divided by the serving count (zero servings reads as one)
pub fn per_serving(recipe: &Recipe, foods: &FoodCatalog) -> Macros {
    recipe_totals(recipe, foods).divided(recipe.effective_servings() as f64)
}

/// Per-serving macros times `portions`, rounded after the multiplication
pub fn scaled_by_portions(recipe: &Recipe, foods: &FoodCatalog, portions: f64) -> Macros {
    per_serving(recipe, foods).scaled(portions)
}

/// One ingredient line with its contribution
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngredientLine<'a> {
    pub index: usize,
    pub ingredient: &'a Ingredient,
    pub food_name: Option<&'a str>,
    pub macros: Option<Macros>,
}

/// Per-line view of a recipe, in ingredient order
pub fn ingredient_breakdown<'a>(recipe: &'a Recipe, foods: &'a FoodCatalog) -> Vec<IngredientLine<'a>> {
    recipe
        .items
        .iter()
        .enumerate()
        .map(|(index, ingredient)| {
            let food = foods.get(&ingredient.food_id);
            IngredientLine {
                index,
                ingredient,
                food_name: food.map(|f| f.name.as_str()),
                macros: food.map(|f| f.per100.for_grams(ingredient.grams)),
            }
        })
        .collect()
}
