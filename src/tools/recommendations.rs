//! Recommendation tools
//!
//! Profile-driven recommendations, per-recipe explanations and ad-hoc scaling.

use serde::Serialize;

use crate::config::RecommendationConfig;
use crate::db::Database;
use crate::models::{Recipe, UserProfile};
use crate::recommend::{self, RecipeEvaluation, RecipeExplanation};

/// Response for recommend_recipes
#[derive(Debug, Serialize)]
pub struct RecommendResponse {
    pub household_size: u32,
    pub count: usize,
    pub recipes: Vec<RecipeEvaluation>,
}

/// Run the recommendation pipeline for a profile
pub async fn recommend_recipes(
    db: &Database,
    profile: &UserProfile,
    config: &RecommendationConfig,
) -> Result<RecommendResponse, String> {
    let recipes = recommend::recommend_for_profile(db, profile, config)
        .await
        .map_err(|e| format!("Failed to recommend recipes: {}", e))?;

    Ok(RecommendResponse {
        household_size: profile.household_size(),
        count: recipes.len(),
        recipes,
    })
}

fn load_recipe(db: &Database, recipe_id: &str) -> Result<Recipe, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    Recipe::get_by_id(&conn, recipe_id)
        .map_err(|e| format!("Failed to get recipe: {}", e))?
        .ok_or_else(|| format!("Recipe not found with id: {}", recipe_id))
}

/// Explain whether one recipe is recommended for a profile
pub fn explain_recipe(
    db: &Database,
    recipe_id: &str,
    profile: &UserProfile,
    config: &RecommendationConfig,
) -> Result<RecipeExplanation, String> {
    let recipe = load_recipe(db, recipe_id)?;
    recommend::explain_recipe(&recipe, profile, config)
        .map_err(|e| format!("Failed to evaluate recipe: {}", e))
}

/// Scale one recipe to a household size, without any filtering
pub fn scale_recipe(
    db: &Database,
    recipe_id: &str,
    household_size: u32,
    config: &RecommendationConfig,
) -> Result<RecipeEvaluation, String> {
    if household_size == 0 {
        return Err("household_size must be at least 1".to_string());
    }
    let recipe = load_recipe(db, recipe_id)?;
    recommend::evaluate_recipe(&recipe, household_size, &config.density)
        .map_err(|e| format!("Failed to scale recipe: {}", e))
}
