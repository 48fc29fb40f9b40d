//! Nourish MCP Server Implementation
//!
//! Implements the MCP server with all Nourish tools.

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

use crate::config::RecommendationConfig;
use crate::db::Database;
use crate::models::{Ingredient, Nutrient, RecipeCreate, UserProfile};
use crate::tools::recipes;
use crate::tools::recommendations;
use crate::tools::status::StatusTracker;

/// Nourish MCP Service
#[derive(Clone)]
pub struct NourishService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    database: Database,
    config: Arc<RecommendationConfig>,
    tool_router: ToolRouter<NourishService>,
}

impl NourishService {
    pub fn new(database_path: PathBuf, database: Database, config: RecommendationConfig) -> Self {
        Self {
            status_tracker: Arc::new(Mutex::new(StatusTracker::new(database_path))),
            database,
            config: Arc::new(config),
            tool_router: Self::tool_router(),
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

// ============================================================================
// Shared Parameter Structs
// ============================================================================

/// Household profile as supplied by the caller
#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct ProfileParams {
    /// Number of people to cook for (defaults to 1)
    pub household_size: Option<u32>,
    /// Declared medical conditions, e.g. "Diabetes", "Heart Disease", "Cancer"
    #[serde(default)]
    pub medical_conditions: Vec<String>,
    /// Ingredient names to exclude (exact, case-sensitive)
    #[serde(default)]
    pub disliked_foods: Vec<String>,
}

impl From<ProfileParams> for UserProfile {
    fn from(p: ProfileParams) -> Self {
        UserProfile {
            household_size: p.household_size,
            medical_conditions: p.medical_conditions.into_iter().collect(),
            disliked_foods: p.disliked_foods.into_iter().collect(),
        }
    }
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct NutrientParam {
    /// Nutrient name, e.g. "Protein", "Fiber", "Vitamin C"
    pub name: String,
    pub amount: f64,
    pub unit: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct IngredientParam {
    pub name: String,
    /// Amount for the recipe's base servings
    pub amount: f64,
    pub unit: String,
    /// Optional nutrient breakdown for this ingredient
    #[serde(default)]
    pub nutrients: Vec<NutrientParam>,
}

impl From<IngredientParam> for Ingredient {
    fn from(p: IngredientParam) -> Self {
        Ingredient {
            name: p.name,
            amount: p.amount,
            unit: p.unit,
            nutrients: p
                .nutrients
                .into_iter()
                .map(|n| Nutrient::new(n.name, n.amount, n.unit))
                .collect(),
        }
    }
}

// ============================================================================
// Recipe Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddRecipeParams {
    /// Recipe id (generated when omitted)
    pub id: Option<String>,
    pub title: String,
    /// Ingredients in display order
    #[serde(default)]
    pub ingredients: Vec<IngredientParam>,
    /// Medical tags, e.g. "High Sugar", "Low Sodium"
    #[serde(default)]
    pub medical_tags: Vec<String>,
    /// Calories for the base servings
    #[serde(default)]
    pub calories: f64,
    /// Servings the ingredient amounts are written for (default 1)
    #[serde(default = "default_servings")]
    pub base_servings: f64,
}

fn default_servings() -> f64 { 1.0 }

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RecipeIdParams {
    /// Recipe id
    pub id: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListRecipesParams {
    /// Search query for recipe title (optional)
    pub query: Option<String>,
    /// Max results (default 50, max 200)
    #[serde(default = "default_list_limit")]
    pub limit: i64,
    /// Offset for pagination (default 0)
    #[serde(default)]
    pub offset: i64,
}

fn default_list_limit() -> i64 { 50 }

// ============================================================================
// Recommendation Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RecommendRecipesParams {
    #[serde(default)]
    pub profile: ProfileParams,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ExplainRecipeParams {
    /// Recipe id
    pub recipe_id: String,
    #[serde(default)]
    pub profile: ProfileParams,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ScaleRecipeParams {
    /// Recipe id
    pub recipe_id: String,
    /// Number of people to cook for
    pub household_size: u32,
}

// ============================================================================
// Tool Implementations
// ============================================================================

#[tool_router]
impl NourishService {
    // --- Status ---

    #[tool(description = "Get the current status of the Nourish service including build info, database status, and process information")]
    async fn nourish_status(&self) -> Result<CallToolResult, McpError> {
        let tracker = self.status_tracker.lock().await;
        to_json(&tracker.get_status())
    }

    #[tool(description = "Get instructions for recommending recipes: profile fields, safety rules, density tags. Call this before the first recommendation in a session.")]
    fn recommendation_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::RECOMMENDATION_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(RECOMMENDATION_INSTRUCTIONS)]))
    }

    // --- Catalog ---

    #[tool(description = "Add a recipe to the catalog with ingredients (optionally with nutrients), medical tags, calories and base servings")]
    fn add_recipe(&self, Parameters(p): Parameters<AddRecipeParams>) -> Result<CallToolResult, McpError> {
        let data = RecipeCreate {
            id: p.id,
            title: p.title,
            ingredients: p.ingredients.into_iter().map(Ingredient::from).collect(),
            medical_tags: p.medical_tags.into_iter().collect(),
            calories: p.calories,
            base_servings: p.base_servings,
        };
        let result = recipes::add_recipe(&self.database, data).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Get a catalog recipe with its ingredients, nutrients and medical tags")]
    fn get_recipe(&self, Parameters(p): Parameters<RecipeIdParams>) -> Result<CallToolResult, McpError> {
        let result = recipes::get_recipe(&self.database, &p.id).map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Some(recipe) => to_json(&recipe),
            None => to_json(&serde_json::json!({ "error": "Recipe not found", "id": p.id })),
        }
    }

    #[tool(description = "List catalog recipes in catalog order with optional title search and pagination")]
    fn list_recipes(&self, Parameters(p): Parameters<ListRecipesParams>) -> Result<CallToolResult, McpError> {
        let result = recipes::list_recipes(&self.database, p.query.as_deref(), p.limit, p.offset)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Delete a recipe from the catalog")]
    fn delete_recipe(&self, Parameters(p): Parameters<RecipeIdParams>) -> Result<CallToolResult, McpError> {
        let result = recipes::delete_recipe(&self.database, &p.id).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    // --- Recommendations ---

    #[tool(description = "Recommend recipes for a household profile: drops medically unsafe recipes and recipes with disliked ingredients, then scales ingredients to the household and tags nutrient density")]
    async fn recommend_recipes(&self, Parameters(p): Parameters<RecommendRecipesParams>) -> Result<CallToolResult, McpError> {
        let profile = UserProfile::from(p.profile);
        let result = recommendations::recommend_recipes(&self.database, &profile, &self.config)
            .await
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Explain whether a recipe is recommended for a profile: safety rule violations, disliked ingredients, and the scaled evaluation")]
    fn explain_recipe(&self, Parameters(p): Parameters<ExplainRecipeParams>) -> Result<CallToolResult, McpError> {
        let profile = UserProfile::from(p.profile);
        let result = recommendations::explain_recipe(&self.database, &p.recipe_id, &profile, &self.config)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Scale one recipe's ingredients to a household size and report nutrient totals and density")]
    fn scale_recipe(&self, Parameters(p): Parameters<ScaleRecipeParams>) -> Result<CallToolResult, McpError> {
        let result = recommendations::scale_recipe(&self.database, &p.recipe_id, p.household_size, &self.config)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
impl ServerHandler for NourishService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "nourish".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("Nourish".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Nourish - medically safe recipe recommendations scaled to a household. \
                 IMPORTANT: Call recommendation_instructions before recommending. \
                 Catalog: add/get/list/delete_recipe. \
                 Recommendations: recommend_recipes (profile: household_size, medical_conditions, disliked_foods), \
                 explain_recipe, scale_recipe. \
                 Status: nourish_status."
                    .into(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_params_default_household() {
        let params: ProfileParams =
            serde_json::from_str(r#"{"medical_conditions": ["Diabetes", "Diabetes"]}"#).unwrap();
        let profile = UserProfile::from(params);
        assert_eq!(profile.household_size(), 1);
        assert_eq!(profile.medical_conditions.len(), 1);
    }

    #[test]
    fn test_ingredient_param_conversion() {
        let param: IngredientParam = serde_json::from_str(
            r#"{"name": "Spinach", "amount": 2, "unit": "cup",
                "nutrients": [{"name": "Iron", "amount": 1.6, "unit": "mg"}]}"#,
        )
        .unwrap();
        let ingredient = Ingredient::from(param);
        assert_eq!(ingredient.amount, 2.0);
        assert_eq!(ingredient.nutrients, vec![Nutrient::new("Iron", 1.6, "mg")]);
    }
}
