//! Recommendation pipeline
//!
//! Fetch the catalog, drop recipes that are medically unsafe or contain a
//! disliked ingredient, then (at display time) scale and score each survivor
//! for the household.

use std::collections::BTreeSet;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::RecommendationConfig;
use crate::db::{Database, DbError};
use crate::models::{Recipe, ScaledIngredient, UserProfile};
use crate::nutrition::{
    calculate_family_nutrient_totals, calculate_nutrient_density, get_nutrient_tags,
    scale_ingredients_for_family, DensityProfile, NutrientTotals, ScaleError,
};
use crate::safety::{safety_violations, validate_medical_integrity, SafetyRules, SafetyViolation};

/// Failure to read the recipe catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to fetch recipes: {0}")]
    Db(#[from] DbError),

    #[error("Catalog fetch task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

#[derive(Debug, Error)]
pub enum RecommendError {
    #[error(transparent)]
    DataFetch(#[from] CatalogError),

    #[error(transparent)]
    Scale(#[from] ScaleError),
}

/// Source of candidate recipes
#[async_trait]
pub trait RecipeCatalog: Send + Sync {
    /// Every recipe in store order. One request, no retry.
    async fn fetch_all(&self) -> Result<Vec<Recipe>, CatalogError>;
}

#[async_trait]
impl RecipeCatalog for Database {
    async fn fetch_all(&self) -> Result<Vec<Recipe>, CatalogError> {
        let db = self.clone();
        let recipes = tokio::task::spawn_blocking(move || db.with_conn(Recipe::list_all)).await??;
        Ok(recipes)
    }
}

/// Names of the recipe's ingredients found in `disliked_foods` (exact match)
pub fn disliked_ingredients<'a>(recipe: &'a Recipe, disliked_foods: &BTreeSet<String>) -> Vec<&'a str> {
    recipe
        .ingredients
        .iter()
        .map(|i| i.name.as_str())
        .filter(|name| disliked_foods.contains(*name))
        .collect()
}

fn contains_disliked(recipe: &Recipe, disliked_foods: &BTreeSet<String>) -> bool {
    recipe
        .ingredients
        .iter()
        .any(|i| disliked_foods.contains(&i.name))
}

/// Fetch the catalog and keep recipes that are safe and free of dislikes.
///
/// Survivors keep the store's order.
pub async fn get_recommended_recipes<C: RecipeCatalog + ?Sized>(
    catalog: &C,
    conditions: &BTreeSet<String>,
    disliked_foods: &BTreeSet<String>,
    rules: &SafetyRules,
) -> Result<Vec<Recipe>, RecommendError> {
    let candidates = catalog.fetch_all().await?;
    let fetched = candidates.len();

    let recommended: Vec<Recipe> = candidates
        .into_iter()
        .filter(|recipe| {
            if !validate_medical_integrity(recipe, conditions, rules) {
                debug!(recipe = %recipe.id, "rejected: medically unsafe");
                return false;
            }
            if contains_disliked(recipe, disliked_foods) {
                debug!(recipe = %recipe.id, "rejected: contains disliked ingredient");
                return false;
            }
            true
        })
        .collect();

    info!(fetched, recommended = recommended.len(), "filtered recipe catalog");
    Ok(recommended)
}

/// A recipe prepared for one household
#[derive(Debug, Clone, Serialize)]
pub struct RecipeEvaluation {
    pub id: String,
    pub title: String,
    pub medical_tags: BTreeSet<String>,
    pub calories: f64,
    pub base_servings: f64,
    pub household_size: u32,
    pub ingredients: Vec<ScaledIngredient>,
    pub nutrient_totals: NutrientTotals,
    pub density_score: f64,
    pub density_tags: Vec<String>,
}

/// Scale a recipe to `household_size` and attach its density score and tags.
///
/// The score compares the recipe's own (unscaled) nutrient totals with its
/// calories, so it does not change with household size.
pub fn evaluate_recipe(
    recipe: &Recipe,
    household_size: u32,
    density: &DensityProfile,
) -> Result<RecipeEvaluation, ScaleError> {
    let ingredients =
        scale_ingredients_for_family(&recipe.ingredients, recipe.base_servings, household_size)?;
    let nutrient_totals = calculate_family_nutrient_totals(&ingredients);

    let nutrients: Vec<_> = recipe
        .ingredients
        .iter()
        .flat_map(|i| i.nutrients.iter().cloned())
        .collect();
    let density_score = calculate_nutrient_density(recipe.calories, &nutrients, density);
    let density_tags = get_nutrient_tags(density_score, density);

    Ok(RecipeEvaluation {
        id: recipe.id.clone(),
        title: recipe.title.clone(),
        medical_tags: recipe.medical_tags.clone(),
        calories: recipe.calories,
        base_servings: recipe.base_servings,
        household_size,
        ingredients,
        nutrient_totals,
        density_score,
        density_tags,
    })
}

/// Recommended recipes for a resolved profile, scaled and scored
pub async fn recommend_for_profile<C: RecipeCatalog + ?Sized>(
    catalog: &C,
    profile: &UserProfile,
    config: &RecommendationConfig,
) -> Result<Vec<RecipeEvaluation>, RecommendError> {
    let profile = profile.normalized();
    let household_size = profile.household_size();

    let recipes = get_recommended_recipes(
        catalog,
        &profile.medical_conditions,
        &profile.disliked_foods,
        &config.safety,
    )
    .await?;

    let evaluations = recipes
        .iter()
        .map(|recipe| evaluate_recipe(recipe, household_size, &config.density))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(evaluations)
}

/// Why a single recipe is or is not recommended for a profile
#[derive(Debug, Clone, Serialize)]
pub struct RecipeExplanation {
    pub recommended: bool,
    pub safety_violations: Vec<SafetyViolation>,
    pub disliked_ingredients: Vec<String>,
    pub unconstrained_conditions: Vec<String>,
    pub evaluation: RecipeEvaluation,
}

pub fn explain_recipe(
    recipe: &Recipe,
    profile: &UserProfile,
    config: &RecommendationConfig,
) -> Result<RecipeExplanation, ScaleError> {
    let profile = profile.normalized();

    let violations = safety_violations(recipe, &profile.medical_conditions, &config.safety);
    let disliked: Vec<String> = disliked_ingredients(recipe, &profile.disliked_foods)
        .into_iter()
        .map(str::to_string)
        .collect();
    let unconstrained = config
        .safety
        .unconstrained(&profile.medical_conditions)
        .into_iter()
        .map(str::to_string)
        .collect();

    Ok(RecipeExplanation {
        recommended: violations.is_empty() && disliked.is_empty(),
        safety_violations: violations,
        disliked_ingredients: disliked,
        unconstrained_conditions: unconstrained,
        evaluation: evaluate_recipe(recipe, profile.household_size(), &config.density)?,
    })
}
