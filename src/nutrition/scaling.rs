//! Household scaling
//!
//! Rescales ingredient amounts from a recipe's base servings to a household
//! and sums nutrient contributions across an ingredient list.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::models::{Ingredient, ScaledIngredient};

/// Summed nutrient amounts keyed by nutrient name
pub type NutrientTotals = BTreeMap<String, f64>;

/// Error type for scaling operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScaleError {
    /// A base serving count of 0 (or negative/NaN) has no scale factor
    #[error("Cannot scale recipe: base servings must be greater than 0 (got {base_servings})")]
    DivisionFault { base_servings: f64 },
}

/// Round half-up to 2 decimal places
pub fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Scale ingredient amounts from `base_servings` to `household_size`.
///
/// Only the top-level `amount` is rescaled (rounded to 2 decimals); names,
/// units and nutrient lists are copied unchanged. Output order matches input.
pub fn scale_ingredients_for_family(
    base_ingredients: &[Ingredient],
    base_servings: f64,
    household_size: u32,
) -> Result<Vec<ScaledIngredient>, ScaleError> {
    if !(base_servings > 0.0) {
        return Err(ScaleError::DivisionFault { base_servings });
    }

    let scale_factor = f64::from(household_size) / base_servings;

    Ok(base_ingredients
        .iter()
        .map(|ingredient| ScaledIngredient {
            amount: round_to_hundredths(ingredient.amount * scale_factor),
            ..ingredient.clone()
        })
        .collect())
}

/// Sum nutrient amounts by name across every ingredient.
///
/// Ingredients without nutrient data contribute nothing.
pub fn calculate_family_nutrient_totals(scaled_ingredients: &[ScaledIngredient]) -> NutrientTotals {
    let mut totals = NutrientTotals::new();

    for nutrient in scaled_ingredients.iter().flat_map(|i| i.nutrients.iter()) {
        *totals.entry(nutrient.name.clone()).or_insert(0.0) += nutrient.amount;
    }

    totals
}
