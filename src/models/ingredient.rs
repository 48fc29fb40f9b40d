//! Ingredient and nutrient models
//!
//! An ingredient's `amount` is written for its recipe's `base_servings`; it
//! carries no meaning outside that recipe.

use serde::{Deserialize, Serialize};

/// A nutrient contribution of an ingredient, e.g. 20 g of Protein
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Nutrient {
    pub name: String,
    pub amount: f64,
    pub unit: String,
}

impl Nutrient {
    pub fn new(name: impl Into<String>, amount: f64, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            amount,
            unit: unit.into(),
        }
    }
}

/// A recipe ingredient with its optional nutrient breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub amount: f64,
    pub unit: String,
    /// Absent in the source data means "no nutrient data", stored as empty
    #[serde(default)]
    pub nutrients: Vec<Nutrient>,
}

impl Ingredient {
    pub fn new(name: impl Into<String>, amount: f64, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            amount,
            unit: unit.into(),
            nutrients: Vec::new(),
        }
    }

    pub fn with_nutrients(mut self, nutrients: Vec<Nutrient>) -> Self {
        self.nutrients = nutrients;
        self
    }
}

/// An ingredient whose amount has been rescaled to a household.
///
/// Same shape as [`Ingredient`]; built fresh for each scaling request.
pub type ScaledIngredient = Ingredient;
