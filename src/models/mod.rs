//! Data models
//!
//! Catalog recipes, their ingredients and nutrients, and the household profile.

mod ingredient;
mod profile;
mod recipe;

pub use ingredient::{Ingredient, Nutrient, ScaledIngredient};
pub use profile::{UserProfile, DEFAULT_HOUSEHOLD_SIZE};
pub use recipe::{Recipe, RecipeCreate};
