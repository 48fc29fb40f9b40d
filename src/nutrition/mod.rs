//! Nutrition calculation module
//!
//! Nutrient density scoring and household scaling.

pub mod density;
pub mod scaling;

pub use density::{
    calculate_nutrient_density, get_nutrient_tags, DensityProfile, DensityTier,
};
pub use scaling::{
    calculate_family_nutrient_totals, round_to_hundredths, scale_ingredients_for_family,
    NutrientTotals, ScaleError,
};
