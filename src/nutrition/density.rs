//! Nutrient density scoring
//!
//! The Nutrient Density Score (NDS) is the weighted sum of selected nutrient
//! amounts per calorie, scaled by 100. Weights and tag tiers are data so that
//! nutrients can be added without touching the scoring code.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::Nutrient;

// ============================================================================
// Default Weights and Tiers
// ============================================================================

/// Essential nutrient weights applied when no rules file overrides them
pub const DEFAULT_WEIGHTS: [(&str, f64); 5] = [
    ("Protein", 1.5),
    ("Fiber", 2.0),
    ("Vitamin C", 1.2),
    ("Iron", 1.5),
    ("Calcium", 1.2),
];

pub const SUPERFOOD: &str = "Superfood";
pub const HIGH_NUTRIENT_DENSITY: &str = "High Nutrient Density";
pub const NUTRITIOUS: &str = "Nutritious";

/// Tag tiers in emission order. A score must be strictly above `above`.
pub const DEFAULT_TIERS: [(&str, f64); 3] = [
    (SUPERFOOD, 80.0),
    (HIGH_NUTRIENT_DENSITY, 50.0),
    (NUTRITIOUS, 20.0),
];

/// A qualitative tag earned by scores strictly greater than `above`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DensityTier {
    pub label: String,
    pub above: f64,
}

/// Weight table and tag tiers used to score recipes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DensityProfile {
    /// Nutrient name (exact match) to weight
    pub weights: BTreeMap<String, f64>,
    /// Evaluated independently, emitted in this order
    pub tiers: Vec<DensityTier>,
}

impl Default for DensityProfile {
    fn default() -> Self {
        Self {
            weights: DEFAULT_WEIGHTS
                .iter()
                .map(|(name, weight)| (name.to_string(), *weight))
                .collect(),
            tiers: DEFAULT_TIERS
                .iter()
                .map(|(label, above)| DensityTier {
                    label: label.to_string(),
                    above: *above,
                })
                .collect(),
        }
    }
}

impl DensityProfile {
    pub fn weight(&self, nutrient: &str) -> Option<f64> {
        self.weights.get(nutrient).copied()
    }
}

/// Calculate the Nutrient Density Score for a calorie count and nutrient list.
///
/// Returns 0 when `calories` is 0. Nutrients without a weight contribute
/// nothing; repeated names each contribute.
pub fn calculate_nutrient_density(
    calories: f64,
    nutrients: &[Nutrient],
    profile: &DensityProfile,
) -> f64 {
    if calories == 0.0 {
        return 0.0;
    }

    let total: f64 = nutrients
        .iter()
        .filter_map(|n| profile.weight(&n.name).map(|w| n.amount * w))
        .sum();

    (total / calories) * 100.0
}

/// Qualitative tags for a density score, in tier order
pub fn get_nutrient_tags(density_score: f64, profile: &DensityProfile) -> Vec<String> {
    profile
        .tiers
        .iter()
        .filter(|tier| density_score > tier.above)
        .map(|tier| tier.label.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(name: &str, amount: f64) -> Nutrient {
        Nutrient::new(name, amount, "g")
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_zero_calories_scores_zero() {
        let profile = DensityProfile::default();
        assert_eq!(calculate_nutrient_density(0.0, &[], &profile), 0.0);
        assert_eq!(
            calculate_nutrient_density(0.0, &[n("Protein", 50.0), n("Fiber", 10.0)], &profile),
            0.0
        );
    }

    #[test]
    fn test_no_nutrients_scores_zero() {
        let profile = DensityProfile::default();
        assert_eq!(calculate_nutrient_density(250.0, &[], &profile), 0.0);
    }

    #[test]
    fn test_unweighted_nutrients_contribute_nothing() {
        let profile = DensityProfile::default();
        let sodium = [Nutrient::new("Sodium", 500.0, "mg")];
        assert_eq!(calculate_nutrient_density(100.0, &sodium, &profile), 0.0);
    }

    #[test]
    fn test_protein_and_fiber() {
        // (20 * 1.5 + 10 * 2.0) / 200 * 100
        let profile = DensityProfile::default();
        let score =
            calculate_nutrient_density(200.0, &[n("Protein", 20.0), n("Fiber", 10.0)], &profile);
        assert!(approx(score, 25.0), "got {}", score);
    }

    #[test]
    fn test_order_does_not_matter() {
        let profile = DensityProfile::default();
        let a = [n("Iron", 3.0), n("Vitamin C", 40.0), n("Calcium", 120.0)];
        let b = [n("Calcium", 120.0), n("Iron", 3.0), n("Vitamin C", 40.0)];
        assert!(approx(
            calculate_nutrient_density(300.0, &a, &profile),
            calculate_nutrient_density(300.0, &b, &profile)
        ));
    }

    #[test]
    fn test_duplicate_names_both_contribute() {
        let profile = DensityProfile::default();
        let once = calculate_nutrient_density(100.0, &[n("Protein", 10.0)], &profile);
        let twice =
            calculate_nutrient_density(100.0, &[n("Protein", 10.0), n("Protein", 10.0)], &profile);
        assert!(approx(once, 15.0));
        assert!(approx(twice, 30.0));
    }

    #[test]
    fn test_names_match_exactly() {
        let profile = DensityProfile::default();
        assert_eq!(calculate_nutrient_density(100.0, &[n("protein", 10.0)], &profile), 0.0);
    }

    #[test]
    fn test_custom_weights() {
        let mut profile = DensityProfile::default();
        profile.weights.insert("Omega-3".to_string(), 3.0);
        let score = calculate_nutrient_density(100.0, &[n("Omega-3", 2.0)], &profile);
        assert!(approx(score, 6.0));
    }

    #[test]
    fn test_tags_above_superfood() {
        let profile = DensityProfile::default();
        assert_eq!(
            get_nutrient_tags(81.0, &profile),
            vec![SUPERFOOD, HIGH_NUTRIENT_DENSITY, NUTRITIOUS]
        );
    }

    #[test]
    fn test_tag_boundaries_are_exclusive() {
        let profile = DensityProfile::default();
        assert_eq!(get_nutrient_tags(80.0, &profile), vec![HIGH_NUTRIENT_DENSITY, NUTRITIOUS]);
        assert_eq!(get_nutrient_tags(50.0, &profile), vec![NUTRITIOUS]);
        assert!(get_nutrient_tags(20.0, &profile).is_empty());
        assert!(get_nutrient_tags(0.0, &profile).is_empty());
    }

    #[test]
    fn test_tags_between_tiers() {
        let profile = DensityProfile::default();
        assert_eq!(get_nutrient_tags(50.5, &profile), vec![HIGH_NUTRIENT_DENSITY, NUTRITIOUS]);
        assert_eq!(get_nutrient_tags(20.01, &profile), vec![NUTRITIOUS]);
    }

    #[test]
    fn test_profile_deserializes_partially() {
        let profile: DensityProfile =
            serde_json::from_str(r#"{"tiers": [{"label": "Dense", "above": 10.0}]}"#).unwrap();
        assert_eq!(profile.weight("Fiber"), Some(2.0));
        assert_eq!(get_nutrient_tags(11.0, &profile), vec!["Dense"]);
    }
}
