//! Medical safety filter
//!
//! Decides whether a recipe is compatible with a household's declared medical
//! conditions. Rules are data: each one names a condition and a medical tag
//! the recipe must avoid or must carry.
//!
//! Conditions without a rule (e.g. "Cancer" in the default set) impose no
//! constraint.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::models::Recipe;

pub const DIABETES: &str = "Diabetes";
pub const HEART_DISEASE: &str = "Heart Disease";
pub const CANCER: &str = "Cancer";

pub const HIGH_SUGAR: &str = "High Sugar";
pub const LOW_SODIUM: &str = "Low Sodium";

/// A single condition-to-tag rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SafetyRule {
    /// Unsafe when the condition is declared and the recipe carries `tag`
    AvoidTag { condition: String, tag: String },
    /// Unsafe when the condition is declared and the recipe lacks `tag`
    RequireTag { condition: String, tag: String },
}

impl SafetyRule {
    pub fn avoid(condition: impl Into<String>, tag: impl Into<String>) -> Self {
        SafetyRule::AvoidTag {
            condition: condition.into(),
            tag: tag.into(),
        }
    }

    pub fn require(condition: impl Into<String>, tag: impl Into<String>) -> Self {
        SafetyRule::RequireTag {
            condition: condition.into(),
            tag: tag.into(),
        }
    }

    pub fn condition(&self) -> &str {
        match self {
            SafetyRule::AvoidTag { condition, .. } | SafetyRule::RequireTag { condition, .. } => {
                condition.as_str()
            }
        }
    }

    pub fn tag(&self) -> &str {
        match self {
            SafetyRule::AvoidTag { tag, .. } | SafetyRule::RequireTag { tag, .. } => tag.as_str(),
        }
    }

    /// Whether `recipe` breaks this rule for a household with `conditions`
    pub fn is_violated_by(&self, recipe: &Recipe, conditions: &BTreeSet<String>) -> bool {
        if !conditions.contains(self.condition()) {
            return false;
        }
        match self {
            SafetyRule::AvoidTag { tag, .. } => recipe.has_tag(tag),
            SafetyRule::RequireTag { tag, .. } => !recipe.has_tag(tag),
        }
    }
}

/// A broken rule, reported back to explain a rejection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SafetyViolation {
    pub condition: String,
    pub reason: String,
}

impl SafetyViolation {
    fn from_rule(rule: &SafetyRule) -> Self {
        let reason = match rule {
            SafetyRule::AvoidTag { .. } => format!("recipe is tagged '{}'", rule.tag()),
            SafetyRule::RequireTag { .. } => format!("recipe is not tagged '{}'", rule.tag()),
        };
        Self {
            condition: rule.condition().to_string(),
            reason,
        }
    }
}

/// The rule set applied by the filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetyRules {
    pub rules: Vec<SafetyRule>,
}

impl Default for SafetyRules {
    fn default() -> Self {
        Self {
            rules: vec![
                SafetyRule::avoid(DIABETES, HIGH_SUGAR),
                SafetyRule::require(HEART_DISEASE, LOW_SODIUM),
            ],
        }
    }
}

impl SafetyRules {
    /// Declared conditions that no rule covers
    pub fn unconstrained<'a>(&self, conditions: &'a BTreeSet<String>) -> Vec<&'a str> {
        conditions
            .iter()
            .map(String::as_str)
            .filter(|c| !self.rules.iter().any(|r| r.condition() == *c))
            .collect()
    }
}

/// Whether a recipe is safe for the declared conditions.
///
/// Stops at the first broken rule.
pub fn validate_medical_integrity(
    recipe: &Recipe,
    user_conditions: &BTreeSet<String>,
    rules: &SafetyRules,
) -> bool {
    !rules
        .rules
        .iter()
        .any(|rule| rule.is_violated_by(recipe, user_conditions))
}

/// Every rule the recipe breaks, in rule order
pub fn safety_violations(
    recipe: &Recipe,
    user_conditions: &BTreeSet<String>,
    rules: &SafetyRules,
) -> Vec<SafetyViolation> {
    rules
        .rules
        .iter()
        .filter(|rule| rule.is_violated_by(recipe, user_conditions))
        .map(SafetyViolation::from_rule)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipe_with_tags(tags: &[&str]) -> Recipe {
        Recipe {
            id: "r".to_string(),
            title: "Test".to_string(),
            ingredients: vec![],
            medical_tags: tags.iter().map(|t| t.to_string()).collect(),
            calories: 400.0,
            base_servings: 1.0,
        }
    }

    fn conditions(list: &[&str]) -> BTreeSet<String> {
        list.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_diabetes_rejects_high_sugar() {
        let rules = SafetyRules::default();
        let recipe = recipe_with_tags(&[HIGH_SUGAR]);
        assert!(!validate_medical_integrity(&recipe, &conditions(&[DIABETES]), &rules));
    }

    #[test]
    fn test_cancer_has_no_rule() {
        let rules = SafetyRules::default();
        let recipe = recipe_with_tags(&[HIGH_SUGAR]);
        assert!(validate_medical_integrity(&recipe, &conditions(&[CANCER]), &rules));
        assert_eq!(rules.unconstrained(&conditions(&[CANCER, DIABETES])), vec![CANCER]);
    }

    #[test]
    fn test_heart_disease_requires_low_sodium() {
        let rules = SafetyRules::default();
        let heart = conditions(&[HEART_DISEASE]);
        assert!(validate_medical_integrity(&recipe_with_tags(&[LOW_SODIUM]), &heart, &rules));
        assert!(!validate_medical_integrity(&recipe_with_tags(&[]), &heart, &rules));
        assert!(!validate_medical_integrity(&recipe_with_tags(&["Low Sugar"]), &heart, &rules));
    }

    #[test]
    fn test_no_conditions_is_always_safe() {
        let rules = SafetyRules::default();
        let recipe = recipe_with_tags(&[HIGH_SUGAR]);
        assert!(validate_medical_integrity(&recipe, &BTreeSet::new(), &rules));
    }

    #[test]
    fn test_both_conditions_need_both_rules() {
        let rules = SafetyRules::default();
        let both = conditions(&[DIABETES, HEART_DISEASE]);
        assert!(validate_medical_integrity(&recipe_with_tags(&[LOW_SODIUM]), &both, &rules));
        assert!(!validate_medical_integrity(
            &recipe_with_tags(&[LOW_SODIUM, HIGH_SUGAR]),
            &both,
            &rules
        ));
    }

    #[test]
    fn test_tags_match_case_sensitively() {
        let rules = SafetyRules::default();
        let recipe = recipe_with_tags(&["high sugar"]);
        assert!(validate_medical_integrity(&recipe, &conditions(&[DIABETES]), &rules));
    }

    #[test]
    fn test_violations_list_every_broken_rule() {
        let rules = SafetyRules::default();
        let recipe = recipe_with_tags(&[HIGH_SUGAR]);
        let violations = safety_violations(&recipe, &conditions(&[DIABETES, HEART_DISEASE]), &rules);

        assert_eq!(violations.len(), 2);
        assert_eq!(violations[0].condition, DIABETES);
        assert_eq!(violations[0].reason, "recipe is tagged 'High Sugar'");
        assert_eq!(violations[1].condition, HEART_DISEASE);
        assert_eq!(violations[1].reason, "recipe is not tagged 'Low Sodium'");
    }

    #[test]
    fn test_custom_rule_for_cancer() {
        let mut rules = SafetyRules::default();
        rules.rules.push(SafetyRule::avoid(CANCER, "Processed Meat"));
        let recipe = recipe_with_tags(&["Processed Meat"]);
        assert!(!validate_medical_integrity(&recipe, &conditions(&[CANCER]), &rules));
    }

    #[test]
    fn test_rules_deserialize_from_json() {
        let rules: SafetyRules = serde_json::from_str(
            r#"{"rules": [{"kind": "avoid_tag", "condition": "Gout", "tag": "High Purine"}]}"#,
        )
        .unwrap();
        assert_eq!(rules.rules, vec![SafetyRule::avoid("Gout", "High Purine")]);
    }
}
