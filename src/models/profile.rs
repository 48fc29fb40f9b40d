//! User profile
//!
//! A household profile resolved by the account layer. The recommender only
//! reads it; it is never stored in the catalog.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Household size used when the profile does not carry a usable one
pub const DEFAULT_HOUSEHOLD_SIZE: u32 = 1;

/// Household profile: size, declared medical conditions, disliked foods
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Missing or zero falls back to [`DEFAULT_HOUSEHOLD_SIZE`]
    #[serde(default)]
    pub household_size: Option<u32>,
    #[serde(default)]
    pub medical_conditions: BTreeSet<String>,
    #[serde(default)]
    pub disliked_foods: BTreeSet<String>,
}

impl UserProfile {
    pub fn new(household_size: u32) -> Self {
        Self {
            household_size: Some(household_size),
            ..Self::default()
        }
    }

    pub fn with_conditions<I, S>(mut self, conditions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.medical_conditions = conditions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_dislikes<I, S>(mut self, foods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.disliked_foods = foods.into_iter().map(Into::into).collect();
        self
    }

    /// Effective household size (always >= 1)
    pub fn household_size(&self) -> u32 {
        match self.household_size {
            Some(n) if n >= 1 => n,
            _ => DEFAULT_HOUSEHOLD_SIZE,
        }
    }

    /// Copy with disliked foods trimmed and blank entries dropped.
    ///
    /// Matching against ingredient names stays case-sensitive; only
    /// surrounding whitespace is removed.
    pub fn normalized(&self) -> Self {
        let disliked_foods = self
            .disliked_foods
            .iter()
            .map(|f| f.trim())
            .filter(|f| !f.is_empty())
            .map(str::to_string)
            .collect();

        Self {
            household_size: Some(self.household_size()),
            medical_conditions: self.medical_conditions.clone(),
            disliked_foods,
        }
    }
}
