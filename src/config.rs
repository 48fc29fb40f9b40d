//! Runtime configuration
//!
//! Environment variables:
//! - `NOURISH_DATABASE_PATH`: recipe catalog location (default `<project>/data/nourish.db`)
//! - `NOURISH_RULES_PATH`: optional JSON file overriding density weights, tag
//!   tiers and medical safety rules

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::nutrition::DensityProfile;
use crate::safety::SafetyRules;

pub const DATABASE_PATH_ENV: &str = "NOURISH_DATABASE_PATH";
pub const RULES_PATH_ENV: &str = "NOURISH_RULES_PATH";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read rules file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse rules file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Tables driving scoring and filtering. Missing sections use the defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationConfig {
    pub density: DensityProfile,
    pub safety: SafetyRules,
}

impl RecommendationConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Load from `NOURISH_RULES_PATH` when set, otherwise the built-in tables
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var_os(RULES_PATH_ENV) {
            Some(path) => {
                let path = PathBuf::from(path);
                let config = Self::from_file(&path)?;
                info!(
                    path = %path.display(),
                    weights = config.density.weights.len(),
                    rules = config.safety.rules.len(),
                    "loaded recommendation rules"
                );
                Ok(config)
            }
            None => Ok(Self::default()),
        }
    }
}

/// Get the database path from environment or use default
pub fn database_path() -> PathBuf {
    std::env::var(DATABASE_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let mut path = std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|p| p.to_path_buf()))
                .unwrap_or_else(|| PathBuf::from("."));

            // Go up from target/release or target/debug to project root
            if path.ends_with("release") || path.ends_with("debug") {
                if let Some(grandparent) = path.parent().and_then(Path::parent) {
                    path = grandparent.to_path_buf();
                }
            }

            path.push("data");
            path.push("nourish.db");
            path
        })
}
