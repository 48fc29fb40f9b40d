//! Nourish Status Tool
//!
//! Runtime status information and usage instructions for the service.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;

/// Recommendation workflow instructions for AI assistants
pub const RECOMMENDATION_INSTRUCTIONS: &str = r#"
# Nourish Recommendation Instructions

## Profile

Every recommendation tool takes the household profile as plain data:

| Field | Meaning | Default |
|-------|---------|---------|
| `household_size` | people to cook for | 1 when missing or 0 |
| `medical_conditions` | e.g. "Diabetes", "Heart Disease", "Cancer" | none |
| `disliked_foods` | exact ingredient names, case-sensitive | none |

## Safety Rules (default)

- **Diabetes**: recipes tagged "High Sugar" are excluded
- **Heart Disease**: recipes NOT tagged "Low Sodium" are excluded
- **Cancer**: no rule; declaring it does not exclude anything

Operators can replace these through the JSON file named by `NOURISH_RULES_PATH`.

## Workflow

1. `recommend_recipes(profile)` returns safe, dislike-free recipes in catalog
   order, with ingredient amounts scaled to the household
2. `explain_recipe(recipe_id, profile)` shows why a recipe was excluded
3. `scale_recipe(recipe_id, household_size)` rescales a single recipe

## Nutrient Density

Score = (sum of nutrient amount x weight) / calories x 100, using
Protein 1.5, Fiber 2.0, Vitamin C 1.2, Iron 1.5, Calcium 1.2.

| Score | Tags |
|-------|------|
| > 80 | Superfood, High Nutrient Density, Nutritious |
| > 50 | High Nutrient Density, Nutritious |
| > 20 | Nutritious |

Scaled amounts are rounded to 2 decimals. Nutrient totals are summed from the
ingredient nutrient data as stored; they are not rescaled.
"#;

/// Runtime status of the Nourish service
#[derive(Debug, Clone, Serialize)]
pub struct NourishStatus {
    /// Build information
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub version: &'static str,

    /// Database information
    pub database_path: String,
    pub database_size_bytes: Option<u64>,

    /// Process information
    pub started_at: String,
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

/// Status tracker for collecting runtime information
pub struct StatusTracker {
    start_time: Instant,
    started_at: String,
    database_path: PathBuf,
}

impl StatusTracker {
    pub fn new(database_path: PathBuf) -> Self {
        Self {
            start_time: Instant::now(),
            started_at: chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            database_path,
        }
    }

    pub fn get_status(&self) -> NourishStatus {
        let build_info = BuildInfo::current();

        let database_size_bytes = std::fs::metadata(&self.database_path)
            .ok()
            .map(|m| m.len());

        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        NourishStatus {
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            version: build_info.version,
            database_path: self.database_path.display().to_string(),
            database_size_bytes,
            started_at: self.started_at.clone(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        }
    }
}
