use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Defaults for approximate comparison and text rendering.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct LinalgConfig {
    /// Maximum per-element absolute difference accepted by `approx_eq`.
    pub tolerance: f64,
    /// Fractional digits printed by `render_with`.
    pub precision: usize,
}

impl LinalgConfig {
    pub const DEFAULT_TOLERANCE: f64 = 1.0e-6;
    pub const DEFAULT_PRECISION: usize = 6;

    pub fn new(tolerance: f64, precision: usize) -> Self {
        Self {
            tolerance,
            precision,
        }
    }

    /// Parse a config from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("failed to parse linalg config")
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize linalg config")
    }
}

impl Default for LinalgConfig {
    fn default() -> Self {
        Self {
            tolerance: Self::DEFAULT_TOLERANCE,
            precision: Self::DEFAULT_PRECISION,
        }
    }
}
