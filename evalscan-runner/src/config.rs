//! Scan configuration, loaded from TOML.
//!
//! ```toml
//! base_dir = "dry_run_output"
//! mode = "all"
//!
//! [population]
//! models = 3
//! challenges = 3
//! temperatures = 6
//! iterations = 20
//!
//! [patterns]
//! harness_error = "No test results found in pytest output"
//! ```
//!
//! Every key is optional. `[population]` also accepts a flat `total = N`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use evalscan_core::{PopulationGrid, HARNESS_NO_RESULTS_MESSAGE};

use crate::filter::ExcludeMode;

pub const DEFAULT_BASE_DIR: &str = "dry_run_output";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("population grid {0:?} overflows usize")]
    PopulationOverflow(PopulationGrid),
}

/// Expected size of the full evaluation grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Population {
    Total { total: usize },
    Grid(PopulationGrid),
}

impl Population {
    pub fn size(&self) -> Result<usize, ConfigError> {
        match self {
            Population::Total { total } => Ok(*total),
            Population::Grid(grid) => grid.total().ok_or(ConfigError::PopulationOverflow(*grid)),
        }
    }
}

impl Default for Population {
    fn default() -> Self {
        Population::Grid(PopulationGrid::default())
    }
}

/// Detector settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternConfig {
    /// Exact harness error that marks a Pattern A iteration.
    pub harness_error: String,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            harness_error: HARNESS_NO_RESULTS_MESSAGE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub base_dir: PathBuf,
    pub mode: ExcludeMode,
    pub population: Population,
    pub patterns: PatternConfig,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from(DEFAULT_BASE_DIR),
            mode: ExcludeMode::default(),
            population: Population::default(),
            patterns: PatternConfig::default(),
        }
    }
}

impl ScanConfig {
    /// Load a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse a config from a TOML string.
    ///
    /// The population grid is checked here so an oversized one fails at load.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.population_size()?;
        Ok(config)
    }

    pub fn population_size(&self) -> Result<usize, ConfigError> {
        self.population.size()
    }
}
