//! Exclusion summaries: counts and percentages over an exclusion set.
//!
//! The population size is the full evaluation grid the set is measured
//! against. It is not derivable from the excluded keys, so callers pass it in.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

use crate::collect::ExclusionSet;
use crate::key::{IterationKey, Temperature};

/// Grid size of the reference evaluation: 3 models × 3 challenges ×
/// 6 temperatures × 20 iterations.
pub const DEFAULT_POPULATION: usize = 1080;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SummaryError {
    #[error("population size must be greater than zero")]
    ZeroPopulation,
}

/// Dimensions of a full evaluation grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationGrid {
    pub models: usize,
    pub challenges: usize,
    pub temperatures: usize,
    pub iterations: usize,
}

impl PopulationGrid {
    /// Number of runs in the grid, or `None` if the product overflows.
    pub fn total(&self) -> Option<usize> {
        self.models
            .checked_mul(self.challenges)?
            .checked_mul(self.temperatures)?
            .checked_mul(self.iterations)
    }
}

impl Default for PopulationGrid {
    fn default() -> Self {
        Self {
            models: 3,
            challenges: 3,
            temperatures: 6,
            iterations: 20,
        }
    }
}

/// Aggregate view of an exclusion set.
///
/// Group tables only list values that occur among the excluded keys.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExclusionSummary {
    pub total_excluded: usize,
    pub population: usize,
    /// `100 * total_excluded / population`.
    pub percentage: f64,
    pub by_model: BTreeMap<String, usize>,
    pub by_challenge: BTreeMap<String, usize>,
    #[serde(serialize_with = "temperature_table")]
    pub by_temperature: BTreeMap<Temperature, usize>,
    /// Excluded keys in natural order.
    pub details: Vec<IterationKey>,
}

/// Summarize an exclusion set against a population of `population` runs.
pub fn summarize(
    excluded: &ExclusionSet,
    population: usize,
) -> Result<ExclusionSummary, SummaryError> {
    if population == 0 {
        return Err(SummaryError::ZeroPopulation);
    }

    let mut by_model: BTreeMap<String, usize> = BTreeMap::new();
    let mut by_challenge: BTreeMap<String, usize> = BTreeMap::new();
    let mut by_temperature: BTreeMap<Temperature, usize> = BTreeMap::new();

    for key in excluded {
        *by_model.entry(key.model.clone()).or_default() += 1;
        *by_challenge.entry(key.challenge.clone()).or_default() += 1;
        *by_temperature.entry(key.temperature).or_default() += 1;
    }

    let total_excluded = excluded.len();
    Ok(ExclusionSummary {
        total_excluded,
        population,
        percentage: (total_excluded as f64 / population as f64) * 100.0,
        by_model,
        by_challenge,
        by_temperature,
        details: excluded.iter().cloned().collect(),
    })
}

// JSON object keys must be strings.
fn temperature_table<S: Serializer>(
    table: &BTreeMap<Temperature, usize>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_map(table.iter().map(|(t, n)| (t.to_string(), n)))
}
