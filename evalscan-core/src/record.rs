//! Experiment result records as stored in `results_flat.json`.
//!
//! Only the fields the detectors and key extractor read are modelled; every
//! other key in the upstream JSON is ignored. Nested metric blocks are
//! optional, and a block that is absent or `null` falls back to its defaults.

use serde::{Deserialize, Deserializer, Serialize};

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn zero_tests() -> Option<u32> {
    Some(0)
}

/// One evaluated code sample.
///
/// `model`, `challenge` and `iteration` are optional at the serde level so a
/// record missing them still loads. Their absence is reported by
/// [`crate::key::extract_key`], the first place they are needed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperimentRecord {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub challenge: Option<String>,
    #[serde(default)]
    pub iteration: Option<u32>,
    /// Path to the generated source. Only used to recover the temperature.
    #[serde(default)]
    pub code_path: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub metrics: Metrics,
}

/// Metric blocks produced by the upstream static-analysis stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    #[serde(default, deserialize_with = "null_as_default")]
    pub compilability: Compilability,
    #[serde(default, deserialize_with = "null_as_default")]
    pub functional_correctness: FunctionalCorrectness,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Compilability {
    /// Absent means "did not compile".
    #[serde(default)]
    pub compiles: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionalCorrectness {
    /// A missing key reads as zero tests; an explicit `null` stays `None`.
    #[serde(default = "zero_tests")]
    pub tests_run: Option<u32>,
    /// Harness-level error message, if the test run failed before reporting.
    #[serde(default)]
    pub error: Option<String>,
}

impl Default for FunctionalCorrectness {
    fn default() -> Self {
        Self {
            tests_run: zero_tests(),
            error: None,
        }
    }
}

impl ExperimentRecord {
    /// Whether the sample compiled. Defaults to `false`.
    pub fn compiles(&self) -> bool {
        self.metrics.compilability.compiles.unwrap_or(false)
    }

    /// Number of test cases executed. `Some(0)` when the key is absent,
    /// `None` when the harness recorded `null`.
    pub fn tests_run(&self) -> Option<u32> {
        self.metrics.functional_correctness.tests_run
    }

    /// Harness error message, if any.
    pub fn harness_error(&self) -> Option<&str> {
        self.metrics.functional_correctness.error.as_deref()
    }
}
