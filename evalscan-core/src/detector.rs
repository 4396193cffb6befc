//! Failure-pattern detectors.
//!
//! Each detector is a pure predicate over a single record. Detectors compose
//! through [`AnyOf`], which matches when any member matches.

use crate::record::ExperimentRecord;

/// Exact harness message emitted when pytest produced no parseable results.
///
/// Matched verbatim. Any change in upstream wording must be mirrored here or
/// supplied through [`PatternA::with_message`].
pub const HARNESS_NO_RESULTS_MESSAGE: &str = "No test results found in pytest output";

/// Trait for record classifiers.
pub trait Detector: Send + Sync {
    /// Short identifier (e.g. "non_compilable", "pattern_a").
    fn name(&self) -> &str;

    /// Whether the record exhibits this failure pattern.
    fn matches(&self, record: &ExperimentRecord) -> bool;
}

/// Matches samples that failed to compile, including records with no
/// compilability block at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NonCompilable;

impl Detector for NonCompilable {
    fn name(&self) -> &str {
        "non_compilable"
    }

    fn matches(&self, record: &ExperimentRecord) -> bool {
        !record.compiles()
    }
}

/// Matches samples that compile but crash during test collection.
///
/// Requires `compiles == true`, `tests_run == 0`, and a harness error equal to
/// the configured message. An absent `tests_run` counts as zero; `null` does not.
#[derive(Debug, Clone)]
pub struct PatternA {
    message: String,
}

impl PatternA {
    pub fn new() -> Self {
        Self::with_message(HARNESS_NO_RESULTS_MESSAGE)
    }

    /// Use a different harness message, e.g. for another pytest version.
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Default for PatternA {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for PatternA {
    fn name(&self) -> &str {
        "pattern_a"
    }

    fn matches(&self, record: &ExperimentRecord) -> bool {
        record.compiles()
            && record.tests_run() == Some(0)
            && record.harness_error() == Some(self.message.as_str())
    }
}

/// Union of detectors.
pub struct AnyOf {
    detectors: Vec<Box<dyn Detector>>,
}

impl AnyOf {
    pub fn new(detectors: Vec<Box<dyn Detector>>) -> Self {
        Self { detectors }
    }

    /// Non-compilable or Pattern A: the filter recommended for analysis.
    pub fn problematic(pattern_a: PatternA) -> Self {
        Self::new(vec![Box::new(NonCompilable), Box::new(pattern_a)])
    }

    pub fn len(&self) -> usize {
        self.detectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detectors.is_empty()
    }
}

impl Detector for AnyOf {
    fn name(&self) -> &str {
        "any_of"
    }

    fn matches(&self, record: &ExperimentRecord) -> bool {
        self.detectors.iter().any(|d| d.matches(record))
    }
}
