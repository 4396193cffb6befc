//! Exclude modes and record filtering.
//!
//! Three modes decide which iterations leave the analysis dataset:
//! - `none`: keep everything (raw data, e.g. for compilation-rate charts)
//! - `syntax`: drop non-compilable iterations only
//! - `all`: drop non-compilable and Pattern A iterations (default)
//!
//! Records whose path carries no temperature cannot be matched against an
//! exclusion key and are always kept.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use evalscan_core::{extract_key, ExclusionSet, ExperimentRecord, KeyError};

use crate::scan::{ScanError, Scanner};

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown exclude mode '{0}' (expected none, syntax or all)")]
pub struct ModeError(pub String);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExcludeMode {
    None,
    Syntax,
    #[default]
    All,
}

impl FromStr for ExcludeMode {
    type Err = ModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(ExcludeMode::None),
            "syntax" => Ok(ExcludeMode::Syntax),
            "all" => Ok(ExcludeMode::All),
            other => Err(ModeError(other.to_string())),
        }
    }
}

impl fmt::Display for ExcludeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExcludeMode::None => "none",
            ExcludeMode::Syntax => "syntax",
            ExcludeMode::All => "all",
        };
        f.write_str(s)
    }
}

/// Which iterations a mode excludes, with per-detector counts.
///
/// Counts are `None` for detectors the mode did not run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExclusionPlan {
    pub mode: ExcludeMode,
    pub excluded: ExclusionSet,
    pub non_compilable: Option<usize>,
    pub pattern_a: Option<usize>,
    /// Matching records left out of `excluded` for lack of a temperature.
    pub unkeyed: usize,
}

/// Records surviving an exclusion plan.
#[derive(Debug, Clone)]
pub struct FilterOutcome {
    pub kept: Vec<ExperimentRecord>,
    pub dropped: usize,
}

impl FilterOutcome {
    pub fn total(&self) -> usize {
        self.kept.len() + self.dropped
    }
}

/// Drop records whose identity is in `excluded`.
pub fn retain_included(
    records: Vec<ExperimentRecord>,
    excluded: &ExclusionSet,
) -> Result<FilterOutcome, KeyError> {
    let mut kept = Vec::with_capacity(records.len());
    let mut dropped = 0;
    for record in records {
        match extract_key(&record)? {
            Some(key) if excluded.contains(&key) => dropped += 1,
            _ => kept.push(record),
        }
    }
    Ok(FilterOutcome { kept, dropped })
}

impl Scanner {
    /// Compute the exclusion set for a mode.
    pub fn plan(&self, mode: ExcludeMode) -> Result<ExclusionPlan, ScanError> {
        let plan = match mode {
            ExcludeMode::None => ExclusionPlan {
                mode,
                excluded: ExclusionSet::new(),
                non_compilable: None,
                pattern_a: None,
                unkeyed: 0,
            },
            ExcludeMode::Syntax => {
                let syntax = self.non_compilable()?;
                ExclusionPlan {
                    mode,
                    non_compilable: Some(syntax.len()),
                    pattern_a: None,
                    unkeyed: syntax.unkeyed,
                    excluded: syntax.keys,
                }
            }
            ExcludeMode::All => {
                let outcome = self.scan_all()?;
                ExclusionPlan {
                    mode,
                    non_compilable: Some(outcome.non_compilable.len()),
                    pattern_a: Some(outcome.pattern_a.len()),
                    unkeyed: outcome.all_problematic.unkeyed,
                    excluded: outcome.all_problematic.keys,
                }
            }
        };
        Ok(plan)
    }

    /// Load every record and drop those the mode excludes.
    pub fn filtered(&self, mode: ExcludeMode) -> Result<(ExclusionPlan, FilterOutcome), ScanError> {
        let plan = self.plan(mode)?;
        let records = self.store().load_all()?;
        let outcome = retain_included(records, &plan.excluded)?;
        tracing::info!(
            mode = %mode,
            kept = outcome.kept.len(),
            dropped = outcome.dropped,
            "records filtered"
        );
        Ok((plan, outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evalscan_core::IterationKey;

    fn record(model: &str, path: &str, iteration: u32) -> ExperimentRecord {
        ExperimentRecord {
            model: Some(model.into()),
            challenge: Some("calculator".into()),
            iteration: Some(iteration),
            code_path: path.into(),
            ..Default::default()
        }
    }

    #[test]
    fn modes_parse_and_display() {
        for mode in [ExcludeMode::None, ExcludeMode::Syntax, ExcludeMode::All] {
            assert_eq!(mode.to_string().parse::<ExcludeMode>(), Ok(mode));
        }
        assert_eq!(
            "everything".parse::<ExcludeMode>(),
            Err(ModeError("everything".into()))
        );
        assert_eq!(ExcludeMode::default(), ExcludeMode::All);
    }

    #[test]
    fn retain_drops_only_excluded_keys() {
        let excluded: ExclusionSet = [IterationKey::new("chatgpt", "calculator", 0.6, 1).unwrap()]
            .into_iter()
            .collect();
        let records = vec![
            record("chatgpt", "a/temp_0.6/b", 1),
            record("chatgpt", "a/temp_0.6/b", 2),
            record("chatgpt", "a/temp_0.8/b", 1),
        ];
        let outcome = retain_included(records, &excluded).unwrap();
        assert_eq!(outcome.dropped, 1);
        assert_eq!(outcome.kept.len(), 2);
        assert_eq!(outcome.total(), 3);
    }

    #[test]
    fn unkeyed_records_are_kept() {
        let excluded: ExclusionSet = [IterationKey::new("chatgpt", "calculator", 0.6, 1).unwrap()]
            .into_iter()
            .collect();
        let outcome =
            retain_included(vec![record("chatgpt", "a/b/chatgpt.py", 1)], &excluded).unwrap();
        assert_eq!(outcome.kept.len(), 1);
        assert_eq!(outcome.dropped, 0);
    }

    #[test]
    fn retain_requires_identity_fields() {
        let mut r = record("chatgpt", "a/temp_0.6/b", 1);
        r.model = None;
        let err = retain_included(vec![r], &ExclusionSet::new()).unwrap_err();
        assert_eq!(err, KeyError::MissingField { field: "model" });
    }
}
