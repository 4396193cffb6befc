//! Scanner: streams a result tree through detectors.
//!
//! Entry points:
//! - `Scanner::non_compilable()`, `Scanner::pattern_a()`,
//!   `Scanner::all_problematic()`: one lazy pass over the tree each.
//! - `Scanner::scan_all()`: one pass feeding all three collectors. Used by reports.
//! - Free functions taking a base directory, using the default Pattern A message.

use std::path::{Path, PathBuf};

use thiserror::Error;

use evalscan_core::{
    summarize, AnyOf, Collected, Collector, Detector, ExclusionSet, ExclusionSummary, KeyError,
    NonCompilable, PatternA, SummaryError,
};

use crate::config::ScanConfig;
use crate::store::{ResultStore, StoreError};

/// Errors from a scan.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("record error: {0}")]
    Key(#[from] KeyError),
}

/// Per-detector results of a single pass.
#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    pub records: usize,
    pub non_compilable: Collected,
    pub pattern_a: Collected,
    pub all_problematic: Collected,
}

/// Result-tree scanner with a configured Pattern A detector.
#[derive(Debug, Clone)]
pub struct Scanner {
    store: ResultStore,
    pattern_a: PatternA,
}

impl Scanner {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            store: ResultStore::new(base_dir),
            pattern_a: PatternA::new(),
        }
    }

    pub fn from_config(config: &ScanConfig) -> Self {
        Self {
            store: ResultStore::new(&config.base_dir),
            pattern_a: PatternA::with_message(&config.patterns.harness_error),
        }
    }

    pub fn store(&self) -> &ResultStore {
        &self.store
    }

    pub fn pattern_a_detector(&self) -> &PatternA {
        &self.pattern_a
    }

    /// Keys of every record the detector matches.
    pub fn collect<D: Detector + ?Sized>(&self, detector: &D) -> Result<Collected, ScanError> {
        let mut collector = Collector::new(detector);
        for record in self.store.records()? {
            collector.push(&record?)?;
        }
        let collected = collector.finish();
        tracing::info!(
            base_dir = %self.store.base_dir().display(),
            detector = detector.name(),
            keys = collected.len(),
            unkeyed = collected.unkeyed,
            "scan complete"
        );
        Ok(collected)
    }

    /// Iterations whose code did not compile.
    pub fn non_compilable(&self) -> Result<Collected, ScanError> {
        self.collect(&NonCompilable)
    }

    /// Iterations that compile but fail at harness collection.
    pub fn pattern_a(&self) -> Result<Collected, ScanError> {
        self.collect(&self.pattern_a)
    }

    /// Union of non-compilable and Pattern A iterations.
    pub fn all_problematic(&self) -> Result<Collected, ScanError> {
        self.collect(&AnyOf::problematic(self.pattern_a.clone()))
    }

    /// Run all three collections in a single pass over the tree.
    pub fn scan_all(&self) -> Result<ScanOutcome, ScanError> {
        let union = AnyOf::problematic(self.pattern_a.clone());
        let mut syntax = Collector::new(&NonCompilable);
        let mut pattern_a = Collector::new(&self.pattern_a);
        let mut all = Collector::new(&union);

        for record in self.store.records()? {
            let record = record?;
            syntax.push(&record)?;
            pattern_a.push(&record)?;
            all.push(&record)?;
        }

        let outcome = ScanOutcome {
            records: all.seen(),
            non_compilable: syntax.finish(),
            pattern_a: pattern_a.finish(),
            all_problematic: all.finish(),
        };
        tracing::info!(
            base_dir = %self.store.base_dir().display(),
            records = outcome.records,
            non_compilable = outcome.non_compilable.len(),
            pattern_a = outcome.pattern_a.len(),
            all_problematic = outcome.all_problematic.len(),
            "scan complete"
        );
        Ok(outcome)
    }
}

/// Non-compilable iterations under `base_dir`.
pub fn non_compilable_iterations(base_dir: &Path) -> Result<Collected, ScanError> {
    Scanner::new(base_dir).non_compilable()
}

/// Pattern A iterations under `base_dir`.
pub fn pattern_a_errors(base_dir: &Path) -> Result<Collected, ScanError> {
    Scanner::new(base_dir).pattern_a()
}

/// All problematic iterations under `base_dir`. The recommended filter.
pub fn all_problematic_iterations(base_dir: &Path) -> Result<Collected, ScanError> {
    Scanner::new(base_dir).all_problematic()
}

/// Summarize an exclusion set against an explicit population size.
pub fn exclusion_summary(
    excluded: &ExclusionSet,
    population: usize,
) -> Result<ExclusionSummary, SummaryError> {
    summarize(excluded, population)
}
