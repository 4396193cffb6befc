//! Collecting matching records into exclusion sets.
//!
//! A record contributes its key when the detector matches and the key can be
//! extracted. Matching records without a temperature token are left out of
//! the set but counted and logged, so the loss is visible.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::detector::Detector;
use crate::key::{extract_key, IterationKey, KeyError};
use crate::record::ExperimentRecord;

/// Set of iteration identities to drop from downstream analysis.
pub type ExclusionSet = BTreeSet<IterationKey>;

/// Keys gathered for one detector.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Collected {
    pub keys: ExclusionSet,
    /// Matching records skipped because `code_path` had no temperature.
    pub unkeyed: usize,
}

impl Collected {
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Streaming accumulator for a single detector.
pub struct Collector<'d, D: Detector + ?Sized> {
    detector: &'d D,
    collected: Collected,
    seen: usize,
}

impl<'d, D: Detector + ?Sized> Collector<'d, D> {
    pub fn new(detector: &'d D) -> Self {
        Self {
            detector,
            collected: Collected::default(),
            seen: 0,
        }
    }

    /// Classify one record. Identity fields are only read for matches.
    pub fn push(&mut self, record: &ExperimentRecord) -> Result<(), KeyError> {
        self.seen += 1;
        if !self.detector.matches(record) {
            return Ok(());
        }
        match extract_key(record)? {
            Some(key) => {
                self.collected.keys.insert(key);
            }
            None => {
                self.collected.unkeyed += 1;
                tracing::warn!(
                    detector = self.detector.name(),
                    model = record.model.as_deref().unwrap_or_default(),
                    challenge = record.challenge.as_deref().unwrap_or_default(),
                    iteration = ?record.iteration,
                    code_path = %record.code_path,
                    "matching record has no temperature token in code_path; skipped"
                );
            }
        }
        Ok(())
    }

    /// Records pushed so far, matching or not.
    pub fn seen(&self) -> usize {
        self.seen
    }

    pub fn finish(self) -> Collected {
        tracing::debug!(
            detector = self.detector.name(),
            records = self.seen,
            keys = self.collected.keys.len(),
            unkeyed = self.collected.unkeyed,
            "collection complete"
        );
        self.collected
    }
}

/// Collect the keys of every record the detector matches.
pub fn collect_matching<'a, I, D>(records: I, detector: &D) -> Result<Collected, KeyError>
where
    I: IntoIterator<Item = &'a ExperimentRecord>,
    D: Detector + ?Sized,
{
    let mut collector = Collector::new(detector);
    for record in records {
        collector.push(record)?;
    }
    Ok(collector.finish())
}
