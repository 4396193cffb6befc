//! EvalScan Core — records, iteration keys, failure-pattern detectors, summaries.
//!
//! This crate holds the decision logic for excluding evaluation iterations:
//! - Typed view of `results_flat.json` records with documented defaults
//! - Identity keys `(model, challenge, temperature, iteration)`
//! - Non-compilable and Pattern A detectors, and their union
//! - Streaming key collection with unkeyable-record accounting
//! - Exclusion summaries grouped by model, challenge and temperature
//!
//! Nothing here touches the filesystem; see `evalscan-runner` for scanning.

pub mod collect;
pub mod detector;
pub mod key;
pub mod record;
pub mod summary;

pub use collect::{collect_matching, Collected, Collector, ExclusionSet};
pub use detector::{AnyOf, Detector, NonCompilable, PatternA, HARNESS_NO_RESULTS_MESSAGE};
pub use key::{extract_key, parse_temperature, IterationKey, KeyError, Temperature};
pub use record::{Compilability, ExperimentRecord, FunctionalCorrectness, Metrics};
pub use summary::{summarize, ExclusionSummary, PopulationGrid, SummaryError, DEFAULT_POPULATION};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: public types can cross thread boundaries.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<ExperimentRecord>();
        require_sync::<ExperimentRecord>();
        require_send::<IterationKey>();
        require_sync::<IterationKey>();
        require_send::<Collected>();
        require_sync::<Collected>();
        require_send::<ExclusionSummary>();
        require_sync::<ExclusionSummary>();
        require_send::<PatternA>();
        require_sync::<PatternA>();
        require_send::<AnyOf>();
        require_sync::<AnyOf>();
    }

    /// Detectors stay usable as trait objects.
    #[test]
    fn detector_is_object_safe() {
        let detectors: Vec<Box<dyn Detector>> = vec![Box::new(NonCompilable), Box::new(PatternA::new())];
        let names: Vec<&str> = detectors.iter().map(|d| d.name()).collect();
        assert_eq!(names, vec!["non_compilable", "pattern_a"]);
    }
}
