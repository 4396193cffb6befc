//! Property tests for exclusion-set invariants.
//!
//! Uses proptest to verify:
//! 1. Union detector yields exactly the union of the individual sets
//! 2. Group tables each sum to the set size
//! 3. Percentage follows the population formula
//! 4. Collection is order independent

use proptest::prelude::*;
use evalscan_core::{
    collect_matching, summarize, AnyOf, Compilability, ExclusionSet, ExperimentRecord,
    FunctionalCorrectness, Metrics, NonCompilable, PatternA, DEFAULT_POPULATION,
    HARNESS_NO_RESULTS_MESSAGE,
};

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_record() -> impl Strategy<Value = ExperimentRecord> {
    (
        prop::sample::select(vec!["chatgpt", "claude", "gemini"]),
        prop::sample::select(vec!["calculator", "todo_list", "bank_account"]),
        prop::sample::select(vec![Some("0.0"), Some("0.2"), Some("0.6"), Some("1.0"), None]),
        1u32..=20,
        prop::option::of(any::<bool>()),
        prop::option::of(0u32..3),
        prop::sample::select(vec![
            None,
            Some(HARNESS_NO_RESULTS_MESSAGE),
            Some("No test results found in pytest output."),
            Some("Timeout"),
        ]),
    )
        .prop_map(|(model, challenge, temp, iteration, compiles, tests_run, error)| {
            let code_path = match temp {
                Some(t) => format!("dry_run_output/code/{challenge}/5-role-zero_shot/temp_{t}/iteration_{iteration}/{model}.py"),
                None => format!("dry_run_output/code/{challenge}/iteration_{iteration}/{model}.py"),
            };
            ExperimentRecord {
                model: Some(model.to_string()),
                challenge: Some(challenge.to_string()),
                iteration: Some(iteration),
                code_path,
                metrics: Metrics {
                    compilability: Compilability { compiles },
                    functional_correctness: FunctionalCorrectness {
                        tests_run,
                        error: error.map(String::from),
                    },
                },
            }
        })
}

fn arb_records() -> impl Strategy<Value = Vec<ExperimentRecord>> {
    prop::collection::vec(arb_record(), 0..60)
}

proptest! {
    #[test]
    fn union_detector_is_set_union(records in arb_records()) {
        let syntax = collect_matching(&records, &NonCompilable).unwrap();
        let pattern_a = collect_matching(&records, &PatternA::new()).unwrap();
        let all = collect_matching(&records, &AnyOf::problematic(PatternA::new())).unwrap();

        let union: ExclusionSet = syntax.keys.union(&pattern_a.keys).cloned().collect();
        prop_assert_eq!(&all.keys, &union);
        prop_assert!(all.len() <= syntax.len() + pattern_a.len());
    }

    #[test]
    fn group_tables_sum_to_total(records in arb_records()) {
        let all = collect_matching(&records, &AnyOf::problematic(PatternA::new())).unwrap();
        let summary = summarize(&all.keys, DEFAULT_POPULATION).unwrap();
        let n = all.keys.len();

        prop_assert_eq!(summary.total_excluded, n);
        prop_assert_eq!(summary.by_model.values().sum::<usize>(), n);
        prop_assert_eq!(summary.by_challenge.values().sum::<usize>(), n);
        prop_assert_eq!(summary.by_temperature.values().sum::<usize>(), n);
        prop_assert_eq!(summary.details.len(), n);
    }

    #[test]
    fn percentage_follows_population(records in arb_records(), population in 1usize..5000) {
        let all = collect_matching(&records, &NonCompilable).unwrap();
        let summary = summarize(&all.keys, population).unwrap();
        let expected = 100.0 * all.keys.len() as f64 / population as f64;
        prop_assert!((summary.percentage - expected).abs() < 1e-9);
    }

    #[test]
    fn collection_is_order_independent(records in arb_records()) {
        let forward = collect_matching(&records, &NonCompilable).unwrap();
        let reversed = collect_matching(records.iter().rev(), &NonCompilable).unwrap();
        prop_assert_eq!(forward, reversed);
    }
}
