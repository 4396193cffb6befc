//! EvalScan Runner — result-tree scanning, exclude modes, configuration, reports.
//!
//! This crate builds on `evalscan-core` to provide:
//! - Lazy reading of `static_analysis/experiment_*/results_flat.json`
//! - A scanner exposing non-compilable, Pattern A and combined exclusion sets
//! - `none` / `syntax` / `all` exclude modes and record filtering
//! - TOML scan configuration (base directory, population grid, harness message)
//! - Exclusion reports with CSV export

pub mod config;
pub mod filter;
pub mod report;
pub mod scan;
pub mod store;

pub use config::{ConfigError, PatternConfig, Population, ScanConfig, DEFAULT_BASE_DIR};
pub use filter::{retain_included, ExcludeMode, ExclusionPlan, FilterOutcome, ModeError};
pub use report::{build_report, write_details_csv, ExclusionReport, ReportError};
pub use scan::{
    all_problematic_iterations, exclusion_summary, non_compilable_iterations, pattern_a_errors,
    ScanError, ScanOutcome, Scanner,
};
pub use store::{Records, ResultStore, StoreError};
