//! Exclusion report: three summaries from one scan, plus CSV export.

use std::io::Write;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use evalscan_core::{summarize, ExclusionSummary, SummaryError};

use crate::scan::{ScanError, Scanner};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error(transparent)]
    Summary(#[from] SummaryError),
    #[error("csv export failed: {0}")]
    Csv(#[from] csv::Error),
}

/// Syntax errors, Pattern A errors, and their union for one result tree.
#[derive(Debug, Clone, Serialize)]
pub struct ExclusionReport {
    pub base_dir: PathBuf,
    pub records: usize,
    pub non_compilable: ExclusionSummary,
    pub pattern_a: ExclusionSummary,
    pub combined: ExclusionSummary,
    /// Matching records dropped because their path carried no temperature.
    pub unkeyed_records: usize,
}

const CSV_HEADER: [&str; 6] = [
    "model",
    "challenge",
    "temperature",
    "iteration",
    "non_compilable",
    "pattern_a",
];

#[derive(Serialize)]
struct DetailRow<'a> {
    model: &'a str,
    challenge: &'a str,
    temperature: f64,
    iteration: u32,
    non_compilable: bool,
    pattern_a: bool,
}

/// Scan the tree once and summarize every exclusion set.
pub fn build_report(scanner: &Scanner, population: usize) -> Result<ExclusionReport, ReportError> {
    let outcome = scanner.scan_all()?;
    Ok(ExclusionReport {
        base_dir: scanner.store().base_dir().to_path_buf(),
        records: outcome.records,
        non_compilable: summarize(&outcome.non_compilable.keys, population)?,
        pattern_a: summarize(&outcome.pattern_a.keys, population)?,
        combined: summarize(&outcome.all_problematic.keys, population)?,
        unkeyed_records: outcome.all_problematic.unkeyed,
    })
}

/// One CSV row per combined key, flagging which detectors matched it.
pub fn write_details_csv<W: Write>(report: &ExclusionReport, writer: W) -> Result<(), ReportError> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    wtr.write_record(CSV_HEADER)?;
    for key in &report.combined.details {
        wtr.serialize(DetailRow {
            model: &key.model,
            challenge: &key.challenge,
            temperature: key.temperature.value(),
            iteration: key.iteration,
            non_compilable: report.non_compilable.details.binary_search(key).is_ok(),
            pattern_a: report.pattern_a.details.binary_search(key).is_ok(),
        })?;
    }
    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}
