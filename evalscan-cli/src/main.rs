//! EvalScan CLI — report and filter commands over a batch-evaluation result tree.
//!
//! Commands:
//! - `report` (default): syntax errors, Pattern A errors and their union, with
//!   breakdowns by model, challenge and temperature
//! - `filter`: apply an exclude mode and count kept / dropped records

use std::collections::BTreeMap;
use std::fmt::Display;
use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::{fmt, EnvFilter};

use evalscan_core::{summarize, ExclusionSummary};
use evalscan_runner::{
    build_report, write_details_csv, ExcludeMode, ExclusionReport, Population, ScanConfig, Scanner,
};

#[derive(Parser)]
#[command(
    name = "evalscan",
    about = "EvalScan CLI — find evaluation iterations to exclude from analysis"
)]
struct Cli {
    /// Verbosity level (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// TOML config file. Flags override its values.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print syntax-error, Pattern A and combined exclusion summaries.
    Report(ReportArgs),
    /// Apply an exclude mode and report kept and dropped record counts.
    Filter(FilterArgs),
}

#[derive(Args, Default)]
struct ReportArgs {
    /// Result tree root. Defaults to ./dry_run_output.
    base_dir: Option<PathBuf>,

    /// Full evaluation grid size used for percentages.
    #[arg(long)]
    population: Option<usize>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Args)]
struct FilterArgs {
    /// Result tree root. Defaults to ./dry_run_output.
    base_dir: Option<PathBuf>,

    /// Exclude mode: none, syntax, or all.
    #[arg(long)]
    mode: Option<ExcludeMode>,

    /// Full evaluation grid size used for percentages.
    #[arg(long)]
    population: Option<usize>,
}

#[derive(Clone, Copy, Default, ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(cli.config.as_deref())?;
    tracing::debug!(?config, "configuration loaded");

    match cli.command {
        Some(Commands::Report(args)) => run_report(config, args),
        Some(Commands::Filter(args)) => run_filter(config, args),
        None => run_report(config, ReportArgs::default()),
    }
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<ScanConfig> {
    match path {
        Some(path) => Ok(ScanConfig::from_file(path)?),
        None => Ok(ScanConfig::default()),
    }
}

fn apply_overrides(config: &mut ScanConfig, base_dir: Option<PathBuf>, population: Option<usize>) {
    if let Some(dir) = base_dir {
        config.base_dir = dir;
    }
    if let Some(total) = population {
        config.population = Population::Total { total };
    }
}

fn run_report(mut config: ScanConfig, args: ReportArgs) -> Result<()> {
    apply_overrides(&mut config, args.base_dir, args.population);

    let scanner = Scanner::from_config(&config);
    let report = build_report(&scanner, config.population_size()?)?;

    match args.format {
        OutputFormat::Text => print_report(&report),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Csv => write_details_csv(&report, std::io::stdout().lock())?,
    }
    Ok(())
}

fn run_filter(mut config: ScanConfig, args: FilterArgs) -> Result<()> {
    apply_overrides(&mut config, args.base_dir, args.population);
    let mode = args.mode.unwrap_or(config.mode);

    let scanner = Scanner::from_config(&config);
    let (plan, outcome) = scanner.filtered(mode)?;

    match mode {
        ExcludeMode::None => println!("Loading raw data (no filtering)"),
        ExcludeMode::Syntax => {
            println!("Excluding {} syntax errors only", plan.excluded.len());
        }
        ExcludeMode::All => {
            println!("Excluding {} problematic iterations:", plan.excluded.len());
            println!("  - Syntax errors: {}", plan.non_compilable.unwrap_or(0));
            println!(
                "  - Pattern A errors (pytest-incompatible): {}",
                plan.pattern_a.unwrap_or(0)
            );
        }
    }
    if !plan.excluded.is_empty() {
        let summary = summarize(&plan.excluded, config.population_size()?)?;
        println!(
            "  Total: {} iterations ({:.2}%)",
            summary.total_excluded, summary.percentage
        );
    }
    println!();

    if outcome.total() == 0 {
        bail!(
            "no static analysis data found in {}",
            scanner.store().base_dir().display()
        );
    }

    println!(
        "Kept {} of {} records ({} dropped)",
        outcome.kept.len(),
        outcome.total(),
        outcome.dropped
    );
    if plan.unkeyed > 0 {
        println!(
            "WARNING: {} matching record(s) had no temp_ token in code_path and were kept",
            plan.unkeyed
        );
    }
    Ok(())
}

fn print_report(report: &ExclusionReport) {
    println!("{}", "=".repeat(80));
    println!("CODE QUALITY FILTERING ANALYSIS");
    println!("{}", "=".repeat(80));
    println!();
    println!("Results:    {}", report.base_dir.display());
    println!("Records:    {}", report.records);
    println!("Population: {}", report.combined.population);
    println!();

    println!("1. Syntax Errors (compiles = False):");
    println!("{}", "-".repeat(40));
    print_section(&report.non_compilable, "syntax errors");
    println!();

    println!("2. Pattern A Errors (compiles but pytest-incompatible):");
    println!("{}", "-".repeat(40));
    print_section(&report.pattern_a, "Pattern A errors");
    println!();

    println!("3. Total Problematic Iterations (recommended filter):");
    println!("{}", "-".repeat(40));
    let all = &report.combined;
    println!(
        "Total: {} iterations ({:.2}%)",
        all.total_excluded, all.percentage
    );
    println!("  Syntax errors: {}", report.non_compilable.total_excluded);
    println!("  Pattern A: {}", report.pattern_a.total_excluded);
    println!();

    if all.total_excluded > 0 {
        println!("Breakdown:");
        println!("  By model: {}", format_counts(&all.by_model));
        println!("  By challenge: {}", format_counts(&all.by_challenge));
        println!("  By temperature: {}", format_counts(&all.by_temperature));
    }

    if report.unkeyed_records > 0 {
        println!();
        println!(
            "WARNING: {} matching record(s) had no temp_ token in code_path and were not counted",
            report.unkeyed_records
        );
    }
}

fn print_section(summary: &ExclusionSummary, label: &str) {
    println!(
        "Found {} iterations with {label} ({:.2}%)",
        summary.total_excluded, summary.percentage
    );
    if summary.total_excluded > 0 {
        println!("  By model: {}", format_counts(&summary.by_model));
        println!("  By challenge: {}", format_counts(&summary.by_challenge));
        for key in &summary.details {
            println!("    - {key}");
        }
    }
}

fn format_counts<K: Display>(counts: &BTreeMap<K, usize>) -> String {
    let pairs: Vec<String> = counts.iter().map(|(k, n)| format!("{k}: {n}")).collect();
    format!("{{{}}}", pairs.join(", "))
}
