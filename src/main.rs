//! Debt Indexation CLI
//!
//! Indexes every case from the input files and writes a summary CSV plus, optionally,
//! one audit CSV per case.

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use debt_indexation::batch::{BatchConfig, BatchInputs, BatchRunner, DEFAULT_DATA_PATH};
use debt_indexation::cases::loader::{CASES_FILE, PAYMENTS_FILE};
use debt_indexation::cpi::CPI_FILE;
use debt_indexation::parse::parse_date;
use debt_indexation::report::{write_breakdown, write_summary};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Debug, Parser)]
#[command(name = "debt-indexation", version, about = "Index court-awarded debts by monthly CPI")]
struct Args {
    /// Directory with cpi.csv, cases.csv and payments.csv
    #[arg(long, default_value = DEFAULT_DATA_PATH)]
    data_dir: PathBuf,

    /// CPI file (overrides <data-dir>/cpi.csv)
    #[arg(long)]
    cpi: Option<PathBuf>,

    /// Cases file (overrides <data-dir>/cases.csv)
    #[arg(long)]
    cases: Option<PathBuf>,

    /// Payments file (overrides <data-dir>/payments.csv)
    #[arg(long)]
    payments: Option<PathBuf>,

    /// Last day to index, YYYY-MM-DD or DD.MM.YYYY (default: end of last month)
    #[arg(long, value_parser = parse_cutoff)]
    cutoff: Option<NaiveDate>,

    /// Summary CSV output
    #[arg(long, short, default_value = "indexation_summary.csv")]
    output: PathBuf,

    /// Directory for per-case audit CSVs
    #[arg(long)]
    breakdown_dir: Option<PathBuf>,

    /// Abort with an error if any case fails
    #[arg(long)]
    fail_fast: bool,

    /// Compute cases on a single thread
    #[arg(long)]
    sequential: bool,

    /// Print the batch summary as JSON
    #[arg(long)]
    json: bool,
}

fn parse_cutoff(raw: &str) -> Result<NaiveDate, String> {
    parse_date(raw).ok_or_else(|| format!("invalid date '{}'", raw))
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let start = Instant::now();

    let inputs = if args.cpi.is_none() && args.cases.is_none() && args.payments.is_none() {
        BatchInputs::load_from(&args.data_dir)
            .with_context(|| format!("failed to load inputs from {}", args.data_dir.display()))?
    } else {
        let cpi_path = args.cpi.clone().unwrap_or_else(|| args.data_dir.join(CPI_FILE));
        let cases_path = args.cases.clone().unwrap_or_else(|| args.data_dir.join(CASES_FILE));
        let payments_path = args.payments.clone().unwrap_or_else(|| args.data_dir.join(PAYMENTS_FILE));
        BatchInputs::load_files(&cpi_path, &cases_path, &payments_path)
            .with_context(|| format!("failed to load inputs from {}", args.data_dir.display()))?
    };
    log::info!("Loaded {} case(s) in {:?}", inputs.cases.len(), start.elapsed());

    let mut config = match args.cutoff {
        Some(cutoff) => BatchConfig::new(cutoff),
        None => BatchConfig::default(),
    };
    config.parallel = !args.sequential;

    let runner = BatchRunner::new(inputs.cpi_table);
    let report = runner.run(&inputs.cases, &config)?;

    if args.fail_fast {
        if let Some((registration_number, err)) = report.failed().next() {
            bail!("case {}: {}", registration_number, err);
        }
    }

    let file = File::create(&args.output)
        .with_context(|| format!("failed to create {}", args.output.display()))?;
    write_summary(BufWriter::new(file), &report)?;

    if let Some(dir) = &args.breakdown_dir {
        fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
        for case in report.succeeded() {
            let path = dir.join(format!("{}.csv", case.registration_number));
            let file = File::create(&path).with_context(|| format!("failed to create {}", path.display()))?;
            write_breakdown(BufWriter::new(file), case)?;
        }
    }

    let summary = report.summary();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("Requested cutoff:  {}", summary.requested_cutoff);
        if report.cutoff_clamped() {
            println!("Effective cutoff:  {} (limited by CPI data)", summary.effective_cutoff);
        } else {
            println!("Effective cutoff:  {}", summary.effective_cutoff);
        }
        println!("Cases:             {}", summary.cases);
        println!("Failed:            {}", summary.failed);
        println!("Total indexation:  {}", summary.total_indexation);
        for (registration_number, err) in report.failed() {
            println!("  case {}: {}", registration_number, err);
        }
        println!("\nSummary written to {}", args.output.display());
    }

    log::info!("Total time: {:?}", start.elapsed());
    Ok(())
}
