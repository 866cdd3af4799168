//! Print the month-by-month indexation audit for a single debt
//!
//! Usage: cargo run --bin case_breakdown -- --order-date 15.01.2024 --amount 10000 \
//!            --payment 2024-02-10=3000 --cutoff 2024-06-30

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use debt_indexation::batch::effective_cutoff;
use debt_indexation::cpi::load_cpi;
use debt_indexation::money::format_amount;
use debt_indexation::parse::{parse_date, parse_decimal};
use debt_indexation::{compute_case, DebtCase, Payment};
use rust_decimal::Decimal;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "case_breakdown", about = "Indexation audit table for one debt")]
struct Args {
    /// CPI file
    #[arg(long, default_value = "data/cpi.csv")]
    cpi: PathBuf,

    /// Date the order was issued
    #[arg(long, value_parser = date_arg)]
    order_date: NaiveDate,

    /// Awarded amount
    #[arg(long, value_parser = amount_arg)]
    amount: Decimal,

    /// Payment as DATE=AMOUNT, may be repeated
    #[arg(long = "payment", value_parser = payment_arg)]
    payments: Vec<Payment>,

    /// Last day to index (default: end of last month)
    #[arg(long, value_parser = date_arg)]
    cutoff: Option<NaiveDate>,
}

fn date_arg(raw: &str) -> Result<NaiveDate, String> {
    parse_date(raw).ok_or_else(|| format!("invalid date '{}'", raw))
}

fn amount_arg(raw: &str) -> Result<Decimal, String> {
    parse_decimal(raw).ok_or_else(|| format!("invalid amount '{}'", raw))
}

fn payment_arg(raw: &str) -> Result<Payment, String> {
    let (date, amount) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected DATE=AMOUNT, got '{}'", raw))?;
    Ok(Payment::new(date_arg(date)?, amount_arg(amount)?))
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let table = load_cpi(&args.cpi).with_context(|| format!("failed to load {}", args.cpi.display()))?;

    let requested = args
        .cutoff
        .unwrap_or_else(|| debt_indexation::BatchConfig::default().requested_cutoff);
    let cutoff = effective_cutoff(requested, &table)?;

    let mut case = DebtCase::new("-", args.order_date, args.amount);
    case.payments = args.payments;

    let result = compute_case(&case, &table, cutoff).context("indexation failed")?;

    println!("Order date:   {}", result.order_date);
    println!("Base amount:  {}", format_amount(result.base_amount));
    if cutoff < requested {
        println!("Cutoff:       {} (requested {}, limited by CPI data)", cutoff, requested);
    } else {
        println!("Cutoff:       {}", cutoff);
    }
    println!("Days:         {}", result.total_days());
    println!();

    for (idx, period) in result.periods.iter().enumerate() {
        println!("Period {}: {} .. {} ({} days)", idx + 1, period.start_date, period.end_date, period.days());
        println!("  Debt at start: {}", format_amount(period.debt_before));
        match period.payment_date {
            Some(date) => println!("  Payment:       {} on {}", format_amount(period.payment_amount), date),
            None => println!("  Payment:       none"),
        }

        println!("  {:>7} {:>5} {:>4} {:>8} {:>12} {:>12}", "Month", "Days", "Of", "CPI", "Factor", "Increment");
        println!("  {}", "-".repeat(53));
        for slice in &period.monthly_breakdown {
            println!(
                "  {:>4}-{:02} {:>5} {:>4} {:>8} {:>12} {:>12}",
                slice.year,
                slice.month,
                slice.days_counted,
                slice.days_in_month,
                slice.cpi_value.to_string(),
                slice.effective_factor.round_dp(6).to_string(),
                format_amount(slice.increment),
            );
        }
        println!("  Indexation:    {}", format_amount(period.indexation));
        println!();
    }

    println!("Total indexation: {}", format_amount(result.total_indexation));
    Ok(())
}
