//! Batch indexation over many cases
//!
//! Loads the CPI table once, clamps the requested cutoff to the CPI coverage, then
//! computes every case independently. One case failing never aborts the others; the
//! caller decides what to do with failures.

use crate::calendar::last_day_of_previous_month;
use crate::cases::{loader as case_loader, DebtCase};
use crate::cpi::{self, CpiTable};
use crate::error::{IndexationError, LoadError};
use crate::indexation::{compute_case, CaseIndexation};
use crate::money::round_half_up;
use chrono::NaiveDate;
use rayon::prelude::*;
use rust_decimal::Decimal;
use serde::Serialize;
use std::path::Path;

/// Default directory holding `cpi.csv`, `cases.csv` and `payments.csv`
pub const DEFAULT_DATA_PATH: &str = "data";

/// Configuration for a batch run
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Cutoff asked for by the user; may be clamped to the CPI coverage
    pub requested_cutoff: NaiveDate,

    /// Compute cases on the rayon thread pool
    pub parallel: bool,
}

impl BatchConfig {
    pub fn new(requested_cutoff: NaiveDate) -> Self {
        Self {
            requested_cutoff,
            parallel: true,
        }
    }
}

impl Default for BatchConfig {
    /// Cutoff at the end of last month, the latest date a CPI could be published for
    fn default() -> Self {
        Self::new(last_day_of_previous_month(chrono::Local::now().date_naive()))
    }
}

/// Cutoff actually usable with `cpi_table`: never past the last covered day
pub fn effective_cutoff(requested: NaiveDate, cpi_table: &CpiTable) -> Result<NaiveDate, IndexationError> {
    let last_covered = cpi_table.last_covered_date().ok_or(IndexationError::EmptyCpiTable)?;
    Ok(requested.min(last_covered))
}

/// Result or failure for one case
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseOutcome {
    pub registration_number: String,
    pub result: Result<CaseIndexation, IndexationError>,
}

/// Outcome of a batch run, cases in input order
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub requested_cutoff: NaiveDate,
    pub effective_cutoff: NaiveDate,
    pub outcomes: Vec<CaseOutcome>,
}

impl BatchReport {
    /// Whether the requested cutoff had to be moved back to the CPI coverage
    pub fn cutoff_clamped(&self) -> bool {
        self.effective_cutoff < self.requested_cutoff
    }

    pub fn succeeded(&self) -> impl Iterator<Item = &CaseIndexation> {
        self.outcomes.iter().filter_map(|o| o.result.as_ref().ok())
    }

    pub fn failed(&self) -> impl Iterator<Item = (&str, &IndexationError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.registration_number.as_str(), e)))
    }

    pub fn failure_count(&self) -> usize {
        self.failed().count()
    }

    /// Sum of indexation over the cases that succeeded
    pub fn total_indexation(&self) -> Decimal {
        round_half_up(self.succeeded().map(|c| c.total_indexation).sum::<Decimal>())
    }

    pub fn summary(&self) -> BatchSummary {
        BatchSummary {
            requested_cutoff: self.requested_cutoff,
            effective_cutoff: self.effective_cutoff,
            cases: self.outcomes.len(),
            failed: self.failure_count(),
            total_indexation: self.total_indexation(),
        }
    }
}

/// Summary statistics for a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub requested_cutoff: NaiveDate,
    pub effective_cutoff: NaiveDate,
    pub cases: usize,
    pub failed: usize,
    pub total_indexation: Decimal,
}

/// Inputs of a batch run read from disk
#[derive(Debug, Clone)]
pub struct BatchInputs {
    pub cpi_table: CpiTable,
    pub cases: Vec<DebtCase>,
}

impl BatchInputs {
    /// Load `cpi.csv`, `cases.csv` and `payments.csv` from a directory
    pub fn load_from(dir: &Path) -> Result<Self, LoadError> {
        Self::load_files(
            &dir.join(cpi::CPI_FILE),
            &dir.join(case_loader::CASES_FILE),
            &dir.join(case_loader::PAYMENTS_FILE),
        )
    }

    pub fn load_files(cpi_path: &Path, cases_path: &Path, payments_path: &Path) -> Result<Self, LoadError> {
        Ok(Self {
            cpi_table: cpi::load_cpi(cpi_path)?,
            cases: case_loader::load_cases_with_payments(cases_path, payments_path)?,
        })
    }
}

/// Runs batches of cases against one pre-loaded CPI table
#[derive(Debug, Clone)]
pub struct BatchRunner {
    cpi_table: CpiTable,
}

impl BatchRunner {
    pub fn new(cpi_table: CpiTable) -> Self {
        Self { cpi_table }
    }

    /// Compute every case; only an empty CPI table fails the whole batch
    pub fn run(&self, cases: &[DebtCase], config: &BatchConfig) -> Result<BatchReport, IndexationError> {
        let effective = effective_cutoff(config.requested_cutoff, &self.cpi_table)?;
        if effective < config.requested_cutoff {
            log::warn!(
                "Cutoff {} is past the last CPI month, using {}",
                config.requested_cutoff,
                effective
            );
        }

        log::info!("Indexing {} case(s) up to {}", cases.len(), effective);

        let compute = |case: &DebtCase| CaseOutcome {
            registration_number: case.registration_number.clone(),
            result: compute_case(case, &self.cpi_table, effective),
        };

        let outcomes: Vec<CaseOutcome> = if config.parallel {
            cases.par_iter().map(compute).collect()
        } else {
            cases.iter().map(compute).collect()
        };

        for outcome in &outcomes {
            if let Err(err) = &outcome.result {
                log::warn!("Case {} failed: {}", outcome.registration_number, err);
            }
        }

        Ok(BatchReport {
            requested_cutoff: config.requested_cutoff,
            effective_cutoff: effective,
            outcomes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::YearMonth;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn table() -> CpiTable {
        [
            (YearMonth::new(2024, 1).unwrap(), dec!(100.86)),
            (YearMonth::new(2024, 2).unwrap(), dec!(100.68)),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_effective_cutoff_clamps_to_cpi_coverage() {
        assert_eq!(effective_cutoff(date(2024, 6, 30), &table()), Ok(date(2024, 2, 29)));
        assert_eq!(effective_cutoff(date(2024, 2, 10), &table()), Ok(date(2024, 2, 10)));
        assert_eq!(
            effective_cutoff(date(2024, 2, 10), &CpiTable::new()),
            Err(IndexationError::EmptyCpiTable)
        );
    }

    #[test]
    fn test_batch_reports_clamped_cutoff() {
        let runner = BatchRunner::new(table());
        let cases = vec![DebtCase::new("1", date(2024, 1, 1), dec!(10000.00))];
        let report = runner.run(&cases, &BatchConfig::new(date(2024, 12, 31))).unwrap();

        assert_eq!(report.requested_cutoff, date(2024, 12, 31));
        assert_eq!(report.effective_cutoff, date(2024, 2, 29));
        assert!(report.cutoff_clamped());

        let case = report.succeeded().next().unwrap();
        assert_eq!(case.cutoff_date, date(2024, 2, 29));
        // 10000 * 1.0086 = 10086.00, then * 1.0068 = 10154.58
        assert_eq!(case.total_indexation, dec!(154.58));
    }

    #[test]
    fn test_failed_case_does_not_abort_batch() {
        let runner = BatchRunner::new(table());
        let cases = vec![
            DebtCase::new("1", date(2024, 1, 1), dec!(10000.00)),
            DebtCase::new("2", date(2023, 12, 15), dec!(500.00)),
            DebtCase::new("3", date(2024, 2, 1), dec!(1000.00)),
        ];
        let report = runner.run(&cases, &BatchConfig::new(date(2024, 2, 29))).unwrap();

        let order: Vec<&str> = report.outcomes.iter().map(|o| o.registration_number.as_str()).collect();
        assert_eq!(order, vec!["1", "2", "3"]);

        let failures: Vec<_> = report.failed().collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, "2");
        assert_eq!(failures[0].1, &IndexationError::MissingIndex(YearMonth::new(2023, 12).unwrap()));

        // 154.58 + 6.80
        assert_eq!(report.total_indexation(), dec!(161.38));
        assert_eq!(report.summary().failed, 1);
    }

    #[test]
    fn test_parallel_and_sequential_agree() {
        let runner = BatchRunner::new(table());
        let cases: Vec<DebtCase> = (1..=20)
            .map(|i| {
                DebtCase::new(i.to_string(), date(2024, 1, i), Decimal::from(1000 * i))
                    .with_payment(date(2024, 2, i), dec!(250))
            })
            .collect();

        let mut config = BatchConfig::new(date(2024, 2, 29));
        let parallel = runner.run(&cases, &config).unwrap();
        config.parallel = false;
        let sequential = runner.run(&cases, &config).unwrap();

        assert_eq!(parallel.outcomes, sequential.outcomes);
    }

    #[test]
    fn test_load_inputs_from_data_dir() {
        let dir = std::env::temp_dir().join(format!("debt_indexation_inputs_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(cpi::CPI_FILE), "Year,Month,CPI\n2024,1,100.86\n2024,2,100.68\n").unwrap();
        std::fs::write(
            dir.join(case_loader::CASES_FILE),
            "RegNumber,OrderDate,BaseAmount\n7,2024-01-01,10000\n8,15.01.2024,500\n",
        )
        .unwrap();
        std::fs::write(
            dir.join(case_loader::PAYMENTS_FILE),
            "RegNumber,PaymentDate,Amount\n7,2024-01-31,4000\n",
        )
        .unwrap();

        let loaded = BatchInputs::load_from(&dir);
        std::fs::remove_dir_all(&dir).unwrap();
        let inputs = loaded.unwrap();

        assert_eq!(inputs.cpi_table.len(), 2);
        assert_eq!(inputs.cases.len(), 2);
        assert_eq!(inputs.cases[0].registration_number, "7");
        assert_eq!(inputs.cases[0].payments.len(), 1);
        assert_eq!(inputs.cases[0].payments[0].amount, dec!(4000));
        assert_eq!(inputs.cases[1].order_date, date(2024, 1, 15));
        assert!(inputs.cases[1].payments.is_empty());
    }

    #[test]
    fn test_load_from_missing_dir_fails() {
        let dir = std::env::temp_dir().join(format!("debt_indexation_missing_{}", std::process::id()));
        assert!(matches!(BatchInputs::load_from(&dir), Err(LoadError::Csv(_))));
    }
}
