//! Post-load validation.
//!
//! Compares the staged CSV with the table read back from the store:
//! - Missing values in the imputed numeric columns
//! - Row count consistency
//! - Completeness of `tenure_group` and `monthly_charge_segment`
//! - Domain of `contract_type_code`
//!
//! Failed checks are reported, never raised. Only failing to read either
//! table is an error.

pub mod checks;
mod report;

pub use report::{CheckResult, CheckStatus, ValidationReport};

use crate::error::{Result, ResultExt};
use crate::store::TableStore;
use crate::utils::read_csv;
use std::path::Path;
use tracing::{info, warn};

/// Runs the validation checks.
pub struct Validator;

impl Validator {
    /// Validate the loaded `table` against the staged file.
    pub fn validate(staged_path: &Path, store: &dyn TableStore, table: &str) -> Result<ValidationReport> {
        info!("Running dataset validation for table {}", table);

        let staged = read_csv(staged_path)?;
        let loaded = store
            .read_table(table)
            .context(format!("Reading table '{}' for validation", table))?;
        info!("Staged rows: {}, loaded rows: {}", staged.height(), loaded.height());

        let mut report = ValidationReport::new(table, staged.height(), loaded.height());
        report.checks.push(checks::check_missing_values(&loaded));
        report.checks.push(checks::check_row_count(staged.height(), loaded.height()));
        report.checks.push(checks::check_tenure_groups(&loaded));
        report.checks.push(checks::check_charge_segments(&loaded));
        report.checks.push(checks::check_contract_codes(&loaded));

        for check in report.failed_checks() {
            warn!("Validation check '{}' failed: {}", check.name, check.details.join("; "));
        }
        info!("Validation completed");

        Ok(report)
    }
}
