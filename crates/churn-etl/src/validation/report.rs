//! Validation report types.

use chrono::Local;
use serde::Serialize;
use std::fmt;

/// Outcome of a single check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Passed,
    Failed,
    /// The column the check needs is not in the loaded table.
    Skipped,
}

impl CheckStatus {
    fn marker(&self) -> &'static str {
        match self {
            Self::Passed => "PASS",
            Self::Failed => "FAIL",
            Self::Skipped => "SKIP",
        }
    }
}

/// One named check with its findings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    /// Human-readable findings, one per line.
    pub details: Vec<String>,
}

impl CheckResult {
    pub fn passed(name: impl Into<String>, details: Vec<String>) -> Self {
        Self {
            name: name.into(),
            status: CheckStatus::Passed,
            details,
        }
    }

    pub fn failed(name: impl Into<String>, details: Vec<String>) -> Self {
        Self {
            name: name.into(),
            status: CheckStatus::Failed,
            details,
        }
    }

    pub fn skipped(name: impl Into<String>, column: &str) -> Self {
        Self {
            name: name.into(),
            status: CheckStatus::Skipped,
            details: vec![format!("column '{}' not present in loaded table", column)],
        }
    }

    pub fn is_failed(&self) -> bool {
        self.status == CheckStatus::Failed
    }
}

/// Result of comparing the staged table with the loaded table.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub generated_at: String,
    pub table: String,
    pub staged_rows: usize,
    pub loaded_rows: usize,
    pub checks: Vec<CheckResult>,
}

impl ValidationReport {
    pub fn new(table: impl Into<String>, staged_rows: usize, loaded_rows: usize) -> Self {
        Self {
            generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            table: table.into(),
            staged_rows,
            loaded_rows,
            checks: Vec::new(),
        }
    }

    /// True when no check failed. Skipped checks do not count as failures.
    pub fn all_passed(&self) -> bool {
        !self.checks.iter().any(CheckResult::is_failed)
    }

    pub fn failed_checks(&self) -> Vec<&CheckResult> {
        self.checks.iter().filter(|c| c.is_failed()).collect()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Validation of table '{}' ({})", self.table, self.generated_at)?;
        writeln!(f, "Staged rows: {}, loaded rows: {}", self.staged_rows, self.loaded_rows)?;

        for check in &self.checks {
            writeln!(f)?;
            writeln!(f, "[{}] {}", check.status.marker(), check.name)?;
            for detail in &check.details {
                writeln!(f, "    {}", detail)?;
            }
        }

        writeln!(f)?;
        let failed = self.failed_checks().len();
        if failed == 0 {
            write!(f, "All checks passed")
        } else {
            write!(f, "{} of {} checks failed", failed, self.checks.len())
        }
    }
}
