//! The individual validation checks.
//!
//! Every check reads the loaded table and never mutates it. A problem in the
//! data, including a column that cannot be read, is a failed [`CheckResult`],
//! not an error.

use super::report::CheckResult;
use crate::error::EtlError;
use crate::types::{ChargeSegment, ContractType, TenureGroup, staged};
use crate::utils::{parse_decimal, series_to_strings};
use polars::prelude::*;
use std::collections::BTreeSet;

/// Label used for null cells in domain findings.
const NULL_LABEL: &str = "<null>";

/// Columns that must be fully populated after imputation.
pub const NON_NULL_COLUMNS: [&str; 3] = [
    staged::TENURE,
    staged::MONTHLY_CHARGES,
    staged::TOTAL_CHARGES,
];

/// Null counts for the imputed numeric columns.
///
/// A column absent from the loaded table fails as a missing column.
pub fn check_missing_values(loaded: &DataFrame) -> CheckResult {
    let mut details = Vec::new();
    let mut ok = true;

    for col in NON_NULL_COLUMNS {
        match loaded.column(col) {
            Ok(column) => {
                let nulls = column.null_count();
                if nulls == 0 {
                    details.push(format!("{}: no missing values", col));
                } else {
                    ok = false;
                    details.push(format!("{}: {} missing values", col, nulls));
                }
            }
            Err(_) => {
                ok = false;
                details.push(format!("{}: missing column", col));
            }
        }
    }

    if ok {
        CheckResult::passed("missing_values", details)
    } else {
        CheckResult::failed("missing_values", details)
    }
}

/// Loaded row count must equal the staged row count.
pub fn check_row_count(staged_rows: usize, loaded_rows: usize) -> CheckResult {
    if staged_rows == loaded_rows {
        CheckResult::passed("row_count", vec![format!("{} rows in both tables", loaded_rows)])
    } else {
        CheckResult::failed(
            "row_count",
            vec![format!(
                "row count mismatch: staged={}, loaded={}",
                staged_rows, loaded_rows
            )],
        )
    }
}

/// The distinct `tenure_group` values must be exactly the four groups.
pub fn check_tenure_groups(loaded: &DataFrame) -> CheckResult {
    let expected: BTreeSet<String> = TenureGroup::ALL.iter().map(|g| g.to_string()).collect();
    check_domain(loaded, staged::TENURE_GROUP, &expected)
}

/// The distinct `monthly_charge_segment` values must be exactly the three segments.
pub fn check_charge_segments(loaded: &DataFrame) -> CheckResult {
    let expected: BTreeSet<String> = ChargeSegment::ALL.iter().map(|s| s.to_string()).collect();
    check_domain(loaded, staged::MONTHLY_CHARGE_SEGMENT, &expected)
}

fn check_domain(loaded: &DataFrame, col: &str, expected: &BTreeSet<String>) -> CheckResult {
    let Ok(column) = loaded.column(col) else {
        return CheckResult::skipped(col, col);
    };
    let values = match series_to_strings(column.as_materialized_series()) {
        Ok(values) => values,
        Err(e) => return unreadable(col, e),
    };

    let actual: BTreeSet<String> = values
        .into_iter()
        .map(|v| v.unwrap_or_else(|| NULL_LABEL.to_string()))
        .collect();

    let found = format!("found: {}", join(&actual));
    if &actual == expected {
        return CheckResult::passed(col, vec![found]);
    }

    let mut details = vec![found];
    let missing: BTreeSet<String> = expected.difference(&actual).cloned().collect();
    let extra: BTreeSet<String> = actual.difference(expected).cloned().collect();
    if !missing.is_empty() {
        details.push(format!("missing: {}", join(&missing)));
    }
    if !extra.is_empty() {
        details.push(format!("unexpected: {}", join(&extra)));
    }
    CheckResult::failed(col, details)
}

/// Every non-null `contract_type_code` must be a known contract code.
///
/// Nulls are allowed; their count is noted.
pub fn check_contract_codes(loaded: &DataFrame) -> CheckResult {
    let col = staged::CONTRACT_TYPE_CODE;
    let Ok(column) = loaded.column(col) else {
        return CheckResult::skipped(col, col);
    };
    let values = match series_to_strings(column.as_materialized_series()) {
        Ok(values) => values,
        Err(e) => return unreadable(col, e),
    };
    let nulls = values.iter().filter(|v| v.is_none()).count();

    let invalid: BTreeSet<String> = values
        .into_iter()
        .flatten()
        .filter(|v| !is_contract_code(v))
        .collect();

    let mut details = Vec::new();
    if nulls > 0 {
        details.push(format!("{} null values (unmapped contract labels)", nulls));
    }

    if invalid.is_empty() {
        details.insert(0, "only codes 0, 1, 2 present".to_string());
        CheckResult::passed(col, details)
    } else {
        details.insert(0, format!("invalid codes: {}", join(&invalid)));
        CheckResult::failed(col, details)
    }
}

fn unreadable(col: &str, error: EtlError) -> CheckResult {
    CheckResult::failed(col, vec![format!("cannot read column: {}", error)])
}

fn is_contract_code(value: &str) -> bool {
    parse_decimal(value)
        .filter(|v| v.fract() == 0.0)
        .is_some_and(|v| ContractType::from_code(v as i64).is_some())
}

fn join(values: &BTreeSet<String>) -> String {
    values.iter().cloned().collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::CheckStatus;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_missing_values_passes() {
        let df = df![
            "tenure" => [1i64],
            "monthlycharges" => [20.0],
            "totalcharges" => [20.0],
        ]
        .unwrap();

        assert_eq!(check_missing_values(&df).status, CheckStatus::Passed);
    }

    #[test]
    fn test_missing_values_reports_nulls_and_absent_columns() {
        let df = df![
            "tenure" => [Some(1i64), None],
            "monthlycharges" => [20.0, 30.0],
        ]
        .unwrap();

        let result = check_missing_values(&df);

        assert_eq!(result.status, CheckStatus::Failed);
        assert!(result.details.contains(&"tenure: 1 missing values".to_string()));
        assert!(result.details.contains(&"totalcharges: missing column".to_string()));
    }

    #[test]
    fn test_row_count() {
        assert_eq!(check_row_count(3, 3).status, CheckStatus::Passed);

        let mismatch = check_row_count(3, 2);
        assert_eq!(mismatch.status, CheckStatus::Failed);
        assert!(mismatch.details[0].contains("staged=3, loaded=2"));
    }

    #[test]
    fn test_tenure_groups_complete() {
        let df = df!["tenure_group" => ["new", "regular", "loyal", "champion", "new"]].unwrap();
        assert_eq!(check_tenure_groups(&df).status, CheckStatus::Passed);
    }

    #[test]
    fn test_tenure_groups_incomplete_names_missing() {
        let df = df!["tenure_group" => ["new", "regular", "loyal"]].unwrap();

        let result = check_tenure_groups(&df);

        assert_eq!(result.status, CheckStatus::Failed);
        assert!(result.details.contains(&"missing: champion".to_string()));
    }

    #[test]
    fn test_tenure_groups_case_as_loaded() {
        let df = df!["tenure_group" => ["New", "regular", "loyal", "champion"]].unwrap();

        let result = check_tenure_groups(&df);

        assert_eq!(result.status, CheckStatus::Failed);
        assert!(result.details.contains(&"missing: new".to_string()));
        assert!(result.details.contains(&"unexpected: New".to_string()));
    }

    #[test]
    fn test_charge_segments_skipped_when_absent() {
        let df = df!["tenure" => [1i64]].unwrap();
        assert_eq!(check_charge_segments(&df).status, CheckStatus::Skipped);
    }

    #[test]
    fn test_contract_codes_allow_nulls() {
        let df = df!["contract_type_code" => [Some(0i64), Some(1), Some(2), None]].unwrap();

        let result = check_contract_codes(&df);

        assert_eq!(result.status, CheckStatus::Passed);
        assert!(result.details[1].starts_with("1 null values"));
    }

    #[test]
    fn test_contract_codes_report_invalid_literals() {
        let df = df!["contract_type_code" => [0i64, 3, 7, 3]].unwrap();

        let result = check_contract_codes(&df);

        assert_eq!(result.status, CheckStatus::Failed);
        assert_eq!(result.details[0], "invalid codes: 3, 7");
    }

    #[test]
    fn test_unreadable_column_fails_the_check() {
        let groups = Series::new(
            "tenure_group".into(),
            &[Series::new("".into(), &["new", "loyal"])],
        );
        let df = DataFrame::new(vec![groups.into_column()]).unwrap();

        let result = check_tenure_groups(&df);

        assert_eq!(result.status, CheckStatus::Failed);
        assert!(result.details[0].starts_with("cannot read column"));
    }

    #[test]
    fn test_contract_codes_accept_float_codes() {
        let df = df!["contract_type_code" => [0.0, 1.0, 2.0]].unwrap();
        assert_eq!(check_contract_codes(&df).status, CheckStatus::Passed);
    }
}
