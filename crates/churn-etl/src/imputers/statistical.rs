//! Statistical imputation methods.
//!
//! Provides median imputation for numeric columns and constant imputation
//! for text columns.

use crate::error::Result;
use crate::types::UNKNOWN_TEXT;
use crate::utils::{
    column_names, fill_integer_nulls, fill_numeric_nulls, fill_string_nulls, is_integer_dtype,
};
use polars::prelude::*;
use serde::Serialize;
use tracing::{debug, warn};

/// Fill value used when a numeric column has no non-null values.
pub const EMPTY_COLUMN_FALLBACK: f64 = 0.0;

/// Record of one numeric imputation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MedianFill {
    pub column: String,
    /// Value written into null cells.
    pub value: f64,
    /// Number of cells that were null.
    pub filled: usize,
    /// True when the column was entirely null and the fallback was used.
    pub used_fallback: bool,
}

/// Statistical imputation methods for filling missing values.
pub struct StatisticalImputer;

impl StatisticalImputer {
    /// Replace nulls in `col_name` with the median of its non-null values.
    ///
    /// Integer columns stay integers: the median is rounded half away from
    /// zero. An all-null column is filled with [`EMPTY_COLUMN_FALLBACK`].
    pub fn apply_numeric_median(
        df: &mut DataFrame,
        col_name: &str,
        processing_steps: &mut Vec<String>,
    ) -> Result<MedianFill> {
        let series = df.column(col_name)?.as_materialized_series().clone();
        let filled = series.null_count();

        let (median_val, used_fallback) = match series.cast(&DataType::Float64)?.median() {
            Some(m) => (m, false),
            None => {
                warn!(
                    "Column '{}' has no non-null values; imputing {}",
                    col_name, EMPTY_COLUMN_FALLBACK
                );
                (EMPTY_COLUMN_FALLBACK, true)
            }
        };

        let (result, value) = if is_integer_dtype(series.dtype()) {
            let rounded = median_val.round();
            (fill_integer_nulls(&series, rounded as i64)?, rounded)
        } else {
            (fill_numeric_nulls(&series, median_val)?, median_val)
        };
        df.replace(col_name, result)?;

        let method = if used_fallback { "fallback" } else { "median" };
        processing_steps.push(format!(
            "Filled {} nulls in '{}' with {}: {:.2}",
            filled, col_name, method, value
        ));
        debug!("Imputed {} nulls in {} with {}", filled, col_name, value);

        Ok(MedianFill {
            column: col_name.to_string(),
            value,
            filled,
            used_fallback,
        })
    }

    /// Fill nulls with `"unknown"` in every text column not listed in `skip`.
    ///
    /// Returns the number of cells filled.
    pub fn apply_constant_to_text_columns(
        df: &mut DataFrame,
        skip: &[&str],
        processing_steps: &mut Vec<String>,
    ) -> Result<usize> {
        let mut total = 0;

        for col_name in column_names(df) {
            if skip.iter().any(|s| s.eq_ignore_ascii_case(&col_name)) {
                continue;
            }

            let series = df.column(&col_name)?.as_materialized_series();
            if series.dtype() != &DataType::String {
                continue;
            }

            let nulls = series.null_count();
            if nulls == 0 {
                continue;
            }

            let filled = fill_string_nulls(series, UNKNOWN_TEXT)?;
            df.replace(&col_name, filled)?;
            total += nulls;

            processing_steps.push(format!(
                "Filled {} nulls in '{}' with constant value: '{}'",
                nulls, col_name, UNKNOWN_TEXT
            ));
        }

        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================================================
    // apply_numeric_median() tests
    // ========================================================================

    #[test]
    fn test_apply_numeric_median_basic() {
        let mut df = df![
            "values" => [Some(10.0), None, Some(30.0)],
        ]
        .unwrap();
        let mut steps = Vec::new();

        let fill = StatisticalImputer::apply_numeric_median(&mut df, "values", &mut steps).unwrap();

        let values = df.column("values").unwrap();
        assert_eq!(values.null_count(), 0);
        assert_eq!(values.get(1).unwrap().try_extract::<f64>().unwrap(), 20.0);
        assert_eq!(fill.value, 20.0);
        assert_eq!(fill.filled, 1);
        assert!(!fill.used_fallback);
        assert!(steps[0].contains("median"));
    }

    #[test]
    fn test_apply_numeric_median_preserves_original_values() {
        let mut df = df![
            "values" => [Some(1.0), None, Some(3.0), None, Some(5.0)],
        ]
        .unwrap();
        let mut steps = Vec::new();

        StatisticalImputer::apply_numeric_median(&mut df, "values", &mut steps).unwrap();

        let values = df.column("values").unwrap();
        assert_eq!(values.get(0).unwrap().try_extract::<f64>().unwrap(), 1.0);
        assert_eq!(values.get(1).unwrap().try_extract::<f64>().unwrap(), 3.0);
        assert_eq!(values.get(3).unwrap().try_extract::<f64>().unwrap(), 3.0);
        assert_eq!(values.get(4).unwrap().try_extract::<f64>().unwrap(), 5.0);
    }

    #[test]
    fn test_apply_numeric_median_integer_column_stays_integer() {
        let mut df = df![
            "tenure" => [Some(1i64), None, Some(4)],
        ]
        .unwrap();
        let mut steps = Vec::new();

        let fill = StatisticalImputer::apply_numeric_median(&mut df, "tenure", &mut steps).unwrap();

        let tenure = df.column("tenure").unwrap();
        assert_eq!(tenure.dtype(), &DataType::Int64);
        // Median of [1, 4] = 2.5, rounded away from zero
        assert_eq!(tenure.get(1).unwrap().try_extract::<i64>().unwrap(), 3);
        assert_eq!(fill.value, 3.0);
    }

    #[test]
    fn test_apply_numeric_median_text_column() {
        let mut df = df![
            "values" => [Some("10"), None, Some("30"), Some("40")],
        ]
        .unwrap();
        let mut steps = Vec::new();

        let fill = StatisticalImputer::apply_numeric_median(&mut df, "values", &mut steps).unwrap();

        assert_eq!(fill.value, 30.0);
        assert_eq!(df.column("values").unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column("values").unwrap().null_count(), 0);
    }

    #[test]
    fn test_apply_numeric_median_all_nulls_uses_fallback() {
        let mut df = df![
            "values" => [Option::<f64>::None, None, None],
        ]
        .unwrap();
        let mut steps = Vec::new();

        let fill = StatisticalImputer::apply_numeric_median(&mut df, "values", &mut steps).unwrap();

        assert!(fill.used_fallback);
        assert_eq!(fill.value, EMPTY_COLUMN_FALLBACK);
        assert_eq!(df.column("values").unwrap().null_count(), 0);
        assert!(steps[0].contains("fallback"));
    }

    #[test]
    fn test_apply_numeric_median_no_nulls() {
        let mut df = df!["values" => [1.0, 2.0, 3.0]].unwrap();
        let mut steps = Vec::new();

        let fill = StatisticalImputer::apply_numeric_median(&mut df, "values", &mut steps).unwrap();

        assert_eq!(fill.filled, 0);
        let values = df.column("values").unwrap();
        assert_eq!(values.get(2).unwrap().try_extract::<f64>().unwrap(), 3.0);
    }

    #[test]
    fn test_apply_numeric_median_nonexistent_column() {
        let mut df = df!["other" => [1.0]].unwrap();
        let mut steps = Vec::new();

        assert!(StatisticalImputer::apply_numeric_median(&mut df, "values", &mut steps).is_err());
    }

    // ========================================================================
    // apply_constant_to_text_columns() tests
    // ========================================================================

    #[test]
    fn test_apply_constant_to_text_columns() {
        let mut df = df![
            "Partner" => [Some("Yes"), None],
            "Churn" => [None, Some("No")],
            "tenure" => [Some(1i64), None],
        ]
        .unwrap();
        let mut steps = Vec::new();

        let filled =
            StatisticalImputer::apply_constant_to_text_columns(&mut df, &[], &mut steps).unwrap();

        assert_eq!(filled, 2);
        let partner: Vec<Option<&str>> = df.column("Partner").unwrap().str().unwrap().into_iter().collect();
        assert_eq!(partner, vec![Some("Yes"), Some("unknown")]);
        // Numeric columns are left alone
        assert_eq!(df.column("tenure").unwrap().null_count(), 1);
        assert_eq!(steps.len(), 2);
    }

    #[test]
    fn test_apply_constant_respects_skip_list() {
        let mut df = df![
            "TotalCharges" => [Option::<&str>::None],
            "Partner" => [Option::<&str>::None],
        ]
        .unwrap();
        let mut steps = Vec::new();

        StatisticalImputer::apply_constant_to_text_columns(&mut df, &["totalcharges"], &mut steps)
            .unwrap();

        assert_eq!(df.column("TotalCharges").unwrap().null_count(), 1);
        assert_eq!(df.column("Partner").unwrap().null_count(), 0);
    }
}
