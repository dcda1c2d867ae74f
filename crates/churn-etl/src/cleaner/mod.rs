//! Data cleaning module for the transform stage.
//!
//! This module provides the schema-level cleaning steps:
//! - Coercing text columns that should hold decimals
//! - Dropping identifier and gender columns
//! - Lower-casing column names

mod converters;

use crate::error::Result;
use crate::types::source;
use crate::utils::find_column;
use polars::prelude::*;
use tracing::debug;

/// Columns removed from the staged table.
pub const EXCLUDED_COLUMNS: [&str; 2] = [source::CUSTOMER_ID, source::GENDER];

/// Data cleaner for the column-level transform steps.
pub struct DataCleaner;

impl DataCleaner {
    /// Replace `column` with its decimal coercion and return how many values
    /// became null that were not null before.
    pub fn coerce_decimal_column(
        df: &mut DataFrame,
        column: &str,
        processing_steps: &mut Vec<String>,
    ) -> Result<usize> {
        let series = df.column(column)?.as_materialized_series().clone();
        let nulls_before = series.null_count();

        let coerced = converters::coerce_to_decimal(&series)?;
        let newly_null = coerced.null_count().saturating_sub(nulls_before);
        df.replace(column, coerced)?;

        processing_steps.push(format!(
            "Coerced '{}' to decimal ({} blank or unparsable values set to null)",
            column, newly_null
        ));
        debug!("Coerced {} to Float64, {} new nulls", column, newly_null);

        Ok(newly_null)
    }

    /// Drop identifier and gender columns. Absent columns are ignored.
    pub fn drop_excluded_columns(df: DataFrame, processing_steps: &mut Vec<String>) -> DataFrame {
        let present: Vec<PlSmallStr> = EXCLUDED_COLUMNS
            .iter()
            .filter_map(|name| find_column(&df, name))
            .map(PlSmallStr::from)
            .collect();

        if present.is_empty() {
            processing_steps.push("No identifier or gender columns to drop".to_string());
            return df;
        }

        processing_steps.push(format!("Dropped columns: {:?}", present));
        df.drop_many(present)
    }

    /// Lower-case every column name.
    pub fn lowercase_column_names(df: &mut DataFrame, processing_steps: &mut Vec<String>) -> Result<()> {
        let lowered: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|name| name.to_lowercase())
            .collect();

        df.set_column_names(lowered)?;
        processing_steps.push("Lower-cased column names".to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::column_names;

    #[test]
    fn test_coerce_decimal_column_counts_new_nulls() {
        let mut df = df![
            "TotalCharges" => [Some("10"), Some(" "), None, Some("abc")],
        ]
        .unwrap();
        let mut steps = Vec::new();

        let newly_null = DataCleaner::coerce_decimal_column(&mut df, "TotalCharges", &mut steps).unwrap();

        assert_eq!(newly_null, 2);
        assert_eq!(df.column("TotalCharges").unwrap().null_count(), 3);
        assert_eq!(df.column("TotalCharges").unwrap().dtype(), &DataType::Float64);
        assert!(steps[0].contains("TotalCharges"));
    }

    #[test]
    fn test_drop_excluded_columns() {
        let df = df![
            "customerID" => ["7590-VHVEG"],
            "gender" => ["Female"],
            "tenure" => [1i64],
        ]
        .unwrap();
        let mut steps = Vec::new();

        let df = DataCleaner::drop_excluded_columns(df, &mut steps);

        assert_eq!(column_names(&df), vec!["tenure"]);
    }

    #[test]
    fn test_drop_excluded_columns_absent_is_ok() {
        let df = df!["tenure" => [1i64]].unwrap();
        let mut steps = Vec::new();

        let df = DataCleaner::drop_excluded_columns(df, &mut steps);

        assert_eq!(df.width(), 1);
        assert!(steps[0].contains("No identifier"));
    }

    #[test]
    fn test_lowercase_column_names() {
        let mut df = df![
            "MonthlyCharges" => [1.0],
            "tenure_group" => ["new"],
        ]
        .unwrap();
        let mut steps = Vec::new();

        DataCleaner::lowercase_column_names(&mut df, &mut steps).unwrap();

        assert_eq!(column_names(&df), vec!["monthlycharges", "tenure_group"]);
    }
}
