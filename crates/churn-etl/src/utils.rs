//! Shared utilities for the ETL workflow.
//!
//! This module contains the column lookup, parsing and CSV helpers used by
//! several stages so that every stage reads and writes tables the same way.

use crate::error::{EtlError, Result, ResultExt};
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use std::fs::{self, File};
use std::path::Path;
use tracing::debug;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    is_integer_dtype(dtype) || matches!(dtype, DataType::Float32 | DataType::Float64)
}

/// Check if a DataType is an integer type.
#[inline]
pub fn is_integer_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
    )
}

// =============================================================================
// Column Lookup
// =============================================================================

/// Find a column by name, ignoring ASCII case. Returns the actual name.
pub fn find_column(df: &DataFrame, name: &str) -> Option<String> {
    df.get_column_names()
        .into_iter()
        .find(|col| col.as_str().eq_ignore_ascii_case(name))
        .map(|col| col.to_string())
}

/// Column names as owned strings, in frame order.
pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names().iter().map(|c| c.to_string()).collect()
}

/// Like [`find_column`] but a missing column is a schema mismatch.
pub fn require_column(df: &DataFrame, name: &str, table: &str) -> Result<String> {
    find_column(df, name).ok_or_else(|| EtlError::missing_column(name, table))
}

// =============================================================================
// Parsing
// =============================================================================

/// Parse a decimal, treating blank, whitespace-only and non-finite input as missing.
pub fn parse_decimal(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

// =============================================================================
// Series Access
// =============================================================================

/// Read any column as optional strings. Nulls stay `None`.
pub fn series_to_strings(series: &Series) -> Result<Vec<Option<String>>> {
    let as_str = series.cast(&DataType::String)?;
    Ok(as_str
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect())
}

/// Read any column as optional floats. Values that cannot be read become `None`.
pub fn series_to_f64(series: &Series) -> Result<Vec<Option<f64>>> {
    if matches!(series.dtype(), DataType::String) {
        return Ok(series
            .str()?
            .into_iter()
            .map(|v| v.and_then(parse_decimal))
            .collect());
    }
    let as_float = series.cast(&DataType::Float64)?;
    Ok(as_float.f64()?.into_iter().collect())
}

/// Fill null values in a numeric Series with a specific value.
pub fn fill_numeric_nulls(series: &Series, fill_value: f64) -> PolarsResult<Series> {
    let as_float = series.cast(&DataType::Float64)?;
    let values: Vec<f64> = as_float
        .f64()?
        .into_iter()
        .map(|v| v.unwrap_or(fill_value))
        .collect();
    Ok(Series::new(series.name().clone(), values))
}

/// Fill null values in an integer Series, keeping it `Int64`.
pub fn fill_integer_nulls(series: &Series, fill_value: i64) -> PolarsResult<Series> {
    let as_int = series.cast(&DataType::Int64)?;
    let values: Vec<i64> = as_int
        .i64()?
        .into_iter()
        .map(|v| v.unwrap_or(fill_value))
        .collect();
    Ok(Series::new(series.name().clone(), values))
}

/// Fill null values in a string Series with a specific value.
pub fn fill_string_nulls(series: &Series, fill_value: &str) -> PolarsResult<Series> {
    let values: Vec<&str> = series
        .str()?
        .into_iter()
        .map(|v| v.unwrap_or(fill_value))
        .collect();
    Ok(Series::new(series.name().clone(), values))
}

// =============================================================================
// CSV I/O
// =============================================================================

/// Read a CSV with a header row, inferring types over the whole file.
pub fn read_csv(path: &Path) -> Result<DataFrame> {
    if !path.exists() {
        return Err(EtlError::SourceNotFound(path.to_path_buf()));
    }

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .context(format!("Opening {}", path.display()))?
        .finish()
        .context(format!("Parsing {}", path.display()))?;

    debug!("Read {} rows x {} columns from {}", df.height(), df.width(), path.display());
    Ok(df)
}

/// Write a CSV with a header row, creating the parent directory if needed.
pub fn write_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| EtlError::write_failed(parent, e))?;
    }

    let mut file = File::create(path).map_err(|e| EtlError::write_failed(path, e))?;

    CsvWriter::new(&mut file)
        .include_header(true)
        .with_separator(b',')
        .with_quote_char(b'"')
        .finish(df)
        .context(format!("Writing {}", path.display()))?;

    debug!("Wrote {} rows to {}", df.height(), path.display());
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
