//! Type conversion functions for data cleaning.

use crate::error::Result;
use crate::utils::{is_numeric_dtype, parse_decimal};
use polars::prelude::*;

/// Coerce a column to `Float64`.
///
/// String cells that are blank, whitespace-only or not a number become null.
/// Numeric columns are cast; any other dtype is read through its string form.
pub(crate) fn coerce_to_decimal(series: &Series) -> Result<Series> {
    if is_numeric_dtype(series.dtype()) {
        return Ok(series.cast(&DataType::Float64)?);
    }

    let as_str = series.cast(&DataType::String)?;
    let values: Vec<Option<f64>> = as_str
        .str()?
        .into_iter()
        .map(|v| v.and_then(parse_decimal))
        .collect();

    Ok(Series::new(series.name().clone(), values))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(series: &Series) -> Vec<Option<f64>> {
        series.f64().unwrap().into_iter().collect()
    }

    #[test]
    fn test_blank_and_whitespace_become_null() {
        let series = Series::new("TotalCharges".into(), &[Some("29.85"), Some(" "), Some(""), None]);
        let result = coerce_to_decimal(&series).unwrap();

        assert_eq!(result.dtype(), &DataType::Float64);
        assert_eq!(values(&result), vec![Some(29.85), None, None, None]);
    }

    #[test]
    fn test_unparsable_becomes_null() {
        let series = Series::new("TotalCharges".into(), &["1889.5", "n/a", "12,5"]);
        let result = coerce_to_decimal(&series).unwrap();
        assert_eq!(values(&result), vec![Some(1889.5), None, None]);
    }

    #[test]
    fn test_numeric_column_is_cast() {
        let series = Series::new("TotalCharges".into(), &[Some(10i64), None, Some(30)]);
        let result = coerce_to_decimal(&series).unwrap();
        assert_eq!(values(&result), vec![Some(10.0), None, Some(30.0)]);
    }

    #[test]
    fn test_name_is_preserved() {
        let series = Series::new("TotalCharges".into(), &["1"]);
        let result = coerce_to_decimal(&series).unwrap();
        assert_eq!(result.name().as_str(), "TotalCharges");
    }
}
