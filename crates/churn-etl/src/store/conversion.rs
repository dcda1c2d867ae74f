//! Conversion between polars frames and JSON row objects.
//!
//! REST stores exchange tables as arrays of objects, one object per row.

use crate::error::Result;
use polars::prelude::*;
use serde_json::{Map, Number, Value};

/// JSON object for one table row.
pub type JsonRow = Map<String, Value>;

static NULL: Value = Value::Null;

/// Convert a polars cell to JSON.
///
/// NaN and infinite floats become `null`; types without a JSON counterpart
/// are written with their display form.
fn any_value_to_json(value: AnyValue) -> Value {
    match value {
        AnyValue::Null => Value::Null,
        AnyValue::Boolean(b) => Value::Bool(b),

        AnyValue::Int8(i) => Value::Number(i.into()),
        AnyValue::Int16(i) => Value::Number(i.into()),
        AnyValue::Int32(i) => Value::Number(i.into()),
        AnyValue::Int64(i) => Value::Number(i.into()),
        AnyValue::UInt8(u) => Value::Number(u.into()),
        AnyValue::UInt16(u) => Value::Number(u.into()),
        AnyValue::UInt32(u) => Value::Number(u.into()),
        AnyValue::UInt64(u) => Value::Number(u.into()),

        AnyValue::Float32(f) => Number::from_f64(f as f64)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        AnyValue::Float64(f) => Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),

        AnyValue::String(s) => Value::String(s.to_string()),
        AnyValue::StringOwned(s) => Value::String(s.to_string()),

        _ => Value::String(format!("{}", value)),
    }
}

/// Convert every row of `df` to a JSON object keyed by column name.
pub fn frame_to_rows(df: &DataFrame) -> Result<Vec<JsonRow>> {
    let columns = df.get_columns();
    let mut rows = Vec::with_capacity(df.height());

    for idx in 0..df.height() {
        let mut row = Map::with_capacity(columns.len());
        for column in columns {
            row.insert(column.name().to_string(), any_value_to_json(column.get(idx)?));
        }
        rows.push(row);
    }

    Ok(rows)
}

/// Build a frame from JSON row objects.
///
/// Columns appear in first-seen order. A key missing from a row is null.
/// Column types are inferred from the non-null values: all booleans give
/// `Boolean`, all integers give `Int64`, all numbers give `Float64`, anything
/// else is read as `String`.
pub fn rows_to_frame(rows: &[JsonRow]) -> Result<DataFrame> {
    if rows.is_empty() {
        return Ok(DataFrame::empty());
    }

    let mut names: Vec<&str> = Vec::new();
    for row in rows {
        for key in row.keys() {
            if !names.contains(&key.as_str()) {
                names.push(key);
            }
        }
    }

    let columns = names
        .into_iter()
        .map(|name| {
            let values: Vec<&Value> = rows
                .iter()
                .map(|row| row.get(name).unwrap_or(&NULL))
                .collect();
            json_column(name, &values).into_column()
        })
        .collect::<Vec<_>>();

    Ok(DataFrame::new(columns)?)
}

fn json_column(name: &str, values: &[&Value]) -> Series {
    let present: Vec<&Value> = values.iter().copied().filter(|v| !v.is_null()).collect();

    if !present.is_empty() && present.iter().all(|v| v.is_boolean()) {
        let data: Vec<Option<bool>> = values.iter().map(|v| v.as_bool()).collect();
        return Series::new(name.into(), data);
    }

    if !present.is_empty() && present.iter().all(|v| v.is_i64()) {
        let data: Vec<Option<i64>> = values.iter().map(|v| v.as_i64()).collect();
        return Series::new(name.into(), data);
    }

    if !present.is_empty() && present.iter().all(|v| v.is_number()) {
        let data: Vec<Option<f64>> = values.iter().map(|v| v.as_f64()).collect();
        return Series::new(name.into(), data);
    }

    let data: Vec<Option<String>> = values
        .iter()
        .map(|v| match v {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        })
        .collect();
    Series::new(name.into(), data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> JsonRow {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_any_value_to_json() {
        assert_eq!(any_value_to_json(AnyValue::Null), Value::Null);
        assert_eq!(any_value_to_json(AnyValue::Int64(3)), json!(3));
        assert_eq!(any_value_to_json(AnyValue::Float64(1.5)), json!(1.5));
        assert_eq!(any_value_to_json(AnyValue::Float64(f64::NAN)), Value::Null);
        assert_eq!(any_value_to_json(AnyValue::String("new")), json!("new"));
    }

    #[test]
    fn test_frame_to_rows() {
        let df = df![
            "tenure" => [1i64, 72],
            "contract_type_code" => [Some(0i64), None],
            "tenure_group" => ["new", "champion"],
        ]
        .unwrap();

        let rows = frame_to_rows(&df).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["tenure"], json!(1));
        assert_eq!(rows[1]["contract_type_code"], Value::Null);
        assert_eq!(rows[1]["tenure_group"], json!("champion"));
    }

    #[test]
    fn test_rows_to_frame_infers_types() {
        let rows = vec![
            row(json!({"tenure": 1, "monthlycharges": 29.85, "churn": "No", "flag": true})),
            row(json!({"tenure": 2, "monthlycharges": 30, "churn": null, "flag": false})),
        ];

        let df = rows_to_frame(&rows).unwrap();

        assert_eq!(df.height(), 2);
        assert_eq!(df.column("tenure").unwrap().dtype(), &DataType::Int64);
        assert_eq!(df.column("monthlycharges").unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column("churn").unwrap().dtype(), &DataType::String);
        assert_eq!(df.column("churn").unwrap().null_count(), 1);
        assert_eq!(df.column("flag").unwrap().dtype(), &DataType::Boolean);
    }

    #[test]
    fn test_rows_to_frame_missing_key_is_null() {
        let rows = vec![row(json!({"a": 1})), row(json!({"a": 2, "b": "x"}))];

        let df = rows_to_frame(&rows).unwrap();

        assert_eq!(df.column("b").unwrap().null_count(), 1);
    }

    #[test]
    fn test_rows_to_frame_empty() {
        let df = rows_to_frame(&[]).unwrap();
        assert_eq!(df.height(), 0);
    }

    #[test]
    fn test_round_trip_through_rows() {
        let df = df![
            "tenure" => [1i64, 72],
            "totalcharges" => [29.85, 7000.0],
        ]
        .unwrap();

        let back = rows_to_frame(&frame_to_rows(&df).unwrap()).unwrap();
        assert!(back.equals(&df));
    }
}
