//! Analysis of the loaded customer table.
//!
//! Computes the churn summary metrics, writes them as a flat `metric,value`
//! CSV and renders the charts.

pub mod charts;

use crate::error::{EtlError, Result, ResultExt};
use crate::store::TableStore;
use crate::types::staged;
use crate::utils::{require_column, series_to_f64, series_to_strings, write_csv};
use polars::prelude::*;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::info;

const VALUE_FIELD: &str = "value";
const COUNT_FIELD: &str = "count";
const ROW_FIELD: &str = "row";
const COLUMN_FIELD: &str = "column";

/// Summary metrics of the loaded table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisSummary {
    pub total_rows: usize,
    /// Percentage of rows whose churn value is "yes" in any case.
    pub churn_percentage: f64,
    pub avg_monthly_charge_per_contract: BTreeMap<String, f64>,
    /// Keys are lower-cased tenure groups.
    pub customer_loyalty_counts: BTreeMap<String, usize>,
    pub internet_service_distribution: BTreeMap<String, usize>,
    /// tenure_group -> churn value -> row count, zero-filled.
    pub pivot_churn_by_tenure: BTreeMap<String, BTreeMap<String, usize>>,
}

impl AnalysisSummary {
    /// Flatten into `(metric, value)` pairs with dotted metric keys.
    pub fn to_metric_rows(&self) -> Vec<(String, String)> {
        let mut rows = vec![
            ("total_rows".to_string(), self.total_rows.to_string()),
            ("churn_percentage".to_string(), self.churn_percentage.to_string()),
        ];

        for (contract, avg) in &self.avg_monthly_charge_per_contract {
            rows.push((format!("avg_monthly_charge_per_contract.{}", contract), avg.to_string()));
        }
        for (group, count) in &self.customer_loyalty_counts {
            rows.push((format!("customer_loyalty_counts.{}", group), count.to_string()));
        }
        for (service, count) in &self.internet_service_distribution {
            rows.push((format!("internet_service_distribution.{}", service), count.to_string()));
        }
        for (group, by_churn) in &self.pivot_churn_by_tenure {
            for (churn, count) in by_churn {
                rows.push((format!("pivot_churn_by_tenure.{}.{}", group, churn), count.to_string()));
            }
        }

        rows
    }

    /// Write the flattened metrics as a two-column CSV.
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let (metrics, values): (Vec<String>, Vec<String>) = self.to_metric_rows().into_iter().unzip();
        let mut df = df![
            "metric" => metrics,
            "value" => values,
        ]?;
        write_csv(&mut df, path)
    }
}

/// Outputs of an analysis run.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisOutcome {
    pub summary: AnalysisSummary,
    pub summary_path: PathBuf,
    pub charts: Vec<PathBuf>,
}

/// Computes summary statistics over the loaded table.
pub struct Analyzer;

impl Analyzer {
    /// Compute the summary metrics of a loaded frame.
    ///
    /// # Errors
    ///
    /// [`EtlError::EmptyDataset`] on zero rows, [`EtlError::SchemaMismatch`]
    /// when `churn`, `contract`, `monthlycharges`, `tenure_group` or
    /// `internetservice` is missing.
    pub fn summarize(df: &DataFrame, table: &str) -> Result<AnalysisSummary> {
        if df.height() == 0 {
            return Err(EtlError::EmptyDataset(table.to_string()));
        }

        let location = format!("loaded table '{}'", table);
        let churn_col = require_column(df, staged::CHURN, &location)?;
        let contract_col = require_column(df, staged::CONTRACT, &location)?;
        let group_col = require_column(df, staged::TENURE_GROUP, &location)?;
        let internet_col = require_column(df, staged::INTERNET_SERVICE, &location)?;
        let monthly_col = require_column(df, staged::MONTHLY_CHARGES, &location)?;

        let churned = series_to_strings(df.column(&churn_col)?.as_materialized_series())?
            .into_iter()
            .flatten()
            .filter(|c| c.eq_ignore_ascii_case("yes"))
            .count();
        let churn_percentage = churned as f64 / df.height() as f64 * 100.0;

        let lowered_groups = df
            .clone()
            .lazy()
            .select([col(group_col.as_str())
                .cast(DataType::String)
                .str()
                .to_lowercase()])
            .collect()?;

        Ok(AnalysisSummary {
            total_rows: df.height(),
            churn_percentage,
            avg_monthly_charge_per_contract: mean_by(df, &contract_col, &monthly_col)?,
            customer_loyalty_counts: value_counts(
                lowered_groups.column(&group_col)?.as_materialized_series(),
            )?,
            internet_service_distribution: value_counts(
                df.column(&internet_col)?.as_materialized_series(),
            )?,
            pivot_churn_by_tenure: crosstab(df, &group_col, &churn_col)?,
        })
    }

    /// Read `table`, write the summary CSV and, if enabled, the charts.
    pub fn analyze(
        store: &dyn TableStore,
        table: &str,
        summary_path: &Path,
        chart_dir: Option<&Path>,
    ) -> Result<AnalysisOutcome> {
        info!("Downloading table {} from {}", table, store.name());
        let df = store
            .read_table(table)
            .context(format!("Reading table '{}' for analysis", table))?;
        info!("Loaded {} rows", df.height());

        let summary = Self::summarize(&df, table)?;
        info!(
            "Churn percentage: {:.2}% over {} rows",
            summary.churn_percentage, summary.total_rows
        );

        summary.write_csv(summary_path)?;
        info!("Summary saved to {}", summary_path.display());

        let charts = chart_dir
            .map(|dir| charts::render_all(&df, dir))
            .unwrap_or_default();

        Ok(AnalysisOutcome {
            summary,
            summary_path: summary_path.to_path_buf(),
            charts,
        })
    }
}

/// Mean of `value` per distinct `key`. Null keys and null means are dropped.
fn mean_by(df: &DataFrame, key: &str, value: &str) -> Result<BTreeMap<String, f64>> {
    let means = df
        .clone()
        .lazy()
        .select([col(key).cast(DataType::String), col(value).cast(DataType::Float64)])
        .group_by([col(key)])
        .agg([col(value).mean()])
        .collect()?;

    let keys = series_to_strings(means.column(key)?.as_materialized_series())?;
    let values = series_to_f64(means.column(value)?.as_materialized_series())?;

    Ok(keys
        .into_iter()
        .zip(values)
        .filter_map(|(k, v)| Some((k?, v?)))
        .collect())
}

/// Row count per distinct non-null value.
fn value_counts(series: &Series) -> Result<BTreeMap<String, usize>> {
    let values = series
        .cast(&DataType::String)?
        .drop_nulls()
        .with_name(VALUE_FIELD.into());
    let counted = values.value_counts(false, false, COUNT_FIELD.into(), false)?;

    let keys = series_to_strings(counted.column(VALUE_FIELD)?.as_materialized_series())?;
    Ok(keys
        .into_iter()
        .zip(count_column(&counted)?)
        .filter_map(|(k, n)| Some((k?, n)))
        .collect())
}

/// Count of each `(row, column)` pair, zero-filled so that every row holds
/// every column value seen in the table.
fn crosstab(
    df: &DataFrame,
    row_key: &str,
    col_key: &str,
) -> Result<BTreeMap<String, BTreeMap<String, usize>>> {
    let counted = df
        .clone()
        .lazy()
        .select([
            col(row_key).cast(DataType::String).alias(ROW_FIELD),
            col(col_key).cast(DataType::String).alias(COLUMN_FIELD),
        ])
        .filter(col(ROW_FIELD).is_not_null().and(col(COLUMN_FIELD).is_not_null()))
        .group_by([col(ROW_FIELD), col(COLUMN_FIELD)])
        .agg([len().alias(COUNT_FIELD)])
        .collect()?;

    let rows = series_to_strings(counted.column(ROW_FIELD)?.as_materialized_series())?;
    let cols = series_to_strings(counted.column(COLUMN_FIELD)?.as_materialized_series())?;
    let col_values: BTreeSet<String> = cols.iter().flatten().cloned().collect();

    let mut table: BTreeMap<String, BTreeMap<String, usize>> = BTreeMap::new();
    for ((row, column), count) in rows.into_iter().zip(cols).zip(count_column(&counted)?) {
        let (Some(row), Some(column)) = (row, column) else { continue };
        table
            .entry(row)
            .or_insert_with(|| col_values.iter().map(|v| (v.clone(), 0)).collect())
            .insert(column, count);
    }
    Ok(table)
}

fn count_column(counted: &DataFrame) -> Result<Vec<usize>> {
    let counts = counted
        .column(COUNT_FIELD)?
        .as_materialized_series()
        .cast(&DataType::UInt64)?;
    Ok(counts
        .u64()?
        .into_iter()
        .map(|n| n.unwrap_or(0) as usize)
        .collect())
}
