//! Transform stage: raw table in, staged table out.

use crate::cleaner::DataCleaner;
use crate::error::{Result, ResultExt};
use crate::features::FeatureDeriver;
use crate::imputers::{MedianFill, StatisticalImputer};
use crate::types::source;
use crate::utils::{is_numeric_dtype, read_csv, require_column, write_csv};
use polars::prelude::*;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info, warn};

const RAW_TABLE: &str = "raw table";

/// What the transform stage did to a table.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TransformSummary {
    pub rows_in: usize,
    pub rows_out: usize,
    pub columns_in: usize,
    pub columns_out: usize,
    /// `TotalCharges` values that were blank or unparsable.
    pub coerced_to_null: usize,
    /// One entry per median-imputed numeric column.
    pub imputations: Vec<MedianFill>,
    /// Text cells filled with `"unknown"`.
    pub unknown_filled: usize,
    /// Contract labels that did not map to a code.
    pub unmapped_contracts: usize,
    pub processing_steps: Vec<String>,
}

/// Cleans the raw customer table and derives the staged columns.
pub struct Transformer;

impl Transformer {
    /// Transform a raw frame in memory.
    ///
    /// Processing order:
    /// 1. Coerce `TotalCharges` to decimal
    /// 2. Median-impute `tenure`, `MonthlyCharges`, `TotalCharges`
    /// 3. Fill remaining text nulls with `"unknown"`
    /// 4. Derive `tenure_group`, `monthly_charge_segment`,
    ///    `is_multi_line_user`, `contract_type_code`
    /// 5. Drop identifier and gender columns
    /// 6. Lower-case column names
    ///
    /// # Errors
    ///
    /// Returns [`crate::EtlError::SchemaMismatch`] when a required source
    /// column is missing.
    pub fn transform_frame(df: DataFrame) -> Result<(DataFrame, TransformSummary)> {
        let mut df = df;
        let mut summary = TransformSummary {
            rows_in: df.height(),
            columns_in: df.width(),
            ..Default::default()
        };
        let steps = &mut summary.processing_steps;

        let tenure = require_column(&df, source::TENURE, RAW_TABLE)?;
        let monthly = require_column(&df, source::MONTHLY_CHARGES, RAW_TABLE)?;
        let total = require_column(&df, source::TOTAL_CHARGES, RAW_TABLE)?;
        let lines = require_column(&df, source::MULTIPLE_LINES, RAW_TABLE)?;
        let contract = require_column(&df, source::CONTRACT, RAW_TABLE)?;

        info!("Step 1: Coercing {} to decimal...", total);
        summary.coerced_to_null = DataCleaner::coerce_decimal_column(&mut df, &total, steps)?;
        for col in [&tenure, &monthly] {
            if !is_numeric_dtype(df.column(col)?.dtype()) {
                warn!("Column '{}' was read as text; coercing to decimal", col);
                DataCleaner::coerce_decimal_column(&mut df, col, steps)?;
            }
        }

        info!("Step 2: Imputing numeric nulls with column medians...");
        for col in [&tenure, &monthly, &total] {
            let fill = StatisticalImputer::apply_numeric_median(&mut df, col, steps)?;
            summary.imputations.push(fill);
        }

        info!("Step 3: Filling text nulls...");
        summary.unknown_filled = StatisticalImputer::apply_constant_to_text_columns(&mut df, &[], steps)?;

        info!("Step 4: Deriving customer attributes...");
        FeatureDeriver::derive_tenure_group(&mut df, &tenure, steps)?;
        FeatureDeriver::derive_charge_segment(&mut df, &monthly, steps)?;
        FeatureDeriver::derive_multi_line_flag(&mut df, &lines, steps)?;
        summary.unmapped_contracts = FeatureDeriver::derive_contract_code(&mut df, &contract, steps)?;

        info!("Step 5: Dropping identifier columns...");
        let mut df = DataCleaner::drop_excluded_columns(df, steps);

        info!("Step 6: Normalizing column names...");
        DataCleaner::lowercase_column_names(&mut df, steps)?;

        summary.rows_out = df.height();
        summary.columns_out = df.width();
        debug!("Transform steps: {:?}", summary.processing_steps);

        Ok((df, summary))
    }

    /// Read `raw_path`, transform it and write the staged CSV to `staged_path`.
    pub fn transform_file(raw_path: &Path, staged_path: &Path) -> Result<TransformSummary> {
        info!("Transforming {}", raw_path.display());

        let df = read_csv(raw_path)?;
        let (mut staged, summary) =
            Self::transform_frame(df).context(format!("Transforming {}", raw_path.display()))?;

        info!("Step 7: Writing staged table...");
        write_csv(&mut staged, staged_path)?;

        info!(
            "Staged {} rows x {} columns to {}",
            summary.rows_out,
            summary.columns_out,
            staged_path.display()
        );
        Ok(summary)
    }
}
