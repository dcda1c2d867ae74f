//! Derived columns added by the transform stage.
//!
//! Each derivation reads one source column and appends one new column. Rows
//! are independent of each other, so the functions only map values.

use crate::error::Result;
use crate::types::{ChargeSegment, ContractType, TenureGroup, staged};
use crate::utils::{series_to_f64, series_to_strings};
use polars::prelude::*;
use tracing::{debug, warn};

/// Appends the derived customer attributes to a frame.
pub struct FeatureDeriver;

impl FeatureDeriver {
    /// Add `tenure_group` from the tenure column.
    pub fn derive_tenure_group(
        df: &mut DataFrame,
        tenure_col: &str,
        processing_steps: &mut Vec<String>,
    ) -> Result<()> {
        let tenure = series_to_f64(df.column(tenure_col)?.as_materialized_series())?;
        let groups: Vec<Option<&str>> = tenure
            .into_iter()
            .map(|v| v.map(|t| TenureGroup::from_tenure(t).as_str()))
            .collect();

        df.with_column(Series::new(staged::TENURE_GROUP.into(), groups))?;
        processing_steps.push(format!("Derived '{}' from '{}'", staged::TENURE_GROUP, tenure_col));
        Ok(())
    }

    /// Add `monthly_charge_segment` from the monthly charge column.
    pub fn derive_charge_segment(
        df: &mut DataFrame,
        charges_col: &str,
        processing_steps: &mut Vec<String>,
    ) -> Result<()> {
        let charges = series_to_f64(df.column(charges_col)?.as_materialized_series())?;
        let segments: Vec<Option<&str>> = charges
            .into_iter()
            .map(|v| v.map(|c| ChargeSegment::from_monthly_charge(c).as_str()))
            .collect();

        df.with_column(Series::new(staged::MONTHLY_CHARGE_SEGMENT.into(), segments))?;
        processing_steps.push(format!(
            "Derived '{}' from '{}'",
            staged::MONTHLY_CHARGE_SEGMENT,
            charges_col
        ));
        Ok(())
    }

    /// Add `is_multi_line_user`: 1 when the value is exactly `"Yes"`, else 0.
    pub fn derive_multi_line_flag(
        df: &mut DataFrame,
        lines_col: &str,
        processing_steps: &mut Vec<String>,
    ) -> Result<()> {
        let lines = series_to_strings(df.column(lines_col)?.as_materialized_series())?;
        let flags: Vec<i64> = lines
            .iter()
            .map(|v| i64::from(v.as_deref() == Some("Yes")))
            .collect();
        let multi_line = flags.iter().sum::<i64>();

        df.with_column(Series::new(staged::IS_MULTI_LINE_USER.into(), flags))?;
        processing_steps.push(format!(
            "Derived '{}' from '{}' ({} multi-line users)",
            staged::IS_MULTI_LINE_USER,
            lines_col,
            multi_line
        ));
        Ok(())
    }

    /// Add `contract_type_code` from the contract label.
    ///
    /// Labels outside the known contract terms become null. Returns how many
    /// non-null labels could not be mapped.
    pub fn derive_contract_code(
        df: &mut DataFrame,
        contract_col: &str,
        processing_steps: &mut Vec<String>,
    ) -> Result<usize> {
        let labels = series_to_strings(df.column(contract_col)?.as_materialized_series())?;

        let mut unmapped = 0;
        let codes: Vec<Option<i64>> = labels
            .iter()
            .map(|label| {
                let code = label
                    .as_deref()
                    .and_then(ContractType::from_label)
                    .map(|c| c.code());
                if code.is_none() && label.is_some() {
                    unmapped += 1;
                }
                code
            })
            .collect();

        df.with_column(Series::new(staged::CONTRACT_TYPE_CODE.into(), codes))?;

        if unmapped > 0 {
            warn!(
                "{} '{}' values did not match a known contract term and were set to null",
                unmapped, contract_col
            );
        }
        processing_steps.push(format!(
            "Derived '{}' from '{}' ({} unmapped)",
            staged::CONTRACT_TYPE_CODE,
            contract_col,
            unmapped
        ));
        debug!("Contract codes derived, {} unmapped", unmapped);

        Ok(unmapped)
    }
}
