//! Imputation module for handling missing values.
//!
//! This module provides the statistical imputation strategies used by the
//! transform stage:
//! - Median imputation for numeric columns
//! - Constant imputation for text columns

mod statistical;

pub use statistical::{EMPTY_COLUMN_FALLBACK, MedianFill, StatisticalImputer};
