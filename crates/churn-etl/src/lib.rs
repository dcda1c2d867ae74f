//! Telco Churn ETL Library
//!
//! A batch extract-transform-load workflow for the telco customer churn
//! dataset, built with Rust and Polars.
//!
//! # Overview
//!
//! The workflow runs five stages, each a single pass over an in-memory table:
//!
//! - **Extract**: Copy the vendor CSV verbatim into raw staging
//! - **Transform**: Coerce and impute values, derive tenure groups, charge
//!   segments, multi-line flags and contract codes, normalize column names
//! - **Load**: Insert the staged table into a hosted table store
//! - **Validate**: Compare the loaded table with the staged file
//! - **Analyze**: Compute churn metrics, write a summary CSV and charts
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use churn_etl::{Pipeline, PipelineConfig, StoreConfig};
//! use churn_etl::store::SupabaseStore;
//! use std::sync::Arc;
//!
//! dotenv::dotenv().ok();
//! let store = Arc::new(SupabaseStore::new(StoreConfig::from_env()?)?);
//!
//! let summary = Pipeline::builder()
//!     .config(PipelineConfig::builder().data_dir("data").build()?)
//!     .store(store)
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .run()?;
//!
//! if let Some(report) = &summary.validation {
//!     println!("{}", report);
//! }
//! println!("Churn: {:.2}%", summary.analysis.summary.churn_percentage);
//! ```
//!
//! # Table Stores
//!
//! The load, validate and analyze stages talk to the hosted table through
//! the [`store::TableStore`] trait:
//!
//! - [`store::SupabaseStore`] - Supabase REST API (`supabase` feature)
//! - [`store::InMemoryStore`] - process-local tables
//!
//! # Running Stages Individually
//!
//! ```rust,ignore
//! use churn_etl::{Extractor, Transformer};
//!
//! Extractor::extract("source.csv".as_ref(), "data/raw".as_ref(), "telco_raw.csv")?;
//! let summary = Transformer::transform_file(
//!     "data/raw/telco_raw.csv".as_ref(),
//!     "data/staged/telco_customer_transformed.csv".as_ref(),
//! )?;
//! println!("{} rows staged", summary.rows_out);
//! ```

pub mod analysis;
pub mod cleaner;
pub mod config;
pub mod error;
pub mod extract;
pub mod features;
pub mod imputers;
pub mod loader;
pub mod pipeline;
pub mod store;
pub mod types;
pub mod utils;
pub mod validation;

// Re-exports for convenient access
pub use analysis::{AnalysisOutcome, AnalysisSummary, Analyzer};
pub use cleaner::DataCleaner;
pub use config::{
    ConfigValidationError, PipelineConfig, PipelineConfigBuilder, StoreConfig, StoreConfigBuilder,
};
pub use error::{EtlError, Result, ResultExt};
pub use extract::{ExtractOutcome, Extractor};
pub use features::FeatureDeriver;
pub use imputers::{MedianFill, StatisticalImputer};
pub use loader::{LoadOutcome, Loader};
pub use pipeline::{
    ClosureProgressReporter, EtlStage, Pipeline, PipelineBuilder, ProgressReporter,
    ProgressUpdate, RunSummary, TransformSummary, Transformer,
};
pub use store::{InMemoryStore, TableStore};
pub use types::{ChargeSegment, ContractType, TenureGroup};
pub use validation::{CheckResult, CheckStatus, ValidationReport, Validator};
