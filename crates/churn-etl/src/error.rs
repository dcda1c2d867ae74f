//! Custom error types for the churn ETL workflow.
//!
//! This module provides the error hierarchy shared by every stage using
//! `thiserror`. Extract, transform, load and analyze propagate these errors
//! and abort the run; the validator only surfaces them when it cannot read
//! its inputs at all.
//!
//! Errors are serializable so they can be emitted as JSON alongside reports.

use serde::Serialize;
use serde::ser::SerializeStruct;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the ETL workflow.
#[derive(Error, Debug)]
pub enum EtlError {
    /// Store credentials or pipeline settings are missing or invalid.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The input file does not exist.
    #[error("Source file not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    /// A table has no rows but an aggregate needs at least one.
    #[error("Dataset '{0}' is empty")]
    EmptyDataset(String),

    /// An expected column is absent from a table.
    #[error("Column '{column}' missing from {table}")]
    SchemaMismatch { column: String, table: String },

    /// A destination file or directory could not be written.
    #[error("Failed to write '{}': {source}", path.display())]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The external table store rejected or failed a call.
    #[error("Table store error: {0}")]
    Store(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request error (only with the "supabase" feature).
    #[cfg(feature = "supabase")]
    #[error("HTTP request error: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<EtlError>,
    },
}

impl EtlError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        EtlError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Shorthand for a [`EtlError::SchemaMismatch`].
    pub fn missing_column(column: impl Into<String>, table: impl Into<String>) -> Self {
        EtlError::SchemaMismatch {
            column: column.into(),
            table: table.into(),
        }
    }

    /// Shorthand for a [`EtlError::WriteError`].
    pub fn write_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        EtlError::WriteError {
            path: path.into(),
            source,
        }
    }

    /// Stable error code, printed next to the message.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::SourceNotFound(_) => "SOURCE_NOT_FOUND",
            Self::EmptyDataset(_) => "EMPTY_DATASET",
            Self::SchemaMismatch { .. } => "SCHEMA_MISMATCH",
            Self::WriteError { .. } => "WRITE_ERROR",
            Self::Store(_) => "STORE_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            #[cfg(feature = "supabase")]
            Self::HttpRequest(_) => "STORE_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Check if this error came from the external table store.
    pub fn is_store_error(&self) -> bool {
        self.error_code() == "STORE_ERROR"
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for EtlError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("EtlError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for ETL operations.
pub type Result<T> = std::result::Result<T, EtlError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| EtlError::Polars(e).with_context(context))
    }
}
