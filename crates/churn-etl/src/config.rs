//! Configuration types for the ETL workflow.
//!
//! [`PipelineConfig`] describes where every stage reads and writes, and
//! [`StoreConfig`] carries the credentials of the hosted table store. Both are
//! built through builders that validate at construction time so that a bad
//! setting fails before any stage runs.

use crate::error::EtlError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable holding the table store endpoint.
pub const STORE_URL_ENV: &str = "SUPABASE_URL";

/// Environment variable holding the table store access key.
pub const STORE_KEY_ENV: &str = "SUPABASE_KEY";

/// Default table name in the hosted store.
pub const DEFAULT_TABLE_NAME: &str = "telco_churn";

/// Default request timeout for the store client in seconds.
pub const DEFAULT_STORE_TIMEOUT_SECS: u64 = 30;

/// Configuration for the ETL workflow.
///
/// Use [`PipelineConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use churn_etl::config::PipelineConfig;
///
/// let config = PipelineConfig::builder()
///     .source_file("WA_Fn-UseC_-Telco-Customer-Churn.csv")
///     .data_dir("data")
///     .table_name("telco_churn")
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Vendor CSV the extractor copies from.
    /// Default: "WA_Fn-UseC_-Telco-Customer-Churn.csv"
    pub source_file: PathBuf,

    /// Directory receiving the verbatim raw copy.
    /// Default: "data/raw"
    pub raw_dir: PathBuf,

    /// File name of the raw copy inside `raw_dir`.
    /// Default: "telco_raw.csv"
    pub raw_file_name: String,

    /// Directory receiving the transformed table.
    /// Default: "data/staged"
    pub staged_dir: PathBuf,

    /// File name of the staged table inside `staged_dir`.
    /// Default: "telco_customer_transformed.csv"
    pub staged_file_name: String,

    /// Directory for the analysis summary and charts.
    /// Default: "data/processed"
    pub processed_dir: PathBuf,

    /// Name of the table in the hosted store.
    /// Default: "telco_churn"
    pub table_name: String,

    /// Whether the analyzer renders PNG charts.
    /// Default: true
    pub generate_charts: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            source_file: PathBuf::from("WA_Fn-UseC_-Telco-Customer-Churn.csv"),
            raw_dir: PathBuf::from("data/raw"),
            raw_file_name: "telco_raw.csv".to_string(),
            staged_dir: PathBuf::from("data/staged"),
            staged_file_name: "telco_customer_transformed.csv".to_string(),
            processed_dir: PathBuf::from("data/processed"),
            table_name: DEFAULT_TABLE_NAME.to_string(),
            generate_charts: true,
        }
    }
}

impl PipelineConfig {
    /// Create a new configuration builder.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Full path of the raw-staging file.
    pub fn raw_path(&self) -> PathBuf {
        self.raw_dir.join(&self.raw_file_name)
    }

    /// Full path of the staged file.
    pub fn staged_path(&self) -> PathBuf {
        self.staged_dir.join(&self.staged_file_name)
    }

    /// Full path of the analysis summary CSV.
    pub fn summary_path(&self) -> PathBuf {
        self.processed_dir.join("analysis_summary.csv")
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.table_name.trim().is_empty() {
            return Err(ConfigValidationError::EmptyValue("table_name".to_string()));
        }

        for (field, name) in [
            ("raw_file_name", &self.raw_file_name),
            ("staged_file_name", &self.staged_file_name),
        ] {
            if name.trim().is_empty() {
                return Err(ConfigValidationError::EmptyValue(field.to_string()));
            }
            if Path::new(name).components().count() != 1 {
                return Err(ConfigValidationError::NotAFileName {
                    field: field.to_string(),
                    value: name.clone(),
                });
            }
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("'{0}' must not be empty")]
    EmptyValue(String),

    #[error("'{field}' must be a bare file name, got '{value}'")]
    NotAFileName { field: String, value: String },
}

impl From<ConfigValidationError> for EtlError {
    fn from(err: ConfigValidationError) -> Self {
        EtlError::Configuration(err.to_string())
    }
}

/// Builder for [`PipelineConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    source_file: Option<PathBuf>,
    raw_dir: Option<PathBuf>,
    raw_file_name: Option<String>,
    staged_dir: Option<PathBuf>,
    staged_file_name: Option<String>,
    processed_dir: Option<PathBuf>,
    table_name: Option<String>,
    generate_charts: Option<bool>,
}

impl PipelineConfigBuilder {
    /// Set the vendor CSV path.
    pub fn source_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.source_file = Some(path.into());
        self
    }

    /// Root all three data directories under `dir`
    /// (`dir/raw`, `dir/staged`, `dir/processed`).
    ///
    /// Explicit `raw_dir`, `staged_dir` or `processed_dir` calls take precedence.
    pub fn data_dir(mut self, dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        self.raw_dir.get_or_insert_with(|| dir.join("raw"));
        self.staged_dir.get_or_insert_with(|| dir.join("staged"));
        self.processed_dir.get_or_insert_with(|| dir.join("processed"));
        self
    }

    /// Set the raw-staging directory.
    pub fn raw_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.raw_dir = Some(path.into());
        self
    }

    /// Set the raw-staging file name.
    pub fn raw_file_name(mut self, name: impl Into<String>) -> Self {
        self.raw_file_name = Some(name.into());
        self
    }

    /// Set the staged directory.
    pub fn staged_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.staged_dir = Some(path.into());
        self
    }

    /// Set the staged file name.
    pub fn staged_file_name(mut self, name: impl Into<String>) -> Self {
        self.staged_file_name = Some(name.into());
        self
    }

    /// Set the output directory for the summary and charts.
    pub fn processed_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.processed_dir = Some(path.into());
        self
    }

    /// Set the hosted table name.
    pub fn table_name(mut self, name: impl Into<String>) -> Self {
        self.table_name = Some(name.into());
        self
    }

    /// Enable or disable chart rendering.
    pub fn generate_charts(mut self, generate: bool) -> Self {
        self.generate_charts = Some(generate);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `PipelineConfig` or an error if validation fails.
    pub fn build(self) -> Result<PipelineConfig, ConfigValidationError> {
        let defaults = PipelineConfig::default();
        let config = PipelineConfig {
            source_file: self.source_file.unwrap_or(defaults.source_file),
            raw_dir: self.raw_dir.unwrap_or(defaults.raw_dir),
            raw_file_name: self.raw_file_name.unwrap_or(defaults.raw_file_name),
            staged_dir: self.staged_dir.unwrap_or(defaults.staged_dir),
            staged_file_name: self.staged_file_name.unwrap_or(defaults.staged_file_name),
            processed_dir: self.processed_dir.unwrap_or(defaults.processed_dir),
            table_name: self.table_name.unwrap_or(defaults.table_name),
            generate_charts: self.generate_charts.unwrap_or(defaults.generate_charts),
        };

        config.validate()?;
        Ok(config)
    }
}

/// Connection settings for the hosted table store.
///
/// Construction fails with [`EtlError::Configuration`] when the endpoint or
/// the key is missing, so a client never exists without credentials.
#[derive(Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Base URL of the project, e.g. `https://xyz.supabase.co`.
    pub url: String,
    /// Service or anon key sent with every request.
    pub api_key: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("url", &self.url)
            .field("api_key", &"***")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl StoreConfig {
    /// Create a new configuration builder.
    pub fn builder() -> StoreConfigBuilder {
        StoreConfigBuilder::default()
    }

    /// Read `SUPABASE_URL` and `SUPABASE_KEY` from the process environment.
    ///
    /// Call `dotenv()` beforehand to pick up a `.env` file.
    pub fn from_env() -> Result<Self, EtlError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, EtlError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = Self::builder();
        if let Some(url) = lookup(STORE_URL_ENV) {
            builder = builder.url(url);
        }
        if let Some(key) = lookup(STORE_KEY_ENV) {
            builder = builder.api_key(key);
        }
        builder.build()
    }
}

/// Builder for [`StoreConfig`].
#[derive(Default)]
pub struct StoreConfigBuilder {
    url: Option<String>,
    api_key: Option<String>,
    timeout_secs: Option<u64>,
}

impl StoreConfigBuilder {
    /// Set the endpoint URL.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set the access key.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the request timeout in seconds.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Build the configuration, failing if a credential is absent or blank.
    pub fn build(self) -> Result<StoreConfig, EtlError> {
        let url = self
            .url
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| EtlError::Configuration(format!("Missing {STORE_URL_ENV}")))?;
        let api_key = self
            .api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| EtlError::Configuration(format!("Missing {STORE_KEY_ENV}")))?;

        let timeout_secs = self.timeout_secs.unwrap_or(DEFAULT_STORE_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(EtlError::Configuration(
                "Store timeout must be at least 1 second".to_string(),
            ));
        }

        Ok(StoreConfig {
            url: url.trim().trim_end_matches('/').to_string(),
            api_key: api_key.trim().to_string(),
            timeout_secs,
        })
    }
}
