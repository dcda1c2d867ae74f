//! Supabase table store.
//!
//! This module provides the [`SupabaseStore`] which implements [`TableStore`]
//! over the PostgREST API of a Supabase project (<https://supabase.com/>).
//!
//! Inserts are sent as JSON arrays in fixed-size batches. Reads are paged
//! with `Range` headers until the server returns a short page.

use super::TableStore;
use super::conversion::{JsonRow, frame_to_rows, rows_to_frame};
use crate::config::StoreConfig;
use crate::error::{EtlError, Result};
use polars::prelude::DataFrame;
use reqwest::blocking::{Client, RequestBuilder, Response};
use std::time::Duration;
use tracing::{debug, info};

/// Default number of rows per insert request.
const DEFAULT_INSERT_BATCH_SIZE: usize = 500;

/// Default number of rows per read request.
const DEFAULT_PAGE_SIZE: usize = 1000;

/// Path of the REST API below the project URL.
const REST_PATH: &str = "rest/v1";

/// Request sizing for the Supabase store.
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    /// Rows per insert request.
    pub insert_batch_size: usize,
    /// Rows per read request.
    pub page_size: usize,
}

impl Default for SupabaseConfig {
    fn default() -> Self {
        Self {
            insert_batch_size: DEFAULT_INSERT_BATCH_SIZE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl SupabaseConfig {
    /// Create a new configuration builder.
    pub fn builder() -> SupabaseConfigBuilder {
        SupabaseConfigBuilder::default()
    }
}

/// Builder for [`SupabaseConfig`].
#[derive(Default)]
pub struct SupabaseConfigBuilder {
    insert_batch_size: Option<usize>,
    page_size: Option<usize>,
}

impl SupabaseConfigBuilder {
    /// Set the rows per insert request. Zero falls back to the default.
    pub fn insert_batch_size(mut self, size: usize) -> Self {
        self.insert_batch_size = Some(size);
        self
    }

    /// Set the rows per read request. Zero falls back to the default.
    pub fn page_size(mut self, size: usize) -> Self {
        self.page_size = Some(size);
        self
    }

    /// Build the configuration.
    pub fn build(self) -> SupabaseConfig {
        SupabaseConfig {
            insert_batch_size: self
                .insert_batch_size
                .filter(|&n| n > 0)
                .unwrap_or(DEFAULT_INSERT_BATCH_SIZE),
            page_size: self
                .page_size
                .filter(|&n| n > 0)
                .unwrap_or(DEFAULT_PAGE_SIZE),
        }
    }
}

/// Table store for a Supabase project.
///
/// # Example
///
/// ```rust,ignore
/// use churn_etl::config::StoreConfig;
/// use churn_etl::store::{SupabaseStore, TableStore};
///
/// let store = SupabaseStore::new(StoreConfig::from_env()?)?;
/// let loaded = store.read_table("telco_churn")?;
/// ```
pub struct SupabaseStore {
    store: StoreConfig,
    config: SupabaseConfig,
    client: Client,
}

static_assertions::assert_impl_all!(SupabaseStore: Send, Sync);

impl SupabaseStore {
    /// Create a store with default request sizing.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(store: StoreConfig) -> Result<Self> {
        Self::with_config(store, SupabaseConfig::default())
    }

    /// Create a store with custom request sizing.
    pub fn with_config(store: StoreConfig, config: SupabaseConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(store.timeout_secs))
            .build()
            .map_err(|e| EtlError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            store,
            config,
            client,
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{}/{}", self.store.url, REST_PATH, table)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.store.api_key)
            .header("Authorization", format!("Bearer {}", self.store.api_key))
    }

    fn insert_batch(&self, table: &str, rows: &[JsonRow]) -> Result<()> {
        let response = self
            .authorized(self.client.post(self.table_url(table)))
            .header("Content-Type", "application/json")
            .header("Prefer", "return=minimal")
            .json(rows)
            .send()?;

        check_status(response, &format!("Insert into '{}'", table)).map(|_| ())
    }

    fn fetch_page(&self, table: &str, start: usize) -> Result<Vec<JsonRow>> {
        let end = start + self.config.page_size - 1;
        let response = self
            .authorized(self.client.get(self.table_url(table)))
            .query(&[("select", "*")])
            .header("Range-Unit", "items")
            .header("Range", format!("{}-{}", start, end))
            .send()?;

        let response = check_status(response, &format!("Read of '{}'", table))?;
        Ok(response.json()?)
    }
}

impl TableStore for SupabaseStore {
    fn write_table(&self, table: &str, frame: &DataFrame) -> Result<usize> {
        let rows = frame_to_rows(frame)?;
        let batches = rows.len().div_ceil(self.config.insert_batch_size);

        for (idx, batch) in rows.chunks(self.config.insert_batch_size).enumerate() {
            debug!("Inserting batch {}/{} ({} rows) into {}", idx + 1, batches, batch.len(), table);
            self.insert_batch(table, batch)?;
        }

        info!("Inserted {} rows into Supabase table {}", rows.len(), table);
        Ok(rows.len())
    }

    fn read_table(&self, table: &str) -> Result<DataFrame> {
        let mut rows = Vec::new();

        loop {
            let page = self.fetch_page(table, rows.len())?;
            let short_page = page.len() < self.config.page_size;
            rows.extend(page);
            if short_page {
                break;
            }
        }

        info!("Fetched {} rows from Supabase table {}", rows.len(), table);
        rows_to_frame(&rows)
    }

    fn name(&self) -> &str {
        "Supabase"
    }
}

fn check_status(response: Response, action: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().unwrap_or_default();
    Err(EtlError::Store(format!("{} failed with {}: {}", action, status, body)))
}
