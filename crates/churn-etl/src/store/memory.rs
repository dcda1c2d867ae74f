//! Process-local table store.

use super::TableStore;
use crate::error::{EtlError, Result};
use parking_lot::RwLock;
use polars::prelude::*;
use std::collections::HashMap;
use tracing::debug;

/// Table store backed by a map of frames.
///
/// Writes append to the named table, the same way an insert into a hosted
/// table does. Reading a table that was never written yields an empty frame.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<HashMap<String, DataFrame>>,
}

static_assertions::assert_impl_all!(InMemoryStore: Send, Sync);

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `frame` under `table`.
    pub fn with_table(table: impl Into<String>, frame: DataFrame) -> Self {
        let store = Self::new();
        store.tables.write().insert(table.into(), frame);
        store
    }
}

impl TableStore for InMemoryStore {
    fn write_table(&self, table: &str, frame: &DataFrame) -> Result<usize> {
        let mut tables = self.tables.write();

        match tables.get_mut(table) {
            Some(existing) if existing.width() > 0 => {
                existing.vstack_mut(frame).map_err(|e| {
                    EtlError::Store(format!("Rows do not match table '{}': {}", table, e))
                })?;
            }
            _ => {
                tables.insert(table.to_string(), frame.clone());
            }
        }

        debug!("Inserted {} rows into in-memory table {}", frame.height(), table);
        Ok(frame.height())
    }

    fn read_table(&self, table: &str) -> Result<DataFrame> {
        Ok(self
            .tables
            .read()
            .get(table)
            .cloned()
            .unwrap_or_else(DataFrame::empty))
    }

    fn name(&self) -> &str {
        "in-memory"
    }
}
