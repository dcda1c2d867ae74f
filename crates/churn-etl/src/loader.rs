//! Load stage: staged CSV into the table store.

use crate::error::{Result, ResultExt};
use crate::store::TableStore;
use crate::utils::read_csv;
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// Result of a load.
#[derive(Debug, Clone, Serialize)]
pub struct LoadOutcome {
    pub table: String,
    pub rows_written: usize,
}

/// Pushes the staged table into a [`TableStore`].
pub struct Loader;

impl Loader {
    /// Read `staged_path` and insert its rows into `table`.
    pub fn load(staged_path: &Path, store: &dyn TableStore, table: &str) -> Result<LoadOutcome> {
        let frame = read_csv(staged_path)?;
        info!(
            "Loading {} rows from {} into {} table {}",
            frame.height(),
            staged_path.display(),
            store.name(),
            table
        );

        let rows_written = store
            .write_table(table, &frame)
            .context(format!("Loading into table '{}'", table))?;

        Ok(LoadOutcome {
            table: table.to_string(),
            rows_written,
        })
    }
}
