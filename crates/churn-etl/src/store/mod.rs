//! Table store module for the hosted copy of the staged table.
//!
//! The load, validate and analyze stages reach the external database only
//! through the [`TableStore`] trait, so they work against any backend:
//!
//! - [`SupabaseStore`] - PostgREST endpoint of a Supabase project (requires
//!   the `supabase` feature)
//! - [`InMemoryStore`] - process-local tables, used by tests and dry runs
//!
//! # Feature Flag
//!
//! ```toml
//! # HTTP store (default)
//! churn-etl = { version = "0.1", features = ["supabase"] }
//!
//! # Trait and in-memory store only
//! churn-etl = { version = "0.1", default-features = false }
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use churn_etl::store::{InMemoryStore, TableStore};
//!
//! let store = InMemoryStore::new();
//! store.write_table("telco_churn", &staged)?;
//! let loaded = store.read_table("telco_churn")?;
//! ```

mod conversion;
mod memory;

#[cfg(feature = "supabase")]
mod supabase;

pub use conversion::{frame_to_rows, rows_to_frame};
pub use memory::InMemoryStore;

#[cfg(feature = "supabase")]
pub use supabase::{SupabaseConfig, SupabaseConfigBuilder, SupabaseStore};

use crate::error::Result;
use polars::prelude::DataFrame;

/// Trait for backends that hold the loaded customer table.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so a store can be shared behind an
/// `Arc` by every stage of a run.
///
/// # Error Handling
///
/// Backend failures are reported as [`crate::EtlError::Store`] (or
/// `HttpRequest` for transport errors). Callers do not retry.
pub trait TableStore: Send + Sync {
    /// Insert every row of `frame` into `table`.
    ///
    /// Rows are appended; existing rows are left in place.
    fn write_table(&self, table: &str, frame: &DataFrame) -> Result<usize>;

    /// Fetch every row of `table`.
    ///
    /// A table with no rows yields an empty frame rather than an error.
    fn read_table(&self, table: &str) -> Result<DataFrame>;

    /// Backend name for logging.
    fn name(&self) -> &str;
}
