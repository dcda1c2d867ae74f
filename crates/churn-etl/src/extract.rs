//! Extract stage: copy the vendor CSV into raw staging, byte for byte.

use crate::error::{EtlError, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// What the extractor produced.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractOutcome {
    pub raw_path: PathBuf,
    pub bytes_copied: u64,
}

/// Copies a source table to the raw-staging location without parsing it.
pub struct Extractor;

impl Extractor {
    /// Copy `source` to `raw_dir/file_name`, creating `raw_dir` and
    /// replacing any previous copy.
    pub fn extract(source: &Path, raw_dir: &Path, file_name: &str) -> Result<ExtractOutcome> {
        if !source.is_file() {
            return Err(EtlError::SourceNotFound(source.to_path_buf()));
        }

        fs::create_dir_all(raw_dir).map_err(|e| EtlError::write_failed(raw_dir, e))?;

        let raw_path = raw_dir.join(file_name);
        if is_same_file(source, &raw_path) {
            let bytes_copied = fs::metadata(source)?.len();
            info!("{} is already in raw staging, nothing to copy", source.display());
            return Ok(ExtractOutcome {
                raw_path,
                bytes_copied,
            });
        }

        let bytes_copied =
            fs::copy(source, &raw_path).map_err(|e| EtlError::write_failed(&raw_path, e))?;

        info!(
            "Extracted {} -> {} ({} bytes)",
            source.display(),
            raw_path.display(),
            bytes_copied
        );

        Ok(ExtractOutcome {
            raw_path,
            bytes_copied,
        })
    }
}

/// True when both paths resolve to the same existing file.
fn is_same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
