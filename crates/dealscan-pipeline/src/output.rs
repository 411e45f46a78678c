//! Output layout and JSON persistence.
//!
//! ```text
//! <root>/
//!   all_deals.json                     aggregated, sorted
//!   <stem>/<stem>_<first>-<last>.json  one file per batch
//! ```

use std::path::{Path, PathBuf};

use dealscan_core::DealRecord;

use crate::error::PipelineError;

/// File name of the aggregated artifact under the output root.
pub const FINAL_ARTIFACT: &str = "all_deals.json";

/// Path of the file a batch covering positions `first..=last` of `stem` is
/// written to.
#[must_use]
pub fn batch_file_path(root: &Path, stem: &str, first: usize, last: usize) -> PathBuf {
    root.join(stem).join(format!("{stem}_{first}-{last}.json"))
}

/// Removes any previous output under `root` and recreates it empty.
///
/// # Errors
///
/// Returns [`PipelineError::Persist`] if the directory cannot be removed or
/// created.
pub async fn reset_output_root(root: &Path) -> Result<(), PipelineError> {
    let persist_err = |source| PipelineError::Persist {
        path: root.to_path_buf(),
        source,
    };

    match tokio::fs::remove_dir_all(root).await {
        Ok(()) => tracing::debug!(root = %root.display(), "cleared previous output"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(persist_err(e)),
    }
    tokio::fs::create_dir_all(root).await.map_err(persist_err)
}

/// Writes `records` as a pretty-printed JSON array, creating parent
/// directories as needed and replacing any existing file.
///
/// # Errors
///
/// - [`PipelineError::Serialize`] if the records cannot be encoded.
/// - [`PipelineError::Persist`] if the file cannot be written.
pub async fn write_records(path: &Path, records: &[DealRecord]) -> Result<(), PipelineError> {
    let json = serde_json::to_string_pretty(records).map_err(|e| PipelineError::Serialize {
        path: path.to_path_buf(),
        source: e,
    })?;

    let persist_err = |source| PipelineError::Persist {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(persist_err)?;
    }
    tokio::fs::write(path, json).await.map_err(persist_err)
}
