use std::path::PathBuf;

use dealscan_catalog::CatalogError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("input directory not found: {}", path.display())]
    InputDirMissing { path: PathBuf },

    #[error("failed to read input {}: {source}", path.display())]
    Input {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A provider call failed; the run stops at this batch.
    #[error("fetch failed for {source_name} identifiers {first}-{last}: {source}")]
    Fetch {
        source_name: String,
        first: usize,
        last: usize,
        #[source]
        source: CatalogError,
    },

    #[error("failed to persist {}: {source}", path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize records for {}: {source}", path.display())]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
