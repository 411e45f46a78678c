//! Input discovery: one listing file per source.

use std::path::{Path, PathBuf};

use crate::error::PipelineError;

/// A listing file: one reference per line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputSource {
    pub path: PathBuf,
    /// File name without extension; names the per-source output directory.
    pub stem: String,
}

impl InputSource {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        let stem = path
            .file_stem()
            .map_or_else(|| "input".to_owned(), |s| s.to_string_lossy().into_owned());
        Self { path, stem }
    }
}

fn is_listing_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"))
}

/// Lists the `*.txt` files directly inside `dir`, sorted by path.
///
/// # Errors
///
/// - [`PipelineError::InputDirMissing`] if `dir` does not exist or is not a
///   directory.
/// - [`PipelineError::Input`] if the directory cannot be listed.
pub async fn discover_sources(dir: &Path) -> Result<Vec<InputSource>, PipelineError> {
    let is_dir = tokio::fs::metadata(dir)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false);
    if !is_dir {
        return Err(PipelineError::InputDirMissing {
            path: dir.to_path_buf(),
        });
    }

    let io_err = |source| PipelineError::Input {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = tokio::fs::read_dir(dir).await.map_err(io_err)?;
    let mut paths = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(io_err)? {
        let path = entry.path();
        let is_file = entry.file_type().await.map_err(io_err)?.is_file();
        if is_file && is_listing_file(&path) {
            paths.push(path);
        }
    }
    paths.sort();

    tracing::debug!(dir = %dir.display(), sources = paths.len(), "discovered input sources");
    Ok(paths.into_iter().map(InputSource::new).collect())
}

/// Reads a source's full text.
///
/// # Errors
///
/// Returns [`PipelineError::Input`] if the file cannot be read as UTF-8.
pub async fn read_source(source: &InputSource) -> Result<String, PipelineError> {
    tokio::fs::read_to_string(&source.path)
        .await
        .map_err(|e| PipelineError::Input {
            path: source.path.clone(),
            source: e,
        })
}
