//! Persisting audit results as indented JSON

use crate::error::AxeError;
use crate::results::AxeResults;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Filename used when no destination path is given.
pub const DEFAULT_RESULTS_FILE: &str = "results.json";

/// Serialize `output` as pretty-printed JSON and write it to `path`,
/// falling back to [`DEFAULT_RESULTS_FILE`] in the current directory.
/// Any existing file at the destination is overwritten. Returns the path
/// actually written.
pub async fn write_results<T: Serialize>(
    output: &T,
    path: Option<&Path>,
) -> Result<PathBuf, AxeError> {
    let path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_RESULTS_FILE));

    let json = serde_json::to_string_pretty(output)?;
    tokio::fs::write(&path, json)
        .await
        .map_err(|e| AxeError::WriteFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;

    debug!("Wrote results to {}", path.display());
    Ok(path)
}

/// Read a previously written results file back into an [`AxeResults`].
pub async fn read_results(path: &Path) -> Result<AxeResults, AxeError> {
    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        AxeError::IoError(format!("failed to read {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&content).map_err(|e| AxeError::InvalidResults(e.to_string()))
}
