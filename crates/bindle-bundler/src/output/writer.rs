//! Writes the single output artifact through the [`Runtime`].
//!
//! The target directory is created (recursively) if absent, then the file is
//! written in one call. There is no locking and no temp-file dance: one run
//! writes one file once.

use std::path::{Path, PathBuf};

use bindle_graph::Runtime;
use path_clean::PathClean;

use crate::{Error, Result};

/// Write `code` to `{dir}/{filename}` and return the written path.
///
/// # Errors
///
/// - [`Error::InvalidOutputPath`] if `filename` would land outside `dir`
/// - [`Error::WriteFailure`] if the directory or file cannot be written
pub async fn write_artifact(
    runtime: &dyn Runtime,
    dir: &Path,
    filename: &str,
    code: &str,
) -> Result<PathBuf> {
    let dir = dir.clean();
    let target = validate_output_path(&dir, filename)?;

    runtime.create_dir(&dir, true).await.map_err(|e| {
        Error::WriteFailure(format!(
            "Failed to create output directory '{}': {}",
            dir.display(),
            e
        ))
    })?;

    runtime
        .write_file(&target, code.as_bytes())
        .await
        .map_err(|e| {
            Error::WriteFailure(format!("Failed to write '{}': {}", target.display(), e))
        })?;

    tracing::debug!(path = %target.display(), bytes = code.len(), "artifact written");
    Ok(target)
}

/// Validates that `filename` resolves to a path within `dir`.
fn validate_output_path(dir: &Path, filename: &str) -> Result<PathBuf> {
    if filename.is_empty() {
        return Err(Error::InvalidOutputPath("empty filename".into()));
    }
    let target = dir.join(filename).clean();
    if target.parent() != Some(dir) {
        return Err(Error::InvalidOutputPath(format!(
            "'{}' escapes output directory '{}'",
            filename,
            dir.display()
        )));
    }
    Ok(target)
}
