//! File-system seam for the compiler.
//!
//! Module sources are read and the artifact is written through [`Runtime`]
//! only. [`NativeRuntime`](native::NativeRuntime) talks to the disk;
//! `TestRuntime` (behind `test-utils`) keeps a virtual tree in memory.

#[cfg(not(target_family = "wasm"))]
pub mod native;

#[cfg(any(
    all(any(test, doctest), not(target_family = "wasm")),
    all(feature = "test-utils", not(target_family = "wasm"))
))]
pub mod test_utils;

use std::fmt;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// File-system operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoOp {
    Read,
    Write,
    CreateDir,
}

impl fmt::Display for IoOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IoOp::Read => "read",
            IoOp::Write => "write",
            IoOp::CreateDir => "create directory",
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// Reported by `read_file` only; the builder turns it into a
    /// module-level `FileNotFound`.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to {op} '{path}': {message}")]
    Io {
        op: IoOp,
        path: PathBuf,
        message: String,
    },

    #[error("Cannot determine working directory: {0}")]
    Cwd(String),
}

impl RuntimeError {
    pub fn io(op: IoOp, path: impl Into<PathBuf>, message: impl fmt::Display) -> Self {
        RuntimeError::Io {
            op,
            path: path.into(),
            message: message.to_string(),
        }
    }
}

/// Async file access used by the module builder and the artifact writer.
///
/// Relative paths are interpreted against [`get_cwd`](Runtime::get_cwd).
#[async_trait]
pub trait Runtime: Send + Sync + fmt::Debug {
    async fn read_file(&self, path: &Path) -> RuntimeResult<Vec<u8>>;

    /// Overwrites `path`. The parent directory must already exist.
    async fn write_file(&self, path: &Path, content: &[u8]) -> RuntimeResult<()>;

    /// True only for regular files; used for extension probing.
    fn exists(&self, path: &Path) -> bool;

    async fn create_dir(&self, path: &Path, recursive: bool) -> RuntimeResult<()>;

    fn get_cwd(&self) -> RuntimeResult<PathBuf>;
}
