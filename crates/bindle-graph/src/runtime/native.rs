use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::{IoOp, Runtime, RuntimeError, RuntimeResult};

/// [`Runtime`] over the real file system, via `tokio::fs`.
///
/// Needs a tokio runtime with the blocking pool available.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeRuntime;

fn map_io(op: IoOp, path: &Path, err: io::Error) -> RuntimeError {
    if op == IoOp::Read && err.kind() == io::ErrorKind::NotFound {
        RuntimeError::FileNotFound(path.to_path_buf())
    } else {
        RuntimeError::io(op, path, err)
    }
}

#[async_trait]
impl Runtime for NativeRuntime {
    async fn read_file(&self, path: &Path) -> RuntimeResult<Vec<u8>> {
        tokio::fs::read(path)
            .await
            .map_err(|err| map_io(IoOp::Read, path, err))
    }

    async fn write_file(&self, path: &Path, content: &[u8]) -> RuntimeResult<()> {
        tokio::fs::write(path, content)
            .await
            .map_err(|err| map_io(IoOp::Write, path, err))
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    async fn create_dir(&self, path: &Path, recursive: bool) -> RuntimeResult<()> {
        let result = if recursive {
            tokio::fs::create_dir_all(path).await
        } else {
            tokio::fs::create_dir(path).await
        };
        result.map_err(|err| map_io(IoOp::CreateDir, path, err))
    }

    fn get_cwd(&self) -> RuntimeResult<PathBuf> {
        std::env::current_dir().map_err(|err| RuntimeError::Cwd(err.to_string()))
    }
}
