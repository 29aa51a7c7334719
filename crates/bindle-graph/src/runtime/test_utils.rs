//! In-memory runtime for tests.
//!
//! `TestRuntime` keeps files and directories in hash maps so graph
//! construction and artifact writing can be exercised without touching disk.
//! Paths are cleaned and resolved against a virtual working directory before
//! lookup, mirroring how the native runtime sees them.

use async_trait::async_trait;
use parking_lot::RwLock;
use path_clean::PathClean;
use rustc_hash::{FxHashMap, FxHashSet};
use std::path::{Path, PathBuf};

use super::{IoOp, Runtime, RuntimeError, RuntimeResult};

/// Virtual file system implementing [`Runtime`].
#[derive(Debug)]
pub struct TestRuntime {
    cwd: PathBuf,
    files: RwLock<FxHashMap<PathBuf, Vec<u8>>>,
    dirs: RwLock<FxHashSet<PathBuf>>,
}

impl TestRuntime {
    /// Create an empty runtime rooted at `cwd`.
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        let cwd = cwd.into();
        let mut dirs = FxHashSet::default();
        for ancestor in cwd.ancestors() {
            dirs.insert(ancestor.to_path_buf());
        }
        Self {
            cwd,
            files: RwLock::new(FxHashMap::default()),
            dirs: RwLock::new(dirs),
        }
    }

    /// Create a runtime pre-populated with `(path, contents)` pairs.
    pub fn with_files<I, P, C>(cwd: impl Into<PathBuf>, files: I) -> Self
    where
        I: IntoIterator<Item = (P, C)>,
        P: AsRef<Path>,
        C: AsRef<str>,
    {
        let runtime = Self::new(cwd);
        for (path, contents) in files {
            runtime.add_file(path, contents.as_ref());
        }
        runtime
    }

    /// Add (or replace) a file. Parent directories are created implicitly.
    pub fn add_file(&self, path: impl AsRef<Path>, contents: impl Into<Vec<u8>>) {
        let path = self.normalize(path.as_ref());
        self.insert_ancestors(&path);
        self.files.write().insert(path, contents.into());
    }

    /// Contents of a file as UTF-8, if present.
    pub fn file_contents(&self, path: impl AsRef<Path>) -> Option<String> {
        let path = self.normalize(path.as_ref());
        self.files
            .read()
            .get(&path)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    /// Whether `path` has been created as a directory.
    pub fn has_dir(&self, path: impl AsRef<Path>) -> bool {
        let path = self.normalize(path.as_ref());
        self.dirs.read().contains(&path)
    }

    fn normalize(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.clean()
        } else {
            self.cwd.join(path).clean()
        }
    }

    fn insert_ancestors(&self, path: &Path) {
        let mut dirs = self.dirs.write();
        for ancestor in path.ancestors().skip(1) {
            dirs.insert(ancestor.to_path_buf());
        }
    }
}

#[async_trait]
impl Runtime for TestRuntime {
    async fn read_file(&self, path: &Path) -> RuntimeResult<Vec<u8>> {
        let path = self.normalize(path);
        self.files
            .read()
            .get(&path)
            .cloned()
            .ok_or(RuntimeError::FileNotFound(path))
    }

    async fn write_file(&self, path: &Path, content: &[u8]) -> RuntimeResult<()> {
        let path = self.normalize(path);
        let parent_exists = path
            .parent()
            .is_none_or(|parent| self.dirs.read().contains(parent));
        if !parent_exists {
            return Err(RuntimeError::io(
                IoOp::Write,
                path,
                "parent directory does not exist",
            ));
        }
        self.files.write().insert(path, content.to_vec());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        let path = self.normalize(path);
        self.files.read().contains_key(&path)
    }

    async fn create_dir(&self, path: &Path, recursive: bool) -> RuntimeResult<()> {
        let path = self.normalize(path);
        if recursive {
            self.insert_ancestors(&path);
        } else {
            let parent_exists = path
                .parent()
                .is_none_or(|parent| self.dirs.read().contains(parent));
            if !parent_exists {
                return Err(RuntimeError::io(
                    IoOp::CreateDir,
                    path,
                    "parent directory does not exist",
                ));
            }
        }
        self.dirs.write().insert(path);
        Ok(())
    }

    fn get_cwd(&self) -> RuntimeResult<PathBuf> {
        Ok(self.cwd.clone())
    }
}
