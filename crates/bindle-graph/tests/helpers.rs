//! Shared test utilities for bindle-graph integration tests.

#![allow(dead_code)]
#![allow(clippy::disallowed_methods)]

use std::path::Path;
use std::sync::Arc;

use bindle_graph::{ModuleBuilder, ModuleId, NativeRuntime, Runtime};
use tempfile::TempDir;

/// Write `(relative path, contents)` pairs into a fresh temporary directory.
pub fn project(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().expect("create temp dir");
    for (relative, contents) in files {
        let path = dir.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create fixture dir");
        }
        std::fs::write(&path, contents).expect("write fixture");
    }
    dir
}

/// Canonical id of a file inside a temporary project.
pub fn id_in(root: &Path, relative: &str) -> ModuleId {
    ModuleId::new(root.join(relative)).expect("absolute fixture path")
}

pub fn native_runtime() -> Arc<dyn Runtime> {
    Arc::new(NativeRuntime)
}

pub fn native_builder() -> ModuleBuilder {
    ModuleBuilder::new(native_runtime())
}
