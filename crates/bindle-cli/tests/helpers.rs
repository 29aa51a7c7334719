//! Shared fixtures for CLI tests.

#![allow(dead_code, clippy::disallowed_methods)]

use std::path::Path;

use assert_cmd::Command;
use tempfile::TempDir;

/// Temporary project containing `files` (paths relative to the root).
pub fn project(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (path, contents) in files {
        let path = dir.path().join(path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, contents).unwrap();
    }
    dir
}

/// `bindle` with colors and environment overrides disabled, run in `cwd`.
pub fn bindle(cwd: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_bindle"));
    cmd.current_dir(cwd)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("BINDLE_ENTRY");
    cmd
}

pub fn read(path: impl AsRef<Path>) -> String {
    std::fs::read_to_string(path).unwrap()
}
