//! Shared test utilities for bindle-bundler tests

#![allow(dead_code)]

use std::sync::Arc;

use bindle_bundler::{BundleConfig, Runtime, TestRuntime};
use parking_lot::Mutex;

/// In-memory project rooted at `/`.
pub fn test_runtime(files: &[(&str, &str)]) -> Arc<TestRuntime> {
    Arc::new(TestRuntime::with_files("/", files.iter().copied()))
}

/// Config writing to `/dist/main.js` inside `runtime`.
pub fn test_config(runtime: &Arc<TestRuntime>, entry: &str) -> BundleConfig {
    let runtime: Arc<dyn Runtime> = Arc::clone(runtime) as Arc<dyn Runtime>;
    BundleConfig::new(entry)
        .cwd("/")
        .output_dir("/dist")
        .runtime(runtime)
}

/// Shared, ordered event log for listeners.
#[derive(Debug, Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<String>>>);

impl EventLog {
    pub fn push(&self, event: impl Into<String>) {
        self.0.lock().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    pub fn position(&self, event: &str) -> Option<usize> {
        self.0.lock().iter().position(|e| e == event)
    }
}
