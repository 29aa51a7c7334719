//! Source transformer seam.
//!
//! A transformer turns module text into executable code plus the list of
//! specifiers it imports. Resolution of those specifiers to canonical ids is
//! the module builder's job, so transformers may return either the raw
//! specifier or a path already joined to the importer's directory.

mod import_rewriter;

pub use import_rewriter::ImportRewriter;

use std::path::Path;

use indexmap::IndexMap;

/// Output of a successful transform.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformOutput {
    /// Specifier → resolved path (relative to the importer, or absolute).
    pub dependencies: IndexMap<String, String>,
    pub code: String,
}

/// The transformer rejected its input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} (line {line})")]
pub struct TransformError {
    pub message: String,
    pub line: usize,
}

impl TransformError {
    pub fn new(message: impl Into<String>, line: usize) -> Self {
        Self {
            message: message.into(),
            line,
        }
    }
}

/// Turns raw module text into `{ dependencies, code }`.
pub trait SourceTransformer: Send + Sync + std::fmt::Debug {
    fn transform(&self, source: &str, path: &Path) -> Result<TransformOutput, TransformError>;
}
