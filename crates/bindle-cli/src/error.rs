//! Error types for the bindle CLI.
//!
//! Configuration problems carry a `Hint:` line telling the user what to
//! change. Bundler failures are passed through untouched so their
//! diagnostic codes and help text reach the terminal.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level CLI error.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Bundle(#[from] bindle_bundler::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Custom(String),
}

/// Problems with `bindle.config.json`, `BINDLE_*` variables or flags.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "Config file not found: {}\n\nHint: Create bindle.config.json or drop the --config flag",
        .0.display()
    )]
    NotFound(PathBuf),

    #[error("Invalid configuration: {message}\n\nHint: {hint}")]
    Invalid { message: String, hint: String },

    #[error("Missing required field: {field}\n\nHint: {hint}")]
    MissingField { field: String, hint: String },

    #[error("Invalid rule pattern '{pattern}': {message}\n\nHint: `test` is a regular expression matched against the module path")]
    InvalidPattern { pattern: String, message: String },

    #[error("Unknown loader '{name}'\n\nHint: Available loaders: {}", .known.join(", "))]
    UnknownLoader { name: String, known: Vec<String> },

    #[error("Unknown plugin '{name}'\n\nHint: Available plugins: {}", .known.join(", "))]
    UnknownPlugin { name: String, known: Vec<String> },
}

/// Result type alias using `CliError` as the default error type.
pub type Result<T, E = CliError> = std::result::Result<T, E>;

/// Extension trait for adding context to `Result` types.
pub trait ResultExt<T> {
    /// Turn a not-found I/O error into [`CliError::FileNotFound`] for `path`.
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T>;

    /// Append a `Hint:` line to the error message.
    fn with_hint(self, hint: impl std::fmt::Display) -> Result<T>;
}

impl<T, E: Into<CliError>> ResultExt<T> for std::result::Result<T, E> {
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T> {
        self.map_err(|e| match e.into() {
            CliError::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound => {
                CliError::FileNotFound(path.as_ref().to_path_buf())
            }
            other => other,
        })
    }

    fn with_hint(self, hint: impl std::fmt::Display) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            CliError::Custom(format!("{}\n\nHint: {}", err, hint))
        })
    }
}

/// Convert a [`CliError`] into a report for `main`.
///
/// Bundler errors keep their `miette::Diagnostic` implementation. A failure
/// after the artifact was written says so, since the output file is on disk.
pub fn cli_error_to_miette(err: CliError) -> miette::Report {
    match err {
        CliError::Bundle(e) => {
            let written = match &e {
                bindle_bundler::Error::PostProcess { artifact, .. } => Some(artifact.clone()),
                _ => None,
            };
            let report = miette::Report::new(e);
            match written {
                Some(path) => report.wrap_err(format!(
                    "Bundle was written to {}, but a post-emit step failed",
                    path.display()
                )),
                None => report,
            }
        }
        CliError::Config(e) => miette::miette!("Configuration error: {}", e),
        other => miette::miette!("{}", other),
    }
}
