#![cfg_attr(docsrs, feature(doc_cfg))]
//! # bindle-bundler
//!
//! Compiler orchestration for bindle: hooks, plugins, and the single-file
//! bundle generator, built on top of `bindle-graph`.
//!
//! ## Quick Start
//!
//! ```no_run
//! use bindle_bundler::{BundleConfig, Plugin, hooks};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let announce = Plugin::callable("announce", |api| {
//!     api.tap_async(hooks::EMIT, |compilation| async move {
//!         if let Some(artifact) = compilation.artifact() {
//!             println!("emitted {}", artifact.path.display());
//!         }
//!         Ok::<_, bindle_bundler::BoxError>(())
//!     })?;
//!     Ok(())
//! });
//!
//! let outcome = BundleConfig::new("./src/index.js")
//!     .output_dir("dist")
//!     .plugin(announce)
//!     .build()
//!     .await?;
//! println!("{} modules", outcome.module_count);
//! # Ok(()) }
//! ```

// Re-export everything from foundation crate
pub use bindle_graph::*;

pub mod compilation;
pub mod compiler;
pub mod config;
pub mod exec;
pub mod generate;
pub mod hooks;
pub mod output;
pub mod plugins;

pub use compilation::{Artifact, Compilation, OutputTarget, Phase};
pub use compiler::{Compiler, RunOutcome};
pub use config::{BundleConfig, OutputConfig};
pub use exec::{CompiledUnit, ExecError, ModuleTable, Scope, compiled_unit};
pub use generate::BundleGenerator;
pub use hooks::{HookError, HookKind, HookRegistry, Listener, ListenerFuture, ListenerResult};
pub use plugins::{Plugin, PluginApi, Registrar};

// Logging utilities (optional, enabled with "logging" feature)
#[cfg(feature = "logging")]
#[cfg_attr(docsrs, doc(cfg(feature = "logging")))]
pub mod logging;

#[cfg(feature = "logging")]
#[cfg_attr(docsrs, doc(cfg(feature = "logging")))]
pub use logging::{LogLevel, init_logging};

/// Boxed error returned by plugins and listeners.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Error types for bindle-bundler operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Building or expanding the module graph failed.
    #[error(transparent)]
    Build(#[from] BuildError),

    /// The assembled graph violates its closure invariant.
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// Hook declaration, registration or invocation failed.
    #[error(transparent)]
    Hook(#[from] HookError),

    /// A plugin failed while being applied.
    #[error("Plugin '{plugin}' failed during setup: {source}")]
    PluginSetup {
        plugin: String,
        #[source]
        source: BoxError,
    },

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid output path (e.g., directory traversal attempt).
    #[error("Invalid output path: {0}")]
    InvalidOutputPath(String),

    /// File write operation failed.
    #[error("Write failure: {0}")]
    WriteFailure(String),

    /// The artifact was written, but an `emit`/`after_emit` listener failed.
    #[error("Bundle written to '{}', but post-processing failed: {source}", .artifact.display())]
    PostProcess {
        artifact: std::path::PathBuf,
        #[source]
        source: HookError,
    },

    /// In-process module execution failed.
    #[error(transparent)]
    Exec(#[from] ExecError),

    /// Runtime error outside of module building.
    #[error("Runtime error: {0}")]
    Runtime(#[from] RuntimeError),

    /// Serializing the module table failed.
    #[error("Failed to serialize bundle: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Alias used in docs and by the CLI.
pub type BundleError = Error;

/// Result type alias for bindle-bundler operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether the output file exists despite the error.
    pub fn artifact_written(&self) -> bool {
        matches!(self, Error::PostProcess { .. })
    }
}

impl miette::Diagnostic for Error {
    fn code(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        Some(Box::new(match self {
            Error::Build(err) => match err {
                BuildError::FileNotFound { .. } => "FILE_NOT_FOUND",
                BuildError::Transform { .. } => "TRANSFORM_ERROR",
                BuildError::LoaderFailed { .. } => "LOADER_FAILED",
                BuildError::InvalidUtf8 { .. } => "INVALID_UTF8",
                BuildError::Io { .. } => "IO_ERROR",
                BuildError::TooManyModules { .. } => "TOO_MANY_MODULES",
                BuildError::InvalidModuleId(_) => "INVALID_MODULE_ID",
                BuildError::Graph(_) => "GRAPH_ERROR",
            },
            Error::Graph(err) => match err {
                GraphError::DuplicateModule(_) => "DUPLICATE_MODULE",
                GraphError::DanglingDependency { .. } => "DANGLING_DEPENDENCY",
                GraphError::MissingEntry(_) => "MISSING_ENTRY",
            },
            Error::Hook(err) => hook_code(err),
            Error::PluginSetup { .. } => "PLUGIN_SETUP",
            Error::InvalidConfig(_) => "INVALID_CONFIG",
            Error::InvalidOutputPath(_) => "INVALID_OUTPUT_PATH",
            Error::WriteFailure(_) => "WRITE_FAILURE",
            Error::PostProcess { .. } => "POST_PROCESS",
            Error::Exec(_) => "EXEC_ERROR",
            Error::Runtime(_) => "RUNTIME_ERROR",
            Error::Serialize(_) => "SERIALIZE_ERROR",
        }))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(miette::Severity::Error)
    }

    fn help(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        match self {
            Error::Build(BuildError::FileNotFound { path }) => Some(Box::new(format!(
                "Check that '{}' exists. Specifiers resolve relative to the importing file's directory.",
                path.display()
            ))),
            Error::Build(BuildError::Transform { source, .. }) => Some(Box::new(format!(
                "Fix the statement on line {} or add a loader rule that turns this file into JavaScript.",
                source.line
            ))),
            Error::Build(BuildError::LoaderFailed { loader, .. }) => Some(Box::new(format!(
                "The '{loader}' loader rejected this file. Check the file contents or the rule's test pattern."
            ))),
            Error::Build(BuildError::TooManyModules { max, .. }) => Some(Box::new(format!(
                "The graph grew past {max} modules. Raise the limit or check for runaway imports."
            ))),
            Error::Hook(HookError::UnknownHook(name)) => Some(Box::new(format!(
                "'{name}' is not a declared hook. Built-in hooks: compilation, make, emit, after_emit."
            ))),
            Error::PluginSetup { plugin, .. } => Some(Box::new(format!(
                "Plugin '{plugin}' could not register its listeners. Check its configuration."
            ))),
            Error::InvalidConfig(msg) => Some(Box::new(format!(
                "Check your configuration file for errors.\nError: {msg}"
            ))),
            Error::InvalidOutputPath(path) => Some(Box::new(format!(
                "The output path '{path}' is invalid. Use a plain file name for output.filename."
            ))),
            Error::WriteFailure(msg) => Some(Box::new(format!(
                "Failed to write file. Check disk space and permissions.\nError: {msg}"
            ))),
            Error::PostProcess { artifact, .. } => Some(Box::new(format!(
                "The bundle at '{}' is complete; only emit/after_emit listeners failed.",
                artifact.display()
            ))),
            _ => None,
        }
    }
}

fn hook_code(err: &HookError) -> &'static str {
    match err {
        HookError::UnknownHook(_) => "UNKNOWN_HOOK",
        HookError::HookKindConflict { .. } => "HOOK_KIND_CONFLICT",
        HookError::HookKindMismatch { .. } => "HOOK_KIND_MISMATCH",
        HookError::AsyncListenerOnSyncHook { .. } => "ASYNC_LISTENER_ON_SYNC_HOOK",
        HookError::Listener { .. } => "HOOK_LISTENER_ERROR",
    }
}
