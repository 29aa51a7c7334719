//! Compiler configuration.
//!
//! `BundleConfig` is built with chained setters, then handed to
//! [`Compiler::new`](crate::Compiler::new):
//!
//! ```no_run
//! use bindle_bundler::BundleConfig;
//!
//! # async fn run() -> bindle_bundler::Result<()> {
//! let outcome = BundleConfig::new("src/index.js")
//!     .output_dir("dist")
//!     .output_filename("app.js")
//!     .build()
//!     .await?;
//! println!("wrote {}", outcome.artifact.path.display());
//! # Ok(())
//! # }
//! ```

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use bindle_graph::{
    ImportRewriter, LoaderPipeline, LoaderRule, NativeRuntime, Runtime, SourceTransformer,
};

use crate::plugins::Plugin;
use crate::{Error, Result};

/// Output target configuration
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub directory: PathBuf,
    pub filename: String,
    /// Emitted verbatim as the first line of the artifact.
    pub banner: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("dist"),
            filename: "main.js".to_string(),
            banner: None,
        }
    }
}

/// Compiler configuration
#[derive(Debug, Clone)]
pub struct BundleConfig {
    /// Entry module, relative to `cwd` unless absolute.
    pub entry: PathBuf,

    pub output: OutputConfig,

    /// Loader rules, applied in declaration order.
    pub rules: Vec<LoaderRule>,

    /// Plugins, applied in declaration order when the compiler is built.
    pub plugins: Vec<Plugin>,

    /// Extensions probed when a resolved dependency path does not exist.
    pub extensions: Vec<String>,

    /// Upper bound on graph size. Unlimited when `None`.
    pub max_modules: Option<usize>,

    /// Working directory for relative paths. Defaults to the runtime's.
    pub cwd: Option<PathBuf>,

    runtime: Option<Arc<dyn Runtime>>,
    transformer: Option<Arc<dyn SourceTransformer>>,
}

impl BundleConfig {
    pub fn new(entry: impl Into<PathBuf>) -> Self {
        Self {
            entry: entry.into(),
            output: OutputConfig::default(),
            rules: Vec::new(),
            plugins: Vec::new(),
            extensions: Vec::new(),
            max_modules: None,
            cwd: None,
            runtime: None,
            transformer: None,
        }
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output.directory = dir.into();
        self
    }

    pub fn output_filename(mut self, filename: impl Into<String>) -> Self {
        self.output.filename = filename.into();
        self
    }

    pub fn banner(mut self, banner: impl Into<String>) -> Self {
        self.output.banner = Some(banner.into());
        self
    }

    /// Add a loader rule
    pub fn rule(mut self, rule: LoaderRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Add a plugin
    pub fn plugin(mut self, plugin: Plugin) -> Self {
        self.plugins.push(plugin);
        self
    }

    pub fn extensions(mut self, extensions: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    pub fn max_modules(mut self, max: usize) -> Self {
        self.max_modules = Some(max);
        self
    }

    /// Set the working directory
    pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// Set the runtime
    pub fn runtime(mut self, runtime: Arc<dyn Runtime>) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Replace the default [`ImportRewriter`].
    pub fn transformer(mut self, transformer: Arc<dyn SourceTransformer>) -> Self {
        self.transformer = Some(transformer);
        self
    }

    /// Runtime in effect: the configured one or [`NativeRuntime`].
    pub fn resolved_runtime(&self) -> Arc<dyn Runtime> {
        self.runtime
            .clone()
            .unwrap_or_else(|| Arc::new(NativeRuntime))
    }

    /// Transformer in effect: the configured one or [`ImportRewriter`].
    pub fn resolved_transformer(&self) -> Arc<dyn SourceTransformer> {
        self.transformer
            .clone()
            .unwrap_or_else(|| Arc::new(ImportRewriter::new()))
    }

    pub fn loader_pipeline(&self) -> LoaderPipeline {
        LoaderPipeline::new(self.rules.clone())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.entry.as_os_str().is_empty() {
            return Err(Error::InvalidConfig("an entry module is required".into()));
        }

        let filename = self.output.filename.as_str();
        if filename.is_empty() {
            return Err(Error::InvalidConfig("output filename must not be empty".into()));
        }
        let mut components = Path::new(filename).components();
        let single_normal = matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        );
        if !single_normal || filename.contains(['/', '\\']) {
            return Err(Error::InvalidConfig(format!(
                "output filename '{filename}' must be a plain file name"
            )));
        }

        if self.max_modules == Some(0) {
            return Err(Error::InvalidConfig("max_modules must be at least 1".into()));
        }

        Ok(())
    }

    /// Build a compiler from this configuration and run it once.
    pub async fn build(self) -> Result<crate::RunOutcome> {
        crate::Compiler::new(self)?.run().await
    }
}
