//! Module builder: one file path in, one [`Module`] out.
//!
//! Reads go through the [`Runtime`], so the same builder works against disk
//! and against the in-memory `TestRuntime`.

use std::path::PathBuf;
use std::sync::Arc;

use crate::graph::GraphError;
use crate::loader::LoaderPipeline;
use crate::module::{DependencyMap, Module};
use crate::module_id::{ModuleId, ModuleIdError};
use crate::runtime::{Runtime, RuntimeError};
use crate::transform::{ImportRewriter, SourceTransformer, TransformError};

/// Errors that abort building a module (and with it, the whole graph).
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Failed to transform '{path}': {source}")]
    Transform {
        path: PathBuf,
        #[source]
        source: TransformError,
    },

    #[error("Loader '{loader}' failed on '{path}': {message}")]
    LoaderFailed {
        path: PathBuf,
        loader: String,
        message: String,
    },

    #[error("File '{path}' is not valid UTF-8")]
    InvalidUtf8 { path: PathBuf },

    #[error("Failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: RuntimeError,
    },

    #[error("Too many modules processed: {count} modules (max: {max} allowed)")]
    TooManyModules { count: usize, max: usize },

    #[error("Invalid module id: {0}")]
    InvalidModuleId(#[from] ModuleIdError),

    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Builds [`Module`] descriptors from files.
///
/// Cheap to clone; every field is shared.
#[derive(Debug, Clone)]
pub struct ModuleBuilder {
    runtime: Arc<dyn Runtime>,
    loaders: LoaderPipeline,
    transformer: Arc<dyn SourceTransformer>,
    extensions: Arc<[String]>,
}

impl ModuleBuilder {
    /// Builder with no loader rules, the [`ImportRewriter`] transformer and
    /// no extension probing.
    pub fn new(runtime: Arc<dyn Runtime>) -> Self {
        Self {
            runtime,
            loaders: LoaderPipeline::default(),
            transformer: Arc::new(ImportRewriter::new()),
            extensions: Arc::from(Vec::new()),
        }
    }

    pub fn with_loaders(mut self, loaders: LoaderPipeline) -> Self {
        self.loaders = loaders;
        self
    }

    pub fn with_transformer(mut self, transformer: Arc<dyn SourceTransformer>) -> Self {
        self.transformer = transformer;
        self
    }

    /// Extensions probed, in order, when a resolved path does not exist.
    /// A missing leading dot is added (`"js"` and `".js"` are equivalent).
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions
            .into_iter()
            .map(|ext| {
                let ext = ext.into();
                if ext.starts_with('.') {
                    ext
                } else {
                    format!(".{ext}")
                }
            })
            .collect();
        self
    }

    pub fn runtime(&self) -> &Arc<dyn Runtime> {
        &self.runtime
    }

    /// Read, load, transform and resolve one module.
    pub async fn build(&self, id: &ModuleId) -> Result<Module, BuildError> {
        let path = id.as_path();
        let bytes = self.runtime.read_file(path).await.map_err(|err| match err {
            RuntimeError::FileNotFound(_) => BuildError::FileNotFound {
                path: path.to_path_buf(),
            },
            source => BuildError::Io {
                path: path.to_path_buf(),
                source,
            },
        })?;
        let text = String::from_utf8(bytes).map_err(|_| BuildError::InvalidUtf8 {
            path: path.to_path_buf(),
        })?;

        let text = self
            .loaders
            .apply(path, text)
            .map_err(|err| BuildError::LoaderFailed {
                path: path.to_path_buf(),
                loader: err.loader,
                message: err.message,
            })?;

        let output = self
            .transformer
            .transform(&text, path)
            .map_err(|source| BuildError::Transform {
                path: path.to_path_buf(),
                source,
            })?;

        let mut dependencies = DependencyMap::with_capacity(output.dependencies.len());
        for (specifier, resolved) in output.dependencies {
            let target = self.resolve(id, &resolved)?;
            dependencies.insert(specifier, target);
        }

        tracing::trace!(
            module = %id,
            dependencies = dependencies.len(),
            "built module"
        );

        Ok(Module::new(id.clone(), dependencies, output.code))
    }

    /// Turn a transformer-resolved path into a canonical id.
    ///
    /// Absolute values are only cleaned; relative ones are joined to the
    /// importer's directory. Extensions are then probed if the exact path
    /// is absent.
    pub fn resolve(&self, importer: &ModuleId, resolved: &str) -> Result<ModuleId, BuildError> {
        let exact = importer.join_specifier(resolved)?;
        if self.extensions.is_empty() || self.runtime.exists(exact.as_path()) {
            return Ok(exact);
        }

        for ext in self.extensions.iter() {
            let mut candidate = exact.as_path().as_os_str().to_os_string();
            candidate.push(ext);
            let candidate = PathBuf::from(candidate);
            if self.runtime.exists(&candidate) {
                return Ok(ModuleId::new(candidate)?);
            }
        }

        Ok(exact)
    }
}
