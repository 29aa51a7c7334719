//! The compiler orchestrator.
//!
//! `Compiler::new` applies plugins (the `Init` phase). Each `run` then walks
//! the remaining phases in a fixed order:
//!
//! ```text
//! Build → GraphAssembled → Make → Generate → Emit → AfterEmit → Done
//! ```
//!
//! Failures before `Emit` abort the run with nothing written. Failures in
//! `Emit`/`AfterEmit` come back as [`Error::PostProcess`]; the artifact is
//! on disk by then.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use bindle_graph::{DependencyGraphBuilder, ModuleBuilder, ModuleId, Runtime};
use path_clean::PathClean;
use tracing::Instrument;

use crate::compilation::{Artifact, Compilation, OutputTarget, Phase};
use crate::config::BundleConfig;
use crate::generate::BundleGenerator;
use crate::hooks::{AFTER_EMIT, COMPILATION, EMIT, HookRegistry, MAKE};
use crate::output::write_artifact;
use crate::plugins::PluginApi;
use crate::{Error, Result};

/// Result of a successful run.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub artifact: Artifact,
    pub module_count: usize,
    pub entry: ModuleId,
    pub duration: Duration,
}

/// Owns hooks, plugins and the graph machinery; drives the phases.
#[derive(Debug)]
pub struct Compiler {
    config: BundleConfig,
    hooks: Arc<HookRegistry>,
    plugins: Vec<String>,
    runtime: Arc<dyn Runtime>,
    graph_builder: DependencyGraphBuilder,
    generator: BundleGenerator,
}

impl Compiler {
    /// Validate `config` and apply its plugins in order.
    pub fn new(mut config: BundleConfig) -> Result<Self> {
        config.validate()?;

        let plugins = std::mem::take(&mut config.plugins);
        let mut hooks = HookRegistry::new();
        for plugin in &plugins {
            let mut api = PluginApi::new(plugin.name(), &mut hooks, &config);
            plugin.apply(&mut api).map_err(|source| Error::PluginSetup {
                plugin: plugin.name().to_string(),
                source,
            })?;
            tracing::debug!(plugin = plugin.name(), "plugin applied");
        }

        let runtime = config.resolved_runtime();
        let module_builder = ModuleBuilder::new(Arc::clone(&runtime))
            .with_loaders(config.loader_pipeline())
            .with_transformer(config.resolved_transformer())
            .with_extensions(config.extensions.iter().cloned());
        let graph_builder =
            DependencyGraphBuilder::new(module_builder).with_max_modules(config.max_modules);
        let generator = BundleGenerator::new().with_banner(config.output.banner.clone());

        Ok(Self {
            plugins: plugins.iter().map(|p| p.name().to_string()).collect(),
            config,
            hooks: Arc::new(hooks),
            runtime,
            graph_builder,
            generator,
        })
    }

    pub fn config(&self) -> &BundleConfig {
        &self.config
    }

    pub fn hooks(&self) -> &HookRegistry {
        &self.hooks
    }

    /// Names of the applied plugins, in application order.
    pub fn plugin_names(&self) -> &[String] {
        &self.plugins
    }

    /// Compile once. Every call starts from a fresh [`Compilation`].
    pub async fn run(&self) -> Result<RunOutcome> {
        let started = Instant::now();
        let compilation = Arc::new(self.new_compilation()?);
        let entry = compilation.entry().clone();

        // Build
        compilation.enter(Phase::Build);
        let entry_module = self
            .graph_builder
            .module_builder()
            .build(&entry)
            .instrument(tracing::debug_span!("phase", phase = %Phase::Build))
            .await?;
        compilation.graph().insert(entry_module.clone())?;

        // GraphAssembled
        compilation.enter(Phase::GraphAssembled);
        tracing::debug_span!("phase", phase = %Phase::GraphAssembled)
            .in_scope(|| self.hooks.invoke_sync(COMPILATION, &compilation))?;

        // Make
        compilation.enter(Phase::Make);
        async {
            let added = self
                .graph_builder
                .expand_into(entry_module, compilation.graph())
                .await?;
            tracing::debug!(added, "graph expanded");
            self.hooks.invoke_async(MAKE, Arc::clone(&compilation)).await?;
            compilation.graph().validate(&entry)?;
            Ok::<_, Error>(())
        }
        .instrument(tracing::debug_span!("phase", phase = %Phase::Make))
        .await?;

        // Generate
        compilation.enter(Phase::Generate);
        let artifact = async {
            let graph = compilation.graph().snapshot();
            let code = self.generator.generate(&graph, &entry)?;
            let path = write_artifact(
                self.runtime.as_ref(),
                compilation.output_dir(),
                &compilation.output().filename,
                &code,
            )
            .await?;
            Ok::<_, Error>(Artifact {
                path,
                size: code.len(),
                module_count: graph.len(),
            })
        }
        .instrument(tracing::debug_span!("phase", phase = %Phase::Generate))
        .await?;
        let artifact = compilation.set_artifact(artifact).clone();

        // Emit, AfterEmit
        for (phase, hook) in [(Phase::Emit, EMIT), (Phase::AfterEmit, AFTER_EMIT)] {
            compilation.enter(phase);
            self.hooks
                .invoke_async(hook, Arc::clone(&compilation))
                .instrument(tracing::debug_span!("phase", phase = %phase))
                .await
                .map_err(|source| Error::PostProcess {
                    artifact: artifact.path.clone(),
                    source,
                })?;
        }

        compilation.enter(Phase::Done);
        let duration = started.elapsed();
        tracing::info!(
            entry = %entry,
            modules = artifact.module_count,
            bytes = artifact.size,
            path = %artifact.path.display(),
            elapsed_ms = duration.as_millis() as u64,
            "bundle written"
        );

        Ok(RunOutcome {
            module_count: artifact.module_count,
            artifact,
            entry,
            duration,
        })
    }

    fn new_compilation(&self) -> Result<Compilation> {
        let cwd = match &self.config.cwd {
            Some(cwd) => cwd.clone(),
            None => self.runtime.get_cwd()?,
        };
        let cwd = if cwd.is_absolute() {
            cwd
        } else {
            self.runtime.get_cwd()?.join(cwd)
        };

        let entry = ModuleId::from_base(&self.config.entry, &cwd)
            .map_err(bindle_graph::BuildError::from)?;
        let directory: PathBuf = cwd.join(&self.config.output.directory).clean();

        Ok(Compilation::new(
            entry,
            OutputTarget {
                directory,
                filename: self.config.output.filename.clone(),
            },
            Arc::clone(&self.hooks),
            Arc::clone(&self.runtime),
        ))
    }
}
