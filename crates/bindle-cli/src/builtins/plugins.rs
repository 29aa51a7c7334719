//! Built-in plugins.
//!
//! - `manifest`: after emit, writes `<filename>.manifest.json` next to the
//!   bundle listing every module id and its dependency map.
//! - `timing`: logs how long the run took to reach each phase.

use std::path::PathBuf;
use std::sync::Arc;

use bindle_bundler::{
    BoxError, Compilation, DependencyMap, ModuleId, Plugin, PluginApi, Registrar, hooks,
};
use serde::Serialize;

/// Names accepted by [`lookup`].
pub const NAMES: &[&str] = &["manifest", "timing"];

/// Built-in plugin registered under `name`.
pub fn lookup(name: &str) -> Option<Plugin> {
    match name {
        "manifest" => Some(Plugin::registrar(ManifestPlugin)),
        "timing" => Some(timing()),
        _ => None,
    }
}

/// Writes a JSON description of the bundled graph beside the artifact.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManifestPlugin;

#[derive(Serialize)]
struct Manifest<'a> {
    entry: &'a ModuleId,
    bundle: PathBuf,
    modules: Vec<ManifestEntry<'a>>,
}

#[derive(Serialize)]
struct ManifestEntry<'a> {
    id: &'a ModuleId,
    dependencies: &'a DependencyMap,
}

impl ManifestPlugin {
    /// `<output dir>/<filename>.manifest.json`
    pub fn manifest_path(compilation: &Compilation) -> PathBuf {
        let output = compilation.output();
        output
            .directory
            .join(format!("{}.manifest.json", output.filename))
    }

    async fn write(compilation: Arc<Compilation>) -> Result<(), BoxError> {
        let graph = compilation.graph().snapshot();
        let json = {
            let manifest = Manifest {
                entry: compilation.entry(),
                bundle: compilation.output_path(),
                modules: graph
                    .modules()
                    .map(|module| ManifestEntry {
                        id: &module.id,
                        dependencies: &module.dependencies,
                    })
                    .collect(),
            };
            serde_json::to_vec_pretty(&manifest)?
        };

        let path = Self::manifest_path(&compilation);
        compilation.runtime().write_file(&path, &json).await?;
        tracing::debug!(path = %path.display(), modules = graph.len(), "manifest written");
        Ok(())
    }
}

impl Registrar for ManifestPlugin {
    fn name(&self) -> &str {
        "manifest"
    }

    fn register(&self, api: &mut PluginApi<'_>) -> Result<(), BoxError> {
        api.tap_async(hooks::AFTER_EMIT, ManifestPlugin::write)?;
        Ok(())
    }
}

fn timing() -> Plugin {
    Plugin::callable("timing", |api| {
        api.tap(hooks::COMPILATION, |compilation| {
            tracing::info!(
                entry = %compilation.entry(),
                elapsed_ms = compilation.elapsed().as_millis() as u64,
                "entry built"
            );
            Ok(())
        })?;
        api.tap(hooks::MAKE, |compilation| {
            tracing::info!(
                modules = compilation.graph().len(),
                elapsed_ms = compilation.elapsed().as_millis() as u64,
                "graph complete"
            );
            Ok(())
        })?;
        api.tap(hooks::EMIT, |compilation| {
            let bytes = compilation.artifact().map_or(0, |artifact| artifact.size);
            tracing::info!(
                bytes,
                elapsed_ms = compilation.elapsed().as_millis() as u64,
                "bundle emitted"
            );
            Ok(())
        })?;
        Ok(())
    })
}
