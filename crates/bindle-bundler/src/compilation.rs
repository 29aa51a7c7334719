//! Per-run compilation state handed to hook listeners.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

use bindle_graph::{ModuleGraph, ModuleId, Runtime};
use parking_lot::RwLock;

use crate::hooks::HookRegistry;

/// Compilation phases, in the only order they can occur.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    Init,
    Build,
    GraphAssembled,
    Make,
    Generate,
    Emit,
    AfterEmit,
    Done,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Init => "init",
            Phase::Build => "build",
            Phase::GraphAssembled => "graph_assembled",
            Phase::Make => "make",
            Phase::Generate => "generate",
            Phase::Emit => "emit",
            Phase::AfterEmit => "after_emit",
            Phase::Done => "done",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The written output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub size: usize,
    pub module_count: usize,
}

/// Where the artifact goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTarget {
    pub directory: PathBuf,
    pub filename: String,
}

impl OutputTarget {
    pub fn path(&self) -> PathBuf {
        self.directory.join(&self.filename)
    }
}

/// State of one `Compiler::run` call.
///
/// Created fresh for every run and never reused. Listeners only get shared
/// access; the graph is the one thing they may extend, and only by
/// appending.
pub struct Compilation {
    entry: ModuleId,
    output: OutputTarget,
    graph: ModuleGraph,
    hooks: Arc<HookRegistry>,
    runtime: Arc<dyn Runtime>,
    phase: RwLock<Phase>,
    artifact: OnceLock<Artifact>,
    started: Instant,
}

impl Compilation {
    pub(crate) fn new(
        entry: ModuleId,
        output: OutputTarget,
        hooks: Arc<HookRegistry>,
        runtime: Arc<dyn Runtime>,
    ) -> Self {
        Self {
            entry,
            output,
            graph: ModuleGraph::new(),
            hooks,
            runtime,
            phase: RwLock::new(Phase::Init),
            artifact: OnceLock::new(),
            started: Instant::now(),
        }
    }

    pub fn entry(&self) -> &ModuleId {
        &self.entry
    }

    pub fn output(&self) -> &OutputTarget {
        &self.output
    }

    pub fn graph(&self) -> &ModuleGraph {
        &self.graph
    }

    /// The hook registry, for listeners that invoke custom hooks.
    pub fn hooks(&self) -> &HookRegistry {
        &self.hooks
    }

    pub fn runtime(&self) -> &Arc<dyn Runtime> {
        &self.runtime
    }

    pub fn phase(&self) -> Phase {
        *self.phase.read()
    }

    /// Set once Generate has written the output file.
    pub fn artifact(&self) -> Option<&Artifact> {
        self.artifact.get()
    }

    pub fn output_path(&self) -> PathBuf {
        self.output.path()
    }

    /// Time since the run started.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub(crate) fn enter(&self, next: Phase) {
        let mut phase = self.phase.write();
        debug_assert!(next > *phase, "phase moved backwards: {} -> {next}", *phase);
        tracing::debug!(from = %*phase, to = %next, "phase transition");
        *phase = next;
    }

    pub(crate) fn set_artifact(&self, artifact: Artifact) -> &Artifact {
        self.artifact.get_or_init(|| artifact)
    }

    pub(crate) fn output_dir(&self) -> &Path {
        &self.output.directory
    }
}

impl fmt::Debug for Compilation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Compilation")
            .field("entry", &self.entry)
            .field("output", &self.output)
            .field("phase", &self.phase())
            .field("modules", &self.graph.len())
            .field("artifact", &self.artifact.get())
            .finish()
    }
}
