//! Graph walker for dependency expansion.
//!
//! Breadth-first: a visited set of canonical ids plus a FIFO work queue kept
//! apart from the graph being filled. Each id is built at most once, so
//! cycles terminate and two specifiers naming the same file collapse into
//! one module.

use std::collections::VecDeque;

use rustc_hash::FxHashSet;

use crate::builder::{BuildError, ModuleBuilder};
use crate::graph::{DependencyGraph, ModuleGraph};
use crate::module::Module;
use crate::module_id::ModuleId;

/// Expands an entry module into the full reachable graph.
#[derive(Debug, Clone)]
pub struct DependencyGraphBuilder {
    builder: ModuleBuilder,
    max_modules: Option<usize>,
}

impl DependencyGraphBuilder {
    pub fn new(builder: ModuleBuilder) -> Self {
        Self {
            builder,
            max_modules: None,
        }
    }

    /// Fail with [`BuildError::TooManyModules`] once the graph would grow
    /// past `max` modules.
    pub fn with_max_modules(mut self, max: Option<usize>) -> Self {
        self.max_modules = max;
        self
    }

    pub fn module_builder(&self) -> &ModuleBuilder {
        &self.builder
    }

    /// Expand `entry` into a fresh graph.
    ///
    /// Any build failure aborts the walk; no partial graph is returned.
    pub async fn expand(&self, entry: Module) -> Result<DependencyGraph, BuildError> {
        let graph = ModuleGraph::new();
        self.expand_into(entry, &graph).await?;
        Ok(graph.snapshot())
    }

    /// Expand `entry` into an existing shared graph.
    ///
    /// Ids already in `graph` count as visited. The entry is inserted if it
    /// is not present yet. Returns the number of modules this call added.
    pub async fn expand_into(&self, entry: Module, graph: &ModuleGraph) -> Result<usize, BuildError> {
        let mut visited: FxHashSet<ModuleId> = graph.ids().into_iter().collect();
        let mut queue: VecDeque<ModuleId> = entry.dependency_ids().cloned().collect();
        let mut added = 0;

        if visited.insert(entry.id.clone()) {
            self.check_limit(graph)?;
            graph.insert(entry)?;
            added += 1;
        }

        while let Some(id) = queue.pop_front() {
            if visited.contains(&id) {
                continue;
            }
            self.check_limit(graph)?;

            let module = self.builder.build(&id).await?;
            visited.insert(id);

            for dep in module.dependency_ids() {
                if !visited.contains(dep) {
                    queue.push_back(dep.clone());
                }
            }

            tracing::debug!(module = %module.id, queued = queue.len(), "module added to graph");
            graph.insert(module)?;
            added += 1;
        }

        Ok(added)
    }

    fn check_limit(&self, graph: &ModuleGraph) -> Result<(), BuildError> {
        match self.max_modules {
            Some(max) if graph.len() >= max => Err(BuildError::TooManyModules {
                count: graph.len() + 1,
                max,
            }),
            _ => Ok(()),
        }
    }
}
