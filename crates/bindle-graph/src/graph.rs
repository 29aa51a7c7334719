//! Dependency graph storage.
//!
//! [`DependencyGraph`] is the plain, insertion-ordered map from module id to
//! module. [`ModuleGraph`] wraps one behind a lock so the compiler and hook
//! listeners can share it; its API is append-only, which is how the
//! single-writer-per-key rule is enforced: nothing can remove or replace a
//! module once inserted.

use std::sync::Arc;

use indexmap::IndexMap;
use indexmap::map::Entry;
use parking_lot::RwLock;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::module::{DependencyMap, Module};
use crate::module_id::ModuleId;

/// Errors raised by graph mutations and validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    #[error("module '{0}' is already in the graph")]
    DuplicateModule(ModuleId),

    #[error("module '{from}' depends on '{target}' (via '{specifier}') which is not in the graph")]
    DanglingDependency {
        from: ModuleId,
        specifier: String,
        target: ModuleId,
    },

    #[error("entry module '{0}' is not in the graph")]
    MissingEntry(ModuleId),
}

/// Mapping from module id to its dependency map and code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyGraph {
    modules: IndexMap<ModuleId, Arc<Module>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a module under its own id.
    ///
    /// Fails if the id is already present; existing entries are never
    /// overwritten.
    pub fn insert(&mut self, module: impl Into<Arc<Module>>) -> Result<(), GraphError> {
        let module = module.into();
        match self.modules.entry(module.id.clone()) {
            Entry::Occupied(entry) => Err(GraphError::DuplicateModule(entry.key().clone())),
            Entry::Vacant(entry) => {
                entry.insert(module);
                Ok(())
            }
        }
    }

    pub fn get(&self, id: &ModuleId) -> Option<&Arc<Module>> {
        self.modules.get(id)
    }

    pub fn contains(&self, id: &ModuleId) -> bool {
        self.modules.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Module ids in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = &ModuleId> {
        self.modules.keys()
    }

    /// Modules in insertion order.
    pub fn modules(&self) -> impl Iterator<Item = &Arc<Module>> {
        self.modules.values()
    }

    /// Check the closure invariant: the entry is present and every
    /// dependency value is itself a key.
    pub fn validate(&self, entry: &ModuleId) -> Result<(), GraphError> {
        if !self.contains(entry) {
            return Err(GraphError::MissingEntry(entry.clone()));
        }
        for module in self.modules.values() {
            for (specifier, target) in &module.dependencies {
                if !self.contains(target) {
                    return Err(GraphError::DanglingDependency {
                        from: module.id.clone(),
                        specifier: specifier.clone(),
                        target: target.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

#[derive(serde::Serialize)]
struct ModuleRecord<'a> {
    dependencies: &'a DependencyMap,
    code: &'a str,
}

impl Serialize for DependencyGraph {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.modules.len()))?;
        for (id, module) in &self.modules {
            map.serialize_entry(
                id,
                &ModuleRecord {
                    dependencies: &module.dependencies,
                    code: &module.code,
                },
            )?;
        }
        map.end()
    }
}

/// Shared, append-only handle to a [`DependencyGraph`].
///
/// Cloning is cheap and every clone sees the same graph.
#[derive(Debug, Clone, Default)]
pub struct ModuleGraph {
    inner: Arc<RwLock<DependencyGraph>>,
}

impl ModuleGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a module. Fails with [`GraphError::DuplicateModule`] if the id
    /// is already present.
    pub fn insert(&self, module: impl Into<Arc<Module>>) -> Result<(), GraphError> {
        self.inner.write().insert(module)
    }

    pub fn get(&self, id: &ModuleId) -> Option<Arc<Module>> {
        self.inner.read().get(id).cloned()
    }

    pub fn contains(&self, id: &ModuleId) -> bool {
        self.inner.read().contains(id)
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Module ids in insertion order.
    pub fn ids(&self) -> Vec<ModuleId> {
        self.inner.read().ids().cloned().collect()
    }

    /// Point-in-time copy of the graph. Modules are shared, not cloned.
    pub fn snapshot(&self) -> DependencyGraph {
        self.inner.read().clone()
    }

    pub fn validate(&self, entry: &ModuleId) -> Result<(), GraphError> {
        self.inner.read().validate(entry)
    }
}

impl From<DependencyGraph> for ModuleGraph {
    fn from(graph: DependencyGraph) -> Self {
        Self {
            inner: Arc::new(RwLock::new(graph)),
        }
    }
}
