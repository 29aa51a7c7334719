//! In-process module table.
//!
//! The Rust-side counterpart of the emitted loader: each module id maps to a
//! compiled unit (a function value) plus its dependency map. Loading follows
//! the artifact's rules exactly: a fresh `{}` export container per load, a
//! `require` scoped to the loading module's own dependency map, and no
//! caching. Unlike the JavaScript loader, unbounded mutual recursion stops
//! with [`ExecError::RecursionLimit`] instead of overflowing the stack.

use std::fmt;
use std::sync::Arc;

use bindle_graph::{DependencyGraph, DependencyMap, Module, ModuleId};
use indexmap::IndexMap;
use serde_json::{Map, Value};

const DEFAULT_RECURSION_LIMIT: usize = 256;

/// Errors raised while loading modules from a [`ModuleTable`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExecError {
    #[error("Cannot find module id '{0}'")]
    UnknownModule(ModuleId),

    #[error("Cannot find module '{specifier}' from '{from}'")]
    UnresolvedSpecifier { from: ModuleId, specifier: String },

    #[error("Module load depth exceeded {limit} while loading '{id}'")]
    RecursionLimit { id: ModuleId, limit: usize },

    #[error("Module '{id}' failed: {message}")]
    Unit { id: ModuleId, message: String },
}

/// A compiled module body. Receives its scope and the export container.
pub type CompiledUnit =
    Arc<dyn Fn(&Scope<'_>, &mut Value) -> Result<(), ExecError> + Send + Sync>;

/// Box a closure as a [`CompiledUnit`].
pub fn compiled_unit<F>(f: F) -> CompiledUnit
where
    F: Fn(&Scope<'_>, &mut Value) -> Result<(), ExecError> + Send + Sync + 'static,
{
    Arc::new(f)
}

struct Entry {
    dependencies: DependencyMap,
    unit: CompiledUnit,
}

/// Execution scope of one module load.
pub struct Scope<'a> {
    table: &'a ModuleTable,
    id: &'a ModuleId,
    depth: usize,
}

impl Scope<'_> {
    /// Id of the module being executed.
    pub fn id(&self) -> &ModuleId {
        self.id
    }

    /// Resolve `specifier` through this module's dependency map and load the
    /// target from scratch.
    pub fn require(&self, specifier: &str) -> Result<Value, ExecError> {
        let entry = self.table.entry(self.id)?;
        let target = entry
            .dependencies
            .get(specifier)
            .ok_or_else(|| ExecError::UnresolvedSpecifier {
                from: self.id.clone(),
                specifier: specifier.to_string(),
            })?;
        self.table.load_at(target, self.depth + 1)
    }

    /// Build a unit-level error attributed to this module.
    pub fn fail(&self, message: impl Into<String>) -> ExecError {
        ExecError::Unit {
            id: self.id.clone(),
            message: message.into(),
        }
    }
}

/// Id-indexed table of compiled units.
pub struct ModuleTable {
    entries: IndexMap<ModuleId, Entry>,
    recursion_limit: usize,
}

impl ModuleTable {
    /// Compile every module of `graph` with `compile`.
    pub fn new<F>(graph: &DependencyGraph, compile: F) -> Result<Self, ExecError>
    where
        F: Fn(&Module) -> Result<CompiledUnit, ExecError>,
    {
        let mut entries = IndexMap::with_capacity(graph.len());
        for module in graph.modules() {
            let unit = compile(module)?;
            entries.insert(
                module.id.clone(),
                Entry {
                    dependencies: module.dependencies.clone(),
                    unit,
                },
            );
        }
        Ok(Self {
            entries,
            recursion_limit: DEFAULT_RECURSION_LIMIT,
        })
    }

    pub fn with_recursion_limit(mut self, limit: usize) -> Self {
        self.recursion_limit = limit;
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Run module `id` in a fresh container and return the container.
    pub fn load(&self, id: &ModuleId) -> Result<Value, ExecError> {
        self.load_at(id, 0)
    }

    fn load_at(&self, id: &ModuleId, depth: usize) -> Result<Value, ExecError> {
        if depth >= self.recursion_limit {
            return Err(ExecError::RecursionLimit {
                id: id.clone(),
                limit: self.recursion_limit,
            });
        }
        let (id, entry) = self
            .entries
            .get_key_value(id)
            .ok_or_else(|| ExecError::UnknownModule(id.clone()))?;

        let scope = Scope {
            table: self,
            id,
            depth,
        };
        let mut exports = Value::Object(Map::new());
        (entry.unit)(&scope, &mut exports)?;
        Ok(exports)
    }

    fn entry(&self, id: &ModuleId) -> Result<&Entry, ExecError> {
        self.entries
            .get(id)
            .ok_or_else(|| ExecError::UnknownModule(id.clone()))
    }
}

impl fmt::Debug for ModuleTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleTable")
            .field("modules", &self.entries.keys().collect::<Vec<_>>())
            .field("recursion_limit", &self.recursion_limit)
            .finish()
    }
}
