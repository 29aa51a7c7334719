use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::ModuleId;

/// Specifier → canonical id mapping for one module, in source order.
pub type DependencyMap = IndexMap<String, ModuleId>;

/// One compiled source file.
///
/// Built once per canonical id by the module builder and never mutated after
/// it enters the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub id: ModuleId,
    pub dependencies: DependencyMap,
    pub code: String,
}

impl Module {
    pub fn new(id: ModuleId, dependencies: DependencyMap, code: impl Into<String>) -> Self {
        Self {
            id,
            dependencies,
            code: code.into(),
        }
    }

    /// Canonical ids this module depends on, in specifier order.
    pub fn dependency_ids(&self) -> impl Iterator<Item = &ModuleId> {
        self.dependencies.values()
    }

    /// Resolve a specifier through this module's own dependency map.
    pub fn resolve(&self, specifier: &str) -> Option<&ModuleId> {
        self.dependencies.get(specifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_is_scoped_to_module() {
        let mut deps = DependencyMap::new();
        deps.insert("./a".to_string(), ModuleId::new("/src/a").unwrap());
        let module = Module::new(ModuleId::new("/src/index").unwrap(), deps, "");

        assert_eq!(module.resolve("./a").unwrap().to_string(), "/src/a");
        assert!(module.resolve("./b").is_none());
        assert_eq!(module.dependency_ids().count(), 1);
    }
}
