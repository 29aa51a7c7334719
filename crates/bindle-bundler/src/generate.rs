//! Bundle generation.
//!
//! The artifact is a single self-executing JavaScript unit. It embeds the
//! module table (one `{ dependencies, factory }` record per module, keyed by
//! id) and a small loader:
//!
//! - `require(specifier)` inside a module looks the specifier up in *that*
//!   module's `dependencies` and loads the target id.
//! - loading an id runs its factory in a fresh `module = { exports: {} }`
//!   and returns `module.exports`. Nothing is cached: every `require` call
//!   runs the target again.

use std::fmt::Write as _;

use bindle_graph::{DependencyGraph, ModuleId};

use crate::Result;

const LOADER_HEAD: &str = r#";(function (modules, entry) {
  function load(id) {
    if (!Object.prototype.hasOwnProperty.call(modules, id)) {
      throw new Error("Cannot find module id '" + id + "'");
    }
    var record = modules[id];
    function require(specifier) {
      if (!Object.prototype.hasOwnProperty.call(record.dependencies, specifier)) {
        throw new Error("Cannot find module '" + specifier + "' from '" + id + "'");
      }
      return load(record.dependencies[specifier]);
    }
    var module = { exports: {} };
    record.factory.call(module.exports, require, module, module.exports);
    return module.exports;
  }
  return load(entry);
})({
"#;

/// Serializes a dependency graph into the artifact text.
#[derive(Debug, Clone, Default)]
pub struct BundleGenerator {
    banner: Option<String>,
}

impl BundleGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_banner(mut self, banner: Option<String>) -> Self {
        self.banner = banner;
        self
    }

    /// Render `graph` with `entry` as the module run on load.
    ///
    /// Modules are emitted in graph insertion order, so equal graphs render
    /// to identical text.
    pub fn generate(&self, graph: &DependencyGraph, entry: &ModuleId) -> Result<String> {
        let mut out = String::new();
        if let Some(banner) = &self.banner {
            out.push_str(banner);
            out.push('\n');
        }
        out.push_str(LOADER_HEAD);

        for module in graph.modules() {
            let id = serde_json::to_string(&module.id)?;
            let dependencies = serde_json::to_string(&module.dependencies)?;
            // writing into a String cannot fail
            let _ = write!(
                out,
                "{id}: {{\n  dependencies: {dependencies},\n  factory: function (require, module, exports) {{\n{code}\n  }}\n}},\n",
                code = module.code,
            );
        }

        let _ = write!(out, "}}, {});\n", serde_json::to_string(entry)?);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use bindle_graph::{DependencyMap, Module};

    use super::*;

    fn graph() -> DependencyGraph {
        let mut deps = DependencyMap::new();
        deps.insert("./a".into(), ModuleId::new("/src/a").unwrap());

        let mut graph = DependencyGraph::new();
        graph
            .insert(Module::new(
                ModuleId::new("/src/index").unwrap(),
                deps,
                "console.log(require('./a'));",
            ))
            .unwrap();
        graph
            .insert(Module::new(
                ModuleId::new("/src/a").unwrap(),
                DependencyMap::new(),
                "module.exports = 'a';",
            ))
            .unwrap();
        graph
    }

    #[test]
    fn test_embeds_table_and_entry() {
        let entry = ModuleId::new("/src/index").unwrap();
        let code = BundleGenerator::new().generate(&graph(), &entry).unwrap();

        assert!(code.starts_with(";(function (modules, entry) {"));
        assert!(code.contains("\"/src/index\": {\n  dependencies: {\"./a\":\"/src/a\"},"));
        assert!(code.contains("\"/src/a\": {\n  dependencies: {},"));
        assert!(code.contains("module.exports = 'a';"));
        assert!(code.trim_end().ends_with("}, \"/src/index\");"));
        assert!(!code.contains("eval("));
    }

    #[test]
    fn test_module_order_follows_graph() {
        let entry = ModuleId::new("/src/index").unwrap();
        let code = BundleGenerator::new().generate(&graph(), &entry).unwrap();
        let index = code.find("\"/src/index\": {").unwrap();
        let a = code.find("\"/src/a\": {").unwrap();
        assert!(index < a);
    }

    #[test]
    fn test_loader_keeps_no_module_cache() {
        let entry = ModuleId::new("/src/index").unwrap();
        let code = BundleGenerator::new().generate(&graph(), &entry).unwrap();

        let head = code.find("(function (modules, entry) {").unwrap();
        let load = code.find("function load(id) {").unwrap();
        let fresh = code.find("var module = { exports: {} };").unwrap();
        let returned = code.find("return module.exports;").unwrap();
        let start = code.find("return load(entry);").unwrap();

        // no state declared between the outer function and `load`
        assert!(code[head + "(function (modules, entry) {".len()..load].trim().is_empty());
        assert!(load < fresh && fresh < returned && returned < start);
        assert_eq!(code.matches("var module = ").count(), 1);
        assert_eq!(code.matches("module.exports;").count(), 1);
        assert!(!code.contains("modules[id] ="));
        assert!(!code.contains("cache"));
    }

    #[test]
    fn test_deterministic_with_banner() {
        let entry = ModuleId::new("/src/index").unwrap();
        let generator = BundleGenerator::new().with_banner(Some("/* built by bindle */".into()));
        let first = generator.generate(&graph(), &entry).unwrap();
        let second = generator.generate(&graph(), &entry).unwrap();

        assert_eq!(first, second);
        assert!(first.starts_with("/* built by bindle */\n;(function"));
    }
}
