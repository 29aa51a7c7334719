//! Configuration for the bindle CLI, merged from several sources.
//!
//! Priority: CLI flags > `BINDLE_*` environment variables >
//! `bindle.config.json` > defaults.

mod defaults;
mod loading;
mod types;

use std::path::Path;

use bindle_bundler::{BundleConfig, Loader, LoaderRule, LoaderUse};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::builtins::{loaders, plugins};
use crate::error::ConfigError;

pub use defaults::*;
pub use types::*;

/// Contents of `bindle.config.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BindleConfig {
    /// Entry module, relative to the working directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry: Option<String>,

    #[serde(default)]
    pub output: OutputSection,

    #[serde(default)]
    pub module: ModuleSection,

    #[serde(default)]
    pub resolve: ResolveSection,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_modules: Option<usize>,
}

impl BindleConfig {
    /// Map this configuration onto a [`BundleConfig`] rooted at `cwd`.
    ///
    /// Loader and plugin names are looked up among the built-ins; unknown
    /// names fail with the list of valid ones.
    pub fn to_bundle_config(&self, cwd: &Path) -> Result<BundleConfig, ConfigError> {
        let entry = self
            .entry
            .as_deref()
            .filter(|entry| !entry.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingField {
                field: "entry".to_string(),
                hint: format!("Pass an entry module (`bindle build src/index.js`) or set \"entry\" in {CONFIG_FILE}"),
            })?;

        let mut config = BundleConfig::new(entry)
            .cwd(cwd)
            .output_dir(self.output.directory.clone())
            .output_filename(self.output.filename.clone())
            .extensions(self.resolve.extensions.iter().cloned());

        if let Some(banner) = &self.output.banner {
            config = config.banner(banner.clone());
        }
        if let Some(max) = self.max_modules {
            config = config.max_modules(max);
        }

        for rule in &self.module.rules {
            config = config.rule(loader_rule(rule)?);
        }

        for name in &self.module.plugins {
            let plugin = plugins::lookup(name).ok_or_else(|| ConfigError::UnknownPlugin {
                name: name.clone(),
                known: plugins::NAMES.iter().map(ToString::to_string).collect(),
            })?;
            config = config.plugin(plugin);
        }

        Ok(config)
    }
}

fn loader_rule(rule: &RuleConfig) -> Result<LoaderRule, ConfigError> {
    let pattern = Regex::new(&rule.test).map_err(|e| ConfigError::InvalidPattern {
        pattern: rule.test.clone(),
        message: e.to_string(),
    })?;

    let chain = rule
        .use_
        .names()
        .iter()
        .map(|name| {
            loaders::lookup(name).ok_or_else(|| ConfigError::UnknownLoader {
                name: name.clone(),
                known: loaders::NAMES.iter().map(ToString::to_string).collect(),
            })
        })
        .collect::<Result<Vec<Loader>, _>>()?;

    let use_ = match &rule.use_ {
        LoaderNames::One(_) => chain.into_iter().next().map(LoaderUse::Single),
        LoaderNames::Chain(_) => (!chain.is_empty()).then(|| LoaderUse::Chain(chain)),
    }
    .ok_or_else(|| ConfigError::Invalid {
        message: format!("rule '{}' has an empty `use` list", rule.test),
        hint: format!("Name at least one loader: {}", loaders::NAMES.join(", ")),
    })?;

    Ok(LoaderRule::regex(pattern, use_))
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn parse(json: &str) -> BindleConfig {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_camel_case_document() {
        let config = parse(
            r#"{
                "entry": "src/index.js",
                "output": { "directory": "build", "filename": "app.js", "banner": "/* hi */" },
                "module": {
                    "rules": [{ "test": "\\.txt$", "use": ["raw", "uppercase"] }],
                    "plugins": ["manifest"]
                },
                "resolve": { "extensions": [".js"] },
                "maxModules": 50
            }"#,
        );

        assert_eq!(config.entry.as_deref(), Some("src/index.js"));
        assert_eq!(config.output.directory, PathBuf::from("build"));
        assert_eq!(config.output.banner.as_deref(), Some("/* hi */"));
        assert_eq!(config.module.rules[0].use_.names(), ["raw", "uppercase"]);
        assert_eq!(config.max_modules, Some(50));
    }

    #[test]
    fn test_defaults_fill_missing_sections() {
        let config = parse(r#"{ "entry": "index.js" }"#);
        assert_eq!(config.output.directory, default_out_dir());
        assert_eq!(config.output.filename, default_filename());
        assert!(config.module.rules.is_empty());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result = serde_json::from_str::<BindleConfig>(r#"{ "entry": "a.js", "outDir": "x" }"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_single_loader_name() {
        let config = parse(r#"{ "entry": "a.js", "module": { "rules": [{ "test": "x", "use": "trim" }] } }"#);
        assert_eq!(config.module.rules[0].use_, LoaderNames::One("trim".into()));
    }

    #[test]
    fn test_to_bundle_config() {
        let config = parse(
            r#"{
                "entry": "src/index.js",
                "output": { "filename": "app.js" },
                "module": { "rules": [{ "test": "\\.txt$", "use": "raw" }], "plugins": ["timing"] }
            }"#,
        );

        let bundle = config.to_bundle_config(Path::new("/project")).unwrap();
        assert_eq!(bundle.entry, PathBuf::from("src/index.js"));
        assert_eq!(bundle.cwd, Some(PathBuf::from("/project")));
        assert_eq!(bundle.output.filename, "app.js");
        assert_eq!(bundle.rules.len(), 1);
        assert!(bundle.rules[0].matches(Path::new("/project/notes.txt")));
        assert_eq!(bundle.plugins[0].name(), "timing");
    }

    #[test]
    fn test_missing_entry() {
        let err = BindleConfig::default()
            .to_bundle_config(Path::new("/"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingField { ref field, .. } if field == "entry"));
    }

    #[test]
    fn test_unknown_names() {
        let config = parse(r#"{ "entry": "a.js", "module": { "rules": [{ "test": "x", "use": ["raw", "sass"] }] } }"#);
        let err = config.to_bundle_config(Path::new("/")).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownLoader { ref name, .. } if name == "sass"));

        let config = parse(r#"{ "entry": "a.js", "module": { "plugins": ["minify"] } }"#);
        let err = config.to_bundle_config(Path::new("/")).unwrap_err();
        assert!(err.to_string().contains("manifest, timing"));
    }

    #[test]
    fn test_bad_pattern() {
        let config = parse(r#"{ "entry": "a.js", "module": { "rules": [{ "test": "(", "use": "raw" }] } }"#);
        let err = config.to_bundle_config(Path::new("/")).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPattern { .. }));
    }
}
