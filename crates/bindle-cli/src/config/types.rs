use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::defaults::{default_filename, default_out_dir};

/// `output` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct OutputSection {
    #[serde(default = "default_out_dir")]
    pub directory: PathBuf,

    #[serde(default = "default_filename")]
    pub filename: String,

    /// First line of the bundle, verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner: Option<String>,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            directory: default_out_dir(),
            filename: default_filename(),
            banner: None,
        }
    }
}

/// `module` section: loader rules and plugin names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ModuleSection {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<RuleConfig>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub plugins: Vec<String>,
}

/// `{ "test": "<regex>", "use": "name" | ["name", ...] }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleConfig {
    /// Regular expression matched against the absolute module path.
    pub test: String,

    #[serde(rename = "use")]
    pub use_: LoaderNames,
}

/// One loader name or a chain (applied last to first).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LoaderNames {
    One(String),
    Chain(Vec<String>),
}

impl LoaderNames {
    pub fn names(&self) -> &[String] {
        match self {
            LoaderNames::One(name) => std::slice::from_ref(name),
            LoaderNames::Chain(names) => names,
        }
    }
}

/// `resolve` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ResolveSection {
    /// Probed in order when a required path does not exist as written.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extensions: Vec<String>,
}
