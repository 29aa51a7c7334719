//! Canonical module identifiers.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use path_clean::PathClean;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Errors produced when constructing a [`ModuleId`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModuleIdError {
    #[error("module path is empty")]
    Empty,

    #[error("module path must be absolute: {0}")]
    NotAbsolute(PathBuf),
}

/// Canonical identity of a module: an absolute, lexically cleaned path.
///
/// Two specifiers that resolve to the same file produce equal ids, which is
/// what lets the graph builder collapse them into a single module. Cleaning is
/// purely lexical (`.` and `..` are folded, symlinks are not followed) so ids
/// can name files that only exist in an in-memory runtime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(PathBuf);

impl ModuleId {
    /// Create an id from an absolute path.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, ModuleIdError> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(ModuleIdError::Empty);
        }
        if !path.has_root() {
            return Err(ModuleIdError::NotAbsolute(path.to_path_buf()));
        }
        Ok(Self(path.clean()))
    }

    /// Create an id, resolving relative paths against `base`.
    pub fn from_base(path: impl AsRef<Path>, base: &Path) -> Result<Self, ModuleIdError> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(ModuleIdError::Empty);
        }
        if path.has_root() {
            Self::new(path)
        } else {
            Self::new(base.join(path))
        }
    }

    /// Resolve `specifier` against the directory containing this module.
    pub fn join_specifier(&self, specifier: &str) -> Result<Self, ModuleIdError> {
        let dir = self.0.parent().unwrap_or(Path::new("/"));
        Self::from_base(specifier, dir)
    }

    /// The underlying path.
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Directory containing the module.
    pub fn dir(&self) -> &Path {
        self.0.parent().unwrap_or(&self.0)
    }

    /// Forward-slash rendering used in generated bundles and manifests.
    pub fn to_portable_string(&self) -> String {
        let mut out = String::new();
        for component in self.0.components() {
            match component {
                Component::Prefix(prefix) => out.push_str(&prefix.as_os_str().to_string_lossy()),
                Component::RootDir => out.push('/'),
                Component::Normal(part) => {
                    if !out.is_empty() && !out.ends_with('/') {
                        out.push('/');
                    }
                    out.push_str(&part.to_string_lossy());
                }
                Component::CurDir | Component::ParentDir => {}
            }
        }
        out
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_portable_string())
    }
}

impl AsRef<Path> for ModuleId {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Serialize for ModuleId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_portable_string())
    }
}

impl<'de> Deserialize<'de> for ModuleId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        ModuleId::new(raw).map_err(serde::de::Error::custom)
    }
}
