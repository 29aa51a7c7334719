//! Loader pipeline: path-matched text transforms applied before the source
//! transformer sees a module.
//!
//! Rules run in declaration order. A rule whose `use` is a chain applies it
//! back-to-front, so the last declared loader runs first:
//!
//! ```rust
//! use bindle_graph::loader::{Loader, LoaderPipeline, LoaderRule};
//! use std::path::Path;
//!
//! let pipeline = LoaderPipeline::new(vec![LoaderRule::extension(
//!     "txt",
//!     vec![
//!         Loader::new("wrap", |text| Ok(format!("[{text}]"))),
//!         Loader::new("upper", |text| Ok(text.to_uppercase())),
//!     ],
//! )]);
//!
//! let out = pipeline.apply(Path::new("/src/note.txt"), "hi".to_string()).unwrap();
//! assert_eq!(out, "[HI]");
//! ```

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use regex::Regex;

/// Error returned by a loader transform.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("loader '{loader}' failed: {message}")]
pub struct LoaderError {
    pub loader: String,
    pub message: String,
}

type LoaderFn = dyn Fn(String) -> Result<String, String> + Send + Sync;
type TestFn = dyn Fn(&Path) -> bool + Send + Sync;

/// A single named text → text transform.
#[derive(Clone)]
pub struct Loader {
    name: Arc<str>,
    transform: Arc<LoaderFn>,
}

impl Loader {
    pub fn new<F>(name: impl Into<Arc<str>>, transform: F) -> Self
    where
        F: Fn(String) -> Result<String, String> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            transform: Arc::new(transform),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, text: String) -> Result<String, LoaderError> {
        (self.transform)(text).map_err(|message| LoaderError {
            loader: self.name.to_string(),
            message,
        })
    }
}

impl fmt::Debug for Loader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Loader").field(&self.name).finish()
    }
}

/// The `use` half of a rule: one loader or an ordered chain.
#[derive(Debug, Clone)]
pub enum LoaderUse {
    Single(Loader),
    /// Applied last-to-first.
    Chain(Vec<Loader>),
}

impl From<Loader> for LoaderUse {
    fn from(loader: Loader) -> Self {
        LoaderUse::Single(loader)
    }
}

impl From<Vec<Loader>> for LoaderUse {
    fn from(chain: Vec<Loader>) -> Self {
        LoaderUse::Chain(chain)
    }
}

/// A `{ test, use }` pair.
#[derive(Clone)]
pub struct LoaderRule {
    test: Arc<TestFn>,
    description: String,
    use_: LoaderUse,
}

impl LoaderRule {
    /// Rule matching paths accepted by an arbitrary predicate.
    pub fn new<F>(test: F, use_: impl Into<LoaderUse>) -> Self
    where
        F: Fn(&Path) -> bool + Send + Sync + 'static,
    {
        Self {
            test: Arc::new(test),
            description: "<predicate>".to_string(),
            use_: use_.into(),
        }
    }

    /// Rule matching files with the given extension (without the dot).
    pub fn extension(ext: impl Into<String>, use_: impl Into<LoaderUse>) -> Self {
        let ext = ext.into();
        let description = format!("*.{ext}");
        Self {
            test: Arc::new(move |path: &Path| {
                path.extension().is_some_and(|e| e.to_string_lossy() == ext.as_str())
            }),
            description,
            use_: use_.into(),
        }
    }

    /// Rule matching paths whose string form matches `pattern`.
    pub fn regex(pattern: Regex, use_: impl Into<LoaderUse>) -> Self {
        let description = format!("/{}/", pattern.as_str());
        Self {
            test: Arc::new(move |path: &Path| pattern.is_match(&path.to_string_lossy())),
            description,
            use_: use_.into(),
        }
    }

    pub fn matches(&self, path: &Path) -> bool {
        (self.test)(path)
    }

    fn apply(&self, text: String) -> Result<String, LoaderError> {
        match &self.use_ {
            LoaderUse::Single(loader) => loader.run(text),
            LoaderUse::Chain(chain) => chain.iter().rev().try_fold(text, |acc, loader| loader.run(acc)),
        }
    }
}

impl fmt::Debug for LoaderRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoaderRule")
            .field("test", &self.description)
            .field("use", &self.use_)
            .finish()
    }
}

/// Ordered rule set.
#[derive(Debug, Clone, Default)]
pub struct LoaderPipeline {
    rules: Vec<LoaderRule>,
}

impl LoaderPipeline {
    pub fn new(rules: Vec<LoaderRule>) -> Self {
        Self { rules }
    }

    pub fn push(&mut self, rule: LoaderRule) {
        self.rules.push(rule);
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Run every matching rule over `text`, in declaration order.
    pub fn apply(&self, path: &Path, text: String) -> Result<String, LoaderError> {
        self.rules
            .iter()
            .filter(|rule| rule.matches(path))
            .try_fold(text, |acc, rule| {
                tracing::trace!(path = %path.display(), rule = ?rule, "applying loader rule");
                rule.apply(acc)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upper() -> Loader {
        Loader::new("upper", |text| Ok(text.to_uppercase()))
    }

    fn suffix(tag: &'static str) -> Loader {
        Loader::new(tag, move |text| Ok(format!("{text}{tag}")))
    }

    #[test]
    fn test_non_matching_rule_is_skipped() {
        let pipeline = LoaderPipeline::new(vec![LoaderRule::extension("txt", upper())]);
        let out = pipeline.apply(Path::new("/src/index"), "abc".into()).unwrap();
        assert_eq!(out, "abc");
    }

    #[test]
    fn test_rules_apply_in_declaration_order() {
        let pipeline = LoaderPipeline::new(vec![
            LoaderRule::new(|_| true, suffix("-1")),
            LoaderRule::new(|_| true, suffix("-2")),
        ]);
        let out = pipeline.apply(Path::new("/a.js"), "x".into()).unwrap();
        assert_eq!(out, "x-1-2");
    }

    #[test]
    fn test_chain_applies_back_to_front() {
        let pipeline = LoaderPipeline::new(vec![LoaderRule::new(
            |_| true,
            vec![suffix("-first"), suffix("-last")],
        )]);
        let out = pipeline.apply(Path::new("/a.js"), "x".into()).unwrap();
        assert_eq!(out, "x-last-first");
    }

    #[test]
    fn test_regex_rule() {
        let rule = LoaderRule::regex(Regex::new(r"\.txt$").unwrap(), upper());
        assert!(rule.matches(Path::new("/src/notes.txt")));
        assert!(!rule.matches(Path::new("/src/notes.txt.js")));
    }

    #[test]
    fn test_failure_names_loader() {
        let pipeline = LoaderPipeline::new(vec![LoaderRule::new(
            |_| true,
            Loader::new("json", |_| Err("unexpected token".to_string())),
        )]);
        let err = pipeline.apply(Path::new("/a.json"), "{".into()).unwrap_err();
        assert_eq!(err.loader, "json");
        assert_eq!(err.message, "unexpected token");
    }
}
