//! # bindle-graph
//!
//! Module graph construction for the bindle compiler.
//!
//! ## Overview
//!
//! This crate owns everything between "a path on disk" and "a closed
//! dependency graph":
//!
//! - [`ModuleId`]: canonical, lexically cleaned absolute path of a module
//! - [`Module`] and [`DependencyGraph`]: the data model the bundle embeds
//! - [`ModuleGraph`]: shared, append-only handle used during a compilation
//! - [`Runtime`]: async file-system abstraction (native and in-memory)
//! - [`loader`]: path-matched text transforms run before parsing
//! - [`transform`]: the source transformer seam and the default
//!   [`ImportRewriter`]
//! - [`ModuleBuilder`] and [`DependencyGraphBuilder`]: build one module,
//!   then walk the rest breadth-first
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use bindle_graph::{DependencyGraphBuilder, ModuleBuilder, ModuleId, NativeRuntime};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let builder = ModuleBuilder::new(Arc::new(NativeRuntime));
//! let entry = builder.build(&ModuleId::new("/project/src/index.js")?).await?;
//!
//! let graph = DependencyGraphBuilder::new(builder).expand(entry).await?;
//! println!("{}", serde_json::to_string_pretty(&graph)?);
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod graph;
pub mod loader;
pub mod module;
pub mod module_id;
pub mod runtime;
pub mod transform;
pub mod walker;

pub use builder::{BuildError, ModuleBuilder};
pub use graph::{DependencyGraph, GraphError, ModuleGraph};
pub use loader::{Loader, LoaderError, LoaderPipeline, LoaderRule, LoaderUse};
pub use module::{DependencyMap, Module};
pub use module_id::{ModuleId, ModuleIdError};
pub use transform::{ImportRewriter, SourceTransformer, TransformError, TransformOutput};
pub use walker::DependencyGraphBuilder;

// Re-export runtime types
pub use runtime::{IoOp, Runtime, RuntimeError, RuntimeResult};

#[cfg(not(target_family = "wasm"))]
pub use runtime::native::NativeRuntime;

// Test utilities (available in test builds)
#[cfg(any(
    all(any(test, doctest), not(target_family = "wasm")),
    all(feature = "test-utils", not(target_family = "wasm"))
))]
pub use runtime::test_utils::TestRuntime;
