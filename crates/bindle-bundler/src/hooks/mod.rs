//! Named extension points.
//!
//! Every hook has a fixed [`HookKind`] that decides how its listeners run:
//!
//! - [`HookKind::Sync`]: one after another on the caller's path; the first
//!   error stops the rest.
//! - [`HookKind::AsyncParallel`]: all listeners start together and the
//!   invocation waits for every one of them. The listener that failed first
//!   (in completion order) is reported.
//! - [`HookKind::AsyncSeries`]: one at a time, each awaited before the next
//!   starts; the first error aborts the sequence.
//!
//! The compiler declares four hooks up front ([`COMPILATION`], [`MAKE`],
//! [`EMIT`], [`AFTER_EMIT`]); plugins may declare more.

mod listener;
mod registry;

pub use listener::{Listener, ListenerFuture, ListenerResult};
pub use registry::HookRegistry;

use std::fmt;

/// Sync hook fired once the entry module is in the graph.
pub const COMPILATION: &str = "compilation";
/// Async-parallel hook fired after the graph has been expanded.
pub const MAKE: &str = "make";
/// Async-series hook fired after the artifact is written.
pub const EMIT: &str = "emit";
/// Async-series hook fired after every `emit` listener finished.
pub const AFTER_EMIT: &str = "after_emit";

/// Invocation semantics of a hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookKind {
    Sync,
    AsyncParallel,
    AsyncSeries,
}

impl HookKind {
    pub fn is_async(&self) -> bool {
        !matches!(self, HookKind::Sync)
    }
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HookKind::Sync => "sync",
            HookKind::AsyncParallel => "async-parallel",
            HookKind::AsyncSeries => "async-series",
        })
    }
}

/// Errors from declaring, tapping or invoking hooks.
#[derive(Debug, thiserror::Error)]
pub enum HookError {
    #[error("Unknown hook '{0}'")]
    UnknownHook(String),

    #[error("Hook '{name}' is already declared as {existing}, cannot redeclare as {requested}")]
    HookKindConflict {
        name: String,
        existing: HookKind,
        requested: HookKind,
    },

    #[error("Hook '{name}' is {kind} and cannot be invoked {attempted}")]
    HookKindMismatch {
        name: String,
        kind: HookKind,
        attempted: &'static str,
    },

    #[error("Listener '{listener}' is async and cannot be tapped on sync hook '{hook}'")]
    AsyncListenerOnSyncHook { hook: String, listener: String },

    #[error("Listener '{listener}' on hook '{hook}' failed: {source}")]
    Listener {
        hook: String,
        listener: String,
        /// What the listener returned; downcast to recover a plugin's own type.
        #[source]
        source: crate::BoxError,
    },
}
