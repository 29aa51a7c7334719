//! Plugins: externally supplied code that taps hooks at construction time.
//!
//! A plugin is either a plain callable or a [`Registrar`] object; both are
//! handed the same explicit [`PluginApi`] handle, never the compiler itself.

mod api;

pub use api::PluginApi;

use std::fmt;
use std::sync::Arc;

use crate::BoxError;

/// Object-style plugin.
pub trait Registrar: Send + Sync {
    /// Name used in logs and error messages.
    fn name(&self) -> &str;

    fn register(&self, api: &mut PluginApi<'_>) -> Result<(), BoxError>;
}

type CallableFn = dyn Fn(&mut PluginApi<'_>) -> Result<(), BoxError> + Send + Sync;

/// A plugin as supplied in configuration.
#[derive(Clone)]
pub enum Plugin {
    Callable { name: Arc<str>, apply: Arc<CallableFn> },
    Registrar(Arc<dyn Registrar>),
}

impl Plugin {
    pub fn callable<F>(name: impl Into<Arc<str>>, apply: F) -> Self
    where
        F: Fn(&mut PluginApi<'_>) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        Plugin::Callable {
            name: name.into(),
            apply: Arc::new(apply),
        }
    }

    pub fn registrar(registrar: impl Registrar + 'static) -> Self {
        Plugin::Registrar(Arc::new(registrar))
    }

    pub fn name(&self) -> &str {
        match self {
            Plugin::Callable { name, .. } => &**name,
            Plugin::Registrar(registrar) => registrar.name(),
        }
    }

    pub(crate) fn apply(&self, api: &mut PluginApi<'_>) -> Result<(), BoxError> {
        match self {
            Plugin::Callable { apply, .. } => apply(api),
            Plugin::Registrar(registrar) => registrar.register(api),
        }
    }
}

impl fmt::Debug for Plugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Plugin::Callable { name, .. } => f.debug_tuple("Plugin::Callable").field(name).finish(),
            Plugin::Registrar(registrar) => f
                .debug_tuple("Plugin::Registrar")
                .field(&registrar.name())
                .finish(),
        }
    }
}
