use std::future::Future;
use std::sync::Arc;

use crate::compilation::Compilation;
use crate::config::BundleConfig;
use crate::hooks::{HookError, HookKind, HookRegistry, Listener, ListenerResult};

/// Handle passed to a plugin while it is being applied.
///
/// Listeners registered through it are named after the plugin.
pub struct PluginApi<'a> {
    plugin: Arc<str>,
    hooks: &'a mut HookRegistry,
    config: &'a BundleConfig,
}

impl<'a> PluginApi<'a> {
    pub(crate) fn new(
        plugin: impl Into<Arc<str>>,
        hooks: &'a mut HookRegistry,
        config: &'a BundleConfig,
    ) -> Self {
        Self {
            plugin: plugin.into(),
            hooks,
            config,
        }
    }

    pub fn plugin_name(&self) -> &str {
        &self.plugin
    }

    pub fn config(&self) -> &BundleConfig {
        self.config
    }

    pub fn hooks(&self) -> &HookRegistry {
        self.hooks
    }

    /// Declare a custom hook other plugins can tap and listeners can invoke
    /// through [`Compilation::hooks`].
    pub fn declare(&mut self, name: impl Into<String>, kind: HookKind) -> Result<(), HookError> {
        self.hooks.declare(name, kind)
    }

    pub fn register(&mut self, hook: &str, listener: Listener) -> Result<(), HookError> {
        self.hooks.register(hook, Arc::clone(&self.plugin), listener)
    }

    /// Tap a synchronous listener.
    pub fn tap<F>(&mut self, hook: &str, f: F) -> Result<(), HookError>
    where
        F: Fn(&Compilation) -> ListenerResult + Send + Sync + 'static,
    {
        self.register(hook, Listener::sync(f))
    }

    /// Tap an async listener. Rejected by sync hooks.
    pub fn tap_async<F, Fut>(&mut self, hook: &str, f: F) -> Result<(), HookError>
    where
        F: Fn(Arc<Compilation>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ListenerResult> + Send + 'static,
    {
        self.register(hook, Listener::future(f))
    }
}
