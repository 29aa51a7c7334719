use std::fmt;
use std::sync::Arc;

use futures::StreamExt;
use futures::stream::FuturesUnordered;
use indexmap::IndexMap;

use super::{AFTER_EMIT, COMPILATION, EMIT, HookError, HookKind, Listener, MAKE};
use crate::compilation::Compilation;

#[derive(Clone)]
struct Tap {
    name: Arc<str>,
    listener: Listener,
}

#[derive(Clone)]
struct Hook {
    kind: HookKind,
    taps: Vec<Tap>,
}

/// Hook name → kind and ordered listeners.
///
/// Mutated while plugins are applied, then frozen behind an `Arc` for the
/// lifetime of the compiler.
#[derive(Clone)]
pub struct HookRegistry {
    hooks: IndexMap<String, Hook>,
}

impl HookRegistry {
    /// Registry with the four built-in hooks declared.
    pub fn new() -> Self {
        let mut hooks = IndexMap::new();
        for (name, kind) in [
            (COMPILATION, HookKind::Sync),
            (MAKE, HookKind::AsyncParallel),
            (EMIT, HookKind::AsyncSeries),
            (AFTER_EMIT, HookKind::AsyncSeries),
        ] {
            hooks.insert(
                name.to_string(),
                Hook {
                    kind,
                    taps: Vec::new(),
                },
            );
        }
        Self { hooks }
    }

    /// Declare a custom hook. Redeclaring with the same kind is a no-op.
    pub fn declare(&mut self, name: impl Into<String>, kind: HookKind) -> Result<(), HookError> {
        let name = name.into();
        if let Some(existing) = self.hooks.get(&name) {
            if existing.kind != kind {
                return Err(HookError::HookKindConflict {
                    name,
                    existing: existing.kind,
                    requested: kind,
                });
            }
            return Ok(());
        }
        self.hooks.insert(
            name,
            Hook {
                kind,
                taps: Vec::new(),
            },
        );
        Ok(())
    }

    pub fn kind(&self, name: &str) -> Option<HookKind> {
        self.hooks.get(name).map(|hook| hook.kind)
    }

    /// Declared hook names, in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.hooks.keys().map(String::as_str)
    }

    pub fn listener_count(&self, name: &str) -> usize {
        self.hooks.get(name).map_or(0, |hook| hook.taps.len())
    }

    /// Listener names on `name`, in registration order.
    pub fn listener_names(&self, name: &str) -> Vec<&str> {
        self.hooks
            .get(name)
            .map(|hook| hook.taps.iter().map(|tap| &*tap.name).collect())
            .unwrap_or_default()
    }

    /// Append `listener` to the hook's ordered list.
    pub fn register(
        &mut self,
        hook: &str,
        listener_name: impl Into<Arc<str>>,
        listener: Listener,
    ) -> Result<(), HookError> {
        let listener_name = listener_name.into();
        let entry = self
            .hooks
            .get_mut(hook)
            .ok_or_else(|| HookError::UnknownHook(hook.to_string()))?;

        if entry.kind == HookKind::Sync && listener.is_async() {
            return Err(HookError::AsyncListenerOnSyncHook {
                hook: hook.to_string(),
                listener: listener_name.to_string(),
            });
        }

        tracing::trace!(hook, listener = %listener_name, "listener registered");
        entry.taps.push(Tap {
            name: listener_name,
            listener,
        });
        Ok(())
    }

    /// Run a sync hook.
    pub fn invoke_sync(&self, name: &str, compilation: &Compilation) -> Result<(), HookError> {
        let hook = self.lookup(name)?;
        if hook.kind != HookKind::Sync {
            return Err(HookError::HookKindMismatch {
                name: name.to_string(),
                kind: hook.kind,
                attempted: "synchronously",
            });
        }

        for tap in &hook.taps {
            // Async listeners never get past `register` on a sync hook.
            if let Listener::Sync(f) = &tap.listener {
                f(compilation).map_err(|err| listener_error(name, tap, err))?;
            }
        }
        Ok(())
    }

    /// Run an async-parallel or async-series hook.
    pub async fn invoke_async(
        &self,
        name: &str,
        compilation: Arc<Compilation>,
    ) -> Result<(), HookError> {
        let hook = self.lookup(name)?;
        match hook.kind {
            HookKind::Sync => Err(HookError::HookKindMismatch {
                name: name.to_string(),
                kind: hook.kind,
                attempted: "asynchronously",
            }),
            HookKind::AsyncParallel => {
                let compilation = &compilation;
                let mut pending: FuturesUnordered<_> = hook
                    .taps
                    .iter()
                    .map(|tap| async move { (tap, tap.listener.call(compilation).await) })
                    .collect();

                // Drain everything; keep the first failure to complete.
                let mut first_failure = None;
                while let Some((tap, result)) = pending.next().await {
                    if let Err(err) = result {
                        if first_failure.is_none() {
                            first_failure = Some(listener_error(name, tap, err));
                        } else {
                            tracing::debug!(
                                hook = name,
                                listener = %tap.name,
                                error = %err,
                                "listener failed after an earlier failure"
                            );
                        }
                    }
                }
                first_failure.map_or(Ok(()), Err)
            }
            HookKind::AsyncSeries => {
                for tap in &hook.taps {
                    tap.listener
                        .call(&compilation)
                        .await
                        .map_err(|err| listener_error(name, tap, err))?;
                }
                Ok(())
            }
        }
    }

    fn lookup(&self, name: &str) -> Result<&Hook, HookError> {
        self.hooks
            .get(name)
            .ok_or_else(|| HookError::UnknownHook(name.to_string()))
    }
}

impl Default for HookRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (name, hook) in &self.hooks {
            map.entry(name, &format_args!("{} ({} listeners)", hook.kind, hook.taps.len()));
        }
        map.finish()
    }
}

fn listener_error(hook: &str, tap: &Tap, err: crate::BoxError) -> HookError {
    HookError::Listener {
        hook: hook.to_string(),
        listener: tap.name.to_string(),
        source: err,
    }
}
