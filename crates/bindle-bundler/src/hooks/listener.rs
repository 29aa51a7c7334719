use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;

use crate::BoxError;
use crate::compilation::Compilation;

/// What a listener returns.
pub type ListenerResult = Result<(), BoxError>;

/// Future returned by async listeners.
pub type ListenerFuture = BoxFuture<'static, ListenerResult>;

type SyncFn = dyn Fn(&Compilation) -> ListenerResult + Send + Sync;
type AsyncFn = dyn Fn(Arc<Compilation>) -> ListenerFuture + Send + Sync;

/// A callable tapped onto a hook.
///
/// Sync listeners may be tapped on any hook; on async hooks they run as an
/// already-completed future. Async listeners are rejected by sync hooks.
#[derive(Clone)]
pub enum Listener {
    Sync(Arc<SyncFn>),
    Async(Arc<AsyncFn>),
}

impl Listener {
    pub fn sync<F>(f: F) -> Self
    where
        F: Fn(&Compilation) -> ListenerResult + Send + Sync + 'static,
    {
        Listener::Sync(Arc::new(f))
    }

    pub fn future<F, Fut>(f: F) -> Self
    where
        F: Fn(Arc<Compilation>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ListenerResult> + Send + 'static,
    {
        Listener::Async(Arc::new(move |compilation| f(compilation).boxed()))
    }

    pub fn is_async(&self) -> bool {
        matches!(self, Listener::Async(_))
    }

    pub(crate) fn call(&self, compilation: &Arc<Compilation>) -> ListenerFuture {
        match self {
            Listener::Sync(f) => futures::future::ready(f(compilation)).boxed(),
            Listener::Async(f) => f(Arc::clone(compilation)),
        }
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Listener::Sync(_) => "Listener::Sync",
            Listener::Async(_) => "Listener::Async",
        })
    }
}
