use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use crate::global::default_logger;
use crate::logger::Logger;

/// Immutable, request-scoped key-value overlay.
///
/// Each [`Context::with_value`] returns a new context that points back at
/// its parent; the parent is never touched. Children see their ancestors'
/// values, siblings never see each other's, and dropping a child leaves
/// the parent intact. Keys are types, so a private key type cannot clash
/// with keys used by other modules.
#[derive(Clone, Default)]
pub struct Context {
    head: Option<Arc<Entry>>,
}

struct Entry {
    key: TypeId,
    value: Arc<dyn Any + Send + Sync>,
    parent: Option<Arc<Entry>>,
}

impl Context {
    /// The empty root context.
    pub fn background() -> Self {
        Context::default()
    }

    /// Derive a context that maps key type `K` to `value`.
    pub fn with_value<K, V>(&self, value: V) -> Context
    where
        K: 'static,
        V: Any + Send + Sync,
    {
        Context {
            head: Some(Arc::new(Entry {
                key: TypeId::of::<K>(),
                value: Arc::new(value),
                parent: self.head.clone(),
            })),
        }
    }

    /// Nearest value stored under `K`, if it is a `V`.
    ///
    /// Only the nearest entry for `K` is considered: if it holds some other
    /// type the result is `None`, not an older entry.
    pub fn value<K, V>(&self) -> Option<&V>
    where
        K: 'static,
        V: Any,
    {
        let key = TypeId::of::<K>();
        let mut cursor = self.head.as_deref();
        while let Some(entry) = cursor {
            if entry.key == key {
                return entry.value.downcast_ref::<V>();
            }
            cursor = entry.parent.as_deref();
        }
        None
    }

    fn depth(&self) -> usize {
        let mut depth = 0;
        let mut cursor = self.head.as_deref();
        while let Some(entry) = cursor {
            depth += 1;
            cursor = entry.parent.as_deref();
        }
        depth
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context").field("depth", &self.depth()).finish()
    }
}

struct LoggerKey;

/// Derive a context carrying `logger`.
pub fn with_logger(ctx: &Context, logger: Logger) -> Context {
    ctx.with_value::<LoggerKey, Logger>(logger)
}

/// The logger carried by `ctx`, or the process-wide default.
pub fn from_context(ctx: &Context) -> Logger {
    match ctx.value::<LoggerKey, Logger>() {
        Some(logger) => logger.clone(),
        None => default_logger(),
    }
}
