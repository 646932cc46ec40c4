//! Task-scoped logger override for async code.
//!
//! Same contract as [`crate::context`], but the logger travels with the
//! running tokio task instead of an explicit [`Context`](crate::context::Context)
//! value.

use std::future::Future;

use crate::global::default_logger;
use crate::logger::Logger;

tokio::task_local! {
    static TASK_LOGGER: Logger;
}

/// Run `future` with `logger` as the task's logger.
///
/// Nested scopes shadow outer ones for their duration only. Tasks spawned
/// from inside the scope do not inherit it.
pub async fn scope<F>(logger: Logger, future: F) -> F::Output
where
    F: Future,
{
    TASK_LOGGER.scope(logger, future).await
}

/// Run the closure `f` with `logger` as the current logger.
pub fn sync_scope<F, R>(logger: Logger, f: F) -> R
where
    F: FnOnce() -> R,
{
    TASK_LOGGER.sync_scope(logger, f)
}

/// The innermost scoped logger, or the process-wide default.
pub fn current() -> Logger {
    TASK_LOGGER
        .try_with(Logger::clone)
        .unwrap_or_else(|_| default_logger())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn outside_any_scope_is_default() {
        assert!(current().ptr_eq(&default_logger()));
    }

    #[tokio::test]
    async fn scope_overrides_and_restores() {
        let outer = Logger::discard().with_name("outer");
        let inner = Logger::discard().with_name("inner");

        let seen = scope(outer.clone(), async {
            let before = current();
            let nested = scope(inner.clone(), async { current() }).await;
            let after = current();
            (before, nested, after)
        })
        .await;

        assert!(seen.0.ptr_eq(&outer));
        assert!(seen.1.ptr_eq(&inner));
        assert!(seen.2.ptr_eq(&outer));
        assert!(current().ptr_eq(&default_logger()));
    }

    #[tokio::test]
    async fn spawned_tasks_do_not_inherit() {
        let scoped = Logger::discard().with_name("scoped");
        let spawned = scope(scoped, async { tokio::spawn(async { current() }).await.unwrap() }).await;
        assert!(spawned.ptr_eq(&default_logger()));
    }

    #[test]
    fn sync_scope_applies_to_closure() {
        let logger = Logger::discard().with_name("sync");
        let inside = sync_scope(logger.clone(), current);
        assert!(inside.ptr_eq(&logger));
        assert!(current().ptr_eq(&default_logger()));
    }
}
