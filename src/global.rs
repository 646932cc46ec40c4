use std::sync::OnceLock;

use crate::env::new_logger_from_env;
use crate::logger::Logger;

/// A logger built at most once, on first use.
///
/// Concurrent first callers block until the single build finishes and
/// then all observe the same instance.
#[derive(Debug, Default)]
pub struct DefaultSlot {
    cell: OnceLock<Logger>,
}

impl DefaultSlot {
    pub const fn new() -> Self {
        DefaultSlot { cell: OnceLock::new() }
    }

    /// The stored logger, running `build` only if nothing is stored yet.
    pub fn get_or_build<F>(&self, build: F) -> Logger
    where
        F: FnOnce() -> Logger,
    {
        self.cell.get_or_init(build).clone()
    }

    /// Store `logger` if the slot is still empty; otherwise hand it back.
    pub fn set(&self, logger: Logger) -> Result<(), Logger> {
        self.cell.set(logger)
    }

    pub fn get(&self) -> Option<Logger> {
        self.cell.get().cloned()
    }
}

static DEFAULT: DefaultSlot = DefaultSlot::new();

/// Process-wide logger, built from the environment on first call.
pub fn default_logger() -> Logger {
    DEFAULT.get_or_build(new_logger_from_env)
}

/// Install the process-wide logger at start-up, before anything calls
/// [`default_logger`].
///
/// Returns the logger back if a default already exists.
pub fn set_default_logger(logger: Logger) -> Result<(), Logger> {
    DEFAULT.set(logger)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Barrier};
    use std::thread;
    use std::time::Duration;

    #[test]
    fn default_logger_is_one_instance() {
        let first = default_logger();
        for _ in 0..10 {
            assert!(default_logger().ptr_eq(&first));
        }
    }

    #[test]
    fn set_after_first_use_is_rejected() {
        let _ = default_logger();
        let rejected = set_default_logger(Logger::discard());
        assert!(rejected.is_err());
    }

    #[test]
    fn concurrent_first_use_builds_once() {
        let slot = Arc::new(DefaultSlot::new());
        let builds = Arc::new(AtomicUsize::new(0));
        let barrier = Arc::new(Barrier::new(16));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let slot = Arc::clone(&slot);
                let builds = Arc::clone(&builds);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    slot.get_or_build(|| {
                        builds.fetch_add(1, Ordering::SeqCst);
                        thread::sleep(Duration::from_millis(20));
                        Logger::discard()
                    })
                })
            })
            .collect();

        let loggers: Vec<Logger> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(builds.load(Ordering::SeqCst), 1);
        assert!(loggers.iter().all(|l| l.ptr_eq(&loggers[0])));
        assert!(slot.get().unwrap().ptr_eq(&loggers[0]));
    }

    #[test]
    fn sequential_use_builds_once() {
        let slot = DefaultSlot::new();
        let builds = AtomicUsize::new(0);
        let build = || {
            builds.fetch_add(1, Ordering::SeqCst);
            Logger::discard()
        };
        let first = slot.get_or_build(build);
        for _ in 0..5 {
            let again = slot.get_or_build(|| {
                builds.fetch_add(1, Ordering::SeqCst);
                Logger::discard()
            });
            assert!(again.ptr_eq(&first));
        }
        assert_eq!(builds.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn explicit_set_wins_over_build() {
        let slot = DefaultSlot::new();
        let installed = Logger::discard();
        slot.set(installed.clone()).unwrap();
        let got = slot.get_or_build(|| panic!("should not build"));
        assert!(got.ptr_eq(&installed));
    }
}
