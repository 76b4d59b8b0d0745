//! Test utilities for syncpromise.
//!
//! This module provides shared helpers for unit and downstream tests:
//! - Consistent tracing-based logging initialization
//! - Phase macros for readable test output
//! - An isolated engine constructor
//! - A call recorder for observing handler order
//! - Settlement assertion macros
//! - An assertion-failure fixture for reclassification tests
//!
//! # Example
//! ```
//! use syncpromise::test_utils::{init_test_logging, test_engine, Recorder};
//! use syncpromise::fulfill;
//!
//! init_test_logging();
//! let engine = test_engine();
//! let seen = Recorder::new();
//! let sink = seen.clone();
//! let p = engine.promise::<i32>();
//! p.success(move |v| fulfill(sink.record(v))).unwrap();
//! p.resolve(5).unwrap();
//! assert_eq!(seen.take(), vec![5]);
//! ```

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Once;

use tracing_subscriber::fmt::format::FmtSpan;

use crate::config::EngineConfig;
use crate::runtime::Engine;

static INIT_LOGGING: Once = Once::new();

/// Initialize test logging with trace-level output.
///
/// Safe to call multiple times; only initializes once.
pub fn init_test_logging() {
    init_test_logging_with_level(tracing::Level::TRACE);
}

/// Initialize test logging with a custom level.
///
/// The first call wins; later calls are no-ops.
pub fn init_test_logging_with_level(level: tracing::Level) {
    INIT_LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(level)
            .with_test_writer()
            .with_file(true)
            .with_line_number(true)
            .with_target(true)
            .with_span_events(FmtSpan::CLOSE)
            .with_ansi(false)
            .try_init();
    });
}

/// Create an engine isolated from the thread default, labelled `"test"`.
#[must_use]
pub fn test_engine() -> Engine {
    Engine::new(EngineConfig::new().name("test"))
}

/// Shared, append-only log of values seen by handlers.
///
/// Clones write to the same log, so one clone can move into a handler while
/// the test keeps another.
#[derive(Debug)]
pub struct Recorder<T> {
    entries: Rc<RefCell<Vec<T>>>,
}

impl<T> Clone for Recorder<T> {
    fn clone(&self) -> Self {
        Self {
            entries: Rc::clone(&self.entries),
        }
    }
}

impl<T> Default for Recorder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Recorder<T> {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Appends `entry`; returns nothing so it can sit at the end of a handler.
    pub fn record(&self, entry: T) {
        self.entries.borrow_mut().push(entry);
    }

    /// Number of entries recorded so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Returns true if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Removes and returns every entry.
    #[must_use]
    pub fn take(&self) -> Vec<T> {
        std::mem::take(&mut *self.entries.borrow_mut())
    }
}

impl<T: Clone> Recorder<T> {
    /// Returns a copy of every entry.
    #[must_use]
    pub fn snapshot(&self) -> Vec<T> {
        self.entries.borrow().clone()
    }
}

/// Failure type for exercising exception reclassification.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("assertion failed: {0}")]
pub struct AssertionFailed(pub String);

/// Log a test phase transition with a visual separator.
#[macro_export]
macro_rules! test_phase {
    ($name:expr) => {
        tracing::info!(phase = %$name, "========================================");
        tracing::info!(phase = %$name, "TEST PHASE: {}", $name);
        tracing::info!(phase = %$name, "========================================");
    };
}

/// Log test completion with summary.
#[macro_export]
macro_rules! test_complete {
    ($name:expr) => {
        tracing::info!(test = %$name, "test completed successfully: {}", $name);
    };
    ($name:expr, $($key:ident = $value:expr),* $(,)?) => {
        tracing::info!(
            test = %$name,
            $($key = %$value,)*
            "test completed successfully: {}",
            $name
        );
    };
}

/// Assert that a promise is fulfilled with a specific value.
#[macro_export]
macro_rules! assert_fulfilled {
    ($promise:expr, $expected:expr) => {
        match $promise.settlement() {
            Some($crate::Settlement::Fulfilled(v)) => assert_eq!(v, $expected),
            other => unreachable!("expected Fulfilled({:?}), got {:?}", $expected, other),
        }
    };
}

/// Assert that a promise is rejected, optionally with a specific message.
#[macro_export]
macro_rules! assert_rejected {
    ($promise:expr) => {
        match $promise.reason() {
            Some(_) => {}
            None => unreachable!("expected rejection, state is {}", $promise.state()),
        }
    };
    ($promise:expr, $message:expr) => {
        match $promise.reason() {
            Some(reason) => assert_eq!(reason.to_string(), $message),
            None => unreachable!("expected rejection, state is {}", $promise.state()),
        }
    };
}

/// Assert that a promise is still pending.
#[macro_export]
macro_rules! assert_pending {
    ($promise:expr) => {
        assert!(
            $promise.is_pending(),
            "expected pending, state is {}",
            $promise.state()
        );
    };
}
