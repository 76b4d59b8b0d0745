//! The promise engine.
//!
//! An [`Engine`] is the composition root for a family of promises. It owns
//! the assertion registry that classifies handler failures, the id sequence,
//! and the activity counters. Every promise remembers the engine it was
//! created in, and children inherit their parent's engine.
//!
//! Each thread has a default engine, reachable through [`Engine::current`];
//! the argument-free constructors on [`Promise`] use it. Tests that want
//! isolation from the thread default build their own with [`Engine::new`].

pub mod classify;
pub mod stats;
pub(crate) mod work;

pub use classify::{AssertionRegistry, Disposition};
pub use stats::EngineStats;

use core::fmt;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::config::EngineConfig;
use crate::error::Result;
use crate::promise::{Promise, Rejecter, Resolver};
use crate::types::{ExceptionKind, PromiseId, Reason, Settlement};
use stats::StatsRecorder;
use work::DrainState;

thread_local! {
    static CURRENT: Engine = Engine::new(EngineConfig::default());
}

struct EngineInner {
    name: &'static str,
    registry: RefCell<AssertionRegistry>,
    warn_on_unhandled_rejection: bool,
    next_seq: Cell<u64>,
    stats: StatsRecorder,
    drain: DrainState,
}

/// Handle to a promise engine. Clones share the same engine.
#[derive(Clone)]
pub struct Engine {
    inner: Rc<EngineInner>,
}

impl Engine {
    /// Creates an engine from `config`.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self {
            inner: Rc::new(EngineInner {
                name: config.name,
                registry: RefCell::new(AssertionRegistry::new(config.assertion_types)),
                warn_on_unhandled_rejection: config.warn_on_unhandled_rejection,
                next_seq: Cell::new(0),
                stats: StatsRecorder::default(),
                drain: DrainState::default(),
            }),
        }
    }

    /// Returns this thread's default engine.
    #[must_use]
    pub fn current() -> Self {
        CURRENT.with(Clone::clone)
    }

    /// Returns the engine label.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.inner.name
    }

    /// Returns true if both handles refer to the same engine.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Creates a pending promise.
    #[must_use]
    pub fn promise<T: Clone + 'static>(&self) -> Promise<T> {
        Promise::new_in(self)
    }

    /// Creates a promise already fulfilled with `value`.
    ///
    /// The value is stored verbatim, even if it is itself a promise.
    #[must_use]
    pub fn resolved<T: Clone + 'static>(&self, value: T) -> Promise<T> {
        let promise = Promise::new_in(self);
        promise.settle_fresh(Settlement::Fulfilled(value));
        promise
    }

    /// Creates a promise already rejected with `reason`.
    #[must_use]
    pub fn rejected<T: Clone + 'static>(&self, reason: impl Into<Reason>) -> Promise<T> {
        let promise = Promise::new_in(self);
        promise.settle_fresh(Settlement::Rejected(reason.into()));
        promise
    }

    /// Creates a promise and hands its settlement handles to `executor`,
    /// which runs before this call returns.
    pub fn with_executor<T, F>(&self, executor: F) -> Result<Promise<T>>
    where
        T: Clone + 'static,
        F: FnOnce(Resolver<T>, Rejecter<T>) -> Result<()>,
    {
        let promise = Promise::new_in(self);
        executor(Resolver::new(&promise), Rejecter::new(&promise))?;
        Ok(promise)
    }

    /// Replaces the assertion registry wholesale; the last call wins.
    pub fn set_assertion_exception_types(&self, kinds: impl IntoIterator<Item = ExceptionKind>) {
        let mut registry = self.inner.registry.borrow_mut();
        registry.replace(kinds);
        tracing::debug!(
            engine = self.inner.name,
            kinds = ?registry.kinds(),
            "assertion registry replaced"
        );
    }

    /// Returns the registered assertion kinds.
    #[must_use]
    pub fn assertion_exception_types(&self) -> Vec<ExceptionKind> {
        self.inner.registry.borrow().kinds().to_vec()
    }

    /// Classifies a handler failure against the registry.
    #[must_use]
    pub fn classify(&self, reason: &Reason) -> Disposition {
        self.inner.registry.borrow().classify(reason)
    }

    /// Returns a snapshot of the engine counters.
    #[must_use]
    pub fn stats(&self) -> EngineStats {
        self.inner.stats.snapshot()
    }

    pub(crate) fn recorder(&self) -> &StatsRecorder {
        &self.inner.stats
    }

    pub(crate) fn drain_state(&self) -> &DrainState {
        &self.inner.drain
    }

    pub(crate) fn next_id(&self) -> PromiseId {
        let seq = self.inner.next_seq.get() + 1;
        self.inner.next_seq.set(seq);
        self.inner.stats.promise_created();
        PromiseId::from_seq(seq)
    }

    pub(crate) fn note_unhandled_rejection(&self, id: PromiseId, reason: &Reason) {
        self.inner.stats.unhandled();
        if self.inner.warn_on_unhandled_rejection {
            tracing::warn!(
                engine = self.inner.name,
                promise = %id,
                reason = %reason,
                "promise rejected with no continuations registered"
            );
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("name", &self.inner.name)
            .field("assertion_types", &self.inner.registry.borrow().kinds())
            .field("promises_created", &self.inner.next_seq.get())
            .finish()
    }
}
