//! The deferred-value cell.
//!
//! A [`Promise`] starts pending and settles exactly once, either fulfilled
//! with a value or rejected with a [`Reason`]. Continuations registered while
//! it is pending are queued in registration order; registering against a
//! settled promise fires the new continuation before the call returns.
//!
//! ```text
//!               resolve(v)
//!   Pending ───────────────► Fulfilled(v)
//!      │
//!      └───────────────────► Rejected(r)
//!               reject(r)
//! ```
//!
//! Nothing here runs off the calling thread. "Asynchrony" is only the gap
//! between registering a continuation and settling the promise it hangs off.
//!
//! # Example
//!
//! ```
//! use syncpromise::{fulfill, Promise};
//!
//! let source = Promise::<i32>::new();
//! let doubled = source.then(|v| fulfill(v * 2)).unwrap();
//! assert!(doubled.is_pending());
//!
//! source.resolve(21).unwrap();
//! assert_eq!(doubled.value(), Some(42));
//! ```
//!
//! # Handler failures
//!
//! A handler that returns `Err(reason)` rejects its child, unless the
//! reason's type is registered with
//! [`Engine::set_assertion_exception_types`], in which case the failure is
//! re-raised as [`ErrorKind::Escalated`](crate::ErrorKind::Escalated) from
//! whichever call triggered the firing. Panics are never caught.

use core::fmt;
use std::cell::RefCell;
use std::mem;
use std::rc::Rc;

use smallvec::smallvec;

use crate::error::{Error, Result};
use crate::record::{
    ContinuationRecord, FinallyRecord, FulfillArm, Observer, Reaction, Registry, RejectArm,
};
use crate::runtime::work::WorkList;
use crate::runtime::Engine;
use crate::thenable::{
    Callback, Cleanup, FinallySignal, HandlerResult, HasFinally, Thenable,
};
use crate::types::{ExceptionKind, PromiseId, PromiseState, Reason, Settlement};

struct Shared<T> {
    id: PromiseId,
    settlement: Option<Settlement<T>>,
    registry: Registry<T>,
}

/// A deferred value that settles synchronously, on demand.
///
/// Cloning a `Promise` yields another handle to the same cell.
pub struct Promise<T> {
    shared: Rc<RefCell<Shared<T>>>,
    engine: Engine,
}

impl<T> Clone for Promise<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Rc::clone(&self.shared),
            engine: self.engine.clone(),
        }
    }
}

impl<T> Promise<T> {
    /// Returns the promise id.
    #[must_use]
    pub fn id(&self) -> PromiseId {
        self.shared.borrow().id
    }

    /// Returns the engine this promise belongs to.
    #[must_use]
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> PromiseState {
        self.shared
            .borrow()
            .settlement
            .as_ref()
            .map_or(PromiseState::Pending, Settlement::state)
    }

    /// Returns true while the promise is unsettled.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.state().is_pending()
    }

    /// Returns true once the promise holds a value.
    #[must_use]
    pub fn is_fulfilled(&self) -> bool {
        self.state().is_fulfilled()
    }

    /// Returns true once the promise holds a rejection reason.
    #[must_use]
    pub fn is_rejected(&self) -> bool {
        self.state().is_rejected()
    }

    /// Returns the rejection reason, if rejected.
    #[must_use]
    pub fn reason(&self) -> Option<Reason> {
        self.shared
            .borrow()
            .settlement
            .as_ref()
            .and_then(Settlement::reason)
            .cloned()
    }

    /// Returns the number of continuations waiting on this promise.
    #[must_use]
    pub fn pending_continuations(&self) -> usize {
        self.shared.borrow().registry.len()
    }

    /// Returns true if both handles refer to the same cell.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.shared, &other.shared)
    }

    /// Takes the queued records if this is the last handle to the cell,
    /// so the caller can free them without recursing into the chain.
    pub(crate) fn detach_registry(&self) -> Option<Registry<T>> {
        if Rc::strong_count(&self.shared) != 1 {
            return None;
        }
        let mut shared = self.shared.try_borrow_mut().ok()?;
        if shared.registry.is_empty() {
            None
        } else {
            Some(mem::take(&mut shared.registry))
        }
    }
}

impl<T: Clone + 'static> Promise<T> {
    /// Creates a pending promise in this thread's default engine.
    #[must_use]
    pub fn new() -> Self {
        Self::new_in(&Engine::current())
    }

    pub(crate) fn new_in(engine: &Engine) -> Self {
        Self {
            shared: Rc::new(RefCell::new(Shared {
                id: engine.next_id(),
                settlement: None,
                registry: Registry::new(),
            })),
            engine: engine.clone(),
        }
    }

    /// Creates a promise and runs `executor` with its settlement handles
    /// before returning, in this thread's default engine.
    pub fn with_executor<F>(executor: F) -> Result<Self>
    where
        F: FnOnce(Resolver<T>, Rejecter<T>) -> Result<()>,
    {
        Engine::current().with_executor(executor)
    }

    /// Creates a promise already fulfilled with `value`.
    #[must_use]
    pub fn resolved(value: T) -> Self {
        Engine::current().resolved(value)
    }

    /// Creates a promise already rejected with `reason`.
    #[must_use]
    pub fn rejected(reason: impl Into<Reason>) -> Self {
        Engine::current().rejected(reason)
    }

    /// Replaces the default engine's assertion registry; the last call wins.
    pub fn set_assertion_exception_types(kinds: impl IntoIterator<Item = ExceptionKind>) {
        Engine::current().set_assertion_exception_types(kinds);
    }

    /// Returns the outcome, if settled.
    #[must_use]
    pub fn settlement(&self) -> Option<Settlement<T>> {
        self.shared.borrow().settlement.clone()
    }

    /// Returns the value, if fulfilled.
    #[must_use]
    pub fn value(&self) -> Option<T> {
        self.shared
            .borrow()
            .settlement
            .as_ref()
            .and_then(Settlement::value)
            .cloned()
    }

    /// Fulfills the promise with `value` and fires queued continuations.
    ///
    /// `value` is stored verbatim: resolving a `Promise<Promise<U>>` with a
    /// promise does not adopt it. Only handler results are adopted.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::AlreadySettled`](crate::ErrorKind::AlreadySettled) if the
    /// promise has settled, or
    /// [`ErrorKind::Escalated`](crate::ErrorKind::Escalated) if a handler
    /// fired by this call failed with a registered assertion type.
    pub fn resolve(&self, value: T) -> Result<()> {
        self.settle(Settlement::Fulfilled(value))
    }

    /// Rejects the promise with `reason` and fires queued continuations.
    ///
    /// # Errors
    ///
    /// Same as [`resolve`](Self::resolve).
    pub fn reject(&self, reason: impl Into<Reason>) -> Result<()> {
        self.settle(Settlement::Rejected(reason.into()))
    }

    /// Settles the promise with `outcome` and fires queued continuations.
    pub fn settle(&self, outcome: Settlement<T>) -> Result<()> {
        WorkList::run(&self.engine, |work| self.settle_in(work, outcome))
    }

    /// Registers a fulfillment handler.
    ///
    /// If this promise rejects, the returned child stays pending forever.
    pub fn success<U, F>(&self, on_fulfilled: F) -> Result<Promise<U>>
    where
        U: Clone + 'static,
        F: FnOnce(T) -> HandlerResult<U> + 'static,
    {
        self.chain(
            FulfillArm::Handle(Box::new(on_fulfilled)),
            RejectArm::Ignore,
        )
    }

    /// Registers a rejection handler.
    ///
    /// If this promise fulfills, the returned child stays pending forever.
    /// Use [`or_else`](Self::or_else) to let values through instead.
    pub fn catch<F>(&self, on_rejected: F) -> Result<Promise<T>>
    where
        F: FnOnce(Reason) -> HandlerResult<T> + 'static,
    {
        self.chain(FulfillArm::Ignore, RejectArm::Handle(Box::new(on_rejected)))
    }

    /// Registers a fulfillment handler; a rejection passes through to the
    /// child unchanged.
    pub fn then<U, F>(&self, on_fulfilled: F) -> Result<Promise<U>>
    where
        U: Clone + 'static,
        F: FnOnce(T) -> HandlerResult<U> + 'static,
    {
        self.chain(
            FulfillArm::Handle(Box::new(on_fulfilled)),
            RejectArm::PassThrough,
        )
    }

    /// Registers both a fulfillment and a rejection handler.
    pub fn then_with<U, F, R>(&self, on_fulfilled: F, on_rejected: R) -> Result<Promise<U>>
    where
        U: Clone + 'static,
        F: FnOnce(T) -> HandlerResult<U> + 'static,
        R: FnOnce(Reason) -> HandlerResult<U> + 'static,
    {
        self.chain(
            FulfillArm::Handle(Box::new(on_fulfilled)),
            RejectArm::Handle(Box::new(on_rejected)),
        )
    }

    /// Registers a rejection handler; a value passes through to the child
    /// unchanged.
    pub fn or_else<F>(&self, on_rejected: F) -> Result<Promise<T>>
    where
        F: FnOnce(Reason) -> HandlerResult<T> + 'static,
    {
        self.chain(
            FulfillArm::PassThrough(core::convert::identity),
            RejectArm::Handle(Box::new(on_rejected)),
        )
    }

    /// Registers a callback that runs on either outcome.
    ///
    /// The child settles with this promise's own outcome, not with anything
    /// the callback returns. If the callback returns [`Cleanup::Await`], the
    /// child waits for that object to signal completion first.
    pub fn finally<F>(&self, on_settled: F) -> Result<Promise<T>>
    where
        F: FnOnce() -> core::result::Result<Cleanup, Reason> + 'static,
    {
        let child = Self::new_in(&self.engine);
        self.register(Box::new(FinallyRecord::new(
            Box::new(on_settled),
            child.clone(),
        )))?;
        Ok(child)
    }

    fn chain<U: Clone + 'static>(
        &self,
        on_fulfilled: FulfillArm<T, U>,
        on_rejected: RejectArm<U>,
    ) -> Result<Promise<U>> {
        let child = Promise::new_in(&self.engine);
        self.register(Box::new(ContinuationRecord::new(
            on_fulfilled,
            on_rejected,
            child.clone(),
        )))?;
        Ok(child)
    }

    fn register(&self, record: Box<dyn Reaction<T>>) -> Result<()> {
        WorkList::run(&self.engine, |work| {
            self.register_in(work, record);
            Ok(())
        })
    }

    /// Queues `record`, or schedules it at once if already settled.
    pub(crate) fn register_in(&self, work: &mut WorkList, record: Box<dyn Reaction<T>>) {
        let settled = {
            let mut shared = self.shared.borrow_mut();
            if shared.settlement.is_none() {
                shared.registry.push(record);
                return;
            }
            shared.settlement.clone()
        };
        if let Some(outcome) = settled {
            work.schedule(outcome, smallvec![record]);
        }
    }

    /// Transitions out of Pending and schedules every queued record.
    pub(crate) fn settle_in(&self, work: &mut WorkList, outcome: Settlement<T>) -> Result<()> {
        let (id, registry) = {
            let mut shared = self.shared.borrow_mut();
            let current = shared
                .settlement
                .as_ref()
                .map_or(PromiseState::Pending, Settlement::state);
            if !current.can_transition_to(outcome.state()) {
                return Err(Error::already_settled(shared.id, current));
            }
            shared.settlement = Some(outcome.clone());
            (shared.id, mem::take(&mut shared.registry))
        };

        self.engine.recorder().settled();
        tracing::trace!(
            engine = self.engine.name(),
            promise = %id,
            state = %outcome.state(),
            continuations = registry.len(),
            "settled"
        );
        if let Settlement::Rejected(reason) = &outcome {
            if registry.is_empty() {
                self.engine.note_unhandled_rejection(id, reason);
            }
        }
        work.schedule(outcome, registry);
        Ok(())
    }

    /// Engine-side settlement: the first committer wins and later attempts
    /// are dropped.
    pub(crate) fn settle_quietly(&self, work: &mut WorkList, outcome: Settlement<T>) -> Result<()> {
        if self.is_pending() {
            self.settle_in(work, outcome)
        } else {
            tracing::trace!(
                promise = %self.id(),
                ignored = %outcome.branch(),
                "already settled, ignoring"
            );
            Ok(())
        }
    }

    /// Settlement requested by a foreign callback. Joins the engine's
    /// running drain if there is one.
    pub(crate) fn settle_external(&self, outcome: Settlement<T>) -> Result<()> {
        let target = self.clone();
        WorkList::submit(
            &self.engine,
            Box::new(move |work: &mut WorkList| target.settle_quietly(work, outcome)),
        )
    }

    /// Settles a promise that cannot have continuations yet.
    pub(crate) fn settle_fresh(&self, outcome: Settlement<T>) {
        let mut shared = self.shared.borrow_mut();
        debug_assert!(shared.settlement.is_none() && shared.registry.is_empty());
        shared.settlement = Some(outcome);
        self.engine.recorder().settled();
    }

    /// Registers an engine-internal observer, joining the running drain if
    /// there is one.
    fn observe(self, record: Observer<T>) -> Result<()> {
        let engine = self.engine.clone();
        WorkList::submit(
            &engine,
            Box::new(move |work: &mut WorkList| {
                self.register_in(work, Box::new(record));
                Ok(())
            }),
        )
    }

    pub(crate) fn external_resolve(&self) -> Callback<T> {
        let target = self.clone();
        Box::new(move |value| target.settle_external(Settlement::Fulfilled(value)))
    }

    pub(crate) fn external_reject(&self) -> Callback<Reason> {
        let target = self.clone();
        Box::new(move |reason| target.settle_external(Settlement::Rejected(reason)))
    }
}

impl<T: Clone + 'static> Default for Promise<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + 'static> Thenable<T> for Promise<T> {
    fn subscribe(
        self: Box<Self>,
        on_fulfilled: Callback<T>,
        on_rejected: Callback<Reason>,
    ) -> Result<()> {
        self.observe(Observer::new(move |outcome: &Settlement<T>, _work| {
            match outcome {
                Settlement::Fulfilled(value) => on_fulfilled(value.clone()),
                Settlement::Rejected(reason) => on_rejected(reason.clone()),
            }
        }))
    }
}

impl<T: Clone + 'static> HasFinally for Promise<T> {
    fn on_finally(self: Box<Self>, signal: FinallySignal) -> Result<()> {
        self.observe(Observer::new(move |_: &Settlement<T>, _work| signal()))
    }
}

impl<T: fmt::Debug> fmt::Debug for Promise<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shared = self.shared.borrow();
        f.debug_struct("Promise")
            .field("id", &shared.id)
            .field("settlement", &shared.settlement)
            .field("continuations", &shared.registry.len())
            .finish()
    }
}

/// Fulfillment handle passed to an executor.
#[derive(Clone)]
pub struct Resolver<T> {
    promise: Promise<T>,
}

impl<T: Clone + 'static> Resolver<T> {
    pub(crate) fn new(promise: &Promise<T>) -> Self {
        Self {
            promise: promise.clone(),
        }
    }

    /// Fulfills the underlying promise.
    pub fn resolve(&self, value: T) -> Result<()> {
        self.promise.resolve(value)
    }
}

/// Rejection handle passed to an executor.
#[derive(Clone)]
pub struct Rejecter<T> {
    promise: Promise<T>,
}

impl<T: Clone + 'static> Rejecter<T> {
    pub(crate) fn new(promise: &Promise<T>) -> Self {
        Self {
            promise: promise.clone(),
        }
    }

    /// Rejects the underlying promise.
    pub fn reject(&self, reason: impl Into<Reason>) -> Result<()> {
        self.promise.reject(reason)
    }
}
