//! Interop with deferred values that are not native promises.
//!
//! Any type implementing `Thenable` can be returned from a handler and
//! adopted; any type implementing `HasFinally` can hold up a `finally`.

#[macro_use]
mod common;

use common::*;
use std::cell::RefCell;
use std::rc::Rc;
use syncpromise::{
    fulfill, Callback, Cleanup, FinallySignal, HasFinally, Promise, Reason, Resolution, Result,
    Thenable,
};

type Slot<T> = Rc<RefCell<Option<(Callback<T>, Callback<Reason>)>>>;

/// A thenable that stores its callbacks until the test settles it.
struct Manual<T> {
    slot: Slot<T>,
}

impl<T> Manual<T> {
    fn new() -> (Self, Slot<T>) {
        let slot: Slot<T> = Rc::new(RefCell::new(None));
        (Self { slot: Rc::clone(&slot) }, slot)
    }
}

impl<T> Thenable<T> for Manual<T> {
    fn subscribe(self: Box<Self>, on_fulfilled: Callback<T>, on_rejected: Callback<Reason>) -> Result<()> {
        *self.slot.borrow_mut() = Some((on_fulfilled, on_rejected));
        Ok(())
    }
}

/// A thenable that reports a value the moment it is subscribed to.
struct Ready(&'static str);

impl Thenable<&'static str> for Ready {
    fn subscribe(
        self: Box<Self>,
        on_fulfilled: Callback<&'static str>,
        _on_rejected: Callback<Reason>,
    ) -> Result<()> {
        on_fulfilled(self.0)
    }
}

/// A badly behaved thenable that calls both callbacks.
struct CallsBoth;

impl Thenable<i32> for CallsBoth {
    fn subscribe(self: Box<Self>, on_fulfilled: Callback<i32>, on_rejected: Callback<Reason>) -> Result<()> {
        on_fulfilled(1)?;
        on_rejected(Reason::msg("second signal"))
    }
}

/// A resource whose release the test triggers by hand.
struct Handle {
    signal: Rc<RefCell<Option<FinallySignal>>>,
}

impl HasFinally for Handle {
    fn on_finally(self: Box<Self>, signal: FinallySignal) -> Result<()> {
        *self.signal.borrow_mut() = Some(signal);
        Ok(())
    }
}

#[test]
fn handler_returning_foreign_thenable_defers_child() {
    init_test_logging();
    test_phase!("handler_returning_foreign_thenable_defers_child");
    let engine = test_engine();
    let parent = engine.promise::<i32>();
    let (manual, slot) = Manual::<String>::new();

    let child = parent
        .then(move |_| Ok(Resolution::thenable(manual)))
        .expect("then");
    parent.resolve(1).expect("resolve");
    assert!(child.is_pending());

    let (on_fulfilled, _) = slot.borrow_mut().take().expect("subscribed");
    on_fulfilled("from abroad".to_string()).expect("fulfill");
    assert_eq!(child.value(), Some("from abroad".to_string()));
    test_complete!("handler_returning_foreign_thenable_defers_child");
}

#[test]
fn foreign_rejection_is_adopted() {
    let engine = test_engine();
    let (manual, slot) = Manual::<i32>::new();
    let child = engine
        .resolved(0)
        .then(move |_| Ok(Resolution::thenable(manual)))
        .expect("then");

    let (_, on_rejected) = slot.borrow_mut().take().expect("subscribed");
    let reason = Reason::new(DomainError("abroad".into()));
    on_rejected(reason.clone()).expect("reject");
    assert!(child.reason().is_some_and(|r| r.same_as(&reason)));
}

#[test]
fn synchronous_thenable_settles_child_before_registration_returns() {
    let engine = test_engine();
    let child = engine
        .resolved(())
        .then(|()| Ok(Resolution::thenable(Ready("now"))))
        .expect("then");
    assert_eq!(child.value(), Some("now"));
}

#[test]
fn double_signalling_thenable_keeps_first_outcome() {
    let engine = test_engine();
    let child = engine
        .resolved(0)
        .then(|_| Ok(Resolution::thenable(CallsBoth)))
        .expect("then");
    assert_eq!(child.value(), Some(1));
}

#[test]
fn foreign_settlement_fires_downstream_continuations() {
    let engine = test_engine();
    let (manual, slot) = Manual::<i32>::new();
    let seen = Recorder::new();
    let sink = seen.clone();

    engine
        .resolved(0)
        .then(move |_| Ok(Resolution::thenable(manual)))
        .and_then(|child| child.success(move |v| fulfill(sink.record(v))))
        .expect("chain");
    assert!(seen.is_empty());

    let (on_fulfilled, _) = slot.borrow_mut().take().expect("subscribed");
    on_fulfilled(11).expect("fulfill");
    assert_eq!(seen.snapshot(), vec![11]);
}

#[test]
fn callback_invoked_from_a_handler_settles_after_it_returns() {
    let engine = test_engine();
    let (manual, slot) = Manual::<i32>::new();
    let adopted = engine
        .resolved(0)
        .then(move |_| Ok(Resolution::thenable(manual)))
        .expect("then");
    let (on_fulfilled, _) = slot.borrow_mut().take().expect("subscribed");

    let trigger = engine.promise::<i32>();
    let observed = adopted.clone();
    let seen_inside = trigger
        .then(move |v| {
            on_fulfilled(v)?;
            fulfill(observed.is_pending())
        })
        .expect("then");

    trigger.resolve(8).expect("resolve");
    assert_eq!(seen_inside.value(), Some(true));
    assert_eq!(adopted.value(), Some(8));
}

#[test]
fn native_promise_is_a_thenable() {
    let engine = test_engine();
    let source = engine.promise::<i32>();
    let seen = Recorder::new();
    let sink = seen.clone();

    Box::new(source.clone())
        .subscribe(
            Box::new(move |v| {
                sink.record(v);
                Ok(())
            }),
            Box::new(|_| Ok(())),
        )
        .expect("subscribe");
    source.resolve(3).expect("resolve");
    assert_eq!(seen.snapshot(), vec![3]);
}

#[test]
fn finally_waits_for_foreign_release() {
    init_test_logging();
    let engine = test_engine();
    let parent = engine.promise::<i32>();
    let signal = Rc::new(RefCell::new(None));
    let handle = Handle {
        signal: Rc::clone(&signal),
    };

    let after = parent
        .finally(move || Ok(Cleanup::wait_for(handle)))
        .expect("finally");
    parent.reject("original").expect("reject");
    assert!(after.is_pending());

    let release = signal.borrow_mut().take().expect("registered");
    release().expect("release");
    assert_eq!(after.reason().map(|r| r.to_string()), Some("original".into()));
}

#[test]
fn finally_on_native_promise_object() {
    let engine = test_engine();
    let parent = engine.resolved("done");
    let cleanup = engine.resolved(());
    let after = parent
        .finally(move || Ok(Cleanup::wait_for(cleanup)))
        .expect("finally");
    assert_eq!(after.value(), Some("done"));
}

#[test]
fn foreign_thenable_feeds_static_combinators() {
    let (manual, slot) = Manual::<i32>::new();
    let all = Promise::all([
        syncpromise::Awaitable::Value(1),
        syncpromise::Awaitable::foreign(manual),
    ])
    .expect("all");

    let (on_fulfilled, _) = slot.borrow_mut().take().expect("subscribed");
    on_fulfilled(2).expect("fulfill");
    assert_eq!(all.value(), Some(vec![1, 2]));
}
