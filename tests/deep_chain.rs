//! Regression tests for very long continuation chains.
//!
//! Settlement cascades run on an explicit work list, so a chain of any
//! length settles without growing the call stack, whether its links adopt
//! native promises, foreign thenables, or objects returned from `finally`.
//! Dropping a chain that never settled is flat as well. Each test runs on a
//! thread with a deliberately small stack to make a recursive
//! implementation fail loudly.

#[macro_use]
mod common;

use common::*;
use std::thread;
use syncpromise::{adopt, fulfill, Callback, Cleanup, Promise, Reason, Resolution, Thenable};

const DEPTH: usize = 100_000;
const SMALL_STACK: usize = 256 * 1024;

fn on_small_stack<F: FnOnce() + Send + 'static>(name: &str, body: F) {
    thread::Builder::new()
        .name(name.to_string())
        .stack_size(SMALL_STACK)
        .spawn(body)
        .expect("spawn test thread")
        .join()
        .expect("test thread panicked");
}

/// A foreign thenable that reports its value as soon as it is subscribed to.
struct Immediate(u64);

impl Thenable<u64> for Immediate {
    fn subscribe(
        self: Box<Self>,
        on_fulfilled: Callback<u64>,
        _on_rejected: Callback<Reason>,
    ) -> syncpromise::Result<()> {
        on_fulfilled(self.0)
    }
}

#[test]
fn long_then_chain_settles_in_one_call() {
    on_small_stack("long_then_chain", || {
        init_test_logging_with_level(tracing::Level::INFO);
        test_phase!("long_then_chain_settles_in_one_call");
        let engine = test_engine();
        let root = engine.promise::<u64>();

        let mut tail = root.clone();
        for _ in 0..DEPTH {
            tail = tail.then(|v| fulfill(v + 1)).expect("then");
        }
        assert!(tail.is_pending());

        root.resolve(0).expect("resolve");
        assert_eq!(tail.value(), Some(DEPTH as u64));

        let stats = engine.stats();
        assert_eq!(stats.continuations_fired, DEPTH as u64);
        assert!(stats.peak_work_depth <= 2, "work list grew to {}", stats.peak_work_depth);
        test_complete!("long_then_chain_settles_in_one_call", depth = DEPTH);
    });
}

#[test]
fn long_rejection_pass_through_chain() {
    on_small_stack("long_pass_through", || {
        let engine = test_engine();
        let root = engine.promise::<u64>();

        let mut tail = root.clone();
        for _ in 0..DEPTH {
            tail = tail.then(|v| fulfill(v + 1)).expect("then");
        }
        let recovered = tail.or_else(|_| fulfill(u64::MAX)).expect("or_else");

        root.reject("bottom").expect("reject");
        assert_eq!(recovered.value(), Some(u64::MAX));
        assert_eq!(engine.stats().pass_throughs, DEPTH as u64);
    });
}

#[test]
fn long_adoption_chain() {
    on_small_stack("long_adoption", || {
        let engine = test_engine();
        let root = engine.promise::<u64>();

        let mut tail = root.clone();
        for _ in 0..DEPTH {
            let engine = engine.clone();
            tail = tail
                .then(move |v| adopt(engine.resolved(v + 1)))
                .expect("then");
        }

        root.resolve(0).expect("resolve");
        assert_eq!(tail.value(), Some(DEPTH as u64));
    });
}

#[test]
fn long_finally_chain() {
    on_small_stack("long_finally", || {
        let engine = test_engine();
        let root = engine.promise::<&'static str>();

        let mut tail = root.clone();
        for _ in 0..DEPTH {
            tail = tail.finally(|| Ok(Cleanup::Done)).expect("finally");
        }

        root.resolve("kept").expect("resolve");
        assert_eq!(tail.value(), Some("kept"));
    });
}

#[test]
fn registration_on_settled_chain_head() {
    on_small_stack("settled_head", || {
        let root = Promise::resolved(0_u64);
        let mut tail = root;
        for _ in 0..DEPTH {
            tail = tail.then(|v| fulfill(v + 1)).expect("then");
        }
        assert_eq!(tail.value(), Some(DEPTH as u64));
    });
}

#[test]
fn long_native_thenable_chain() {
    on_small_stack("long_native_thenable", || {
        let engine = test_engine();
        let root = engine.promise::<u64>();

        let mut tail = root.clone();
        for _ in 0..DEPTH {
            let engine = engine.clone();
            tail = tail
                .then(move |v| Ok(Resolution::thenable(engine.resolved(v + 1))))
                .expect("then");
        }

        root.resolve(0).expect("resolve");
        assert_eq!(tail.value(), Some(DEPTH as u64));
    });
}

#[test]
fn long_foreign_thenable_chain() {
    on_small_stack("long_foreign_thenable", || {
        let engine = test_engine();
        let root = engine.promise::<u64>();

        let mut tail = root.clone();
        for _ in 0..DEPTH {
            tail = tail
                .then(|v| Ok(Resolution::thenable(Immediate(v + 1))))
                .expect("then");
        }

        root.resolve(0).expect("resolve");
        assert_eq!(tail.value(), Some(DEPTH as u64));
    });
}

#[test]
fn long_finally_chain_waiting_on_promises() {
    on_small_stack("long_finally_await", || {
        let engine = test_engine();
        let root = engine.promise::<&'static str>();

        let mut tail = root.clone();
        for _ in 0..DEPTH {
            let engine = engine.clone();
            tail = tail
                .finally(move || Ok(Cleanup::wait_for(engine.resolved(0_u8))))
                .expect("finally");
        }

        root.reject("kept").expect("reject");
        assert_eq!(tail.reason().map(|r| r.to_string()), Some("kept".into()));
    });
}

#[test]
fn dropping_a_long_unsettled_chain() {
    on_small_stack("unsettled_drop", || {
        let engine = test_engine();
        let root = engine.promise::<u64>();

        let mut tail = root.clone();
        for _ in 0..DEPTH {
            tail = tail.then(|v| fulfill(v + 1)).expect("then");
        }
        assert_eq!(root.pending_continuations(), 1);

        drop(tail);
        drop(root);
    });
}

#[test]
fn dropping_a_chain_stranded_by_success_on_rejection() {
    on_small_stack("stranded_drop", || {
        let engine = test_engine();
        let stranded = engine
            .rejected::<u64>("never fulfilled")
            .success(|v| fulfill(v + 1))
            .expect("success");
        assert!(stranded.is_pending());

        let mut tail = stranded.clone();
        for _ in 0..DEPTH {
            tail = tail.then(|v| fulfill(v + 1)).expect("then");
        }

        drop(tail);
        drop(stranded);
    });
}
