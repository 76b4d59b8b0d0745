//! Flat teardown of unsettled chains.
//!
//! A queued record owns its child promise, the child owns its own registry,
//! and so on down the chain. Left to the default drop glue, freeing the head
//! of a long chain that never settled would recurse once per link. Records
//! hold their child through [`Child`] instead, which hands the child's
//! registry to a per-thread queue when it goes away. The outermost release
//! frees that queue in a loop, so later links are queued rather than dropped
//! in place.

use core::ops::Deref;
use std::any::Any;
use std::cell::RefCell;

use crate::promise::Promise;

thread_local! {
    static RELEASED: RefCell<Released> = const {
        RefCell::new(Released {
            queue: Vec::new(),
            freeing: false,
        })
    };
}

struct Released {
    queue: Vec<Box<dyn Any>>,
    freeing: bool,
}

/// Resets the per-thread flag even if a drop panics.
struct Freeing;

impl Drop for Freeing {
    fn drop(&mut self) {
        let _ = RELEASED.try_with(|released| released.borrow_mut().freeing = false);
    }
}

/// The child promise owned by a record.
pub(crate) struct Child<U: 'static>(Promise<U>);

impl<U: 'static> Child<U> {
    pub(crate) fn new(promise: Promise<U>) -> Self {
        Self(promise)
    }
}

impl<U: 'static> Deref for Child<U> {
    type Target = Promise<U>;

    fn deref(&self) -> &Promise<U> {
        &self.0
    }
}

impl<U: 'static> Drop for Child<U> {
    fn drop(&mut self) {
        if let Some(registry) = self.0.detach_registry() {
            release(Box::new(registry));
        }
    }
}

fn release(garbage: Box<dyn Any>) {
    // Without thread-local storage the closure drops `garbage` in place.
    let outermost = RELEASED
        .try_with(move |released| {
            let mut released = released.borrow_mut();
            released.queue.push(garbage);
            !std::mem::replace(&mut released.freeing, true)
        })
        .unwrap_or(false);
    if !outermost {
        return;
    }

    let _freeing = Freeing;
    while let Some(next) = RELEASED
        .try_with(|released| released.borrow_mut().queue.pop())
        .ok()
        .flatten()
    {
        drop(next);
    }
}
