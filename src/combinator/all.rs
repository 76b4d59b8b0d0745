//! All combinator: wait for every input, keep input order.
//!
//! # Semantics
//!
//! `all([a, b, c])`:
//! 1. Adapt each input into a native promise
//! 2. Subscribe to each one, in input order
//! 3. Fulfill with `[va, vb, vc]` once every input has fulfilled, or reject
//!    with the first rejection seen
//!
//! The value vector is indexed by input position, never by completion
//! order. An empty input fulfills at once with an empty vector.
//!
//! # Algebraic Laws
//!
//! - Order: `all([a, b])` fulfills with `[va, vb]` whichever settles first
//! - Identity: `all([])` fulfills with `[]` before returning
//! - Short circuit: once rejected, later fulfillments are ignored

use std::cell::RefCell;
use std::mem;
use std::rc::Rc;

use crate::combinator::{adapt_all, Awaitable};
use crate::error::{Error, Result};
use crate::promise::Promise;
use crate::record::Observer;
use crate::runtime::work::WorkList;
use crate::runtime::Engine;
use crate::types::Settlement;

/// Values collected so far, by input position.
struct JoinState<T> {
    slots: Vec<Option<T>>,
    remaining: usize,
}

impl<T> JoinState<T> {
    fn new(len: usize) -> Self {
        Self {
            slots: (0..len).map(|_| None).collect(),
            remaining: len,
        }
    }

    /// Stores the value at `index`; returns every value once all are in.
    fn fill(&mut self, index: usize, value: T) -> Option<Vec<T>> {
        if self.slots[index].replace(value).is_none() {
            self.remaining -= 1;
        }
        if self.remaining > 0 {
            return None;
        }
        Some(mem::take(&mut self.slots).into_iter().flatten().collect())
    }
}

impl Engine {
    /// Waits for every input to fulfill.
    ///
    /// The result fulfills with the values in input order, or rejects with
    /// the reason of the first input to reject.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::Escalated`](crate::ErrorKind::Escalated) if
    /// subscribing to an already-settled input fired a handler that failed
    /// with a registered assertion type.
    pub fn all<T, I>(&self, items: I) -> Result<Promise<Vec<T>>>
    where
        T: Clone + 'static,
        I: IntoIterator,
        I::Item: Into<Awaitable<T>>,
    {
        let inputs = adapt_all(self, items)?;
        if inputs.is_empty() {
            return Ok(self.resolved(Vec::new()));
        }

        let result = self.promise::<Vec<T>>();
        tracing::debug!(
            engine = self.name(),
            result = %result.id(),
            inputs = inputs.len(),
            "all: subscribing"
        );
        let state = Rc::new(RefCell::new(JoinState::new(inputs.len())));

        WorkList::run(self, |work| {
            for (index, input) in inputs.iter().enumerate() {
                let result = result.clone();
                let state = Rc::clone(&state);
                input.register_in(
                    work,
                    Box::new(Observer::new(move |outcome: &Settlement<T>, work| {
                        on_settled(&result, &state, index, outcome, work)
                    })),
                );
                work.drain()?;
            }
            Ok(())
        })?;
        Ok(result)
    }

    /// [`all`](Self::all), rejecting a missing input collection.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::InvalidArgument`](crate::ErrorKind::InvalidArgument) if
    /// `items` is `None`; otherwise as for [`all`](Self::all).
    pub fn try_all<T, I>(&self, items: Option<I>) -> Result<Promise<Vec<T>>>
    where
        T: Clone + 'static,
        I: IntoIterator,
        I::Item: Into<Awaitable<T>>,
    {
        let items = items.ok_or_else(|| Error::invalid_argument("all: input collection is missing"))?;
        self.all(items)
    }
}

fn on_settled<T: Clone + 'static>(
    result: &Promise<Vec<T>>,
    state: &RefCell<JoinState<T>>,
    index: usize,
    outcome: &Settlement<T>,
    work: &mut WorkList,
) -> Result<()> {
    if !result.is_pending() {
        return Ok(());
    }
    match outcome {
        Settlement::Fulfilled(value) => {
            let complete = state.borrow_mut().fill(index, value.clone());
            match complete {
                Some(values) => result.settle_quietly(work, Settlement::Fulfilled(values)),
                None => Ok(()),
            }
        }
        Settlement::Rejected(reason) => {
            tracing::trace!(result = %result.id(), index, "all: input rejected");
            result.settle_quietly(work, Settlement::Rejected(reason.clone()))
        }
    }
}

impl<T: Clone + 'static> Promise<T> {
    /// [`Engine::all`] on this thread's default engine.
    pub fn all<I>(items: I) -> Result<Promise<Vec<T>>>
    where
        I: IntoIterator,
        I::Item: Into<Awaitable<T>>,
    {
        Engine::current().all(items)
    }

    /// [`Engine::try_all`] on this thread's default engine.
    pub fn try_all<I>(items: Option<I>) -> Result<Promise<Vec<T>>>
    where
        I: IntoIterator,
        I::Item: Into<Awaitable<T>>,
    {
        Engine::current().try_all(items)
    }
}
