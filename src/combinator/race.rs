//! Race combinator: first settlement wins.
//!
//! # Semantics
//!
//! `race([a, b])`:
//! 1. Adapt each input into a native promise
//! 2. Subscribe to each one, in input order
//! 3. Settle with whichever outcome, fulfilled or rejected, arrives first
//!
//! Inputs that are already settled when the race starts are visited in
//! input order, so the earliest settled input wins. Losers are not
//! cancelled; their later outcomes are dropped.
//!
//! An empty race fulfills at once with `None`, so the result type is
//! `Promise<Option<T>>`.
//!
//! # Algebraic Laws
//!
//! - Identity: `race([a, never]) ≃ a`
//! - First wins: a settled race never changes its outcome

use crate::combinator::{adapt_all, Awaitable};
use crate::error::{Error, Result};
use crate::promise::Promise;
use crate::record::Observer;
use crate::runtime::work::WorkList;
use crate::runtime::Engine;
use crate::types::Settlement;

impl Engine {
    /// Settles with the first input outcome to arrive.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::Escalated`](crate::ErrorKind::Escalated) if
    /// subscribing to an already-settled input fired a handler that failed
    /// with a registered assertion type.
    pub fn race<T, I>(&self, items: I) -> Result<Promise<Option<T>>>
    where
        T: Clone + 'static,
        I: IntoIterator,
        I::Item: Into<Awaitable<T>>,
    {
        let inputs = adapt_all(self, items)?;
        if inputs.is_empty() {
            return Ok(self.resolved(None));
        }

        let result = self.promise::<Option<T>>();
        tracing::debug!(
            engine = self.name(),
            result = %result.id(),
            inputs = inputs.len(),
            "race: subscribing"
        );

        WorkList::run(self, |work| {
            for (index, input) in inputs.iter().enumerate() {
                let result = result.clone();
                input.register_in(
                    work,
                    Box::new(Observer::new(move |outcome: &Settlement<T>, work: &mut WorkList| {
                        if !result.is_pending() {
                            return Ok(());
                        }
                        tracing::trace!(result = %result.id(), index, "race: winner");
                        result.settle_quietly(work, outcome.clone().map(Some))
                    })),
                );
                work.drain()?;
            }
            Ok(())
        })?;
        Ok(result)
    }

    /// [`race`](Self::race), rejecting a missing input collection.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::InvalidArgument`](crate::ErrorKind::InvalidArgument) if
    /// `items` is `None`; otherwise as for [`race`](Self::race).
    pub fn try_race<T, I>(&self, items: Option<I>) -> Result<Promise<Option<T>>>
    where
        T: Clone + 'static,
        I: IntoIterator,
        I::Item: Into<Awaitable<T>>,
    {
        let items =
            items.ok_or_else(|| Error::invalid_argument("race: input collection is missing"))?;
        self.race(items)
    }
}

impl<T: Clone + 'static> Promise<T> {
    /// [`Engine::race`] on this thread's default engine.
    pub fn race<I>(items: I) -> Result<Promise<Option<T>>>
    where
        I: IntoIterator,
        I::Item: Into<Awaitable<T>>,
    {
        Engine::current().race(items)
    }

    /// [`Engine::try_race`] on this thread's default engine.
    pub fn try_race<I>(items: Option<I>) -> Result<Promise<Option<T>>>
    where
        I: IntoIterator,
        I::Item: Into<Awaitable<T>>,
    {
        Engine::current().try_race(items)
    }
}
