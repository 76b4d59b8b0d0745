//! Aggregate combinators over many deferred values.
//!
//! - [`all`](mod@all): fulfills with every value in input order, or rejects
//!   with the first rejection
//! - [`race`](mod@race): settles with whichever input settles first
//!
//! Both accept a mix of plain values, native promises and foreign thenables
//! through [`Awaitable`]. Every input is first adapted into a native promise
//! of the same engine; the aggregate then subscribes an observer to each one
//! and funnels outcomes into a single result promise. The result settles at
//! most once: the first committing signal wins and later ones are dropped.

pub mod all;
pub mod race;

use core::fmt;

use crate::error::Result;
use crate::promise::Promise;
use crate::runtime::Engine;
use crate::thenable::Thenable;

/// One combinator input.
pub enum Awaitable<T> {
    /// A plain value, treated as an already-fulfilled promise.
    Value(T),
    /// A native promise, used as-is.
    Promise(Promise<T>),
    /// A foreign thenable, adopted through a fresh native promise.
    Foreign(Box<dyn Thenable<T>>),
}

impl<T> Awaitable<T> {
    /// Wraps a foreign thenable.
    #[must_use]
    pub fn foreign(thenable: impl Thenable<T> + 'static) -> Self {
        Self::Foreign(Box::new(thenable))
    }
}

impl<T: Clone + 'static> Awaitable<T> {
    /// Turns this input into a native promise owned by `engine`.
    ///
    /// A foreign thenable is subscribed immediately; if it calls back
    /// synchronously, the returned promise is already settled.
    pub(crate) fn adapt(self, engine: &Engine) -> Result<Promise<T>> {
        match self {
            Self::Value(value) => Ok(engine.resolved(value)),
            Self::Promise(promise) => Ok(promise),
            Self::Foreign(thenable) => {
                let promise = engine.promise();
                thenable.subscribe(promise.external_resolve(), promise.external_reject())?;
                Ok(promise)
            }
        }
    }
}

impl<T> From<Promise<T>> for Awaitable<T> {
    fn from(promise: Promise<T>) -> Self {
        Self::Promise(promise)
    }
}

impl<T> From<&Promise<T>> for Awaitable<T> {
    fn from(promise: &Promise<T>) -> Self {
        Self::Promise(promise.clone())
    }
}

impl<T: fmt::Debug> fmt::Debug for Awaitable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Self::Promise(p) => f.debug_tuple("Promise").field(&p.id()).finish(),
            Self::Foreign(_) => f.debug_tuple("Foreign").field(&"<thenable>").finish(),
        }
    }
}

/// Adapts every input up front so the element count is known before any
/// observer can fire.
fn adapt_all<T, I>(engine: &Engine, items: I) -> Result<Vec<Promise<T>>>
where
    T: Clone + 'static,
    I: IntoIterator,
    I::Item: Into<Awaitable<T>>,
{
    items
        .into_iter()
        .map(|item| item.into().adapt(engine))
        .collect()
}
