//! Capability traits for interop with foreign deferred values.
//!
//! Anything that can report a single future outcome can take part in a chain
//! by implementing [`Thenable`]; anything that can signal "I am done" can
//! hold up a `finally` by implementing [`HasFinally`]. [`Promise`] implements
//! both. The engine never inspects values at run time: a handler says what it
//! returned through [`Resolution`] or [`Cleanup`].

use core::fmt;

use crate::error::Result;
use crate::promise::Promise;
use crate::types::Reason;

/// Settlement callback handed to a [`Thenable`].
///
/// Invoking it settles the subscriber and fires its continuations before
/// returning; an escalated handler failure comes back as the `Err`.
pub type Callback<V> = Box<dyn FnOnce(V) -> Result<()>>;

/// Completion callback handed to a [`HasFinally`] object.
pub type FinallySignal = Box<dyn FnOnce() -> Result<()>>;

/// A value that will eventually fulfill with `T` or reject with a [`Reason`].
pub trait Thenable<T> {
    /// Arranges for exactly one of the callbacks to be called, at most once.
    ///
    /// Implementations may call back synchronously if already settled.
    fn subscribe(self: Box<Self>, on_fulfilled: Callback<T>, on_rejected: Callback<Reason>)
        -> Result<()>;
}

/// A value that can signal its own completion, whatever the outcome.
pub trait HasFinally {
    /// Arranges for `signal` to be called once this object is done.
    fn on_finally(self: Box<Self>, signal: FinallySignal) -> Result<()>;
}

/// What a fulfillment or rejection handler produced.
pub enum Resolution<U> {
    /// Fulfill the child with this value.
    Value(U),
    /// Settle the child with this promise's outcome, whenever it arrives.
    Promise(Promise<U>),
    /// Settle the child with this thenable's outcome, whenever it arrives.
    Thenable(Box<dyn Thenable<U>>),
}

impl<U> Resolution<U> {
    /// Wraps a foreign thenable.
    #[must_use]
    pub fn thenable(thenable: impl Thenable<U> + 'static) -> Self {
        Self::Thenable(Box::new(thenable))
    }

    /// Returns true if the child will be settled later rather than at once.
    #[must_use]
    pub const fn is_deferred(&self) -> bool {
        !matches!(self, Self::Value(_))
    }
}

impl<U> From<Promise<U>> for Resolution<U> {
    fn from(promise: Promise<U>) -> Self {
        Self::Promise(promise)
    }
}

impl<U: fmt::Debug> fmt::Debug for Resolution<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Self::Promise(p) => f.debug_tuple("Promise").field(&p.id()).finish(),
            Self::Thenable(_) => f.debug_tuple("Thenable").field(&"<foreign>").finish(),
        }
    }
}

/// The return type of fulfillment and rejection handlers. `Err` is a
/// handler failure.
pub type HandlerResult<U> = core::result::Result<Resolution<U>, Reason>;

/// What a `finally` callback produced.
pub enum Cleanup {
    /// Nothing to wait for; the child settles right away.
    Done,
    /// Hold the child until this object signals completion.
    Await(Box<dyn HasFinally>),
}

impl Cleanup {
    /// Holds the child until `object` signals completion.
    #[must_use]
    pub fn wait_for(object: impl HasFinally + 'static) -> Self {
        Self::Await(Box::new(object))
    }
}

impl fmt::Debug for Cleanup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Done => f.write_str("Done"),
            Self::Await(_) => f.debug_tuple("Await").field(&"<object>").finish(),
        }
    }
}

/// Handler shorthand: fulfill the child with `value`.
pub fn fulfill<U>(value: U) -> HandlerResult<U> {
    Ok(Resolution::Value(value))
}

/// Handler shorthand: settle the child with `promise`'s outcome.
pub fn adopt<U>(promise: Promise<U>) -> HandlerResult<U> {
    Ok(Resolution::Promise(promise))
}

/// Handler shorthand: fail with `reason`.
pub fn throw<U>(reason: impl Into<Reason>) -> HandlerResult<U> {
    Err(reason.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::Engine;

    #[test]
    fn shorthands() {
        assert!(matches!(fulfill(1), Ok(Resolution::Value(1))));
        assert!(throw::<i32>("x").is_err());

        let p = Engine::default().promise::<i32>();
        let adopted = adopt(p.clone()).expect("adopt");
        assert!(adopted.is_deferred());
        assert!(matches!(adopted, Resolution::Promise(inner) if inner.ptr_eq(&p)));
    }

    #[test]
    fn debug_does_not_require_thenable_debug() {
        let p = Engine::default().promise::<i32>();
        let rendered = format!("{:?}", Resolution::from(p));
        assert!(rendered.starts_with("Promise(PromiseId("));
        assert_eq!(format!("{:?}", Cleanup::Done), "Done");
    }
}
