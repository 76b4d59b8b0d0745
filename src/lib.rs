//! Syncpromise: deterministic, fully synchronous promises for test code.
//!
//! # Overview
//!
//! A [`Promise`] is a deferred value that settles exactly once. Unlike an
//! executor-driven future, nothing here waits for an event loop: every
//! continuation fires inline, inside the `resolve`/`reject` call that
//! settles the promise it hangs off. Tests drive "asynchronous" code one
//! explicit settlement at a time and observe every effect before the next
//! line runs.
//!
//! # Core Guarantees
//!
//! - **Single settlement**: a promise leaves Pending once; later user
//!   attempts fail with [`ErrorKind::AlreadySettled`]
//! - **Registration order**: continuations on one promise fire in the order
//!   they were registered, finally callbacks last
//! - **Late registration fires now**: registering on a settled promise fires
//!   before the registration call returns
//! - **Bounded stack**: settlement cascades run on an explicit work list, so
//!   neither settling nor dropping a long chain grows the call stack
//! - **No swallowed assertions**: handler failures whose type is registered
//!   with the [`Engine`] propagate out of the triggering call
//!
//! # Module Structure
//!
//! - [`types`]: Identifiers, states, outcomes, rejection reasons
//! - [`promise`]: The promise cell and its registration methods
//! - [`thenable`]: Capability traits and handler return types
//! - [`combinator`]: `all` and `race`
//! - [`runtime`]: The engine, failure classification, counters
//! - [`config`]: Engine configuration
//! - [`error`]: Error types
//!
//! # Example
//!
//! ```
//! use syncpromise::{fulfill, Promise};
//!
//! let source = Promise::<u32>::new();
//! let label = source
//!     .then(|n| fulfill(n + 1))
//!     .and_then(|p| p.then(|n| fulfill(format!("got {n}"))))
//!     .unwrap();
//!
//! source.resolve(41).unwrap();
//! assert_eq!(label.value().as_deref(), Some("got 42"));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::module_name_repetitions)]

pub mod combinator;
pub mod config;
pub mod error;
pub mod promise;
pub(crate) mod record;
pub mod runtime;
pub mod thenable;
pub mod types;

#[cfg(any(test, feature = "test-internals"))]
pub mod test_utils;

// Re-exports for convenient access to core types
pub use combinator::Awaitable;
pub use config::EngineConfig;
pub use error::{Error, ErrorKind, Result};
pub use promise::{Promise, Rejecter, Resolver};
pub use runtime::{AssertionRegistry, Disposition, Engine, EngineStats};
pub use thenable::{
    adopt, fulfill, throw, Callback, Cleanup, FinallySignal, HandlerResult, HasFinally,
    Resolution, Thenable,
};
pub use types::{Branch, ExceptionKind, Message, PromiseId, PromiseState, Reason, Settlement};
