//! Core types for syncpromise.
//!
//! - [`id`]: Promise identifiers
//! - [`state`]: The three-valued promise state
//! - [`outcome`]: The settled outcome of a promise (value or reason)
//! - [`reason`]: Rejection reasons and the exception kinds used to classify them

pub mod id;
pub mod outcome;
pub mod reason;
pub mod state;

pub use id::PromiseId;
pub use outcome::{Branch, Settlement};
pub use reason::{ExceptionKind, Message, Reason};
pub use state::PromiseState;
