//! Rejection reasons and exception kinds.
//!
//! A [`Reason`] is what a promise is rejected with and what a failing handler
//! returns. It wraps any `std::error::Error` and remembers the concrete type
//! it was built from; that type is its [`ExceptionKind`], which the engine
//! consults to decide whether a handler failure is captured as a rejection or
//! re-raised to the caller.

use core::fmt;
use std::any::{type_name, TypeId};
use std::error::Error as StdError;
use std::sync::Arc;

/// The concrete error type behind a [`Reason`].
#[derive(Clone, Copy)]
pub struct ExceptionKind {
    type_id: TypeId,
    name: &'static str,
}

impl ExceptionKind {
    /// Returns the kind for error type `E`.
    #[must_use]
    pub fn of<E: StdError + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<E>(),
            name: type_name::<E>(),
        }
    }

    /// Returns the fully qualified type name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns true if `reason` was built from this kind.
    #[must_use]
    pub fn matches(&self, reason: &Reason) -> bool {
        reason.kind == *self
    }
}

impl PartialEq for ExceptionKind {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for ExceptionKind {}

impl std::hash::Hash for ExceptionKind {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for ExceptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExceptionKind({})", self.name)
    }
}

/// Plain-text reason used by [`Reason::msg`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct Message(pub String);

/// Why a promise was rejected.
///
/// Cloning is cheap; clones share the underlying error, so a reason handed
/// through a chain of pass-throughs stays the very same object
/// (see [`Reason::same_as`]).
#[derive(Clone)]
pub struct Reason {
    error: Arc<dyn StdError + Send + Sync + 'static>,
    kind: ExceptionKind,
}

impl Reason {
    /// Wraps an error value.
    #[must_use]
    pub fn new<E: StdError + Send + Sync + 'static>(error: E) -> Self {
        Self {
            error: Arc::new(error),
            kind: ExceptionKind::of::<E>(),
        }
    }

    /// Builds a reason from a plain message.
    #[must_use]
    pub fn msg(message: impl Into<String>) -> Self {
        Self::new(Message(message.into()))
    }

    /// Returns the kind this reason was built from.
    #[must_use]
    pub const fn kind(&self) -> ExceptionKind {
        self.kind
    }

    /// Returns true if the wrapped error is an `E`.
    #[must_use]
    pub fn is<E: StdError + 'static>(&self) -> bool {
        self.error.is::<E>()
    }

    /// Returns the wrapped error as an `E`, if it is one.
    #[must_use]
    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        self.error.downcast_ref::<E>()
    }

    /// Returns the wrapped error.
    #[must_use]
    pub fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
        &*self.error
    }

    /// Returns true if both reasons share the same underlying error object.
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.error, &other.error)
    }
}

impl fmt::Debug for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reason")
            .field("kind", &self.kind.name)
            .field("error", &format_args!("{}", self.error))
            .finish()
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.error, f)
    }
}

/// An escalated error converts back to the reason it carries, so `?` on a
/// nested settle call inside a handler re-raises the original failure.
impl From<crate::error::Error> for Reason {
    fn from(err: crate::error::Error) -> Self {
        if err.is_escalated() {
            if let Some(reason) = err.reason() {
                return reason.clone();
            }
        }
        Self::new(err)
    }
}

impl From<&str> for Reason {
    fn from(message: &str) -> Self {
        Self::msg(message)
    }
}

impl From<String> for Reason {
    fn from(message: String) -> Self {
        Self::msg(message)
    }
}
