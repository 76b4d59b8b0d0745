//! Error types and error handling strategy for syncpromise.
//!
//! Only three things can go wrong at the language level:
//!
//! - **Misuse**: settling a promise twice, or handing a combinator a missing
//!   input. These are programmer errors and surface synchronously.
//! - **Escalation**: a handler failed with a reason whose concrete type is in
//!   the engine's assertion registry. The reason is re-raised out of the call
//!   that triggered firing instead of becoming a rejection.
//!
//! Every other failure flows through the promise model as a rejection
//! [`Reason`] and never surfaces as an `Err` here.

use core::fmt;

use crate::types::{PromiseId, PromiseState, Reason};

/// The kind of error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// `resolve`/`reject` called on a promise that is no longer pending.
    AlreadySettled,
    /// A combinator was given no input at all.
    InvalidArgument,
    /// A handler failed with a registered assertion type.
    Escalated,
}

impl ErrorKind {
    /// Returns true if this kind signals a programmer mistake at the call site.
    #[must_use]
    pub const fn is_misuse(&self) -> bool {
        matches!(self, Self::AlreadySettled | Self::InvalidArgument)
    }
}

/// The main error type for syncpromise operations.
#[derive(Debug, Clone)]
pub struct Error {
    kind: ErrorKind,
    message: Option<String>,
    reason: Option<Reason>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub const fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            reason: None,
        }
    }

    /// Returns the error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Adds a message description to the error.
    #[must_use]
    pub fn with_message(mut self, msg: impl Into<String>) -> Self {
        self.message = Some(msg.into());
        self
    }

    /// Attaches the rejection reason this error carries.
    #[must_use]
    pub fn with_reason(mut self, reason: Reason) -> Self {
        self.reason = Some(reason);
        self
    }

    /// Creates an already-settled error for `id`, currently in `state`.
    #[must_use]
    pub fn already_settled(id: PromiseId, state: PromiseState) -> Self {
        Self::new(ErrorKind::AlreadySettled).with_message(format!("{id} is already {state}"))
    }

    /// Creates an invalid-argument error.
    #[must_use]
    pub fn invalid_argument(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument).with_message(detail)
    }

    /// Creates an escalation carrying the handler's failure.
    #[must_use]
    pub fn escalated(reason: Reason) -> Self {
        Self::new(ErrorKind::Escalated)
            .with_message(reason.to_string())
            .with_reason(reason)
    }

    /// Returns true if a promise was settled twice.
    #[must_use]
    pub const fn is_already_settled(&self) -> bool {
        matches!(self.kind, ErrorKind::AlreadySettled)
    }

    /// Returns true if this is a re-raised assertion failure.
    #[must_use]
    pub const fn is_escalated(&self) -> bool {
        matches!(self.kind, ErrorKind::Escalated)
    }

    /// Returns the error message, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Returns the attached reason (set for escalations).
    #[must_use]
    pub const fn reason(&self) -> Option<&Reason> {
        self.reason.as_ref()
    }

    /// Consumes the error, returning the attached reason.
    #[must_use]
    pub fn into_reason(self) -> Option<Reason> {
        self.reason
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.kind)?;
        if let Some(msg) = &self.message {
            write!(f, ": {msg}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.reason.as_ref().map(|r| r.as_error() as _)
    }
}

/// A specialized Result type for syncpromise operations.
pub type Result<T> = core::result::Result<T, Error>;
