//! The settled outcome of a promise.
//!
//! A [`Settlement`] is the value or reason a promise settled with. It is the
//! payload the engine hands to every continuation drained from that promise.

use super::reason::Reason;
use super::state::PromiseState;
use core::fmt;

/// Which settlement branch an outcome belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Branch {
    /// The fulfillment branch.
    Fulfilled,
    /// The rejection branch.
    Rejected,
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fulfilled => f.write_str("fulfilled"),
            Self::Rejected => f.write_str("rejected"),
        }
    }
}

/// The terminal outcome of a promise.
#[derive(Debug, Clone)]
pub enum Settlement<T> {
    /// Settled with a value.
    Fulfilled(T),
    /// Settled with a rejection reason.
    Rejected(Reason),
}

impl<T> Settlement<T> {
    /// Returns the branch this outcome belongs to.
    #[must_use]
    pub const fn branch(&self) -> Branch {
        match self {
            Self::Fulfilled(_) => Branch::Fulfilled,
            Self::Rejected(_) => Branch::Rejected,
        }
    }

    /// Returns the promise state this outcome corresponds to.
    #[must_use]
    pub const fn state(&self) -> PromiseState {
        match self {
            Self::Fulfilled(_) => PromiseState::Fulfilled,
            Self::Rejected(_) => PromiseState::Rejected,
        }
    }

    /// Returns true if this outcome is a value.
    #[must_use]
    pub const fn is_fulfilled(&self) -> bool {
        matches!(self, Self::Fulfilled(_))
    }

    /// Returns true if this outcome is a rejection.
    #[must_use]
    pub const fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }

    /// Returns the value, if fulfilled.
    #[must_use]
    pub const fn value(&self) -> Option<&T> {
        match self {
            Self::Fulfilled(v) => Some(v),
            Self::Rejected(_) => None,
        }
    }

    /// Returns the reason, if rejected.
    #[must_use]
    pub const fn reason(&self) -> Option<&Reason> {
        match self {
            Self::Fulfilled(_) => None,
            Self::Rejected(r) => Some(r),
        }
    }

    /// Maps the fulfillment value, leaving a rejection untouched.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Settlement<U> {
        match self {
            Self::Fulfilled(v) => Settlement::Fulfilled(f(v)),
            Self::Rejected(r) => Settlement::Rejected(r),
        }
    }

    /// Converts this outcome into a standard `Result`.
    pub fn into_result(self) -> Result<T, Reason> {
        match self {
            Self::Fulfilled(v) => Ok(v),
            Self::Rejected(r) => Err(r),
        }
    }

    /// Returns the value or panics.
    ///
    /// # Panics
    ///
    /// Panics if the outcome is a rejection.
    #[track_caller]
    pub fn unwrap(self) -> T {
        match self {
            Self::Fulfilled(v) => v,
            Self::Rejected(r) => panic!("called `Settlement::unwrap()` on a rejection: {r}"),
        }
    }

    /// Returns the reason or panics.
    ///
    /// # Panics
    ///
    /// Panics if the outcome is a value.
    #[track_caller]
    pub fn unwrap_reason(self) -> Reason {
        match self {
            Self::Fulfilled(_) => {
                panic!("called `Settlement::unwrap_reason()` on a fulfillment")
            }
            Self::Rejected(r) => r,
        }
    }
}

impl<T> From<Result<T, Reason>> for Settlement<T> {
    fn from(result: Result<T, Reason>) -> Self {
        match result {
            Ok(v) => Self::Fulfilled(v),
            Err(r) => Self::Rejected(r),
        }
    }
}
