//! The three-valued promise state.

use core::fmt;

use serde::Serialize;

/// Lifecycle state of a promise.
///
/// The only legal transitions are `Pending -> Fulfilled` and
/// `Pending -> Rejected`. A settled state never changes again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PromiseState {
    /// Not yet settled.
    Pending,
    /// Settled with a value.
    Fulfilled,
    /// Settled with a rejection reason.
    Rejected,
}

impl PromiseState {
    /// Returns true while the promise can still be settled.
    #[must_use]
    pub const fn is_pending(self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Returns true once the promise holds a value.
    #[must_use]
    pub const fn is_fulfilled(self) -> bool {
        matches!(self, Self::Fulfilled)
    }

    /// Returns true once the promise holds a rejection reason.
    #[must_use]
    pub const fn is_rejected(self) -> bool {
        matches!(self, Self::Rejected)
    }

    /// Returns true for either terminal state.
    #[must_use]
    pub const fn is_settled(self) -> bool {
        !self.is_pending()
    }

    /// Returns true if moving from `self` to `next` is a legal transition.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Fulfilled | Self::Rejected)
        )
    }
}

impl fmt::Display for PromiseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => f.write_str("pending"),
            Self::Fulfilled => f.write_str("fulfilled"),
            Self::Rejected => f.write_str("rejected"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_pending_transitions() {
        use PromiseState::{Fulfilled, Pending, Rejected};

        assert!(Pending.can_transition_to(Fulfilled));
        assert!(Pending.can_transition_to(Rejected));
        assert!(!Pending.can_transition_to(Pending));
        for settled in [Fulfilled, Rejected] {
            for next in [Pending, Fulfilled, Rejected] {
                assert!(!settled.can_transition_to(next), "{settled} -> {next}");
            }
        }
    }

    #[test]
    fn predicates() {
        assert!(PromiseState::Pending.is_pending());
        assert!(!PromiseState::Pending.is_settled());
        assert!(PromiseState::Fulfilled.is_fulfilled());
        assert!(PromiseState::Rejected.is_rejected());
        assert!(PromiseState::Rejected.is_settled());
    }

    #[test]
    fn serializes_snake_case() {
        let json = serde_json::to_string(&PromiseState::Fulfilled).expect("serialize");
        assert_eq!(json, "\"fulfilled\"");
    }
}
