//! Exception classification.
//!
//! The registry decides what happens when a handler fails: a reason whose
//! kind is registered is re-raised out of the firing call, anything else
//! rejects the handler's child promise.

use crate::types::{ExceptionKind, Reason};

/// What to do with a handler failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Reject the child promise with the reason.
    Capture,
    /// Re-raise the reason out of the firing call.
    Escalate,
}

/// The set of exception kinds that escalate.
#[derive(Debug, Clone, Default)]
pub struct AssertionRegistry {
    kinds: Vec<ExceptionKind>,
}

impl AssertionRegistry {
    /// Creates a registry holding `kinds`.
    #[must_use]
    pub fn new(kinds: impl IntoIterator<Item = ExceptionKind>) -> Self {
        let mut registry = Self::default();
        registry.replace(kinds);
        registry
    }

    /// Replaces the whole registry. Earlier contents are discarded.
    pub fn replace(&mut self, kinds: impl IntoIterator<Item = ExceptionKind>) {
        self.kinds.clear();
        for kind in kinds {
            if !self.kinds.contains(&kind) {
                self.kinds.push(kind);
            }
        }
    }

    /// Returns true if `kind` is registered.
    #[must_use]
    pub fn contains(&self, kind: ExceptionKind) -> bool {
        self.kinds.contains(&kind)
    }

    /// Classifies a handler failure.
    #[must_use]
    pub fn classify(&self, reason: &Reason) -> Disposition {
        if self.contains(reason.kind()) {
            Disposition::Escalate
        } else {
            Disposition::Capture
        }
    }

    /// Returns the registered kinds in registration order.
    #[must_use]
    pub fn kinds(&self) -> &[ExceptionKind] {
        &self.kinds
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}
