//! Identifier types for promises.
//!
//! Ids are handed out by the owning [`Engine`](crate::runtime::Engine) in
//! creation order and exist for diagnostics only; identity checks go through
//! [`Promise::ptr_eq`](crate::Promise::ptr_eq).

use core::fmt;

/// A per-engine identifier for a promise, assigned in creation order.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PromiseId(u64);

impl PromiseId {
    /// Creates an id from an engine sequence number (internal use).
    #[must_use]
    pub(crate) const fn from_seq(seq: u64) -> Self {
        Self(seq)
    }

    /// Creates a promise id for testing purposes.
    #[doc(hidden)]
    #[must_use]
    pub const fn new_for_test(seq: u64) -> Self {
        Self(seq)
    }

    /// Returns the creation sequence number.
    #[must_use]
    pub const fn seq(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for PromiseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PromiseId({})", self.0)
    }
}

impl fmt::Display for PromiseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "promise#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_and_debug() {
        let id = PromiseId::from_seq(3);
        assert_eq!(id.to_string(), "promise#3");
        assert_eq!(format!("{id:?}"), "PromiseId(3)");
        assert_eq!(id.seq(), 3);
    }

    #[test]
    fn ordering_follows_creation() {
        assert!(PromiseId::from_seq(1) < PromiseId::from_seq(2));
    }
}
