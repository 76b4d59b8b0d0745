//! Configuration for a promise engine.
//!
//! The engine configuration controls:
//! - The initial assertion registry (which handler failures escalate)
//! - Whether rejections with nobody listening are logged
//! - The label attached to log events

use crate::types::ExceptionKind;

/// Configuration for an [`Engine`](crate::runtime::Engine).
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Label used in log events.
    pub name: &'static str,
    /// Handler failures of these types are re-raised instead of captured.
    pub assertion_types: Vec<ExceptionKind>,
    /// Whether to log a warning when a promise is rejected with no continuations.
    pub warn_on_unhandled_rejection: bool,
}

impl EngineConfig {
    /// Creates a configuration with an empty assertion registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            name: "default",
            assertion_types: Vec::new(),
            warn_on_unhandled_rejection: true,
        }
    }

    /// Sets the label used in log events.
    #[must_use]
    pub fn name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Adds `E` to the initial assertion registry.
    #[must_use]
    pub fn assertion_type<E: std::error::Error + 'static>(mut self) -> Self {
        let kind = ExceptionKind::of::<E>();
        if !self.assertion_types.contains(&kind) {
            self.assertion_types.push(kind);
        }
        self
    }

    /// Replaces the initial assertion registry.
    #[must_use]
    pub fn assertion_types(mut self, kinds: impl IntoIterator<Item = ExceptionKind>) -> Self {
        self.assertion_types = kinds.into_iter().collect();
        self
    }

    /// Sets whether unhandled rejections are logged.
    #[must_use]
    pub fn warn_on_unhandled_rejection(mut self, value: bool) -> Self {
        self.warn_on_unhandled_rejection = value;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::reason::Message;

    #[derive(Debug, thiserror::Error)]
    #[error("check failed")]
    struct CheckFailed;

    #[test]
    fn default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.name, "default");
        assert!(config.assertion_types.is_empty());
        assert!(config.warn_on_unhandled_rejection);
    }

    #[test]
    fn assertion_type_is_deduplicated() {
        let config = EngineConfig::new()
            .assertion_type::<CheckFailed>()
            .assertion_type::<CheckFailed>();
        assert_eq!(config.assertion_types, vec![ExceptionKind::of::<CheckFailed>()]);
    }

    #[test]
    fn assertion_types_replace() {
        let config = EngineConfig::new()
            .assertion_type::<CheckFailed>()
            .assertion_types([ExceptionKind::of::<Message>()]);
        assert_eq!(config.assertion_types, vec![ExceptionKind::of::<Message>()]);
    }
}
