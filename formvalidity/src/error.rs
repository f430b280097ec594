//! Error types.
//!
//! Validation failures are not errors: they are reported as data
//! (`Vec<String>` for a field, [`Aggregate`](crate::Aggregate) for a form).
//! The types here cover misuse of the API and malformed user patterns.

use formdom::{NodeId, SelectorError};
use thiserror::Error;

/// Caller-side misuse, surfaced immediately.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An override value of a shape the target does not accept.
    #[error("invalid {scope} override: expected {expected}, got {found}")]
    InvalidOverride {
        scope: &'static str,
        expected: &'static str,
        found: String,
    },

    /// Overrides can only be set on nodes that carry validity state.
    #[error("{node} is not an attached {scope}")]
    NotAttached { scope: &'static str, node: NodeId },

    #[error("a validator is already registered for selector '{0}'")]
    DuplicateValidator(String),

    #[error("invalid selector: {0}")]
    Selector(#[from] SelectorError),

    #[error("invalid configuration: {0}")]
    Json(#[from] serde_json::Error),
}

/// A user-authored `pattern` attribute that does not compile.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("pattern '{pattern}' does not compile: {message}")]
pub struct PatternError {
    /// The normalized (anchored) pattern source.
    pub pattern: String,
    pub message: String,
}
