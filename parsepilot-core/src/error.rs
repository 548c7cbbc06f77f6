//! Core error types for `ParsePilot`.

use thiserror::Error;

use crate::session::Stage;

/// Core error type for session and reconciliation operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A candidate id that matches nothing in the session's candidate set.
    #[error("No candidate with id {0}")]
    UnknownCandidate(u32),

    /// Every field was excluded; a config with zero fields is rejected.
    #[error("Selection is empty: at least one field must be included")]
    EmptySelection,

    /// Required context is missing or malformed (e.g. an unusable source URL).
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A stage transition that the session state machine forbids.
    #[error("Invalid stage transition: {from:?} -> {to:?}")]
    InvalidTransition {
        /// Stage the session was in.
        from: Stage,
        /// Stage the caller tried to move to.
        to: Stage,
    },

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CoreError {
    /// Returns true if the error stems from user input and the session can
    /// stay where it is while the user corrects it.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::UnknownCandidate(_) | Self::EmptySelection | Self::Validation(_)
        )
    }
}
