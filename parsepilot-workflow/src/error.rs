//! Workflow error types.

use thiserror::Error;

use parsepilot_client::ApiError;
use parsepilot_core::{CoreError, Stage};

/// Error type for workflow operations.
///
/// Fatal variants (transport, task failure, poll exhaustion) have already
/// moved the session to [`Stage::Failed`] when they surface; recoverable
/// variants left the stage unchanged so the caller can correct the input and
/// retry without re-running earlier stages.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// The backend could not be reached or answered with an error status.
    #[error("Transport error: {0}")]
    Transport(#[from] ApiError),

    /// The backend reported the polled task as terminally failed.
    #[error("Task failed: {0}")]
    TaskFailure(String),

    /// The poll was cancelled before a terminal status arrived. The session
    /// is unchanged; no terminal outcome was delivered.
    #[error("Polling cancelled")]
    Cancelled,

    /// The configured liveness cap was reached while still in progress.
    #[error("Task still in progress after {attempts} status queries")]
    PollExhausted {
        /// Number of status queries issued.
        attempts: u32,
    },

    /// Invalid or empty user selection.
    #[error(transparent)]
    Selection(CoreError),

    /// Missing or malformed context for the requested operation.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The operation is not available in the session's current stage.
    #[error("Operation not available in the {} stage", .stage.label())]
    WrongStage {
        /// The session's current stage.
        stage: Stage,
    },
}

impl WorkflowError {
    /// Returns true when the session survives this error: the stage is
    /// unchanged and the user can correct the input and retry.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Selection(_) | Self::Validation(_) | Self::WrongStage { .. } | Self::Cancelled
        )
    }
}

impl From<CoreError> for WorkflowError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::UnknownCandidate(_) | CoreError::EmptySelection => Self::Selection(err),
            CoreError::Validation(message) => Self::Validation(message),
            CoreError::InvalidTransition { from, .. } => Self::WrongStage { stage: from },
            CoreError::Serialization(err) => Self::Validation(err.to_string()),
        }
    }
}
