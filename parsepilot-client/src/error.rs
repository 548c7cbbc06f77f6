//! Client error types.

use thiserror::Error;

// ============================================================================
// API Error
// ============================================================================

/// Error type for backend API calls.
///
/// Every variant means the backend could not be used as intended; for
/// session purposes all of them classify as transport failures.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request failed before a response arrived (connect, timeout, TLS).
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("Backend returned {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Message from the backend's error body, or the status reason.
        message: String,
    },

    /// The response body did not parse as the expected shape.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The response parsed but violates the contract (e.g. a success status
    /// missing a field the contract promises).
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// Returns true for a backend-reported 404.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }
}

// ============================================================================
// Poll Error
// ============================================================================

/// Error type for a poll that ended without a successful terminal payload.
#[derive(Debug, Error)]
pub enum PollError {
    /// A status query failed; polling stops after the first such failure.
    #[error("Transport error while polling: {0}")]
    Transport(#[from] ApiError),

    /// The backend reported the task as terminally failed.
    #[error("Task failed: {0}")]
    TaskFailed(String),

    /// The poll was cancelled before a terminal status arrived.
    #[error("Poll cancelled")]
    Cancelled,

    /// The configured attempt bound was reached while still in progress.
    #[error("Task still in progress after {attempts} status queries")]
    AttemptsExhausted {
        /// Number of queries issued.
        attempts: u32,
    },
}

impl PollError {
    /// Returns true when the poll ended by caller cancellation rather than
    /// by anything the backend did.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
