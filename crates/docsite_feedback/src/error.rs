//! Error types for feedback submission.

use std::time::Duration;

use thiserror::Error;

/// Note rejected before any network call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("feedback is empty")]
    Empty,

    #[error("feedback is {len} characters long; the limit is {max}")]
    TooLong { len: usize, max: usize },
}

/// Failure reported by a content store call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("credential rejected ({status}): {message}")]
    Unauthorized { status: u16, message: String },

    /// The version token sent with a write no longer matches the stored revision.
    #[error("stale version token: {message}")]
    Conflict { message: String },

    #[error("rate limited: {message}")]
    RateLimited { message: String },

    #[error("unexpected status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("malformed response: {0}")]
    Malformed(String),
}

impl StoreError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict { .. })
    }

    pub(crate) fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            StoreError::Timeout(timeout)
        } else if err.is_decode() {
            StoreError::Malformed(err.to_string())
        } else {
            StoreError::Transport(err.to_string())
        }
    }
}

/// Errors that end a submission attempt.
#[derive(Error, Debug)]
pub enum FeedbackError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Read step failed; no write was attempted.
    #[error("could not read the feedback log: {0}")]
    Read(#[source] StoreError),

    #[error("could not write the feedback log: {0}")]
    Write(#[source] StoreError),

    #[error("configuration error: {0}")]
    Config(String),

    /// The append queue task has stopped.
    #[error("feedback queue is closed")]
    QueueClosed,
}

impl FeedbackError {
    /// The store failure behind a read or write error.
    pub fn store_error(&self) -> Option<&StoreError> {
        match self {
            FeedbackError::Read(e) | FeedbackError::Write(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, FeedbackError>;
