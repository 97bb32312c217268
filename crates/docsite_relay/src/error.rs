//! Error types for the feedback relay.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("configuration error: {0}")]
    Config(String),

    /// Session token missing, malformed, expired or out of scope.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("could not mint session token: {0}")]
    Mint(String),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Feedback(#[from] docsite_feedback::FeedbackError),

    #[error("relay request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The relay answered with a non-success status.
    #[error("relay rejected the submission ({status}): {message}")]
    Rejected { status: u16, message: String },
}

impl From<jsonwebtoken::errors::Error> for RelayError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;
        let reason = match err.kind() {
            ErrorKind::ExpiredSignature => "session expired",
            ErrorKind::InvalidSignature => "invalid signature",
            ErrorKind::InvalidToken => "invalid token",
            ErrorKind::MissingRequiredClaim(_) => "missing required claim",
            _ => "session validation failed",
        };
        RelayError::Unauthorized(reason.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RelayError>;
