//! Route handlers. Each returns a status and a JSON body; the server turns that into a
//! response.

use chrono::Utc;
use docsite_feedback::{
    AppendQueue, FeedbackError, FeedbackSubmission, FeedbackText, PageId, StoreError,
};
use docsite_observability::record_error;
use hyper::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::session::{SessionValidator, bearer_token};

/// Shared state of a running relay.
pub struct RelayState {
    pub queue: AppendQueue,
    pub sessions: SessionValidator,
    pub allowed_origin: String,
}

impl RelayState {
    pub fn new(queue: AppendQueue, sessions: SessionValidator) -> Self {
        Self {
            queue,
            sessions,
            allowed_origin: "*".to_string(),
        }
    }

    pub fn with_allowed_origin(mut self, origin: impl Into<String>) -> Self {
        self.allowed_origin = origin.into();
        self
    }
}

#[derive(Debug, Deserialize)]
struct FeedbackRequest {
    text: String,
    #[serde(default)]
    page: String,
}

pub fn error_body(message: impl Into<String>) -> Value {
    json!({ "error": message.into() })
}

pub fn health() -> (StatusCode, Value) {
    (
        StatusCode::OK,
        json!({ "status": "ok", "version": docsite_constant::app::VERSION }),
    )
}

/// `POST /feedback`: session check, body parse, validation, then a queued append.
pub async fn handle_feedback(
    state: &RelayState,
    authorization: Option<&str>,
    body: &[u8],
) -> (StatusCode, Value) {
    let Some(token) = bearer_token(authorization) else {
        return (StatusCode::UNAUTHORIZED, error_body("missing bearer session token"));
    };
    let claims = match state.sessions.validate(token) {
        Ok(claims) => claims,
        Err(err) => {
            warn!(error = %err, "session rejected");
            return (StatusCode::UNAUTHORIZED, error_body(err.to_string()));
        }
    };

    let request: FeedbackRequest = match serde_json::from_slice(body) {
        Ok(request) => request,
        Err(err) => {
            return (
                StatusCode::BAD_REQUEST,
                error_body(format!("malformed request body: {}", err)),
            );
        }
    };
    let text = match FeedbackText::parse(&request.text) {
        Ok(text) => text,
        Err(err) => return (StatusCode::UNPROCESSABLE_ENTITY, error_body(err.to_string())),
    };
    let page = PageId::new(&request.page);
    let submission = FeedbackSubmission::new(text, page.clone(), Utc::now());

    match state.queue.append(submission).await {
        Ok(receipt) => {
            info!(subject = %claims.sub, page = %page, attempts = receipt.attempts, "relayed feedback appended");
            (
                StatusCode::OK,
                json!({
                    "status": "ok",
                    "version": receipt.version,
                    "attempts": receipt.attempts,
                }),
            )
        }
        Err(err) => {
            info!(subject = %claims.sub, page = %page, "relayed feedback not appended");
            record_error(&err);
            (status_for(&err), error_body(err.to_string()))
        }
    }
}

fn status_for(err: &FeedbackError) -> StatusCode {
    match err {
        FeedbackError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        FeedbackError::Write(StoreError::Conflict { .. }) => StatusCode::CONFLICT,
        FeedbackError::Read(_) | FeedbackError::Write(_) => StatusCode::BAD_GATEWAY,
        FeedbackError::QueueClosed => StatusCode::SERVICE_UNAVAILABLE,
        FeedbackError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
