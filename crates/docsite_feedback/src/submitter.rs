//! Feedback widget state machine.
//!
//! ```text
//! Idle ─submit─▶ Validating ─▶ AwaitingCredential ─▶ FetchingCurrent ─▶ Composing ─▶ Writing
//!   ▲               │ invalid          │ declined           │ read error        │
//!   └───────────────┴──────────────────┘                    ▼                   ▼
//!                                                         Failed      Succeeded / Failed
//! ```
//!
//! Succeeded and Failed are display states; the next submit starts over from Validating.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::append::{AppendReceipt, append};
use crate::config::AppendPolicy;
use crate::credential::CredentialSource;
use crate::error::{FeedbackError, ValidationError};
use crate::store::ContentStore;
use crate::submission::{FeedbackSubmission, FeedbackText, PageId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionState {
    Idle,
    Validating,
    AwaitingCredential,
    FetchingCurrent,
    Composing,
    Writing,
    Succeeded,
    Failed,
}

/// How one submit attempt ended.
#[derive(Debug)]
pub enum SubmissionOutcome {
    Succeeded(AppendReceipt),
    /// The user declined to provide a credential
    Cancelled,
    /// The note was rejected locally; nothing was sent
    Rejected(ValidationError),
    Failed(FeedbackError),
}

impl SubmissionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SubmissionOutcome::Succeeded(_))
    }
}

pub const MSG_SUCCEEDED: &str = "Thanks! Your feedback was recorded.";
pub const MSG_CANCELLED: &str = "Submission cancelled.";
pub const MSG_EMPTY: &str = "Please enter some feedback before submitting.";

/// The widget the user types into.
#[derive(Debug, Clone)]
pub struct FeedbackWidget {
    text: String,
    state: SubmissionState,
    message: Option<String>,
}

impl Default for FeedbackWidget {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedbackWidget {
    pub fn new() -> Self {
        Self {
            text: String::new(),
            state: SubmissionState::Idle,
            message: None,
        }
    }

    pub fn with_text(text: impl Into<String>) -> Self {
        let mut widget = Self::new();
        widget.set_text(text);
        widget
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn state(&self) -> SubmissionState {
        self.state
    }

    /// Inline message shown under the widget, if any.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Drives one widget through validate → credential → read-modify-write.
pub struct Submitter {
    store: Arc<dyn ContentStore>,
    credentials: Arc<dyn CredentialSource>,
    policy: AppendPolicy,
    clock: Clock,
    events: Option<mpsc::Sender<SubmissionState>>,
}

impl Submitter {
    /// A stale version token ends the attempt in [`SubmissionState::Failed`]; the reader
    /// resubmits. Use [`Submitter::with_policy`] to restart automatically instead.
    pub fn new(store: Arc<dyn ContentStore>, credentials: Arc<dyn CredentialSource>) -> Self {
        Self {
            store,
            credentials,
            policy: AppendPolicy::no_retry(),
            clock: Arc::new(Utc::now),
            events: None,
        }
    }

    pub fn with_policy(mut self, policy: AppendPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Publish every state transition. Transitions are dropped when the channel is full.
    pub fn with_events(mut self, events: mpsc::Sender<SubmissionState>) -> Self {
        self.events = Some(events);
        self
    }

    fn transition(
        events: Option<&mpsc::Sender<SubmissionState>>,
        widget: &mut FeedbackWidget,
        state: SubmissionState,
    ) {
        debug!(from = ?widget.state, to = ?state, "feedback state");
        widget.state = state;
        if let Some(tx) = events {
            let _ = tx.try_send(state);
        }
    }

    /// Submit the widget's text as feedback on `page`.
    pub async fn submit(&self, widget: &mut FeedbackWidget, page: &PageId) -> SubmissionOutcome {
        let events = self.events.as_ref();
        widget.message = None;

        Self::transition(events, widget, SubmissionState::Validating);
        let text = match FeedbackText::parse(&widget.text) {
            Ok(text) => text,
            Err(err) => {
                widget.message = Some(match &err {
                    ValidationError::Empty => MSG_EMPTY.to_string(),
                    other => other.to_string(),
                });
                Self::transition(events, widget, SubmissionState::Idle);
                return SubmissionOutcome::Rejected(err);
            }
        };

        Self::transition(events, widget, SubmissionState::AwaitingCredential);
        let Some(credential) = self.credentials.request().await else {
            info!(page = %page, "feedback submission cancelled");
            widget.message = Some(MSG_CANCELLED.to_string());
            Self::transition(events, widget, SubmissionState::Idle);
            return SubmissionOutcome::Cancelled;
        };

        let submission = FeedbackSubmission::new(text, page.clone(), (self.clock)());
        let result = append(
            self.store.as_ref(),
            &credential,
            &submission,
            &self.policy,
            |state| Self::transition(events, widget, state),
        )
        .await;
        drop(credential);

        match result {
            Ok(receipt) => {
                widget.text.clear();
                widget.message = Some(MSG_SUCCEEDED.to_string());
                Self::transition(events, widget, SubmissionState::Succeeded);
                SubmissionOutcome::Succeeded(receipt)
            }
            Err(err) => {
                warn!(page = %page, error = %err, "feedback submission failed");
                widget.message = Some(format!("Feedback could not be saved: {}", err));
                Self::transition(events, widget, SubmissionState::Failed);
                SubmissionOutcome::Failed(err)
            }
        }
    }
}
