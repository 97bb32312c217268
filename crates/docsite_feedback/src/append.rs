//! Read-modify-write append.
//!
//! Fetch, compose and write run strictly in that order: the write carries the version
//! token from the fetch of the same round. A stale token restarts the whole round;
//! the stale token is never re-sent.

use docsite_observability::feedback_span;
use tracing::{Instrument, debug, info, warn};

use crate::config::AppendPolicy;
use crate::credential::Credential;
use crate::error::{FeedbackError, Result};
use crate::store::{ContentStore, VersionToken, WriteRequest};
use crate::submission::{FeedbackSubmission, compose};
use crate::submitter::SubmissionState;

/// A successful append.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendReceipt {
    /// Version of the log after the write
    pub version: VersionToken,
    /// Read-modify-write rounds used (1 without conflicts)
    pub attempts: u32,
    /// The line that was appended
    pub line: String,
}

/// Append `submission` to the log behind `store`.
///
/// `notify` observes FetchingCurrent, Composing and Writing for every round.
pub async fn append<F>(
    store: &dyn ContentStore,
    credential: &Credential,
    submission: &FeedbackSubmission,
    policy: &AppendPolicy,
    mut notify: F,
) -> Result<AppendReceipt>
where
    F: FnMut(SubmissionState) + Send,
{
    let span = feedback_span!(submission.page().as_str());
    async move {
        let mut on_state = |state: SubmissionState| {
            tracing::Span::current().record("feedback.state", tracing::field::debug(state));
            notify(state);
        };
        let line = submission.to_line();
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            tracing::Span::current().record("feedback.attempt", attempt);

            on_state(SubmissionState::FetchingCurrent);
            let snapshot = store.fetch(credential).await.map_err(FeedbackError::Read)?;

            on_state(SubmissionState::Composing);
            let (content, version) = match snapshot {
                Some(current) => (compose(&current.text, &line), Some(current.version)),
                None => {
                    debug!(resource = store.resource(), "creating feedback log");
                    (compose("", &line), None)
                }
            };

            on_state(SubmissionState::Writing);
            let request = WriteRequest {
                content,
                version,
                message: submission.commit_message(),
            };
            match store.write(credential, request).await {
                Ok(receipt) => {
                    info!(attempts = attempt, version = %receipt.version, "feedback appended");
                    return Ok(AppendReceipt {
                        version: receipt.version,
                        attempts: attempt,
                        line,
                    });
                }
                Err(err) if err.is_conflict() && attempt <= policy.max_conflict_retries => {
                    let delay = policy.backoff(attempt);
                    warn!(
                        attempt,
                        retry_in_ms = delay.as_millis() as u64,
                        error = %err,
                        "feedback log changed underneath us, starting over"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(FeedbackError::Write(err)),
            }
        }
    }
    .instrument(span)
    .await
}
