//! Single-writer append queue.
//!
//! One task owns the store and the store credential and performs appends one at a
//! time, so submissions routed through the same queue can never overwrite each other.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::append::{AppendReceipt, append};
use crate::config::AppendPolicy;
use crate::credential::Credential;
use crate::error::{FeedbackError, Result};
use crate::store::ContentStore;
use crate::submission::FeedbackSubmission;

struct AppendJob {
    submission: FeedbackSubmission,
    reply: oneshot::Sender<Result<AppendReceipt>>,
}

/// Handle to the append task. Cheap to clone; the task stops when every handle is dropped.
#[derive(Clone)]
pub struct AppendQueue {
    tx: mpsc::Sender<AppendJob>,
}

impl AppendQueue {
    /// Spawn the append task on the current runtime.
    pub fn spawn(
        store: Arc<dyn ContentStore>,
        credential: Credential,
        policy: AppendPolicy,
        capacity: usize,
    ) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let handle = tokio::spawn(run(rx, store, credential, policy));
        (Self { tx }, handle)
    }

    /// Queue `submission` and wait for its append to finish.
    pub async fn append(&self, submission: FeedbackSubmission) -> Result<AppendReceipt> {
        let (reply, response) = oneshot::channel();
        self.tx
            .send(AppendJob { submission, reply })
            .await
            .map_err(|_| FeedbackError::QueueClosed)?;
        response.await.map_err(|_| FeedbackError::QueueClosed)?
    }
}

async fn run(
    mut rx: mpsc::Receiver<AppendJob>,
    store: Arc<dyn ContentStore>,
    credential: Credential,
    policy: AppendPolicy,
) {
    info!(backend = store.backend(), resource = store.resource(), "append queue started");
    let mut processed: u64 = 0;
    while let Some(job) = rx.recv().await {
        let result = append(store.as_ref(), &credential, &job.submission, &policy, |_| {}).await;
        processed += 1;
        if job.reply.send(result).is_err() {
            debug!("submitter went away before its append finished");
        }
    }
    info!(processed, "append queue stopped");
}
