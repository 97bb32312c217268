//! docsite-feedback: page feedback appended to a shared log.
//!
//! A note typed on a documentation page is validated, then appended to one text
//! resource in a versioned content store by a read-modify-write cycle:
//!
//! 1. fetch the current content and its [`VersionToken`]
//! 2. compose the new content (old content plus one line)
//! 3. write it back, conditional on the token from step 1
//!
//! A stale token means someone else wrote in between; the whole cycle restarts a
//! bounded number of times. [`AppendQueue`] serializes appends that share a process.

pub mod append;
pub mod config;
pub mod credential;
pub mod error;
pub mod queue;
pub mod store;
pub mod submission;
pub mod submitter;
pub mod widget;

#[cfg(test)]
mod tests;

pub use append::{AppendReceipt, append};
pub use config::{AppendPolicy, FeedbackConfig, StoreLocation};
pub use credential::{Credential, CredentialSource, Declined, FixedCredential};
pub use error::{FeedbackError, Result, StoreError, ValidationError};
pub use queue::AppendQueue;
pub use store::{
    ContentStore, GitHubContentsStore, MemoryStore, RemoteSnapshot, VersionToken, WriteReceipt,
    WriteRequest,
};
pub use submission::{FeedbackSubmission, FeedbackText, PageId, compose, iso_timestamp};
pub use submitter::{FeedbackWidget, SubmissionOutcome, SubmissionState, Submitter};
pub use widget::{inject_widget, render_widget};
