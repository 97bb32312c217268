//! In-process content store with content-addressed versions.
//!
//! Enforces the same conditional-update contract as a remote store, so it backs tests
//! and `--dry-run` submissions.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use super::{ContentStore, RemoteSnapshot, VersionToken, WriteReceipt, WriteRequest};
use crate::credential::Credential;
use crate::error::StoreError;

#[derive(Default)]
struct MemoryState {
    current: Option<RemoteSnapshot>,
    writes: Vec<WriteRequest>,
    fetches: usize,
    fetch_failures: VecDeque<StoreError>,
    write_failures: VecDeque<StoreError>,
}

pub struct MemoryStore {
    resource: String,
    required_credential: Option<String>,
    state: Mutex<MemoryState>,
}

fn version_of(content: &str) -> VersionToken {
    VersionToken::new(format!("{:x}", Sha256::digest(content.as_bytes())))
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Empty store: the resource does not exist yet.
    pub fn new() -> Self {
        Self {
            resource: docsite_constant::feedback::DEFAULT_LOG_PATH.to_string(),
            required_credential: None,
            state: Mutex::new(MemoryState::default()),
        }
    }

    pub fn with_content(content: impl Into<String>) -> Self {
        let store = Self::new();
        store.replace_content(content);
        store
    }

    /// Reject every call whose credential differs from `secret`.
    pub fn require_credential(mut self, secret: impl Into<String>) -> Self {
        self.required_credential = Some(secret.into());
        self
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        // A panicking test thread must not wedge the others.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Overwrite the resource out of band, as a concurrent writer would.
    pub fn replace_content(&self, content: impl Into<String>) -> VersionToken {
        let text = content.into();
        let version = version_of(&text);
        self.lock().current = Some(RemoteSnapshot {
            text,
            version: version.clone(),
        });
        version
    }

    pub fn fail_next_fetch(&self, err: StoreError) {
        self.lock().fetch_failures.push_back(err);
    }

    pub fn fail_next_write(&self, err: StoreError) {
        self.lock().write_failures.push_back(err);
    }

    pub fn content(&self) -> Option<String> {
        self.lock().current.as_ref().map(|s| s.text.clone())
    }

    pub fn version(&self) -> Option<VersionToken> {
        self.lock().current.as_ref().map(|s| s.version.clone())
    }

    /// Every write attempted, accepted or not, in arrival order.
    pub fn writes(&self) -> Vec<WriteRequest> {
        self.lock().writes.clone()
    }

    pub fn fetch_count(&self) -> usize {
        self.lock().fetches
    }

    fn authorize(&self, credential: &Credential) -> Result<(), StoreError> {
        match &self.required_credential {
            Some(expected) if expected != credential.expose() => Err(StoreError::Unauthorized {
                status: 401,
                message: "Bad credentials".to_string(),
            }),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    fn backend(&self) -> &str {
        "memory"
    }

    fn resource(&self) -> &str {
        &self.resource
    }

    async fn fetch(&self, credential: &Credential) -> Result<Option<RemoteSnapshot>, StoreError> {
        self.authorize(credential)?;
        let mut state = self.lock();
        state.fetches += 1;
        if let Some(err) = state.fetch_failures.pop_front() {
            return Err(err);
        }
        Ok(state.current.clone())
    }

    async fn write(
        &self,
        credential: &Credential,
        request: WriteRequest,
    ) -> Result<WriteReceipt, StoreError> {
        self.authorize(credential)?;
        let mut state = self.lock();
        state.writes.push(request.clone());
        if let Some(err) = state.write_failures.pop_front() {
            return Err(err);
        }
        let current = state.current.as_ref().map(|s| &s.version);
        match (current, request.version.as_ref()) {
            (None, None) => {}
            (Some(stored), Some(sent)) if stored == sent => {}
            (None, Some(sent)) => {
                return Err(StoreError::Conflict {
                    message: format!("resource no longer exists (sent {})", sent),
                });
            }
            (Some(stored), Some(sent)) => {
                return Err(StoreError::Conflict {
                    message: format!("is at {} but expected {}", stored, sent),
                });
            }
            (Some(_), None) => {
                return Err(StoreError::Conflict {
                    message: "resource already exists; a version token is required".to_string(),
                });
            }
        }
        let version = version_of(&request.content);
        state.current = Some(RemoteSnapshot {
            text: request.content,
            version: version.clone(),
        });
        Ok(WriteReceipt { version })
    }
}
