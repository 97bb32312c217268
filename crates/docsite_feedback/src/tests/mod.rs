mod submitter;

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use crate::credential::{Credential, CredentialSource};
use crate::error::StoreError;
use crate::store::{ContentStore, MemoryStore, RemoteSnapshot, WriteReceipt, WriteRequest};
use crate::submitter::Clock;

pub(crate) const STAMP: &str = "2024-05-01T12:00:00.000Z";

pub(crate) fn fixed_clock() -> Clock {
    Arc::new(|| Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap())
}

pub(crate) fn cred(secret: &str) -> Credential {
    Credential::new(secret).unwrap()
}

/// Simulates another writer landing between our fetch and our write.
pub(crate) struct RacingStore {
    pub inner: Arc<MemoryStore>,
    interleaved: Mutex<VecDeque<String>>,
}

impl RacingStore {
    pub fn new(inner: Arc<MemoryStore>, lines: &[&str]) -> Self {
        Self {
            inner,
            interleaved: Mutex::new(lines.iter().map(|l| l.to_string()).collect()),
        }
    }
}

#[async_trait]
impl ContentStore for RacingStore {
    fn backend(&self) -> &str {
        "racing"
    }

    fn resource(&self) -> &str {
        self.inner.resource()
    }

    async fn fetch(&self, credential: &Credential) -> Result<Option<RemoteSnapshot>, StoreError> {
        self.inner.fetch(credential).await
    }

    async fn write(
        &self,
        credential: &Credential,
        request: WriteRequest,
    ) -> Result<WriteReceipt, StoreError> {
        let next = self.interleaved.lock().unwrap().pop_front();
        if let Some(line) = next {
            let current = self.inner.content().unwrap_or_default();
            self.inner.replace_content(format!("{}{}", current, line));
        }
        self.inner.write(credential, request).await
    }
}

/// Hands out a credential and counts how often it was asked.
pub(crate) struct CountingCredential {
    secret: String,
    pub requests: AtomicUsize,
}

impl CountingCredential {
    pub fn new(secret: &str) -> Self {
        Self {
            secret: secret.to_string(),
            requests: AtomicUsize::new(0),
        }
    }

    pub fn count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CredentialSource for CountingCredential {
    async fn request(&self) -> Option<Credential> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        Credential::new(self.secret.clone())
    }
}
