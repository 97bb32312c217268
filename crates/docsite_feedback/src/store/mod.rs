//! Content store seam: one text resource guarded by an opaque version token.

mod github;
mod memory;

pub use github::GitHubContentsStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::credential::Credential;
use crate::error::StoreError;

/// Opaque revision identifier returned by a read and required by an update.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionToken(String);

impl VersionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for VersionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Current content of an existing resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteSnapshot {
    pub text: String,
    pub version: VersionToken,
}

/// Create-or-update. `version` is `None` only when creating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteRequest {
    pub content: String,
    pub version: Option<VersionToken>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteReceipt {
    pub version: VersionToken,
}

/// A remote text resource with optimistic concurrency.
///
/// Implementations must reject a write whose version token is stale (or absent for an
/// existing resource) with [`StoreError::Conflict`].
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Short backend name for logs (e.g. "github").
    fn backend(&self) -> &str;

    /// Resource path for logs.
    fn resource(&self) -> &str;

    /// `Ok(None)` when the resource does not exist yet.
    async fn fetch(&self, credential: &Credential) -> Result<Option<RemoteSnapshot>, StoreError>;

    async fn write(
        &self,
        credential: &Credential,
        request: WriteRequest,
    ) -> Result<WriteReceipt, StoreError>;
}
