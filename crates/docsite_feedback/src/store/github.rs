//! GitHub contents API store.
//!
//! `GET /repos/{owner}/{repo}/contents/{path}` returns the file base64-encoded with its
//! blob `sha`; `PUT` on the same URL commits new content, conditional on `sha`.
//! API docs: https://docs.github.com/rest/repos/contents

use std::time::{Duration, Instant};

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use docsite_constant::app;
use docsite_observability::{record_duration, store_span};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{Instrument, debug, warn};

use super::{ContentStore, RemoteSnapshot, VersionToken, WriteReceipt, WriteRequest};
use crate::config::StoreLocation;
use crate::credential::Credential;
use crate::error::StoreError;

const API_VERSION_HEADER: &str = "X-GitHub-Api-Version";
const API_VERSION: &str = "2022-11-28";
const MEDIA_TYPE: &str = "application/vnd.github+json";
const RATE_LIMIT_REMAINING: &str = "x-ratelimit-remaining";

#[derive(Debug, Deserialize)]
struct ContentsResponse {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    encoding: Option<String>,
    #[serde(default)]
    content: Option<String>,
    sha: String,
}

#[derive(Debug, Serialize)]
struct PutBody<'a> {
    message: &'a str,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    branch: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct PutResponse {
    content: PutContent,
}

#[derive(Debug, Deserialize)]
struct PutContent {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Content store backed by a file in a GitHub repository.
pub struct GitHubContentsStore {
    client: Client,
    location: StoreLocation,
    timeout: Duration,
}

impl GitHubContentsStore {
    /// Every request carries `timeout` as its deadline.
    pub fn new(location: StoreLocation, timeout: Duration) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(format!("{}/{}", app::NAME, app::VERSION))
            .build()
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            location,
            timeout,
        })
    }

    fn url(&self) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.location.api_url.trim_end_matches('/'),
            self.location.owner,
            self.location.repo,
            self.location.path.trim_start_matches('/')
        )
    }

    fn headers(&self, credential: &Credential) -> Result<HeaderMap, StoreError> {
        let mut headers = HeaderMap::new();
        let mut auth = credential
            .bearer()
            .parse::<reqwest::header::HeaderValue>()
            .map_err(|_| StoreError::Unauthorized {
                status: 0,
                message: "credential contains characters not allowed in a header".to_string(),
            })?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, reqwest::header::HeaderValue::from_static(MEDIA_TYPE));
        headers.insert(API_VERSION_HEADER, reqwest::header::HeaderValue::from_static(API_VERSION));
        Ok(headers)
    }

    fn decode(body: ContentsResponse) -> Result<RemoteSnapshot, StoreError> {
        if let Some(kind) = body.kind.as_deref() {
            if kind != "file" {
                return Err(StoreError::Malformed(format!("expected a file, found a {}", kind)));
            }
        }
        let raw = body.content.unwrap_or_default();
        let text = match body.encoding.as_deref() {
            None | Some("base64") => {
                // the API wraps base64 at 60 columns
                let compact: String = raw.chars().filter(|c| !c.is_ascii_whitespace()).collect();
                let bytes = STANDARD
                    .decode(compact)
                    .map_err(|e| StoreError::Malformed(format!("invalid base64 content: {}", e)))?;
                String::from_utf8(bytes)
                    .map_err(|_| StoreError::Malformed("content is not UTF-8".to_string()))?
            }
            Some(other) => {
                return Err(StoreError::Malformed(format!("unsupported encoding '{}'", other)));
            }
        };
        Ok(RemoteSnapshot {
            text,
            version: VersionToken::new(body.sha),
        })
    }
}

/// Map a non-success response onto the store taxonomy, keeping the remote message.
fn classify(status: StatusCode, headers: &HeaderMap, body: &str) -> StoreError {
    let message = serde_json::from_str::<ApiErrorBody>(body)
        .map(|b| b.message)
        .unwrap_or_else(|_| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                status.canonical_reason().unwrap_or("no message").to_string()
            } else {
                trimmed.to_string()
            }
        });
    let rate_exhausted = headers
        .get(RATE_LIMIT_REMAINING)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.trim() == "0");

    match status {
        StatusCode::TOO_MANY_REQUESTS => StoreError::RateLimited { message },
        StatusCode::FORBIDDEN if rate_exhausted => StoreError::RateLimited { message },
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => StoreError::Unauthorized {
            status: status.as_u16(),
            message,
        },
        StatusCode::CONFLICT => StoreError::Conflict { message },
        // Creating without a sha when the file appeared in the meantime
        StatusCode::UNPROCESSABLE_ENTITY if message.contains("sha") => {
            StoreError::Conflict { message }
        }
        _ => StoreError::Status {
            status: status.as_u16(),
            message,
        },
    }
}

#[async_trait]
impl ContentStore for GitHubContentsStore {
    fn backend(&self) -> &str {
        "github"
    }

    fn resource(&self) -> &str {
        &self.location.path
    }

    async fn fetch(&self, credential: &Credential) -> Result<Option<RemoteSnapshot>, StoreError> {
        let span = store_span!(self.backend(), "fetch", self.resource());
        async {
            let mut request = self.client.get(self.url()).headers(self.headers(credential)?);
            if let Some(branch) = &self.location.branch {
                request = request.query(&[("ref", branch.as_str())]);
            }
            let started = Instant::now();
            let response = request
                .send()
                .await
                .map_err(|e| StoreError::from_reqwest(e, self.timeout))?;
            record_duration("duration_ms", started.elapsed());
            let status = response.status();
            tracing::Span::current().record("http.status_code", status.as_u16());

            if status == StatusCode::NOT_FOUND {
                debug!("feedback log does not exist yet");
                return Ok(None);
            }
            if !status.is_success() {
                let headers = response.headers().clone();
                let body = response.text().await.unwrap_or_default();
                let err = classify(status, &headers, &body);
                warn!(error = %err, "fetch rejected");
                return Err(err);
            }
            let body: ContentsResponse = response
                .json()
                .await
                .map_err(|e| StoreError::from_reqwest(e, self.timeout))?;
            Self::decode(body).map(Some)
        }
        .instrument(span)
        .await
    }

    async fn write(
        &self,
        credential: &Credential,
        request: WriteRequest,
    ) -> Result<WriteReceipt, StoreError> {
        let span = store_span!(self.backend(), "write", self.resource());
        async {
            let body = PutBody {
                message: &request.message,
                content: STANDARD.encode(request.content.as_bytes()),
                sha: request.version.as_ref().map(|v| v.as_str()),
                branch: self.location.branch.as_deref(),
            };
            let started = Instant::now();
            let response = self
                .client
                .put(self.url())
                .headers(self.headers(credential)?)
                .json(&body)
                .send()
                .await
                .map_err(|e| StoreError::from_reqwest(e, self.timeout))?;
            record_duration("duration_ms", started.elapsed());
            let status = response.status();
            tracing::Span::current().record("http.status_code", status.as_u16());

            if !status.is_success() {
                let headers = response.headers().clone();
                let body = response.text().await.unwrap_or_default();
                let err = classify(status, &headers, &body);
                warn!(error = %err, "write rejected");
                return Err(err);
            }
            let body: PutResponse = response
                .json()
                .await
                .map_err(|e| StoreError::from_reqwest(e, self.timeout))?;
            Ok::<_, StoreError>(WriteReceipt {
                version: VersionToken::new(body.content.sha),
            })
        }
        .instrument(span)
        .await
    }
}
