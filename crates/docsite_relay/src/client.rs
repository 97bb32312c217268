//! HTTP client for a running relay.

use std::time::Duration;

use docsite_constant::app;
use docsite_feedback::Credential;
use reqwest::Client;
use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{RelayError, Result};

#[derive(Debug, Serialize)]
struct FeedbackBody<'a> {
    text: &'a str,
    page: &'a str,
}

/// What the relay reports after a successful append.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RelayReceipt {
    pub version: String,
    pub attempts: u32,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

pub struct RelayClient {
    client: Client,
    base_url: String,
}

impl RelayClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(format!("{}/{}", app::NAME, app::VERSION))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn health(&self) -> Result<()> {
        let response = self.client.get(format!("{}/health", self.base_url)).send().await?;
        if !response.status().is_success() {
            return Err(rejected(response).await);
        }
        Ok(())
    }

    /// Submit one note through the relay, authenticated by a session token.
    pub async fn send(&self, session: &Credential, page: &str, text: &str) -> Result<RelayReceipt> {
        let mut auth: reqwest::header::HeaderValue = format!("Bearer {}", session.expose())
            .parse()
            .map_err(|_| RelayError::Unauthorized("session token is not a valid header value".into()))?;
        auth.set_sensitive(true);

        let response = self
            .client
            .post(format!("{}/feedback", self.base_url))
            .header(AUTHORIZATION, auth)
            .json(&FeedbackBody { text, page })
            .send()
            .await?;
        let status = response.status();
        debug!(status = status.as_u16(), "relay responded");
        if !status.is_success() {
            return Err(rejected(response).await);
        }
        Ok(response.json::<RelayReceipt>().await?)
    }
}

async fn rejected(response: reqwest::Response) -> RelayError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .map(|b| b.error)
        .unwrap_or_else(|_| {
            status.canonical_reason().unwrap_or("no message").to_string()
        });
    RelayError::Rejected {
        status: status.as_u16(),
        message,
    }
}
