//! Relay configuration.

use std::net::SocketAddr;

use docsite_constant::env as vars;
use docsite_constant::feedback::{DEFAULT_QUEUE_CAPACITY, DEFAULT_RELAY_ADDR};
use docsite_feedback::{Credential, FeedbackConfig};

use crate::error::{RelayError, Result};

/// Everything the relay needs to run. Secrets are held as redacted [`Credential`]s.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub addr: SocketAddr,
    pub store: FeedbackConfig,
    /// High-privilege content store credential
    pub store_token: Credential,
    /// HS256 key for session tokens
    pub session_secret: Credential,
    /// Value of `Access-Control-Allow-Origin`
    pub allowed_origin: String,
    pub queue_capacity: usize,
}

impl RelayConfig {
    pub fn new(store: FeedbackConfig, store_token: Credential, session_secret: Credential) -> Self {
        Self {
            addr: default_addr(),
            store,
            store_token,
            session_secret,
            allowed_origin: "*".to_string(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }

    pub fn with_addr(mut self, addr: SocketAddr) -> Self {
        self.addr = addr;
        self
    }

    pub fn with_allowed_origin(mut self, origin: impl Into<String>) -> Self {
        self.allowed_origin = origin.into();
        self
    }

    /// Create config from environment variables.
    ///
    /// Required: `DOCSITE_RELAY_STORE_TOKEN`, `DOCSITE_SESSION_SECRET` and the store
    /// variables read by [`FeedbackConfig::from_env`].
    /// Optional: `DOCSITE_RELAY_ADDR`, `DOCSITE_RELAY_ALLOWED_ORIGIN`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let store = FeedbackConfig::from_lookup(&lookup)?;
        let secret = |key: &str| {
            lookup(key)
                .and_then(Credential::new)
                .ok_or_else(|| RelayError::Config(format!("{} not set", key)))
        };
        let store_token = secret(vars::RELAY_STORE_TOKEN)?;
        let session_secret = secret(vars::SESSION_SECRET)?;

        let mut config = Self::new(store, store_token, session_secret);
        if let Some(addr) = lookup(vars::RELAY_ADDR).filter(|v| !v.trim().is_empty()) {
            config.addr = addr.trim().parse().map_err(|_| {
                RelayError::Config(format!("{} is not a socket address: {}", vars::RELAY_ADDR, addr))
            })?;
        }
        if let Some(origin) = lookup(vars::RELAY_ALLOWED_ORIGIN).filter(|v| !v.trim().is_empty()) {
            config.allowed_origin = origin.trim().to_string();
        }
        Ok(config)
    }
}

fn default_addr() -> SocketAddr {
    DEFAULT_RELAY_ADDR
        .parse()
        .unwrap_or_else(|_| SocketAddr::from(([127, 0, 0, 1], 8787)))
}
