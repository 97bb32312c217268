//! Configuration for the feedback log and the append policy.

use std::time::Duration;

use docsite_constant::env as vars;
use docsite_constant::feedback::{
    DEFAULT_API_URL, DEFAULT_BRANCH, DEFAULT_CONFLICT_BACKOFF_MS, DEFAULT_CONFLICT_RETRIES,
    DEFAULT_LOG_PATH, DEFAULT_REQUEST_TIMEOUT_SECS, MAX_CONFLICT_BACKOFF_MS,
};

use crate::error::{FeedbackError, Result};

/// Where the feedback log lives in the content store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreLocation {
    /// API root (e.g. "https://api.github.com")
    pub api_url: String,
    pub owner: String,
    pub repo: String,
    /// Path of the log file inside the repository
    pub path: String,
    /// Branch to read and commit to; `None` uses the repository default
    pub branch: Option<String>,
}

impl StoreLocation {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            owner: owner.into(),
            repo: repo.into(),
            path: DEFAULT_LOG_PATH.to_string(),
            branch: Some(DEFAULT_BRANCH.to_string()),
        }
    }

    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn branch(mut self, branch: Option<String>) -> Self {
        self.branch = branch;
        self
    }
}

/// How a read-modify-write append reacts to a stale version token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendPolicy {
    /// Full restarts (re-fetch, re-compose, re-write) after a conflict. 0 = fail at once.
    pub max_conflict_retries: u32,
    /// First backoff; doubled per retry and capped.
    pub backoff_base: Duration,
}

impl Default for AppendPolicy {
    fn default() -> Self {
        Self {
            max_conflict_retries: DEFAULT_CONFLICT_RETRIES,
            backoff_base: Duration::from_millis(DEFAULT_CONFLICT_BACKOFF_MS),
        }
    }
}

impl AppendPolicy {
    /// Fail on the first conflict.
    pub fn no_retry() -> Self {
        Self {
            max_conflict_retries: 0,
            ..Self::default()
        }
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.max_conflict_retries = retries;
        self
    }

    pub fn with_backoff_base(mut self, base: Duration) -> Self {
        self.backoff_base = base;
        self
    }

    /// Delay before retry number `retry` (1-based): base, 2·base, 4·base, … capped.
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        self.backoff_base
            .saturating_mul(factor)
            .min(Duration::from_millis(MAX_CONFLICT_BACKOFF_MS))
    }
}

/// Everything needed to talk to the feedback log.
#[derive(Debug, Clone)]
pub struct FeedbackConfig {
    pub location: StoreLocation,
    /// Deadline applied to every content store request
    pub request_timeout: Duration,
    pub policy: AppendPolicy,
}

impl FeedbackConfig {
    pub fn new(location: StoreLocation) -> Self {
        Self {
            location,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            policy: AppendPolicy::default(),
        }
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn policy(mut self, policy: AppendPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Create config from environment variables.
    ///
    /// Required: `DOCSITE_STORE_OWNER`, `DOCSITE_STORE_REPO`
    /// Optional: `DOCSITE_STORE_PATH`, `DOCSITE_STORE_BRANCH` (empty = repository default),
    /// `DOCSITE_STORE_API_URL`, `DOCSITE_REQUEST_TIMEOUT_SECS`, `DOCSITE_CONFLICT_RETRIES`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| FeedbackError::Config(format!("{} not set", key)))
        };
        let owner = required(vars::STORE_OWNER)?;
        let repo = required(vars::STORE_REPO)?;

        let mut location = StoreLocation::new(owner, repo);
        if let Some(path) = lookup(vars::STORE_PATH).filter(|v| !v.is_empty()) {
            location = location.path(path);
        }
        if let Some(branch) = lookup(vars::STORE_BRANCH) {
            location = location.branch(Some(branch).filter(|b| !b.is_empty()));
        }
        if let Some(url) = lookup(vars::STORE_API_URL).filter(|v| !v.is_empty()) {
            location = location.api_url(url);
        }

        let mut config = Self::new(location);
        if let Some(secs) = lookup(vars::REQUEST_TIMEOUT_SECS) {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                FeedbackError::Config(format!("{} must be a number of seconds", vars::REQUEST_TIMEOUT_SECS))
            })?;
            if secs == 0 {
                return Err(FeedbackError::Config(format!(
                    "{} must be greater than zero",
                    vars::REQUEST_TIMEOUT_SECS
                )));
            }
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(retries) = lookup(vars::CONFLICT_RETRIES) {
            let retries: u32 = retries.trim().parse().map_err(|_| {
                FeedbackError::Config(format!("{} must be a non-negative integer", vars::CONFLICT_RETRIES))
            })?;
            config.policy = config.policy.with_retries(retries);
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = FeedbackConfig::from_lookup(lookup(&[
            ("DOCSITE_STORE_OWNER", "acme"),
            ("DOCSITE_STORE_REPO", "docs"),
        ]))
        .unwrap();
        assert_eq!(config.location.api_url, "https://api.github.com");
        assert_eq!(config.location.path, "feedback/feedback.md");
        assert_eq!(config.location.branch.as_deref(), Some("main"));
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.policy.max_conflict_retries, 2);
    }

    #[test]
    fn test_missing_owner() {
        let err = FeedbackConfig::from_lookup(lookup(&[("DOCSITE_STORE_REPO", "docs")])).unwrap_err();
        assert_eq!(err.to_string(), "configuration error: DOCSITE_STORE_OWNER not set");
    }

    #[test]
    fn test_overrides() {
        let config = FeedbackConfig::from_lookup(lookup(&[
            ("DOCSITE_STORE_OWNER", "acme"),
            ("DOCSITE_STORE_REPO", "docs"),
            ("DOCSITE_STORE_BRANCH", ""),
            ("DOCSITE_STORE_PATH", "notes.md"),
            ("DOCSITE_REQUEST_TIMEOUT_SECS", "2"),
            ("DOCSITE_CONFLICT_RETRIES", "0"),
        ]))
        .unwrap();
        assert_eq!(config.location.branch, None);
        assert_eq!(config.location.path, "notes.md");
        assert_eq!(config.request_timeout, Duration::from_secs(2));
        assert_eq!(config.policy.max_conflict_retries, 0);
    }

    #[test]
    fn test_bad_numbers() {
        let base = [("DOCSITE_STORE_OWNER", "a"), ("DOCSITE_STORE_REPO", "b")];
        let mut with_timeout = base.to_vec();
        with_timeout.push(("DOCSITE_REQUEST_TIMEOUT_SECS", "0"));
        assert!(FeedbackConfig::from_lookup(lookup(&with_timeout)).is_err());

        let mut with_retries = base.to_vec();
        with_retries.push(("DOCSITE_CONFLICT_RETRIES", "-1"));
        assert!(FeedbackConfig::from_lookup(lookup(&with_retries)).is_err());
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = AppendPolicy::default().with_backoff_base(Duration::from_millis(300));
        assert_eq!(policy.backoff(1), Duration::from_millis(300));
        assert_eq!(policy.backoff(2), Duration::from_millis(600));
        assert_eq!(policy.backoff(3), Duration::from_millis(1200));
        assert_eq!(policy.backoff(4), Duration::from_millis(2000));
        assert_eq!(policy.backoff(40), Duration::from_millis(2000));
    }
}
