//! Error types for navigation configuration.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum NavError {
    /// Structurally valid TOML that breaks a navigation rule
    #[error("invalid navigation config: {0}")]
    InvalidConfig(String),

    #[error("failed to parse navigation config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, NavError>;
