//! Error types for the observability crate

use thiserror::Error;

/// Errors raised while installing the tracing pipeline
#[derive(Error, Debug)]
pub enum ObservabilityError {
    /// OTLP exporter or subscriber could not be installed
    #[error("Failed to initialize observability: {0}")]
    InitFailed(String),

    #[error("Configuration error: {0}")]
    Config(String),
}
