//! docsite observability - tracing setup shared by the CLI and the feedback relay
//!
//! # Features
//!
//! - `tracing-subscriber` registry with `EnvFilter` and console output
//! - Optional OpenTelemetry OTLP export
//! - Span macros for HTTP requests, feedback submissions and content store calls
//! - A line sink layer that forwards formatted events to a callback
//!
//! # Quick Start
//!
//! ```no_run
//! use docsite_observability::{ObservabilityConfig, init};
//!
//! let config = ObservabilityConfig::new("docsite-relay")
//!     .with_otlp_endpoint("http://localhost:4317")
//!     .with_log_level("info");
//!
//! init(config)?;
//! tracing::info!("relay started");
//! # Ok::<(), docsite_observability::ObservabilityError>(())
//! ```
//!
//! # Environment Variables
//!
//! - `OTEL_SERVICE_NAME` or `SERVICE_NAME` - Service name
//! - `OTEL_SERVICE_VERSION` or `SERVICE_VERSION` - Service version
//! - `OTEL_EXPORTER_OTLP_ENDPOINT` - OTLP endpoint
//! - `OTEL_LOG_LEVEL` or `RUST_LOG` - Log level filter

pub mod config;
pub mod error;
pub mod sink_layer;
pub mod telemetry;
pub mod tracing;

pub use config::{LogSink, ObservabilityConfig};
pub use error::ObservabilityError;
pub use sink_layer::{sink_layer, SinkLayer};
pub use telemetry::{init, shutdown};
pub use self::tracing::{record_duration, record_error};
