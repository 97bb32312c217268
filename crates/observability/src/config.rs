//! Configuration for logging and trace export

use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Receives each formatted log line. Called from the tracing layer; must not block.
pub type LogSink = Arc<dyn Fn(String) + Send + Sync>;

const DEFAULT_SERVICE_NAME: &str = "docsite";

/// Observability configuration
#[derive(Clone)]
pub struct ObservabilityConfig {
    /// Service name for traces (e.g., "docsite-cli", "docsite-relay")
    pub service_name: String,

    /// Service version (optional)
    pub service_version: Option<String>,

    /// OTLP endpoint for trace export (e.g., "http://localhost:4317")
    pub otlp_endpoint: Option<String>,

    /// Enable console/log output in addition to OTLP export
    pub enable_console: bool,

    /// Log level filter (e.g., "info", "debug", "docsite_feedback=trace")
    /// Defaults to "info" if not set
    pub log_level: Option<String>,

    /// Additional resource attributes (key-value pairs)
    pub resource_attributes: Vec<(String, String)>,

    /// Optional sink for each formatted log line. Not serialized.
    pub log_sink: Option<LogSink>,
}

// Arc<dyn Fn> has no serde support, so the sink is skipped by hand.
impl Serialize for ObservabilityConfig {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut s = serializer.serialize_struct("ObservabilityConfig", 6)?;
        s.serialize_field("service_name", &self.service_name)?;
        s.serialize_field("service_version", &self.service_version)?;
        s.serialize_field("otlp_endpoint", &self.otlp_endpoint)?;
        s.serialize_field("enable_console", &self.enable_console)?;
        s.serialize_field("log_level", &self.log_level)?;
        s.serialize_field("resource_attributes", &self.resource_attributes)?;
        s.end()
    }
}

impl<'de> Deserialize<'de> for ObservabilityConfig {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct ObservabilityConfigDe {
            #[serde(default = "default_service_name")]
            service_name: String,
            service_version: Option<String>,
            otlp_endpoint: Option<String>,
            #[serde(default = "default_console")]
            enable_console: bool,
            log_level: Option<String>,
            #[serde(default)]
            resource_attributes: Vec<(String, String)>,
        }
        fn default_service_name() -> String {
            DEFAULT_SERVICE_NAME.to_string()
        }
        fn default_console() -> bool {
            true
        }
        let de = ObservabilityConfigDe::deserialize(deserializer)?;
        Ok(ObservabilityConfig {
            service_name: de.service_name,
            service_version: de.service_version,
            otlp_endpoint: de.otlp_endpoint,
            enable_console: de.enable_console,
            log_level: de.log_level,
            resource_attributes: de.resource_attributes,
            log_sink: None,
        })
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            service_version: None,
            otlp_endpoint: None,
            enable_console: true,
            log_level: None,
            resource_attributes: Vec::new(),
            log_sink: None,
        }
    }
}

impl std::fmt::Debug for ObservabilityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObservabilityConfig")
            .field("service_name", &self.service_name)
            .field("service_version", &self.service_version)
            .field("otlp_endpoint", &self.otlp_endpoint)
            .field("enable_console", &self.enable_console)
            .field("log_level", &self.log_level)
            .field("resource_attributes", &self.resource_attributes)
            .field("log_sink", &self.log_sink.as_ref().map(|_| "Some(LogSink)"))
            .finish()
    }
}

impl ObservabilityConfig {
    /// Create a new configuration with service name
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            ..Default::default()
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.service_version = Some(version.into());
        self
    }

    pub fn with_otlp_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.otlp_endpoint = Some(endpoint.into());
        self
    }

    pub fn with_console(mut self, enable: bool) -> Self {
        self.enable_console = enable;
        self
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = Some(level.into());
        self
    }

    pub fn with_resource_attribute(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.resource_attributes.push((key.into(), value.into()));
        self
    }

    pub fn with_log_sink(mut self, sink: LogSink) -> Self {
        self.log_sink = Some(sink);
        self
    }

    /// Build from environment variables
    ///
    /// Reads:
    /// - `OTEL_SERVICE_NAME` or `SERVICE_NAME` → service_name
    /// - `OTEL_SERVICE_VERSION` or `SERVICE_VERSION` → service_version
    /// - `OTEL_EXPORTER_OTLP_ENDPOINT` → otlp_endpoint
    /// - `OTEL_LOG_LEVEL` or `RUST_LOG` → log_level
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let service_name = lookup("OTEL_SERVICE_NAME")
            .or_else(|| lookup("SERVICE_NAME"))
            .unwrap_or_else(|| DEFAULT_SERVICE_NAME.to_string());

        let service_version =
            lookup("OTEL_SERVICE_VERSION").or_else(|| lookup("SERVICE_VERSION"));

        // OTLP only when explicitly set; console-only otherwise.
        let otlp_endpoint = lookup("OTEL_EXPORTER_OTLP_ENDPOINT").filter(|v| !v.is_empty());

        let log_level = lookup("OTEL_LOG_LEVEL").or_else(|| lookup("RUST_LOG"));

        Self {
            service_name,
            service_version,
            otlp_endpoint,
            enable_console: true,
            log_level,
            resource_attributes: Vec::new(),
            log_sink: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_from_lookup_prefers_otel_names() {
        let vars: HashMap<&str, &str> = [
            ("OTEL_SERVICE_NAME", "docsite-relay"),
            ("SERVICE_NAME", "ignored"),
            ("RUST_LOG", "debug"),
        ]
        .into_iter()
        .collect();
        let config = ObservabilityConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(config.service_name, "docsite-relay");
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert!(config.otlp_endpoint.is_none());
    }

    #[test]
    fn test_empty_otlp_endpoint_is_ignored() {
        let config = ObservabilityConfig::from_lookup(|k| {
            (k == "OTEL_EXPORTER_OTLP_ENDPOINT").then(String::new)
        });
        assert!(config.otlp_endpoint.is_none());
        assert_eq!(config.service_name, "docsite");
    }

    #[test]
    fn test_serde_skips_sink() {
        let config = ObservabilityConfig::new("svc")
            .with_log_sink(Arc::new(|_line| {}))
            .with_resource_attribute("deployment.environment", "dev");
        let json = serde_json::to_value(&config).unwrap();
        assert!(json.get("log_sink").is_none());
        let back: ObservabilityConfig = serde_json::from_value(json).unwrap();
        assert_eq!(back.service_name, "svc");
        assert!(back.log_sink.is_none());
        assert_eq!(back.resource_attributes.len(), 1);
    }
}
