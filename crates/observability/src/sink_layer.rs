//! Tracing layer that forwards formatted log lines to a sink.

use std::fmt::Write;

use tracing::field::Visit;
use tracing_subscriber::layer::{Context, Layer};

use crate::config::LogSink;

const MAX_LINE_LEN: usize = 32_000;

/// Builds "[LEVEL] target: message key=value ..." from one event.
struct LineVisitor {
    buf: String,
}

impl LineVisitor {
    fn new() -> Self {
        Self {
            buf: String::with_capacity(256),
        }
    }

    fn separate(&mut self) {
        if !self.buf.is_empty() {
            self.buf.push(' ');
        }
    }

    fn finish(self) -> String {
        self.buf
    }
}

impl Visit for LineVisitor {
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.separate();
        if field.name() == "message" {
            self.buf.push_str(value);
        } else {
            write!(self.buf, "{}={:?}", field.name(), value).ok();
        }
    }

    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.separate();
        if field.name() == "message" {
            write!(self.buf, "{:?}", value).ok();
        } else {
            write!(self.buf, "{}={:?}", field.name(), value).ok();
        }
    }
}

/// Layer that sends each formatted event to `sink` when present.
pub fn sink_layer(sink: Option<LogSink>) -> SinkLayer {
    SinkLayer { sink }
}

#[derive(Clone)]
pub struct SinkLayer {
    sink: Option<LogSink>,
}

impl<S> Layer<S> for SinkLayer
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let Some(sink) = self.sink.as_ref() else {
            return;
        };
        let level = *event.metadata().level();
        let target = event.metadata().target();
        let mut visitor = LineVisitor::new();
        event.record(&mut visitor);
        let rest = visitor.finish();
        let line = if rest.is_empty() {
            format!("[{}] {}", level, target)
        } else {
            format!("[{}] {}: {}", level, target, rest)
        };
        let line = if line.len() > MAX_LINE_LEN {
            let trunc: String = line.chars().take(MAX_LINE_LEN).collect();
            format!("{}… ({} chars)", trunc, line.len())
        } else {
            line
        };
        sink(line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::layer::SubscriberExt;

    #[test]
    fn test_lines_reach_sink() {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let captured = lines.clone();
        let sink: LogSink = Arc::new(move |line| captured.lock().unwrap().push(line));
        let subscriber = tracing_subscriber::registry().with(sink_layer(Some(sink)));

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(page = "/pages/a.html", "feedback stored");
        });

        let lines = lines.lock().unwrap();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("[INFO]"));
        assert!(lines[0].contains("feedback stored"));
        assert!(lines[0].contains("page=\"/pages/a.html\""));
    }

    #[test]
    fn test_no_sink_is_silent() {
        let subscriber = tracing_subscriber::registry().with(sink_layer(None));
        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!("nothing to forward to");
        });
    }
}
