//! Span helpers shared across docsite crates

/// Create a span with common HTTP request fields
///
/// # Example
///
/// ```rust
/// use docsite_observability::http_request_span;
///
/// let span = http_request_span!("POST", "/feedback", "req-1");
/// let _guard = span.enter();
/// ```
#[macro_export]
macro_rules! http_request_span {
    ($method:expr, $path:expr, $request_id:expr) => {
        tracing::info_span!(
            "http.request",
            http.method = $method,
            http.route = $path,
            http.status_code = tracing::field::Empty,
            request.id = $request_id,
            error = tracing::field::Empty,
            error.message = tracing::field::Empty,
        )
    };
}

/// Create a span around one feedback submission attempt.
///
/// The page identifier is recorded; the note text and the credential never are.
///
/// ```rust
/// use docsite_observability::feedback_span;
///
/// let span = feedback_span!("/pages/quick-start.html");
/// let _guard = span.enter();
/// ```
#[macro_export]
macro_rules! feedback_span {
    ($page:expr) => {
        tracing::info_span!(
            "feedback.submit",
            feedback.page = $page,
            feedback.state = tracing::field::Empty,
            feedback.attempt = tracing::field::Empty,
        )
    };
}

/// Create a span for a content store call.
///
/// ```rust
/// use docsite_observability::store_span;
///
/// let span = store_span!("github", "fetch", "feedback/feedback.md");
/// let _guard = span.enter();
/// ```
#[macro_export]
macro_rules! store_span {
    ($backend:expr, $operation:expr, $path:expr) => {
        tracing::info_span!(
            "store.operation",
            store.backend = $backend,
            store.operation = $operation,
            store.path = $path,
            http.status_code = tracing::field::Empty,
            duration_ms = tracing::field::Empty,
        )
    };
}

/// Record an error on the current span and log it.
pub fn record_error<E: std::error::Error>(error: &E) {
    let span = tracing::Span::current();
    span.record("error", true);
    span.record("error.message", error.to_string().as_str());
    tracing::error!(error = %error, "Operation failed");
}

/// Record a duration in milliseconds on the current span.
pub fn record_duration(key: &str, duration: std::time::Duration) {
    let span = tracing::Span::current();
    span.record(key, duration.as_millis() as u64);
}
