//! HTTP server
//!
//! hyper http1 over `TokioIo`, one task per connection.

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use docsite_constant::feedback::{MAX_RELAY_BODY_BYTES, QUEUE_DRAIN_TIMEOUT_SECS};
use docsite_feedback::{AppendQueue, GitHubContentsStore};
use docsite_observability::http_request_span;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Incoming;
use hyper::header::{self, HeaderMap, HeaderValue};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, error, info, warn};

use crate::config::RelayConfig;
use crate::error::{RelayError, Result};
use crate::handlers::{self, RelayState, error_body};
use crate::session::SessionValidator;

/// Build relay state backed by the configured content store.
///
/// The returned handle is the append queue task; it ends once the state is dropped.
pub fn build_state(config: &RelayConfig) -> Result<(RelayState, JoinHandle<()>)> {
    let store = GitHubContentsStore::new(config.store.location.clone(), config.store.request_timeout)
        .map_err(|e| RelayError::Config(format!("content store client: {}", e)))?;
    let sessions = SessionValidator::new(&config.session_secret)?;
    let (queue, handle) = AppendQueue::spawn(
        Arc::new(store),
        config.store_token.clone(),
        config.store.policy.clone(),
        config.queue_capacity,
    );
    let state = RelayState::new(queue, sessions).with_allowed_origin(config.allowed_origin.clone());
    Ok((state, handle))
}

pub async fn bind(addr: SocketAddr) -> Result<TcpListener> {
    TcpListener::bind(addr)
        .await
        .map_err(|source| RelayError::Bind { addr, source })
}

/// Run the relay until `shutdown` resolves.
pub async fn run<F>(config: RelayConfig, shutdown: F) -> Result<()>
where
    F: Future<Output = ()>,
{
    let (state, queue_task) = build_state(&config)?;
    let listener = bind(config.addr).await?;
    info!(
        "Feedback relay listening on {} (log {}/{}:{})",
        config.addr, config.store.location.owner, config.store.location.repo, config.store.location.path
    );
    serve(listener, Arc::new(state), shutdown).await?;
    drain_queue(queue_task, Duration::from_secs(QUEUE_DRAIN_TIMEOUT_SECS)).await;
    Ok(())
}

/// Wait for the append queue to finish its pending jobs. The queue stops once every
/// handle is dropped; if that takes longer than `grace` it is aborted.
///
/// Returns `true` when the queue stopped on its own.
pub async fn drain_queue(queue_task: JoinHandle<()>, grace: Duration) -> bool {
    let abort = queue_task.abort_handle();
    match tokio::time::timeout(grace, queue_task).await {
        Ok(_) => true,
        Err(_) => {
            abort.abort();
            warn!(grace_secs = grace.as_secs_f64(), "append queue still busy, aborting it");
            false
        }
    }
}

/// Accept connections on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, state: Arc<RelayState>, shutdown: F) -> Result<()>
where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Feedback relay shutting down");
                return Ok(());
            }
            accepted = listener.accept() => match accepted {
                Ok((stream, addr)) => {
                    let state = Arc::clone(&state);
                    tokio::spawn(async move {
                        let io = TokioIo::new(stream);
                        let service = service_fn(move |req| {
                            let state = Arc::clone(&state);
                            async move { Ok::<_, Infallible>(route(state, req).await) }
                        });
                        if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                            debug!("Error serving connection from {}: {:?}", addr, err);
                        }
                    });
                }
                Err(e) => {
                    error!("Error accepting connection: {:?}", e);
                }
            }
        }
    }
}

async fn route(state: Arc<RelayState>, req: Request<Incoming>) -> Response<Full<Bytes>> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let request_id = uuid::Uuid::new_v4().to_string();
    let span = http_request_span!(method.as_str(), path.as_str(), request_id.as_str());

    async move {
        let (status, body) = match (&method, path.as_str()) {
            (&Method::OPTIONS, _) => return preflight_response(&state),
            (&Method::GET, "/health") => handlers::health(),
            (&Method::POST, "/feedback") => {
                let authorization = req
                    .headers()
                    .get(header::AUTHORIZATION)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);
                match read_body(req.into_body()).await {
                    Ok(body) => handlers::handle_feedback(&state, authorization.as_deref(), &body).await,
                    Err(rejection) => rejection,
                }
            }
            (_, "/health") => return method_not_allowed(&state, "GET"),
            (_, "/feedback") => return method_not_allowed(&state, "POST, OPTIONS"),
            _ => (
                StatusCode::NOT_FOUND,
                json!({ "error": "Not Found", "path": path }),
            ),
        };
        tracing::Span::current().record("http.status_code", status.as_u16());
        debug!(status = status.as_u16(), "request handled");
        json_response(&state, status, &body)
    }
    .instrument(span)
    .await
}

async fn read_body(body: Incoming) -> std::result::Result<Bytes, (StatusCode, Value)> {
    match Limited::new(body, MAX_RELAY_BODY_BYTES).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(err) if err.downcast_ref::<LengthLimitError>().is_some() => Err((
            StatusCode::PAYLOAD_TOO_LARGE,
            error_body(format!("request body exceeds {} bytes", MAX_RELAY_BODY_BYTES)),
        )),
        Err(err) => Err((
            StatusCode::BAD_REQUEST,
            error_body(format!("could not read request body: {}", err)),
        )),
    }
}

fn cors_headers(headers: &mut HeaderMap, state: &RelayState) {
    if let Ok(origin) = HeaderValue::from_str(&state.allowed_origin) {
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
    }
}

fn json_response(state: &RelayState, status: StatusCode, body: &Value) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from(body.to_string())));
    *response.status_mut() = status;
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    cors_headers(headers, state);
    response
}

fn method_not_allowed(state: &RelayState, allow: &'static str) -> Response<Full<Bytes>> {
    let mut response = json_response(
        state,
        StatusCode::METHOD_NOT_ALLOWED,
        &error_body("Method Not Allowed"),
    );
    response
        .headers_mut()
        .insert(header::ALLOW, HeaderValue::from_static(allow));
    response
}

/// CORS preflight response
fn preflight_response(state: &RelayState) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = StatusCode::NO_CONTENT;
    let headers = response.headers_mut();
    cors_headers(headers, state);
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("authorization, content-type"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, OPTIONS"),
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use docsite_feedback::{
        AppendPolicy, Credential, FeedbackSubmission, FeedbackText, MemoryStore, PageId,
    };

    fn spawn_queue(store: Arc<MemoryStore>) -> (AppendQueue, JoinHandle<()>) {
        AppendQueue::spawn(
            store,
            Credential::new("ghp_relay").unwrap(),
            AppendPolicy::no_retry(),
            4,
        )
    }

    fn note(text: &str) -> FeedbackSubmission {
        FeedbackSubmission::new(FeedbackText::parse(text).unwrap(), PageId::new("/"), Utc::now())
    }

    #[tokio::test]
    async fn test_drain_lets_pending_append_finish() {
        let store = Arc::new(MemoryStore::new());
        let (queue, task) = spawn_queue(store.clone());
        let pending = tokio::spawn(async move { queue.append(note("last one in")).await });

        assert!(drain_queue(task, Duration::from_secs(5)).await);
        let receipt = pending.await.unwrap().unwrap();
        assert_eq!(receipt.attempts, 1);
        assert!(store.content().unwrap().ends_with("last one in"));
    }

    #[tokio::test]
    async fn test_drain_aborts_after_grace() {
        let (queue, task) = spawn_queue(Arc::new(MemoryStore::new()));

        assert!(!drain_queue(task, Duration::from_millis(20)).await);
        let err = queue.append(note("too late")).await.unwrap_err();
        assert!(matches!(err, docsite_feedback::FeedbackError::QueueClosed));
    }
}
