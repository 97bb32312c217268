//! docsite-relay: server-side feedback relay.
//!
//! Readers never hold the content store credential. The relay keeps it, accepts
//! `POST /feedback` from holders of a short-lived session token and appends through a
//! single [`AppendQueue`](docsite_feedback::AppendQueue), so concurrent readers never
//! overwrite each other.
//!
//! Routes:
//! - `GET /health`
//! - `POST /feedback` with `Authorization: Bearer <session>` and `{"text", "page"}`

pub mod client;
pub mod config;
pub mod error;
pub mod handlers;
pub mod server;
pub mod session;

pub use client::{RelayClient, RelayReceipt};
pub use config::RelayConfig;
pub use error::{RelayError, Result};
pub use handlers::{RelayState, handle_feedback, health};
pub use server::{bind, build_state, drain_queue, run, serve};
pub use session::{Claims, SessionIssuer, SessionValidator, bearer_token};
