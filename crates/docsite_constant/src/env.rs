//! Environment variable names.

pub const STORE_OWNER: &str = "DOCSITE_STORE_OWNER";
pub const STORE_REPO: &str = "DOCSITE_STORE_REPO";
pub const STORE_PATH: &str = "DOCSITE_STORE_PATH";
pub const STORE_BRANCH: &str = "DOCSITE_STORE_BRANCH";
pub const STORE_API_URL: &str = "DOCSITE_STORE_API_URL";
pub const REQUEST_TIMEOUT_SECS: &str = "DOCSITE_REQUEST_TIMEOUT_SECS";
pub const CONFLICT_RETRIES: &str = "DOCSITE_CONFLICT_RETRIES";

pub const RELAY_ADDR: &str = "DOCSITE_RELAY_ADDR";
/// High-privilege store credential; read by the relay only.
pub const RELAY_STORE_TOKEN: &str = "DOCSITE_RELAY_STORE_TOKEN";
pub const SESSION_SECRET: &str = "DOCSITE_SESSION_SECRET";
pub const SESSION_TOKEN: &str = "DOCSITE_SESSION_TOKEN";
/// Origin allowed to call the relay from a browser; `*` when unset.
pub const RELAY_ALLOWED_ORIGIN: &str = "DOCSITE_RELAY_ALLOWED_ORIGIN";
/// Base URL of a running relay, used by `docsite feedback send`.
pub const RELAY_URL: &str = "DOCSITE_RELAY_URL";
/// Form action of the injected feedback widget.
pub const FEEDBACK_ENDPOINT: &str = "DOCSITE_FEEDBACK_ENDPOINT";
