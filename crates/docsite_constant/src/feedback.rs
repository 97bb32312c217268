//! Feedback defaults shared by the submitter, the relay and the CLI.

/// Maximum note length, counted in characters.
pub const MAX_FEEDBACK_CHARS: usize = 200;

/// Path of the shared feedback log inside the content store.
pub const DEFAULT_LOG_PATH: &str = "feedback/feedback.md";
pub const DEFAULT_BRANCH: &str = "main";
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Per-request deadline for content store calls.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 5;
/// Full read-modify-write restarts after a stale version token.
pub const DEFAULT_CONFLICT_RETRIES: u32 = 2;
pub const DEFAULT_CONFLICT_BACKOFF_MS: u64 = 250;
pub const MAX_CONFLICT_BACKOFF_MS: u64 = 2_000;

/// Scope carried by relay session tokens.
pub const SESSION_SCOPE: &str = "feedback:append";
pub const DEFAULT_SESSION_TTL_SECS: u64 = 900;
pub const DEFAULT_RELAY_ADDR: &str = "127.0.0.1:8787";
/// Largest request body the relay reads.
pub const MAX_RELAY_BODY_BYTES: usize = 16 * 1024;
/// Pending submissions buffered by the relay's append queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;
/// Shortest accepted HS256 session secret, in bytes.
pub const MIN_SESSION_SECRET_LEN: usize = 32;
/// Widget form action when none is configured.
pub const DEFAULT_FEEDBACK_ENDPOINT: &str = "/feedback";
/// How long a stopping relay waits for queued appends to finish.
pub const QUEUE_DRAIN_TIMEOUT_SECS: u64 = 10;
