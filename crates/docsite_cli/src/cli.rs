//! CLI argument definitions using clap derive macros.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use docsite_constant::{app, env as vars};

#[derive(Parser)]
#[command(
    name = app::NAME,
    about = app::DESCRIPTION,
    version = app::VERSION,
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format: text (human-readable) or json (machine-readable)
    #[arg(short, long, global = true, default_value = "text")]
    pub output: OutputFormat,
}

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum OutputFormat {
    /// Colored terminal output for humans
    #[default]
    Text,
    /// Structured JSON for machine consumption
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Render the navigation tree
    Nav {
        #[command(subcommand)]
        action: NavAction,
    },
    /// Process a directory of built pages
    Site {
        #[command(subcommand)]
        action: SiteAction,
    },
    /// Leave feedback on a page
    Feedback {
        #[command(subcommand)]
        action: FeedbackAction,
    },
    /// Run the feedback relay
    Relay {
        #[command(subcommand)]
        action: RelayAction,
    },
    /// Relay session tokens
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },
}

#[derive(Subcommand)]
pub enum NavAction {
    /// Mount the navigation tree into one page
    Render {
        /// Navigation config (TOML)
        #[arg(short, long)]
        config: PathBuf,
        /// HTML page to render into
        #[arg(short, long)]
        page: PathBuf,
        /// Id of the container element
        #[arg(long, default_value = app::NAV_CONTAINER_ID)]
        container: String,
        /// Write here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// List groups and links in configuration order
    List {
        /// Navigation config (TOML)
        #[arg(short, long)]
        config: PathBuf,
    },
}

#[derive(Subcommand)]
pub enum SiteAction {
    /// Mount navigation and the feedback widget into every page of a directory
    Build {
        /// Navigation config (TOML)
        #[arg(short, long)]
        config: PathBuf,
        /// Directory of built pages
        #[arg(long)]
        src: PathBuf,
        /// Output directory (must not be inside --src)
        #[arg(long)]
        out: PathBuf,
        /// Id of the navigation container element
        #[arg(long, default_value = app::NAV_CONTAINER_ID)]
        container: String,
        /// Form action of the feedback widget (e.g. https://relay.example.com/feedback)
        #[arg(long, env = vars::FEEDBACK_ENDPOINT, default_value = docsite_constant::feedback::DEFAULT_FEEDBACK_ENDPOINT)]
        endpoint: String,
    },
}

#[derive(Subcommand)]
pub enum FeedbackAction {
    /// Append a note directly to the feedback log (prompts for the store token)
    Submit {
        /// Page the note is about (path or full URL)
        #[arg(short, long)]
        page: String,
        /// The note
        #[arg(short, long)]
        text: String,
        /// Compose against an in-memory log; nothing is sent
        #[arg(long)]
        dry_run: bool,
    },
    /// Submit a note through a running relay
    Send {
        /// Relay base URL
        #[arg(long, env = vars::RELAY_URL)]
        relay: String,
        /// Page the note is about (path or full URL)
        #[arg(short, long)]
        page: String,
        /// The note
        #[arg(short, long)]
        text: String,
    },
}

#[derive(Subcommand)]
pub enum RelayAction {
    /// Serve the relay until interrupted
    Serve {
        /// Listen address (overrides DOCSITE_RELAY_ADDR)
        #[arg(long)]
        addr: Option<SocketAddr>,
        /// Allowed browser origin (overrides DOCSITE_RELAY_ALLOWED_ORIGIN)
        #[arg(long)]
        allowed_origin: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum SessionAction {
    /// Mint a session token signed with DOCSITE_SESSION_SECRET
    Mint {
        /// Who the session is for
        #[arg(short, long)]
        subject: String,
        /// Lifetime in seconds
        #[arg(long, default_value_t = docsite_constant::feedback::DEFAULT_SESSION_TTL_SECS)]
        ttl_secs: u64,
    },
}
