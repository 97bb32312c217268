//! CLI entry point for docsite.

mod cli;
mod commands;
mod output;
mod prompt;

use clap::Parser;
use docsite_constant::app;
use docsite_observability::ObservabilityConfig;

use crate::cli::{Cli, Command};

/// Load configuration from env files without overriding variables already set.
/// Order: 1) ~/.docsite/env  2) nearest .env walking up from the working directory
fn load_docsite_config() {
    if let Some(home) = dirs::home_dir() {
        let config_path = home.join(app::DATA_DIR).join(app::ENV_FILE);
        if config_path.exists() {
            let _ = dotenvy::from_path(&config_path);
        }
    }
    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd;
        for _ in 0..32 {
            let env_file = dir.join(".env");
            if env_file.exists() {
                let _ = dotenvy::from_path(&env_file);
                break;
            }
            if let Some(parent) = dir.parent() {
                dir = parent.to_path_buf();
            } else {
                break;
            }
        }
    }
}

fn init_tracing(cli: &Cli) {
    let serving = matches!(cli.command, Command::Relay { .. });
    let mut config = ObservabilityConfig::from_env().with_version(app::VERSION);
    if serving {
        config.service_name = format!("{}-relay", app::NAME);
    }
    if cli.verbose {
        config = config.with_log_level("debug");
    } else if config.log_level.is_none() {
        config = config.with_log_level(if serving { "info" } else { "warn" });
    }
    if let Err(e) = docsite_observability::init(config) {
        output::warning(&format!("Logging disabled: {}", e));
    }
}

#[tokio::main]
async fn main() {
    load_docsite_config();
    let cli = Cli::parse();
    output::init(cli.output);
    init_tracing(&cli);

    let result = commands::handle(cli).await;
    docsite_observability::shutdown();
    if let Err(e) = result {
        output::error(&e.to_string());
        std::process::exit(1);
    }
}
