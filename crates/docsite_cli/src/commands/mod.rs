//! Command dispatch.

pub mod feedback;
pub mod nav;
pub mod relay;
pub mod session;
pub mod site;

use crate::cli::{Cli, Command};
use anyhow::Result;

pub async fn handle(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Nav { action } => nav::handle(action),
        Command::Site { action } => site::handle(action),
        Command::Feedback { action } => feedback::handle(action).await,
        Command::Relay { action } => relay::handle(action).await,
        Command::Session { action } => session::handle(action),
    }
}
