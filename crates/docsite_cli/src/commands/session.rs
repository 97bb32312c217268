//! `docsite session` subcommands.

use std::time::Duration;

use anyhow::{Result, anyhow};
use docsite_constant::env as vars;
use docsite_feedback::Credential;
use docsite_relay::SessionIssuer;
use serde_json::json;

use crate::cli::SessionAction;
use crate::output;

pub fn handle(action: SessionAction) -> Result<()> {
    match action {
        SessionAction::Mint { subject, ttl_secs } => mint(&subject, ttl_secs),
    }
}

fn mint(subject: &str, ttl_secs: u64) -> Result<()> {
    let secret = std::env::var(vars::SESSION_SECRET)
        .ok()
        .and_then(Credential::new)
        .ok_or_else(|| anyhow!("{} is not set", vars::SESSION_SECRET))?;
    let issuer = SessionIssuer::new(&secret, Duration::from_secs(ttl_secs))?;
    let token = issuer.mint(subject)?;

    if output::is_json() {
        output::data(
            "session",
            &json!({ "token": token, "subject": subject, "expires_in": ttl_secs }),
        );
    } else {
        println!("{}", token);
        output::dim(&format!("Session for {} valid for {}s", subject, ttl_secs));
    }
    Ok(())
}
