//! `docsite feedback` subcommands.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, anyhow, bail};
use docsite_constant::env as vars;
use docsite_constant::feedback::DEFAULT_REQUEST_TIMEOUT_SECS;
use docsite_feedback::{
    ContentStore, Credential, CredentialSource, FeedbackConfig, FeedbackWidget, FixedCredential,
    GitHubContentsStore, MemoryStore, PageId, SubmissionOutcome, SubmissionState, Submitter,
};
use docsite_relay::RelayClient;
use indicatif::ProgressBar;
use serde_json::json;
use tokio::sync::mpsc;

use crate::cli::FeedbackAction;
use crate::output;
use crate::prompt::{self, TerminalPrompt};

pub async fn handle(action: FeedbackAction) -> Result<()> {
    match action {
        FeedbackAction::Submit {
            page,
            text,
            dry_run,
        } => submit(&page, &text, dry_run).await,
        FeedbackAction::Send { relay, page, text } => send(&relay, &page, &text).await,
    }
}

fn state_message(state: SubmissionState) -> Option<&'static str> {
    match state {
        SubmissionState::FetchingCurrent => Some("Reading the feedback log..."),
        SubmissionState::Composing => Some("Composing..."),
        SubmissionState::Writing => Some("Saving your feedback..."),
        _ => None,
    }
}

async fn submit(page: &str, text: &str, dry_run: bool) -> Result<()> {
    // A conflict ends the attempt; the reader resubmits.
    let (store, credentials): (Arc<dyn ContentStore>, Arc<dyn CredentialSource>) = if dry_run {
        let dry = Credential::new("dry-run").ok_or_else(|| anyhow!("empty dry-run credential"))?;
        (Arc::new(MemoryStore::new()), Arc::new(FixedCredential::new(dry)))
    } else {
        let config = FeedbackConfig::from_env()?;
        if !prompt::is_interactive() {
            bail!("feedback submit needs an interactive terminal to ask for the store token");
        }
        let store = GitHubContentsStore::new(config.location, config.request_timeout)?;
        (Arc::new(store), Arc::new(TerminalPrompt::new("Content store token")))
    };

    let (tx, mut rx) = mpsc::channel(16);
    let progress = tokio::spawn(async move {
        let mut spinner: Option<ProgressBar> = None;
        while let Some(state) = rx.recv().await {
            let Some(message) = state_message(state) else {
                continue;
            };
            match &spinner {
                Some(s) => s.set_message(message),
                None => spinner = Some(output::spinner(message)),
            }
        }
        spinner
    });

    let submitter = Submitter::new(store, credentials).with_events(tx);
    let mut widget = FeedbackWidget::with_text(text);
    let outcome = submitter.submit(&mut widget, &PageId::new(page)).await;
    drop(submitter);
    let spinner = progress.await.ok().flatten();
    let message = widget.message().unwrap_or_default().to_string();

    match outcome {
        SubmissionOutcome::Succeeded(receipt) => {
            match &spinner {
                Some(s) => output::spinner_success(s, &message),
                None => output::success(&message),
            }
            if output::is_json() {
                output::data(
                    "receipt",
                    &json!({
                        "version": receipt.version,
                        "attempts": receipt.attempts,
                        "line": receipt.line.trim_start(),
                        "dry_run": dry_run,
                    }),
                );
            } else {
                output::kv("line", receipt.line.trim_start());
                if dry_run {
                    output::dim("Dry run: nothing was sent.");
                }
            }
            Ok(())
        }
        SubmissionOutcome::Cancelled => {
            output::warning(&message);
            Ok(())
        }
        SubmissionOutcome::Rejected(_) => Err(anyhow!(message)),
        SubmissionOutcome::Failed(_) => {
            if let Some(s) = &spinner {
                s.finish_and_clear();
            }
            Err(anyhow!(message))
        }
    }
}

async fn session_token() -> Result<Credential> {
    if let Some(token) = std::env::var(vars::SESSION_TOKEN).ok().and_then(Credential::new) {
        return Ok(token);
    }
    if !prompt::is_interactive() {
        bail!(
            "{} is not set and there is no terminal to ask for a session token",
            vars::SESSION_TOKEN
        );
    }
    TerminalPrompt::new("Session token")
        .request()
        .await
        .ok_or_else(|| anyhow!("Submission cancelled."))
}

async fn send(relay: &str, page: &str, text: &str) -> Result<()> {
    let session = session_token().await?;
    let client = RelayClient::new(relay, Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS * 3))?;

    let spinner = output::spinner(&format!("Sending feedback to {}...", client.base_url()));
    match client.send(&session, page, text).await {
        Ok(receipt) => {
            output::spinner_success(&spinner, docsite_feedback::submitter::MSG_SUCCEEDED);
            if output::is_json() {
                output::data("receipt", &json!({ "version": receipt.version, "attempts": receipt.attempts }));
            }
            Ok(())
        }
        Err(e) => {
            output::spinner_error(&spinner, "Feedback could not be saved");
            Err(e.into())
        }
    }
}
