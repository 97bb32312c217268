//! Hidden terminal input for tokens.

use std::io::{self, IsTerminal, Write};

use async_trait::async_trait;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use docsite_feedback::{Credential, CredentialSource};
use tracing::warn;
use zeroize::{Zeroize, Zeroizing};

const MAX_TOKEN_LEN: usize = 512;

pub fn is_interactive() -> bool {
    io::stdin().is_terminal() && io::stderr().is_terminal()
}

/// Read a line without echoing it. Esc or Ctrl-C returns an empty string.
pub fn read_hidden(label: &str) -> io::Result<Zeroizing<String>> {
    eprint!("{}: ", label);
    io::stderr().flush()?;

    terminal::enable_raw_mode()?;
    let result = read_masked();
    terminal::disable_raw_mode()?;
    eprintln!();
    result
}

#[derive(Debug, PartialEq, Eq)]
enum Step {
    Pushed,
    Popped,
    Ignored,
    Done,
    Cancelled,
}

/// Apply one key press to the buffer. A cancel wipes what was typed so far.
fn apply_key(key: &mut String, press: KeyEvent) -> Step {
    match press.code {
        KeyCode::Enter => Step::Done,
        KeyCode::Esc => {
            key.zeroize();
            Step::Cancelled
        }
        KeyCode::Char('c') if press.modifiers.contains(KeyModifiers::CONTROL) => {
            key.zeroize();
            Step::Cancelled
        }
        KeyCode::Backspace => match key.pop() {
            Some(_) => Step::Popped,
            None => Step::Ignored,
        },
        KeyCode::Char(c) => {
            key.push(c);
            Step::Pushed
        }
        _ => Step::Ignored,
    }
}

fn read_masked() -> io::Result<Zeroizing<String>> {
    // reserved up front so pushes don't leave copies in reallocated buffers
    let mut key = Zeroizing::new(String::with_capacity(MAX_TOKEN_LEN));
    loop {
        let Event::Key(press) = event::read()? else {
            continue;
        };
        if press.kind != KeyEventKind::Press {
            continue;
        }
        match apply_key(&mut key, press) {
            Step::Done | Step::Cancelled => return Ok(key),
            Step::Pushed => eprint!("*"),
            Step::Popped => eprint!("\x08 \x08"),
            Step::Ignored => continue,
        }
        io::stderr().flush()?;
    }
}

/// Asks for the token on the terminal each time a submission needs one.
pub struct TerminalPrompt {
    label: String,
}

impl TerminalPrompt {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

#[async_trait]
impl CredentialSource for TerminalPrompt {
    async fn request(&self) -> Option<Credential> {
        let label = self.label.clone();
        match tokio::task::spawn_blocking(move || read_hidden(&label)).await {
            Ok(Ok(secret)) => Credential::new(secret.as_str()),
            Ok(Err(e)) => {
                warn!(error = %e, "could not read from the terminal");
                None
            }
            Err(e) => {
                warn!(error = %e, "prompt task failed");
                None
            }
        }
    }
}
