//! Feedback notes, page identifiers and the log line format.
//!
//! One submission becomes one line of the shared log:
//!
//! ```text
//! \n- [2024-05-01T12:00:00.000Z] (/pages/quick-start.html) Great docs!
//! ```

use chrono::{DateTime, SecondsFormat, Utc};
use docsite_constant::feedback::MAX_FEEDBACK_CHARS;
use reqwest::Url;

use crate::error::ValidationError;

/// A validated note: trimmed, non-empty, at most [`MAX_FEEDBACK_CHARS`] characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackText(String);

impl FeedbackText {
    /// Length is counted in characters, not bytes.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty);
        }
        let len = trimmed.chars().count();
        if len > MAX_FEEDBACK_CHARS {
            return Err(ValidationError::TooLong {
                len,
                max: MAX_FEEDBACK_CHARS,
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The note with every run of line breaks folded into one space.
    pub fn single_line(&self) -> String {
        fold_line_breaks(&self.0)
    }
}

fn fold_line_breaks(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_break = false;
    for c in s.chars() {
        if c == '\n' || c == '\r' {
            if !in_break {
                out.push(' ');
                in_break = true;
            }
        } else {
            out.push(c);
            in_break = false;
        }
    }
    out
}

/// Path plus query of the page a note was left on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageId(String);

impl PageId {
    /// Accepts a full URL (scheme and host are dropped) or a bare path.
    pub fn new(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.starts_with("http://") || raw.starts_with("https://") {
            if let Ok(url) = Url::parse(raw) {
                return Self::from_url(&url);
            }
        }
        if raw.is_empty() {
            Self("/".to_string())
        } else {
            Self(fold_line_breaks(raw))
        }
    }

    pub fn from_url(url: &Url) -> Self {
        match url.query() {
            Some(q) => Self(format!("{}?{}", url.path(), q)),
            None => Self(url.path().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One note, immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackSubmission {
    text: FeedbackText,
    page: PageId,
    timestamp: DateTime<Utc>,
}

impl FeedbackSubmission {
    pub fn new(text: FeedbackText, page: PageId, timestamp: DateTime<Utc>) -> Self {
        Self {
            text,
            page,
            timestamp,
        }
    }

    pub fn text(&self) -> &FeedbackText {
        &self.text
    }

    pub fn page(&self) -> &PageId {
        &self.page
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Leading newline included.
    pub fn to_line(&self) -> String {
        format!(
            "\n- [{}] ({}) {}",
            iso_timestamp(self.timestamp),
            self.page,
            self.text.single_line()
        )
    }

    pub fn commit_message(&self) -> String {
        format!("Feedback on {}", self.page)
    }
}

/// ISO-8601 UTC with millisecond precision, e.g. `2024-05-01T12:00:00.000Z`.
pub fn iso_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// New log content: `base` minus one leading line break, then `line`.
pub fn compose(base: &str, line: &str) -> String {
    let base = base
        .strip_prefix("\r\n")
        .or_else(|| base.strip_prefix('\n'))
        .unwrap_or(base);
    let mut out = String::with_capacity(base.len() + line.len());
    out.push_str(base);
    out.push_str(line);
    out
}
