use std::sync::{Arc, Mutex};
use std::time::Duration;

use docsite_observability::{LogSink, sink_layer};
use tokio::sync::mpsc;
use tracing_subscriber::layer::SubscriberExt;

use super::{CountingCredential, RacingStore, STAMP, cred, fixed_clock};
use crate::config::AppendPolicy;
use crate::credential::{Declined, FixedCredential};
use crate::error::{FeedbackError, StoreError, ValidationError};
use crate::store::MemoryStore;
use crate::submission::PageId;
use crate::submitter::{
    FeedbackWidget, MSG_CANCELLED, MSG_EMPTY, MSG_SUCCEEDED, SubmissionOutcome, SubmissionState,
    Submitter,
};

fn quick_start() -> PageId {
    PageId::new("/pages/quick-start.html")
}

fn line(page: &str, text: &str) -> String {
    format!("\n- [{}] ({}) {}", STAMP, page, text)
}

fn fast_retries() -> AppendPolicy {
    AppendPolicy::default().with_backoff_base(Duration::from_millis(1))
}

fn submitter(store: Arc<dyn crate::store::ContentStore>) -> Submitter {
    Submitter::new(store, Arc::new(FixedCredential::new(cred("ghp_test"))))
        .with_clock(fixed_clock())
        .with_policy(fast_retries())
}

#[tokio::test]
async fn test_first_note_creates_log() {
    let store = Arc::new(MemoryStore::new());
    let mut widget = FeedbackWidget::with_text("Great docs!");

    let outcome = submitter(store.clone()).submit(&mut widget, &quick_start()).await;

    let SubmissionOutcome::Succeeded(receipt) = outcome else {
        panic!("expected success, got {:?}", outcome);
    };
    assert_eq!(receipt.attempts, 1);
    let writes = store.writes();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].version, None);
    assert_eq!(writes[0].message, "Feedback on /pages/quick-start.html");
    assert_eq!(
        store.content().unwrap(),
        line("/pages/quick-start.html", "Great docs!")
    );
    assert_eq!(widget.text(), "");
    assert_eq!(widget.state(), SubmissionState::Succeeded);
    assert_eq!(widget.message(), Some(MSG_SUCCEEDED));
}

#[tokio::test]
async fn test_append_sends_token_from_fetch() {
    let store = Arc::new(MemoryStore::with_content("# Feedback\n"));
    let token = store.version().unwrap();
    let mut widget = FeedbackWidget::with_text("Missing a section on proxies");

    let outcome = submitter(store.clone())
        .submit(&mut widget, &PageId::new("https://docs.example.com/pages/java.html"))
        .await;

    assert!(outcome.is_success());
    let writes = store.writes();
    assert_eq!(writes[0].version, Some(token));
    assert_eq!(
        store.content().unwrap(),
        format!("# Feedback\n{}", line("/pages/java.html", "Missing a section on proxies"))
    );
}

#[tokio::test]
async fn test_leading_newline_of_log_is_dropped() {
    let existing = line("/a.html", "first");
    let store = Arc::new(MemoryStore::with_content(existing));
    let mut widget = FeedbackWidget::with_text("second");

    submitter(store.clone()).submit(&mut widget, &PageId::new("/b.html")).await;

    assert_eq!(
        store.content().unwrap(),
        format!("- [{}] (/a.html) first{}", STAMP, line("/b.html", "second"))
    );
}

#[tokio::test]
async fn test_read_failure_never_writes() {
    let store = Arc::new(MemoryStore::with_content("base"));
    store.fail_next_fetch(StoreError::Transport("connection reset".to_string()));
    let mut widget = FeedbackWidget::with_text("Great docs!");

    let outcome = submitter(store.clone()).submit(&mut widget, &quick_start()).await;

    assert!(matches!(
        outcome,
        SubmissionOutcome::Failed(FeedbackError::Read(StoreError::Transport(_)))
    ));
    assert!(store.writes().is_empty());
    assert_eq!(store.content().as_deref(), Some("base"));
    assert_eq!(widget.text(), "Great docs!");
    assert_eq!(widget.state(), SubmissionState::Failed);
    assert!(widget.message().unwrap().contains("connection reset"));
}

#[tokio::test]
async fn test_default_policy_does_not_retry_conflicts() {
    let inner = Arc::new(MemoryStore::with_content("base"));
    let racing = Arc::new(RacingStore::new(inner.clone(), &["\n- someone else"]));
    let submitter = Submitter::new(racing, Arc::new(FixedCredential::new(cred("ghp_test"))));
    let mut widget = FeedbackWidget::with_text("mine");

    let outcome = submitter.submit(&mut widget, &quick_start()).await;

    assert!(matches!(
        outcome,
        SubmissionOutcome::Failed(FeedbackError::Write(StoreError::Conflict { .. }))
    ));
    assert_eq!(widget.state(), SubmissionState::Failed);
    assert_eq!(inner.fetch_count(), 1);
    assert_eq!(inner.writes().len(), 1);
}

#[tokio::test]
async fn test_stale_token_without_retry_fails_then_resubmit_refetches() {
    let inner = Arc::new(MemoryStore::with_content("base"));
    let racing = Arc::new(RacingStore::new(inner.clone(), &["\n- someone else"]));
    let mut widget = FeedbackWidget::with_text("mine");
    let submitter = submitter(racing).with_policy(AppendPolicy::no_retry());

    let outcome = submitter.submit(&mut widget, &quick_start()).await;

    assert!(matches!(
        outcome,
        SubmissionOutcome::Failed(FeedbackError::Write(StoreError::Conflict { .. }))
    ));
    assert_eq!(inner.content().as_deref(), Some("base\n- someone else"));
    assert_eq!(widget.text(), "mine");
    let concurrent_version = inner.version().unwrap();

    let outcome = submitter.submit(&mut widget, &quick_start()).await;

    assert!(outcome.is_success());
    assert_eq!(inner.fetch_count(), 2);
    let writes = inner.writes();
    assert_eq!(writes.len(), 2);
    assert_eq!(writes[1].version, Some(concurrent_version));
    assert_eq!(
        inner.content().unwrap(),
        format!("base\n- someone else{}", line("/pages/quick-start.html", "mine"))
    );
}

#[tokio::test]
async fn test_conflict_restarts_full_cycle() {
    let inner = Arc::new(MemoryStore::with_content("base"));
    let racing = Arc::new(RacingStore::new(inner.clone(), &["\n- other"]));
    let mut widget = FeedbackWidget::with_text("mine");

    let outcome = submitter(racing).submit(&mut widget, &quick_start()).await;

    let SubmissionOutcome::Succeeded(receipt) = outcome else {
        panic!("expected success, got {:?}", outcome);
    };
    assert_eq!(receipt.attempts, 2);
    assert_eq!(inner.fetch_count(), 2);
    let writes = inner.writes();
    assert_eq!(writes.len(), 2);
    assert_ne!(writes[0].version, writes[1].version);
    assert!(writes[1].content.starts_with("base\n- other"));
    assert!(inner.content().unwrap().ends_with(&line("/pages/quick-start.html", "mine")));
}

#[tokio::test]
async fn test_conflict_retries_are_bounded() {
    let inner = Arc::new(MemoryStore::with_content("base"));
    let racing = Arc::new(RacingStore::new(inner.clone(), &["\n- a", "\n- b", "\n- c", "\n- d"]));
    let mut widget = FeedbackWidget::with_text("mine");

    let outcome = submitter(racing)
        .with_policy(fast_retries().with_retries(2))
        .submit(&mut widget, &quick_start())
        .await;

    assert!(matches!(
        outcome,
        SubmissionOutcome::Failed(FeedbackError::Write(StoreError::Conflict { .. }))
    ));
    assert_eq!(inner.writes().len(), 3);
    assert_eq!(inner.fetch_count(), 3);
    assert_eq!(inner.content().as_deref(), Some("base\n- a\n- b\n- c"));
}

#[tokio::test]
async fn test_sequential_notes_keep_both() {
    let store = Arc::new(MemoryStore::with_content("log"));
    let submitter = submitter(store.clone());

    let mut first = FeedbackWidget::with_text("A");
    let mut second = FeedbackWidget::with_text("B");
    assert!(submitter.submit(&mut first, &PageId::new("/one")).await.is_success());
    assert!(submitter.submit(&mut second, &PageId::new("/two")).await.is_success());

    assert_eq!(
        store.content().unwrap(),
        format!("log{}{}", line("/one", "A"), line("/two", "B"))
    );
}

#[tokio::test]
async fn test_invalid_note_never_reaches_store() {
    let store = Arc::new(MemoryStore::new());
    let credentials = Arc::new(CountingCredential::new("ghp_test"));
    let submitter = Submitter::new(store.clone(), credentials.clone());

    let mut blank = FeedbackWidget::with_text("   \n\t ");
    let outcome = submitter.submit(&mut blank, &quick_start()).await;
    assert!(matches!(outcome, SubmissionOutcome::Rejected(ValidationError::Empty)));
    assert_eq!(blank.message(), Some(MSG_EMPTY));
    assert_eq!(blank.state(), SubmissionState::Idle);

    let mut long = FeedbackWidget::with_text("é".repeat(201));
    let outcome = submitter.submit(&mut long, &quick_start()).await;
    assert!(matches!(
        outcome,
        SubmissionOutcome::Rejected(ValidationError::TooLong { len: 201, max: 200 })
    ));
    assert_eq!(long.text().chars().count(), 201);

    assert_eq!(credentials.count(), 0);
    assert_eq!(store.fetch_count(), 0);
    assert!(store.writes().is_empty());
}

#[tokio::test]
async fn test_exactly_max_chars_is_accepted() {
    let store = Arc::new(MemoryStore::new());
    let mut widget = FeedbackWidget::with_text(format!("  {}  ", "x".repeat(200)));

    let outcome = submitter(store.clone()).submit(&mut widget, &quick_start()).await;

    assert!(outcome.is_success());
}

#[tokio::test]
async fn test_declined_credential_cancels() {
    let store = Arc::new(MemoryStore::new());
    let mut widget = FeedbackWidget::with_text("Great docs!");

    let outcome = Submitter::new(store.clone(), Arc::new(Declined))
        .submit(&mut widget, &quick_start())
        .await;

    assert!(matches!(outcome, SubmissionOutcome::Cancelled));
    assert_eq!(store.fetch_count(), 0);
    assert_eq!(widget.text(), "Great docs!");
    assert_eq!(widget.state(), SubmissionState::Idle);
    assert_eq!(widget.message(), Some(MSG_CANCELLED));
}

#[tokio::test]
async fn test_rejected_credential_surfaces_status() {
    let store = Arc::new(MemoryStore::new().require_credential("right"));
    let mut widget = FeedbackWidget::with_text("Great docs!");

    let outcome = Submitter::new(store.clone(), Arc::new(FixedCredential::new(cred("wrong"))))
        .submit(&mut widget, &quick_start())
        .await;

    match outcome {
        SubmissionOutcome::Failed(err) => {
            assert!(matches!(
                err.store_error(),
                Some(StoreError::Unauthorized { status: 401, .. })
            ));
        }
        other => panic!("expected failure, got {:?}", other),
    }
    assert!(widget.message().unwrap().contains("401"));
}

#[tokio::test]
async fn test_embedded_newlines_are_folded() {
    let store = Arc::new(MemoryStore::new());
    let mut widget = FeedbackWidget::with_text("Line one\r\n\r\nLine two\nLine three");

    submitter(store.clone()).submit(&mut widget, &quick_start()).await;

    assert_eq!(
        store.content().unwrap(),
        line("/pages/quick-start.html", "Line one Line two Line three")
    );
}

#[tokio::test]
async fn test_state_transitions_are_published() {
    let store = Arc::new(MemoryStore::new());
    let (tx, mut rx) = mpsc::channel(32);
    let mut widget = FeedbackWidget::with_text("Great docs!");

    submitter(store)
        .with_events(tx)
        .submit(&mut widget, &quick_start())
        .await;

    let mut seen = Vec::new();
    while let Ok(state) = rx.try_recv() {
        seen.push(state);
    }
    assert_eq!(
        seen,
        vec![
            SubmissionState::Validating,
            SubmissionState::AwaitingCredential,
            SubmissionState::FetchingCurrent,
            SubmissionState::Composing,
            SubmissionState::Writing,
            SubmissionState::Succeeded,
        ]
    );
}

#[tokio::test]
async fn test_credential_never_logged() {
    let lines = Arc::new(Mutex::new(Vec::<String>::new()));
    let captured = lines.clone();
    let sink: LogSink = Arc::new(move |line| captured.lock().unwrap().push(line));
    let subscriber = tracing_subscriber::registry().with(sink_layer(Some(sink)));
    let _guard = tracing::subscriber::set_default(subscriber);

    let secret = "ghp_Sup3rS3cretValue";
    let inner = Arc::new(MemoryStore::with_content("base").require_credential(secret));
    let racing = Arc::new(RacingStore::new(inner.clone(), &["\n- other"]));
    let submitter = Submitter::new(racing, Arc::new(FixedCredential::new(cred(secret))))
        .with_policy(fast_retries());

    let mut ok = FeedbackWidget::with_text("works");
    assert!(submitter.submit(&mut ok, &quick_start()).await.is_success());
    inner.fail_next_write(StoreError::Status {
        status: 500,
        message: "boom".to_string(),
    });
    let mut failing = FeedbackWidget::with_text("fails");
    assert!(!submitter.submit(&mut failing, &quick_start()).await.is_success());

    let lines = lines.lock().unwrap();
    assert!(!lines.is_empty());
    assert!(lines.iter().all(|l| !l.contains(secret)), "{:#?}", lines);
    assert!(lines.iter().any(|l| l.contains("feedback appended")));
}

/// Collects every value recorded into the `feedback.state` span field.
struct StateRecorder(Arc<Mutex<Vec<String>>>);

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for StateRecorder {
    fn on_record(
        &self,
        _id: &tracing::span::Id,
        values: &tracing::span::Record<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        struct Visitor<'a>(&'a Mutex<Vec<String>>);
        impl tracing::field::Visit for Visitor<'_> {
            fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
                if field.name() == "feedback.state" {
                    self.0.lock().unwrap().push(format!("{:?}", value));
                }
            }
        }
        values.record(&mut Visitor(&self.0));
    }
}

#[tokio::test]
async fn test_span_records_each_state() {
    let states = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::registry().with(StateRecorder(states.clone()));
    let _guard = tracing::subscriber::set_default(subscriber);

    let store = Arc::new(MemoryStore::with_content("base"));
    let mut widget = FeedbackWidget::with_text("traced");
    assert!(submitter(store).submit(&mut widget, &quick_start()).await.is_success());

    assert_eq!(
        *states.lock().unwrap(),
        vec!["FetchingCurrent", "Composing", "Writing"]
    );
}
