#![forbid(unsafe_code)]

//! Structured logging tests for [`History`].
//!
//! Verify that engine transitions emit `tracing` events with cursor fields
//! and that failures are logged at `WARN` with the error attached.
//!
//! Run:
//!   cargo test -p rewind --test tracing_events

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use tracing_subscriber::layer::SubscriberExt;

use rewind::{History, HistoryConfig, TargetHandle, TextDelete, TextInsert};

// ============================================================================
// Test Infrastructure
// ============================================================================

/// A captured event with its level, message and fields.
#[derive(Debug, Clone)]
struct CapturedEvent {
    level: tracing::Level,
    message: String,
    fields: HashMap<String, String>,
}

/// A tracing Layer that records every event it sees.
struct EventCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

/// Visitor that extracts event fields as strings.
struct FieldVisitor(Vec<(String, String)>);

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.push((field.name().to_string(), format!("{value:?}")));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for EventCapture {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = FieldVisitor(Vec::new());
        event.record(&mut visitor);

        let fields: HashMap<String, String> = visitor.0.into_iter().collect();
        let message = fields.get("message").cloned().unwrap_or_default();

        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            message,
            fields,
        });
    }
}

/// Run `f` with a capturing subscriber and return the captured events.
fn capture(f: impl FnOnce()) -> Vec<CapturedEvent> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let layer = EventCapture {
        events: Arc::clone(&events),
    };
    let subscriber = tracing_subscriber::registry().with(layer);
    tracing::subscriber::with_default(subscriber, f);
    let captured = events.lock().unwrap().clone();
    captured
}

fn find<'a>(events: &'a [CapturedEvent], message: &str) -> Vec<&'a CapturedEvent> {
    events.iter().filter(|e| e.message == message).collect()
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn execute_undo_redo_emit_debug_events() {
    let events = capture(|| {
        let buffer = TargetHandle::new(String::new());
        let mut history = History::unbounded(buffer);
        history.execute(TextInsert::new(0, "a")).unwrap();
        history.execute(TextInsert::new(1, "b")).unwrap();
        history.undo().unwrap();
        history.redo().unwrap();
    });

    let executes = find(&events, "history execute");
    assert_eq!(executes.len(), 2);
    assert!(executes.iter().all(|e| e.level == tracing::Level::DEBUG));
    assert_eq!(executes[1].fields.get("index").map(String::as_str), Some("1"));
    assert_eq!(executes[1].fields.get("len").map(String::as_str), Some("2"));

    let undos = find(&events, "history undo");
    assert_eq!(undos.len(), 1);
    assert_eq!(undos[0].fields.get("index").map(String::as_str), Some("Some(0)"));

    let redos = find(&events, "history redo");
    assert_eq!(redos.len(), 1);
    assert_eq!(redos[0].fields.get("index").map(String::as_str), Some("1"));
}

#[test]
fn failed_execute_logs_warning_with_error() {
    let events = capture(|| {
        let buffer = TargetHandle::new(String::from("abc"));
        let mut history = History::unbounded(buffer);
        assert!(history.execute(TextDelete::new(0, "xyz")).is_err());
    });

    let warnings = find(&events, "history execute failed");
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].level, tracing::Level::WARN);
    assert!(warnings[0].fields["error"].contains("state drift"));
    assert_eq!(warnings[0].fields["operation"], "Delete text");
    assert!(find(&events, "history execute").is_empty());
}

#[test]
fn failed_undo_logs_warning() {
    let events = capture(|| {
        let buffer = TargetHandle::new(String::new());
        let mut history = History::unbounded(buffer.clone());
        history.execute(TextInsert::new(0, "abc")).unwrap();
        buffer.replace(String::new());
        assert!(history.undo().is_err());
    });

    let warnings = find(&events, "history undo failed");
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].fields.get("index").map(String::as_str), Some("0"));
    assert!(find(&events, "history undo").is_empty());
}

#[test]
fn truncation_and_eviction_emit_trace_events() {
    let events = capture(|| {
        let buffer = TargetHandle::new(String::new());
        let config = HistoryConfig::new().with_max_history(NonZeroUsize::new(2).unwrap());
        let mut history = History::new(buffer, config);
        history.execute(TextInsert::new(0, "a")).unwrap();
        history.execute(TextInsert::new(1, "b")).unwrap();
        history.execute(TextInsert::new(2, "c")).unwrap();
        history.undo().unwrap();
        history.execute(TextInsert::new(2, "d")).unwrap();
    });

    let evictions = find(&events, "history evicted oldest");
    assert_eq!(evictions.len(), 1);
    assert_eq!(evictions[0].level, tracing::Level::TRACE);
    assert_eq!(evictions[0].fields["evicted"], "1");
    assert_eq!(evictions[0].fields["capacity"], "2");

    let truncations = find(&events, "history truncated redo tail");
    assert_eq!(truncations.len(), 1);
    assert_eq!(truncations[0].fields["dropped"], "1");
}
