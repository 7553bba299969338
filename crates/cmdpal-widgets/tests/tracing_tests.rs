#![forbid(unsafe_code)]

//! Log event integration tests.
//!
//! Verifies that the palette emits structured events for the state
//! changes an embedder would want in its logs, and warns (rather than
//! failing) when recents storage misbehaves.
//!
//!   cargo test -p cmdpal-widgets --test tracing_tests

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use cmdpal_runtime::{StorageBackend, StorageError, StorageResult, StoredEntry};
use cmdpal_widgets::command_palette::{Command, CommandPalette};

use tracing::field::{Field, Visit};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::{Context, SubscriberExt};

// ============================================================================
// Test Infrastructure
// ============================================================================

/// A captured event: level, message and formatted fields.
#[derive(Debug, Clone)]
struct CapturedEvent {
    level: tracing::Level,
    message: String,
    fields: HashMap<String, String>,
}

#[derive(Default)]
struct FieldVisitor {
    message: String,
    fields: HashMap<String, String>,
}

impl Visit for FieldVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            self.fields.insert(field.name().to_string(), format!("{value:?}"));
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.fields.insert(field.name().to_string(), value.to_string());
    }
}

/// A Layer that records every event it sees.
struct EventCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl<S: tracing::Subscriber> Layer<S> for EventCapture {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);
        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            message: visitor.message,
            fields: visitor.fields,
        });
    }
}

fn capture<R>(f: impl FnOnce() -> R) -> (R, Vec<CapturedEvent>) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::registry().with(EventCapture {
        events: Arc::clone(&events),
    });
    let out = tracing::subscriber::with_default(subscriber, f);
    let events = events.lock().unwrap().clone();
    (out, events)
}

fn find<'a>(events: &'a [CapturedEvent], message: &str) -> Option<&'a CapturedEvent> {
    events.iter().find(|e| e.message == message)
}

struct Offline;

impl StorageBackend for Offline {
    fn name(&self) -> &str {
        "Offline"
    }
    fn load(&self, _key: &str) -> StorageResult<Option<StoredEntry>> {
        Err(StorageError::Unavailable("disk gone".into()))
    }
    fn store(&self, _entry: StoredEntry) -> StorageResult<()> {
        Err(StorageError::Unavailable("disk gone".into()))
    }
    fn remove(&self, _key: &str) -> StorageResult<()> {
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn selection_is_logged_with_command_id() {
    let (_, events) = capture(|| {
        let mut palette = CommandPalette::new(vec![Command::new("save", "Save")], |_| {});
        palette.open();
        palette.select(&Command::new("save", "Save"));
    });

    let selected = find(&events, "command selected").expect("selection event");
    assert_eq!(selected.level, tracing::Level::DEBUG);
    assert_eq!(selected.fields.get("id").map(String::as_str), Some("save"));
    assert!(find(&events, "palette open state changed").is_some());
}

#[test]
fn storage_faults_warn_and_continue() {
    let (palette, events) = capture(|| {
        let mut palette = CommandPalette::new(vec![Command::new("a", "A")], |_| {})
            .with_recents(Arc::new(Offline));
        palette.open();
        palette.select(&Command::new("a", "A"));
        palette
    });

    let warnings: Vec<_> = events
        .iter()
        .filter(|e| e.level == tracing::Level::WARN)
        .map(|e| e.message.as_str())
        .collect();
    assert_eq!(
        warnings,
        vec!["failed to read recent commands", "failed to write recent commands"]
    );
    assert_eq!(palette.recent_items().len(), 1);
}

#[test]
fn disabled_commands_trace_only() {
    let (_, events) = capture(|| {
        let mut palette = CommandPalette::new(Vec::new(), |_| {});
        palette.select(&Command::new("x", "X").with_disabled(true));
    });
    assert!(events.iter().all(|e| e.level != tracing::Level::WARN));
    assert!(find(&events, "ignoring disabled command").is_some());
}
