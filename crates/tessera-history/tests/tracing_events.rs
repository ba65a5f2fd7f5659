#![forbid(unsafe_code)]

//! Structured logging contract.
//!
//! Navigation logs under `tessera.history`, resolution runs inside a
//! `history.resolve` span under `tessera.group`, and the drag helper logs
//! under `tessera.drag`.
//!
//! Run:
//!   cargo test -p tessera-history --test tracing_events

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tessera_history::{
    Change, DragSession, EditContext, HistoryConfig, HistoryManager, TimestampOnly, shared,
};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;

// ============================================================================
// Test Infrastructure
// ============================================================================

#[derive(Debug, Clone)]
struct CapturedSpan {
    name: String,
    target: String,
    fields: HashMap<String, String>,
}

#[derive(Debug, Clone)]
struct CapturedEvent {
    level: tracing::Level,
    target: String,
    message: String,
    fields: HashMap<String, String>,
    parent_span_name: Option<String>,
}

#[derive(Default)]
struct Capture {
    spans: Arc<Mutex<Vec<CapturedSpan>>>,
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

struct CaptureHandle {
    spans: Arc<Mutex<Vec<CapturedSpan>>>,
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl CaptureHandle {
    fn spans(&self) -> Vec<CapturedSpan> {
        self.spans.lock().unwrap().clone()
    }

    fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().unwrap().clone()
    }

    fn messages(&self, target: &str) -> Vec<String> {
        self.events()
            .into_iter()
            .filter(|e| e.target == target)
            .map(|e| e.message)
            .collect()
    }
}

struct FieldVisitor(Vec<(String, String)>);

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.push((field.name().to_string(), format!("{value:?}")));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
}

impl<S> tracing_subscriber::Layer<S> for Capture
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(
        &self,
        attrs: &tracing::span::Attributes<'_>,
        _id: &tracing::span::Id,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let mut visitor = FieldVisitor(Vec::new());
        attrs.record(&mut visitor);
        self.spans.lock().unwrap().push(CapturedSpan {
            name: attrs.metadata().name().to_string(),
            target: attrs.metadata().target().to_string(),
            fields: visitor.0.into_iter().collect(),
        });
    }

    fn on_event(&self, event: &tracing::Event<'_>, ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = FieldVisitor(Vec::new());
        event.record(&mut visitor);
        let fields: HashMap<String, String> = visitor.0.into_iter().collect();
        let message = fields.get("message").cloned().unwrap_or_default();
        let parent_span_name = ctx
            .current_span()
            .id()
            .and_then(|id| ctx.span(id))
            .map(|span| span.name().to_string());

        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            target: event.metadata().target().to_string(),
            message,
            fields,
            parent_span_name,
        });
    }
}

fn with_captured<F: FnOnce()>(f: F) -> CaptureHandle {
    let layer = Capture::default();
    let handle = CaptureHandle {
        spans: Arc::clone(&layer.spans),
        events: Arc::clone(&layer.events),
    };
    let subscriber = tracing_subscriber::registry()
        .with(tracing_subscriber::filter::LevelFilter::TRACE)
        .with(layer);
    tracing::subscriber::with_default(subscriber, f);
    handle
}

#[derive(Debug)]
struct Opacity(u8);

impl EditContext for Opacity {
    type Snapshot = u8;

    fn snapshot(&self) -> u8 {
        self.0
    }

    fn restore(&mut self, snapshot: &u8) {
        self.0 = *snapshot;
    }

    fn is_different(a: &u8, b: &u8) -> bool {
        a != b
    }
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn push_and_navigation_events_carry_fields() {
    let handle = with_captured(|| {
        let manager = HistoryManager::new(HistoryConfig::default());
        let stack = manager.new_stack("Opacity", "Opacity", shared(Opacity(255)));
        manager.add_child(&stack).unwrap();
        stack.execute(Change::snapshot(255, 128), "Fade");
        manager.undo();
        manager.redo();
    });

    assert_eq!(
        handle.messages("tessera.history"),
        vec![
            "record pushed",
            "record applied",
            "global undo",
            "record applied",
            "global redo",
        ]
    );

    let applied: Vec<_> = handle
        .events()
        .into_iter()
        .filter(|e| e.message == "record applied")
        .collect();
    assert_eq!(applied[0].level, tracing::Level::DEBUG);
    assert_eq!(applied[0].fields["stack"], "Opacity");
    assert_eq!(applied[0].fields["direction"], "undo");
    assert_eq!(applied[0].fields["description"], "Fade");
    assert_eq!(applied[0].fields["cursor"], "0");
    assert_eq!(applied[1].fields["direction"], "redo");
    assert_eq!(applied[1].fields["timestamp"], "1");
}

#[test]
fn resolution_runs_inside_resolve_span() {
    let handle = with_captured(|| {
        let manager = HistoryManager::default();
        manager.set_root_policy(TimestampOnly);
        let stack = manager.new_stack("Opacity", "Opacity", shared(Opacity(0)));
        manager.add_child(&stack).unwrap();
        stack.execute(Change::snapshot(0, 1), "Raise");
        manager.undo();
    });

    let resolve: Vec<_> = handle
        .spans()
        .into_iter()
        .filter(|s| s.name == "history.resolve")
        .collect();
    assert_eq!(resolve.len(), 1);
    assert_eq!(resolve[0].target, "tessera.group");
    assert_eq!(resolve[0].fields["group"], "Root");
    assert_eq!(resolve[0].fields["direction"], "undo");

    let selected: Vec<_> = handle
        .events()
        .into_iter()
        .filter(|e| e.message == "candidate selected")
        .collect();
    assert_eq!(selected.len(), 1);
    assert_eq!(
        selected[0].parent_span_name.as_deref(),
        Some("history.resolve")
    );
    assert_eq!(selected[0].fields["policy"], "TimestampOnly");
    assert_eq!(selected[0].fields["stack"], "Opacity");
}

#[test]
fn drag_events_use_drag_target() {
    let handle = with_captured(|| {
        let manager = HistoryManager::default();
        let stack = manager.new_stack("Opacity", "Opacity", shared(Opacity(0)));
        let mut drag = DragSession::new(&stack);
        drag.begin_drag();
        drag.end_drag("noop");
        drag.begin_drag();
        stack.context().borrow_mut().0 = 9;
        drag.end_drag("Raise");
    });

    assert_eq!(
        handle.messages("tessera.drag"),
        vec![
            "drag started",
            "no net change; nothing recorded",
            "drag started",
            "drag recorded",
        ]
    );
}

#[test]
fn tree_changes_are_logged() {
    let handle = with_captured(|| {
        let manager = HistoryManager::default();
        manager.add_child(manager.new_group("Tools", "Tools")).unwrap();
        manager.detach("Tools").unwrap();
    });
    assert_eq!(
        handle.messages("tessera.group"),
        vec!["child attached", "child detached"]
    );
}
