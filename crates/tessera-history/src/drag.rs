#![forbid(unsafe_code)]

//! Gesture coalescing.
//!
//! A drag mutates the context many times between pointer-down and
//! pointer-up. [`DragSession`] captures a snapshot at
//! [`begin_drag`](DragSession::begin_drag), lets the tool mutate the
//! context freely, and at [`end_drag`](DragSession::end_drag) pushes a
//! single record, or none if the gesture left no net change according to
//! [`EditContext::is_different`].
//!
//! ```text
//! Idle --begin_drag--> Active { start }
//! Active --end_drag--> Idle        (push if start != end)
//! Active --cancel_drag--> Idle     (restore start, no push)
//! ```

use std::fmt;

use tracing::debug;

use crate::context::EditContext;
use crate::record::{Change, RecordMeta};
use crate::stack::HistoryStack;

type Builder<C> =
    Box<dyn Fn(&<C as EditContext>::Snapshot, &<C as EditContext>::Snapshot) -> Change<C>>;

enum DragState<S> {
    Idle,
    Active { start: S },
}

/// Drag helper bound to one stack.
pub struct DragSession<C: EditContext> {
    stack: HistoryStack<C>,
    state: DragState<C::Snapshot>,
    builder: Option<Builder<C>>,
}

impl<C: EditContext> fmt::Debug for DragSession<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DragSession")
            .field("stack", &self.stack.id())
            .field("active", &self.is_active())
            .field("custom_builder", &self.builder.is_some())
            .finish()
    }
}

impl<C: EditContext> DragSession<C> {
    /// Idle session recording snapshot changes into `stack`.
    #[must_use]
    pub fn new(stack: &HistoryStack<C>) -> Self {
        Self {
            stack: stack.clone(),
            state: DragState::Idle,
            builder: None,
        }
    }

    /// Build records with `builder` instead of [`Change::Snapshot`].
    #[must_use]
    pub fn with_builder(
        mut self,
        builder: impl Fn(&C::Snapshot, &C::Snapshot) -> Change<C> + 'static,
    ) -> Self {
        self.builder = Some(Box::new(builder));
        self
    }

    /// The stack records land in.
    #[must_use]
    pub fn stack(&self) -> &HistoryStack<C> {
        &self.stack
    }

    /// Whether a gesture is in progress.
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self.state, DragState::Active { .. })
    }

    /// Capture the start snapshot. Returns `false` if already active; the
    /// original start is kept.
    pub fn begin_drag(&mut self) -> bool {
        if self.is_active() {
            debug!(target: "tessera.drag", stack = %self.stack.id(), "drag already active");
            return false;
        }
        let start = self.stack.context().borrow().snapshot();
        self.state = DragState::Active { start };
        debug!(target: "tessera.drag", stack = %self.stack.id(), "drag started");
        true
    }

    /// Finish the gesture, pushing a record if the context changed.
    ///
    /// Always returns to idle. `None` if idle or if nothing changed.
    pub fn end_drag(&mut self, description: impl Into<String>) -> Option<RecordMeta> {
        let DragState::Active { start } = std::mem::replace(&mut self.state, DragState::Idle)
        else {
            return None;
        };
        let end = self.stack.context().borrow().snapshot();
        self.commit(&start, &end, description)
    }

    /// Abandon the gesture and put the start snapshot back. Returns `false`
    /// if idle.
    pub fn cancel_drag(&mut self) -> bool {
        let DragState::Active { start } = std::mem::replace(&mut self.state, DragState::Idle)
        else {
            return false;
        };
        self.stack.context().borrow_mut().restore(&start);
        debug!(target: "tessera.drag", stack = %self.stack.id(), "drag cancelled");
        true
    }

    /// Record a discrete change the caller already applied, suppressing
    /// no-ops. Independent of the drag state.
    pub fn record_immediate(
        &self,
        before: C::Snapshot,
        after: C::Snapshot,
        description: impl Into<String>,
    ) -> Option<RecordMeta> {
        self.commit(&before, &after, description)
    }

    fn commit(
        &self,
        before: &C::Snapshot,
        after: &C::Snapshot,
        description: impl Into<String>,
    ) -> Option<RecordMeta> {
        if !C::is_different(before, after) {
            debug!(target: "tessera.drag", stack = %self.stack.id(), "no net change; nothing recorded");
            return None;
        }
        let change = match &self.builder {
            Some(build) => build(before, after),
            None => Change::snapshot(before.clone(), after.clone()),
        };
        let meta = self.stack.record(change, description);
        debug!(
            target: "tessera.drag",
            stack = %self.stack.id(),
            record = %meta.id,
            "drag recorded"
        );
        Some(meta)
    }
}
