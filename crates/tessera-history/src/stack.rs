#![forbid(unsafe_code)]

//! Linear undo/redo log bound to one context.
//!
//! # Invariants
//!
//! 1. `0 <= cursor <= len(entries)` after every operation.
//! 2. `can_undo() == (cursor > 0)` and `can_redo() == (cursor < len)`.
//! 3. A push while `cursor < len` discards every entry at or after the
//!    cursor before appending (branch-discard).
//! 4. Timestamps within one stack strictly increase in entry order.
//!
//! # State Machine
//!
//! `(cursor, len)` fully describes a stack. Transitions:
//!
//! ```text
//! push   (c, n) -> (c + 1, c + 1)
//! undo   (c, n) -> (c - 1, n)        requires c > 0
//! redo   (c, n) -> (c + 1, n)        requires c < n
//! clear  (c, n) -> (0, 0)
//! ```
//!
//! With a configured `max_depth`, an overflow evicts applied entries from
//! the front and shifts the cursor down by the evicted count. If the limit
//! is lowered while redo entries exist, the remaining excess is cut from
//! the redo tail.

use std::any::Any;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use tracing::debug;

use crate::clock::{LogicalClock, Timestamp};
use crate::context::{EditContext, SharedContext};
use crate::listener::{ListenerId, ListenerSet, NavigationInfo};
use crate::record::{Change, Direction, Record, RecordMeta};

/// Object-safe view of a stack, used by groups to hold stacks over
/// different context types side by side.
pub trait StackNode {
    /// Stable identifier.
    fn id(&self) -> &str;

    /// Name shown in history panels.
    fn display_name(&self) -> &str;

    /// Whether a record is available to undo.
    fn can_undo(&self) -> bool;

    /// Whether a record is available to redo.
    fn can_redo(&self) -> bool;

    /// Metadata of the record the next navigation in `direction` applies.
    fn peek(&self, direction: Direction) -> Option<RecordMeta>;

    /// Navigate one step. Returns `false` at a boundary.
    fn navigate(&self, direction: Direction) -> bool;

    /// Drop all history without touching the context.
    fn clear(&self);

    /// One-line diagnostic summary.
    fn debug_summary(&self) -> String;

    /// Downcast to the concrete stack handle.
    fn as_any(&self) -> &dyn Any;
}

struct OpenGroup {
    start: usize,
    description: String,
}

struct StackState<C: EditContext> {
    entries: VecDeque<Record<C>>,
    cursor: usize,
    open_group: Option<OpenGroup>,
    /// Cursor position of the last `mark_clean`; `None` once unreachable.
    clean_cursor: Option<usize>,
    serial: u64,
    /// Maximum number of entries; 0 means unlimited.
    max_depth: usize,
    listeners: ListenerSet<NavigationInfo>,
}

impl<C: EditContext> StackState<C> {
    fn enforce_depth(&mut self) -> usize {
        if self.max_depth == 0 {
            return 0;
        }
        let excess = self.entries.len().saturating_sub(self.max_depth);
        if excess == 0 {
            return 0;
        }
        // Only applied entries leave from the front; the rest of the excess
        // comes off the redo tail so replay stays contiguous.
        let front = excess.min(self.cursor);
        self.entries.drain(..front);
        self.cursor -= front;
        self.entries.truncate(self.max_depth);
        let len = self.entries.len();

        self.clean_cursor = self
            .clean_cursor
            .and_then(|c| c.checked_sub(front))
            .filter(|&c| c <= len);
        if let Some(group) = self.open_group.as_mut() {
            group.start = group.start.saturating_sub(front).min(self.cursor);
        }
        excess
    }

    fn next_serial(&mut self, stack_id: &str) -> String {
        self.serial += 1;
        format!("{stack_id}#{}", self.serial)
    }

    fn peek(&self, direction: Direction) -> Option<&Record<C>> {
        match direction {
            Direction::Undo => self.cursor.checked_sub(1).and_then(|i| self.entries.get(i)),
            Direction::Redo => self.entries.get(self.cursor),
        }
    }
}

struct StackShared<C: EditContext> {
    id: String,
    display_name: String,
    context: SharedContext<C>,
    clock: LogicalClock,
    state: RefCell<StackState<C>>,
}

/// Undo/redo log over a [`SharedContext<C>`].
///
/// `HistoryStack` is a handle: clones share the same log, so the owning
/// tool keeps authoring into it after a clone is attached to a
/// [`HistoryGroup`](crate::HistoryGroup).
///
/// Records are pushed after the caller has already mutated the context
/// (the drag pattern). Use [`execute`](Self::execute) to apply and push in
/// one call.
///
/// # Example
///
/// ```
/// use tessera_history::{Change, EditContext, HistoryStack, LogicalClock, shared};
///
/// #[derive(Debug, Clone, Copy, PartialEq)]
/// struct Zoom(f32);
///
/// impl EditContext for Zoom {
///     type Snapshot = Zoom;
///     fn snapshot(&self) -> Zoom {
///         *self
///     }
///     fn restore(&mut self, snapshot: &Zoom) {
///         *self = *snapshot;
///     }
///     fn is_different(a: &Zoom, b: &Zoom) -> bool {
///         a != b
///     }
/// }
///
/// let clock = LogicalClock::new();
/// let stack = HistoryStack::new("Camera", "Camera", shared(Zoom(1.0)), &clock);
/// stack.execute(Change::snapshot(Zoom(1.0), Zoom(2.0)), "Zoom in");
/// assert_eq!(*stack.context().borrow(), Zoom(2.0));
///
/// assert!(stack.undo());
/// assert_eq!(*stack.context().borrow(), Zoom(1.0));
/// assert!(stack.can_redo());
/// ```
pub struct HistoryStack<C: EditContext> {
    inner: Rc<StackShared<C>>,
}

impl<C: EditContext> Clone for HistoryStack<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<C: EditContext> fmt::Debug for HistoryStack<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("HistoryStack")
            .field("id", &self.inner.id)
            .field("len", &state.entries.len())
            .field("cursor", &state.cursor)
            .field("group_open", &state.open_group.is_some())
            .field("max_depth", &state.max_depth)
            .field("listeners", &state.listeners.len())
            .finish()
    }
}

impl<C: EditContext> HistoryStack<C> {
    /// Create an empty stack stamping records from `clock`.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        context: SharedContext<C>,
        clock: &LogicalClock,
    ) -> Self {
        Self {
            inner: Rc::new(StackShared {
                id: id.into(),
                display_name: display_name.into(),
                context,
                clock: clock.clone(),
                state: RefCell::new(StackState {
                    entries: VecDeque::new(),
                    cursor: 0,
                    open_group: None,
                    clean_cursor: Some(0),
                    serial: 0,
                    max_depth: 0,
                    listeners: ListenerSet::new(),
                }),
            }),
        }
    }

    /// Create a stack with a private clock. Its timestamps are not
    /// comparable with other stacks.
    #[must_use]
    pub fn standalone(
        id: impl Into<String>,
        display_name: impl Into<String>,
        context: SharedContext<C>,
    ) -> Self {
        Self::new(id, display_name, context, &LogicalClock::new())
    }

    /// Limit the number of retained entries (0 = unlimited).
    #[must_use]
    pub fn with_max_depth(self, max_depth: usize) -> Self {
        {
            let mut state = self.inner.state.borrow_mut();
            state.max_depth = max_depth;
            state.enforce_depth();
        }
        self
    }

    /// Stable identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    /// Name shown in history panels.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.inner.display_name
    }

    /// The edited context.
    #[must_use]
    pub fn context(&self) -> &SharedContext<C> {
        &self.inner.context
    }

    /// The clock stamping this stack's records.
    #[must_use]
    pub fn clock(&self) -> &LogicalClock {
        &self.inner.clock
    }

    /// Whether two handles refer to the same stack.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    // ========================================================================
    // Authoring
    // ========================================================================

    /// Push an already-applied record, discarding any redo branch.
    ///
    /// The record is stamped with the next id and logical timestamp.
    pub fn push(&self, mut record: Record<C>) -> RecordMeta {
        let mut state = self.inner.state.borrow_mut();
        let cursor = state.cursor;
        let discarded = state.entries.len() - cursor;
        state.entries.truncate(cursor);
        if state.clean_cursor.is_some_and(|clean| clean > cursor) {
            state.clean_cursor = None;
        }

        record.meta.id = state.next_serial(&self.inner.id);
        record.meta.timestamp = self.inner.clock.tick();
        let meta = record.meta.clone();
        state.entries.push_back(record);
        state.cursor = state.entries.len();
        let evicted = state.enforce_depth();

        debug!(
            target: "tessera.history",
            stack = %self.inner.id,
            record = %meta.id,
            timestamp = meta.timestamp.raw(),
            description = %meta.description,
            discarded,
            evicted,
            len = state.entries.len(),
            "record pushed"
        );
        meta
    }

    /// Push an already-applied change with a description.
    pub fn record(&self, change: Change<C>, description: impl Into<String>) -> RecordMeta {
        self.push(Record::new(change, description))
    }

    /// Apply a change to the context, then push it.
    pub fn execute(&self, change: Change<C>, description: impl Into<String>) -> RecordMeta {
        change.redo(&self.inner.context);
        self.record(change, description)
    }

    /// Open a group at the current cursor.
    ///
    /// Returns `false` (and keeps the outer group) if one is already open.
    pub fn begin_group(&self, description: impl Into<String>) -> bool {
        let mut state = self.inner.state.borrow_mut();
        if state.open_group.is_some() {
            debug!(
                target: "tessera.history",
                stack = %self.inner.id,
                "group already open"
            );
            return false;
        }
        let start = state.cursor;
        state.open_group = Some(OpenGroup {
            start,
            description: description.into(),
        });
        true
    }

    /// Close the open group without touching entries.
    ///
    /// Returns the number of entries pushed since [`begin_group`](Self::begin_group),
    /// or `None` if no group was open.
    pub fn end_group(&self) -> Option<usize> {
        let mut state = self.inner.state.borrow_mut();
        let group = state.open_group.take()?;
        Some(state.cursor.saturating_sub(group.start))
    }

    /// Whether a group is open.
    #[must_use]
    pub fn is_group_open(&self) -> bool {
        self.inner.state.borrow().open_group.is_some()
    }

    /// Close the open group and fold its entries into one batch record.
    ///
    /// The batch takes the group description and the latest inner
    /// timestamp. An empty group produces nothing; a single entry is kept
    /// as it is. Returns the metadata of the resulting entry.
    pub fn squash_group(&self) -> Option<RecordMeta> {
        let mut state = self.inner.state.borrow_mut();
        let group = state.open_group.take()?;
        let cursor = state.cursor;
        let start = group.start.min(cursor);
        match cursor - start {
            0 => return None,
            1 => return state.entries.get(start).map(|r| r.meta.clone()),
            _ => {}
        }

        let folded: Vec<Record<C>> = state.entries.drain(start..cursor).collect();
        let count = folded.len();
        let timestamp = folded
            .last()
            .map(Record::timestamp)
            .unwrap_or_else(|| self.inner.clock.now());
        let changes = folded.into_iter().map(|r| r.change).collect();
        let meta = RecordMeta {
            id: state.next_serial(&self.inner.id),
            timestamp,
            description: group.description,
        };
        state.entries.insert(
            start,
            Record {
                meta: meta.clone(),
                change: Change::Batch(changes),
            },
        );
        state.cursor = start + 1;
        state.clean_cursor = match state.clean_cursor {
            Some(clean) if clean > start && clean < cursor => None,
            Some(clean) if clean >= cursor => Some(clean - (count - 1)),
            other => other,
        };

        debug!(
            target: "tessera.history",
            stack = %self.inner.id,
            record = %meta.id,
            folded = count,
            "group squashed"
        );
        Some(meta)
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    /// Revert the record before the cursor. Returns `false` at the start.
    pub fn undo(&self) -> bool {
        self.step(Direction::Undo)
    }

    /// Reapply the record at the cursor. Returns `false` at the end.
    pub fn redo(&self) -> bool {
        self.step(Direction::Redo)
    }

    fn step(&self, direction: Direction) -> bool {
        let (info, callbacks) = {
            let mut state = self.inner.state.borrow_mut();
            let index = match direction {
                Direction::Undo if state.cursor > 0 => state.cursor - 1,
                Direction::Redo if state.cursor < state.entries.len() => state.cursor,
                _ => {
                    debug!(
                        target: "tessera.history",
                        stack = %self.inner.id,
                        direction = direction.as_str(),
                        "nothing to apply"
                    );
                    return false;
                }
            };

            let record = &state.entries[index];
            match direction {
                Direction::Undo => record.undo(&self.inner.context),
                Direction::Redo => record.redo(&self.inner.context),
            }
            let meta = record.meta.clone();

            state.cursor = match direction {
                Direction::Undo => index,
                Direction::Redo => index + 1,
            };
            let cursor = state.cursor;
            if let Some(group) = state.open_group.as_mut() {
                group.start = group.start.min(cursor);
            }

            debug!(
                target: "tessera.history",
                stack = %self.inner.id,
                direction = direction.as_str(),
                record = %meta.id,
                timestamp = meta.timestamp.raw(),
                description = %meta.description,
                cursor,
                len = state.entries.len(),
                "record applied"
            );

            let info = NavigationInfo {
                stack_id: self.inner.id.clone(),
                direction,
                record: meta,
            };
            (info, state.listeners.callbacks())
        };

        for callback in callbacks {
            callback(&info);
        }
        true
    }

    /// Drop all entries and close any open group. The context is untouched.
    pub fn clear(&self) {
        let mut state = self.inner.state.borrow_mut();
        let was_clean = state.clean_cursor == Some(state.cursor);
        let dropped = state.entries.len();
        state.entries.clear();
        state.cursor = 0;
        state.open_group = None;
        state.clean_cursor = was_clean.then_some(0);
        debug!(
            target: "tessera.history",
            stack = %self.inner.id,
            dropped,
            "history cleared"
        );
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    /// Whether a record is available to undo.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.inner.state.borrow().cursor > 0
    }

    /// Whether a record is available to redo.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        let state = self.inner.state.borrow();
        state.cursor < state.entries.len()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.state.borrow().entries.len()
    }

    /// Whether the stack has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.state.borrow().entries.is_empty()
    }

    /// Current cursor position.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.inner.state.borrow().cursor
    }

    /// Number of records that can be undone.
    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.cursor()
    }

    /// Number of records that can be redone.
    #[must_use]
    pub fn redo_depth(&self) -> usize {
        let state = self.inner.state.borrow();
        state.entries.len() - state.cursor
    }

    /// Configured depth limit (0 = unlimited).
    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.inner.state.borrow().max_depth
    }

    /// Metadata of the record the next undo reverts.
    #[must_use]
    pub fn next_undo_info(&self) -> Option<RecordMeta> {
        self.peek_meta(Direction::Undo)
    }

    /// Metadata of the record the next redo reapplies.
    #[must_use]
    pub fn next_redo_info(&self) -> Option<RecordMeta> {
        self.peek_meta(Direction::Redo)
    }

    fn peek_meta(&self, direction: Direction) -> Option<RecordMeta> {
        self.inner
            .state
            .borrow()
            .peek(direction)
            .map(|r| r.meta.clone())
    }

    /// Timestamp of the most recent applied edit.
    #[must_use]
    pub fn last_edit_timestamp(&self) -> Option<Timestamp> {
        self.inner
            .state
            .borrow()
            .peek(Direction::Undo)
            .map(Record::timestamp)
    }

    /// Undo descriptions, most recent first.
    #[must_use]
    pub fn undo_descriptions(&self, limit: usize) -> Vec<String> {
        let state = self.inner.state.borrow();
        state
            .entries
            .iter()
            .take(state.cursor)
            .rev()
            .take(limit)
            .map(|r| r.meta.description.clone())
            .collect()
    }

    /// Redo descriptions, next-to-redo first.
    #[must_use]
    pub fn redo_descriptions(&self, limit: usize) -> Vec<String> {
        let state = self.inner.state.borrow();
        state
            .entries
            .iter()
            .skip(state.cursor)
            .take(limit)
            .map(|r| r.meta.description.clone())
            .collect()
    }

    /// Record the current position as the saved state.
    pub fn mark_clean(&self) {
        let mut state = self.inner.state.borrow_mut();
        state.clean_cursor = Some(state.cursor);
    }

    /// Whether the context differs from the saved state.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        let state = self.inner.state.borrow();
        state.clean_cursor != Some(state.cursor)
    }

    /// Counts and cursor position, for diagnostics only.
    #[must_use]
    pub fn debug_summary(&self) -> String {
        let state = self.inner.state.borrow();
        let mut summary = format!(
            "{} [{}]: {} entries, cursor {} (undo {}, redo {})",
            self.inner.display_name,
            self.inner.id,
            state.entries.len(),
            state.cursor,
            state.cursor,
            state.entries.len() - state.cursor,
        );
        if let Some(group) = &state.open_group {
            summary.push_str(&format!(", group '{}' open at {}", group.description, group.start));
        }
        summary
    }

    // ========================================================================
    // Notification
    // ========================================================================

    /// Call `callback` after every successful undo.
    pub fn on_undo_performed(&self, callback: impl Fn(&NavigationInfo) + 'static) -> ListenerId {
        self.on_navigate(move |info| {
            if info.direction == Direction::Undo {
                callback(info);
            }
        })
    }

    /// Call `callback` after every successful redo.
    pub fn on_redo_performed(&self, callback: impl Fn(&NavigationInfo) + 'static) -> ListenerId {
        self.on_navigate(move |info| {
            if info.direction == Direction::Redo {
                callback(info);
            }
        })
    }

    /// Call `callback` after every successful undo or redo.
    pub fn on_navigate(&self, callback: impl Fn(&NavigationInfo) + 'static) -> ListenerId {
        self.inner.state.borrow_mut().listeners.subscribe(callback)
    }

    /// Remove a listener. Returns `false` if it was not registered here.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.inner.state.borrow_mut().listeners.unsubscribe(id)
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.inner.state.borrow().listeners.len()
    }
}

impl<C: EditContext> StackNode for HistoryStack<C> {
    fn id(&self) -> &str {
        HistoryStack::id(self)
    }

    fn display_name(&self) -> &str {
        HistoryStack::display_name(self)
    }

    fn can_undo(&self) -> bool {
        HistoryStack::can_undo(self)
    }

    fn can_redo(&self) -> bool {
        HistoryStack::can_redo(self)
    }

    fn peek(&self, direction: Direction) -> Option<RecordMeta> {
        self.peek_meta(direction)
    }

    fn navigate(&self, direction: Direction) -> bool {
        self.step(direction)
    }

    fn clear(&self) {
        HistoryStack::clear(self);
    }

    fn debug_summary(&self) -> String {
        HistoryStack::debug_summary(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ============================================================================
// Tests
// ============================================================================
