#![forbid(unsafe_code)]

//! Edit contexts: the mutable state a history domain edits.
//!
//! A context is owned by its subsystem and shared with the stack through a
//! [`SharedContext`] handle. The UI reads it between edits on the same
//! thread; records mutate it in place during undo/redo.

use std::cell::RefCell;
use std::rc::Rc;

/// Single-threaded shared handle to a context.
pub type SharedContext<C> = Rc<RefCell<C>>;

/// Wrap a context value in a [`SharedContext`].
#[must_use]
pub fn shared<C>(context: C) -> SharedContext<C> {
    Rc::new(RefCell::new(context))
}

/// State that can be captured and restored by snapshot.
///
/// Implementations decide what a snapshot covers (the whole context or the
/// sub-portion a domain edits) and how two snapshots are compared. The
/// comparator drives no-op suppression in [`DragSession`](crate::DragSession).
pub trait EditContext: 'static {
    /// Captured state.
    type Snapshot: Clone + 'static;

    /// Capture the current state.
    fn snapshot(&self) -> Self::Snapshot;

    /// Replace the current state with a captured one.
    fn restore(&mut self, snapshot: &Self::Snapshot);

    /// Whether two snapshots describe observably different states.
    fn is_different(a: &Self::Snapshot, b: &Self::Snapshot) -> bool;
}
