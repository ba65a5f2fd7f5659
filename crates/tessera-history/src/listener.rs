#![forbid(unsafe_code)]

//! Navigation listeners.
//!
//! Collaborators (render buffers, selection UI) subscribe to a stack's
//! undo/redo notifications to resynchronize derived state. Subscriptions
//! are explicit: [`ListenerSet::subscribe`] hands out a [`ListenerId`] and
//! [`ListenerSet::unsubscribe`] removes it, so teardown order stays under
//! the owner's control.
//!
//! Listeners run after the stack has released its internal borrow, so they
//! may query the stack. A push, undo or redo made from a listener applies
//! immediately; a push after an undo discards the redo branch, so defer
//! follow-up edits to the next event-loop tick.

use std::fmt;
use std::rc::Rc;

use crate::clock::Timestamp;
use crate::record::{Direction, RecordMeta};

/// Handle of a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Get the raw id value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Payload delivered after a stack navigated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationInfo {
    /// Id of the stack that acted.
    pub stack_id: String,
    /// Whether the record was undone or redone.
    pub direction: Direction,
    /// The record that was applied.
    pub record: RecordMeta,
}

impl NavigationInfo {
    /// Description of the applied record.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.record.description
    }

    /// Logical timestamp of the applied record.
    #[must_use]
    pub fn timestamp(&self) -> Timestamp {
        self.record.timestamp
    }
}

type Callback<E> = Rc<dyn Fn(&E)>;

/// Ordered set of listener callbacks.
pub struct ListenerSet<E> {
    next_id: u64,
    listeners: Vec<(ListenerId, Callback<E>)>,
}

impl<E> Default for ListenerSet<E> {
    fn default() -> Self {
        Self {
            next_id: 0,
            listeners: Vec::new(),
        }
    }
}

impl<E> fmt::Debug for ListenerSet<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerSet")
            .field("count", &self.listeners.len())
            .finish()
    }
}

impl<E> ListenerSet<E> {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback. Callbacks fire in registration order.
    pub fn subscribe(&mut self, callback: impl Fn(&E) + 'static) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.listeners.push((id, Rc::new(callback)));
        id
    }

    /// Remove a callback. Returns `false` if the id was not registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    /// Number of registered callbacks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Whether no callbacks are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Remove every callback.
    pub fn clear(&mut self) {
        self.listeners.clear();
    }

    /// Clone the current callbacks so they can be invoked after the owner
    /// releases its borrow.
    #[must_use]
    pub(crate) fn callbacks(&self) -> Vec<Callback<E>> {
        self.listeners.iter().map(|(_, cb)| Rc::clone(cb)).collect()
    }

    /// Invoke every callback with `event`.
    pub fn emit(&self, event: &E) {
        for (_, callback) in &self.listeners {
            callback(event);
        }
    }
}
