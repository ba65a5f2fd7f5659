#![forbid(unsafe_code)]

//! Logical time shared by sibling history domains.
//!
//! Records are ordered across stacks by a monotonically increasing counter,
//! never by wall-clock time, so resolution is deterministic under test.
//! Every stack created by one [`HistoryManager`](crate::HistoryManager)
//! shares the manager's clock.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

/// A point on the logical clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp(pub u64);

impl Timestamp {
    /// Create a timestamp from a raw counter value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Get the raw counter value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// Shared monotonic counter handing out [`Timestamp`]s.
///
/// Cloning yields another handle to the same counter.
#[derive(Clone, Default)]
pub struct LogicalClock {
    now: Rc<Cell<u64>>,
}

impl fmt::Debug for LogicalClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogicalClock")
            .field("now", &self.now.get())
            .finish()
    }
}

impl LogicalClock {
    /// Create a clock at time zero. The first [`tick`](Self::tick) yields `t1`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently issued timestamp (`t0` if none was issued).
    #[must_use]
    pub fn now(&self) -> Timestamp {
        Timestamp(self.now.get())
    }

    /// Advance by one and return the new timestamp.
    pub fn tick(&self) -> Timestamp {
        let next = self.now.get().saturating_add(1);
        self.now.set(next);
        Timestamp(next)
    }

    /// Move the clock forward to `value`. Never moves it backwards.
    pub fn advance_to(&self, value: u64) {
        if value > self.now.get() {
            self.now.set(value);
        }
    }

    /// Whether two handles share the same counter.
    #[must_use]
    pub fn same_clock(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.now, &other.now)
    }
}
