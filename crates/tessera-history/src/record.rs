#![forbid(unsafe_code)]

//! Operation records: reversible units of change.
//!
//! A [`Record`] pairs metadata (id, logical timestamp, description) with a
//! [`Change`]. `Change` is a closed set of authoring styles:
//!
//! - [`Change::Snapshot`]: full before/after state. Used for topology edits.
//! - [`Change::Delta`]: a minimal patch supplied by the domain. Used for
//!   drags and slider edits.
//! - [`Change::Batch`]: several changes that navigate as one entry.
//! - [`Change::Linked`]: a primary change plus auxiliary restorations of
//!   contexts owned by other domains.
//!
//! # Invariants
//!
//! - `undo` then `redo` reproduces the state `redo` alone produces.
//! - Effects depend only on the record and the current context.
//! - Linked changes apply the primary first, then auxiliaries in
//!   registration order, in both directions.

use std::cell::RefCell;
use std::fmt;

use crate::clock::Timestamp;
use crate::context::{EditContext, SharedContext};

/// Navigation direction through a history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Revert the record before the cursor.
    Undo,
    /// Reapply the record at the cursor.
    Redo,
}

impl Direction {
    /// Lowercase name used in log fields.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Undo => "undo",
            Self::Redo => "redo",
        }
    }
}

/// A minimal patch over a context.
///
/// `apply` moves the context from the old values to the new ones, `revert`
/// moves it back. Both must be pure functions of the patch and the
/// context. Indices that no longer fit the context are a caller contract
/// violation: assert in debug builds, skip in release builds.
pub trait Delta<C>: fmt::Debug {
    /// Write the new values.
    fn apply(&self, context: &mut C);

    /// Write the old values.
    fn revert(&self, context: &mut C);

    /// Short label for diagnostics.
    fn label(&self) -> &'static str {
        "delta"
    }
}

/// A restoration of state owned by another domain, carried by a
/// [`Change::Linked`] record.
pub trait Auxiliary {
    /// Restore the state from before the edit.
    fn restore_before(&self);

    /// Restore the state from after the edit.
    fn restore_after(&self);

    /// Short label for diagnostics.
    fn label(&self) -> &'static str {
        "auxiliary"
    }
}

/// Auxiliary that restores a snapshot of another shared context.
pub struct SnapshotRestore<D: EditContext> {
    context: SharedContext<D>,
    before: D::Snapshot,
    after: D::Snapshot,
}

impl<D: EditContext> SnapshotRestore<D> {
    /// Restore `context` to `before` on undo and to `after` on redo.
    #[must_use]
    pub fn new(context: SharedContext<D>, before: D::Snapshot, after: D::Snapshot) -> Self {
        Self {
            context,
            before,
            after,
        }
    }
}

impl<D: EditContext> Auxiliary for SnapshotRestore<D> {
    fn restore_before(&self) {
        self.context.borrow_mut().restore(&self.before);
    }

    fn restore_after(&self) {
        self.context.borrow_mut().restore(&self.after);
    }

    fn label(&self) -> &'static str {
        "snapshot-restore"
    }
}

/// The effect of a record.
pub enum Change<C: EditContext> {
    /// Full before/after snapshots.
    Snapshot {
        before: C::Snapshot,
        after: C::Snapshot,
    },
    /// Domain patch.
    Delta(Box<dyn Delta<C>>),
    /// Ordered changes navigated as one entry.
    Batch(Vec<Change<C>>),
    /// Primary change followed by restorations in other domains.
    Linked {
        primary: Box<Change<C>>,
        auxiliaries: Vec<Box<dyn Auxiliary>>,
    },
}

impl<C: EditContext> fmt::Debug for Change<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Snapshot { .. } => f.write_str("Snapshot"),
            Self::Delta(delta) => f.debug_tuple("Delta").field(delta).finish(),
            Self::Batch(items) => f.debug_tuple("Batch").field(items).finish(),
            Self::Linked {
                primary,
                auxiliaries,
            } => f
                .debug_struct("Linked")
                .field("primary", primary)
                .field(
                    "auxiliaries",
                    &auxiliaries.iter().map(|a| a.label()).collect::<Vec<_>>(),
                )
                .finish(),
        }
    }
}

impl<C: EditContext> Change<C> {
    /// Snapshot-style change.
    #[must_use]
    pub fn snapshot(before: C::Snapshot, after: C::Snapshot) -> Self {
        Self::Snapshot { before, after }
    }

    /// Delta-style change.
    #[must_use]
    pub fn delta(delta: impl Delta<C> + 'static) -> Self {
        Self::Delta(Box::new(delta))
    }

    /// Attach an auxiliary restoration. A non-linked change becomes the
    /// primary of a new linked change.
    #[must_use]
    pub fn with_auxiliary(self, auxiliary: impl Auxiliary + 'static) -> Self {
        match self {
            Self::Linked {
                primary,
                mut auxiliaries,
            } => {
                auxiliaries.push(Box::new(auxiliary));
                Self::Linked {
                    primary,
                    auxiliaries,
                }
            }
            other => Self::Linked {
                primary: Box::new(other),
                auxiliaries: vec![Box::new(auxiliary)],
            },
        }
    }

    /// Variant name for diagnostics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Snapshot { .. } => "snapshot",
            Self::Delta(_) => "delta",
            Self::Batch(_) => "batch",
            Self::Linked { .. } => "linked",
        }
    }

    /// Write the "after" state.
    pub fn redo(&self, context: &RefCell<C>) {
        match self {
            Self::Snapshot { after, .. } => context.borrow_mut().restore(after),
            Self::Delta(delta) => delta.apply(&mut context.borrow_mut()),
            Self::Batch(items) => {
                for item in items {
                    item.redo(context);
                }
            }
            Self::Linked {
                primary,
                auxiliaries,
            } => {
                primary.redo(context);
                for auxiliary in auxiliaries {
                    auxiliary.restore_after();
                }
            }
        }
    }

    /// Write the "before" state.
    pub fn undo(&self, context: &RefCell<C>) {
        match self {
            Self::Snapshot { before, .. } => context.borrow_mut().restore(before),
            Self::Delta(delta) => delta.revert(&mut context.borrow_mut()),
            Self::Batch(items) => {
                for item in items.iter().rev() {
                    item.undo(context);
                }
            }
            Self::Linked {
                primary,
                auxiliaries,
            } => {
                primary.undo(context);
                for auxiliary in auxiliaries {
                    auxiliary.restore_before();
                }
            }
        }
    }
}

/// Identity and ordering data of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordMeta {
    /// `"{stack_id}#{serial}"`, assigned at push time.
    pub id: String,
    /// Logical time of the push.
    pub timestamp: Timestamp,
    /// Human-readable description for menus and history panels.
    pub description: String,
}

/// One entry of a history stack.
pub struct Record<C: EditContext> {
    pub(crate) meta: RecordMeta,
    pub(crate) change: Change<C>,
}

impl<C: EditContext> fmt::Debug for Record<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("meta", &self.meta)
            .field("change", &self.change)
            .finish()
    }
}

impl<C: EditContext> Record<C> {
    /// Build an unstamped record. The stack assigns id and timestamp on push.
    #[must_use]
    pub fn new(change: Change<C>, description: impl Into<String>) -> Self {
        Self {
            meta: RecordMeta {
                id: String::new(),
                timestamp: Timestamp::default(),
                description: description.into(),
            },
            change,
        }
    }

    /// Record metadata.
    #[must_use]
    pub fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    /// Record description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.meta.description
    }

    /// Logical timestamp (zero until pushed).
    #[must_use]
    pub fn timestamp(&self) -> Timestamp {
        self.meta.timestamp
    }

    /// The recorded change.
    #[must_use]
    pub fn change(&self) -> &Change<C> {
        &self.change
    }

    /// Apply the "before" state to `context`.
    pub fn undo(&self, context: &RefCell<C>) {
        self.change.undo(context);
    }

    /// Apply the "after" state to `context`.
    pub fn redo(&self, context: &RefCell<C>) {
        self.change.redo(context);
    }
}
