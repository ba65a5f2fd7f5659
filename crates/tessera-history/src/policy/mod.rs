//! Resolution policies for ambiguous undo/redo.
//!
//! When several children of a group can act, a [`ResolutionPolicy`] picks
//! exactly one. Policies see one slot per child in registration order:
//! `Some(timestamp)` of the record that child would apply next, or `None`
//! if the child cannot act.
//!
//! # Standalone structs vs. convenience enum
//!
//! Each built-in policy has a standalone struct ([`FocusedFirst`],
//! [`TimestampOnly`]) that implements [`ResolutionPolicy`] directly. For
//! selection from configuration, use [`PolicyKind`] which delegates to the
//! same logic.

mod focused_first;
mod timestamp_only;

pub use focused_first::FocusedFirst;
pub use timestamp_only::TimestampOnly;

use crate::clock::Timestamp;
use crate::record::Direction;

/// Picks which child of a group handles an undo or redo.
pub trait ResolutionPolicy {
    /// Index of the chosen child, or `None` if no slot can act.
    ///
    /// `focused` is the index of the group's focused child, if any.
    fn select(
        &self,
        direction: Direction,
        focused: Option<usize>,
        candidates: &[Option<Timestamp>],
    ) -> Option<usize>;

    /// Human-readable policy name for logs/debugging.
    fn name(&self) -> &str;
}

/// Chronological choice shared by the built-in policies.
///
/// Undo takes the greatest timestamp (the most recent edit), redo the
/// smallest (replaying in original order). Ties go to the earlier slot.
#[must_use]
pub fn chronological(direction: Direction, candidates: &[Option<Timestamp>]) -> Option<usize> {
    let mut best: Option<(usize, Timestamp)> = None;
    for (index, slot) in candidates.iter().enumerate() {
        let Some(ts) = *slot else { continue };
        let better = match (best, direction) {
            (None, _) => true,
            (Some((_, current)), Direction::Undo) => ts > current,
            (Some((_, current)), Direction::Redo) => ts < current,
        };
        if better {
            best = Some((index, ts));
        }
    }
    best.map(|(index, _)| index)
}

/// Built-in policy selection convenience enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "config",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum PolicyKind {
    /// Focused child first, chronological fallback.
    FocusedFirst,
    /// Chronological across all children.
    #[default]
    TimestampOnly,
}

impl PolicyKind {
    /// Boxed standalone policy for this kind.
    #[must_use]
    pub fn into_policy(self) -> Box<dyn ResolutionPolicy> {
        match self {
            Self::FocusedFirst => Box::new(FocusedFirst),
            Self::TimestampOnly => Box::new(TimestampOnly),
        }
    }
}

impl ResolutionPolicy for PolicyKind {
    fn select(
        &self,
        direction: Direction,
        focused: Option<usize>,
        candidates: &[Option<Timestamp>],
    ) -> Option<usize> {
        match self {
            Self::FocusedFirst => FocusedFirst.select(direction, focused, candidates),
            Self::TimestampOnly => TimestampOnly.select(direction, focused, candidates),
        }
    }

    fn name(&self) -> &str {
        match self {
            Self::FocusedFirst => "FocusedFirst",
            Self::TimestampOnly => "TimestampOnly",
        }
    }
}
