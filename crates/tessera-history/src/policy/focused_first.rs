//! [`FocusedFirst`] policy: the focused child acts when it can.

use super::{ResolutionPolicy, chronological};
use crate::clock::Timestamp;
use crate::record::Direction;

/// Prefer the focused child; fall back to chronological order across all
/// children when nothing is focused or the focused child cannot act.
///
/// This is the default for sub-tool windows: the tool the user is working
/// in owns undo, until its history runs out.
#[derive(Debug, Clone, Copy, Default)]
pub struct FocusedFirst;

impl ResolutionPolicy for FocusedFirst {
    fn select(
        &self,
        direction: Direction,
        focused: Option<usize>,
        candidates: &[Option<Timestamp>],
    ) -> Option<usize> {
        if let Some(index) = focused
            && matches!(candidates.get(index), Some(Some(_)))
        {
            return Some(index);
        }
        chronological(direction, candidates)
    }

    fn name(&self) -> &str {
        "FocusedFirst"
    }
}
