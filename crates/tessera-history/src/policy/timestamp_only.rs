//! [`TimestampOnly`] policy: pure chronological resolution.

use super::{ResolutionPolicy, chronological};
use crate::clock::Timestamp;
use crate::record::Direction;

/// Ignore focus. Undo reverts the most recent edit anywhere below the
/// group; redo replays the earliest undone one.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimestampOnly;

impl ResolutionPolicy for TimestampOnly {
    fn select(
        &self,
        direction: Direction,
        _focused: Option<usize>,
        candidates: &[Option<Timestamp>],
    ) -> Option<usize> {
        chronological(direction, candidates)
    }

    fn name(&self) -> &str {
        "TimestampOnly"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn focus_is_ignored() {
        let slots = [Some(Timestamp(42)), Some(Timestamp(43))];
        assert_eq!(
            TimestampOnly.select(Direction::Undo, Some(0), &slots),
            Some(1)
        );
        assert_eq!(
            TimestampOnly.select(Direction::Redo, Some(1), &slots),
            Some(0)
        );
    }

    #[test]
    fn name_is_stable() {
        assert_eq!(TimestampOnly.name(), "TimestampOnly");
    }
}
