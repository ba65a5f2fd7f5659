#![forbid(unsafe_code)]

//! Nodes of the history tree.

use std::fmt;
use std::rc::Rc;

use crate::clock::Timestamp;
use crate::context::EditContext;
use crate::group::HistoryGroup;
use crate::record::{Direction, RecordMeta};
use crate::stack::{HistoryStack, StackNode};

/// A child of a [`HistoryGroup`]: either a nested group or a stack.
#[derive(Clone)]
pub enum HistoryNode {
    /// Composite container.
    Group(HistoryGroup),
    /// Leaf history over some context type.
    Stack(Rc<dyn StackNode>),
}

impl HistoryNode {
    /// Wrap a stack handle.
    #[must_use]
    pub fn stack<C: EditContext>(stack: &HistoryStack<C>) -> Self {
        Self::Stack(Rc::new(stack.clone()))
    }

    /// Stable identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Group(group) => group.id(),
            Self::Stack(stack) => stack.id(),
        }
    }

    /// Name shown in history panels.
    #[must_use]
    pub fn display_name(&self) -> &str {
        match self {
            Self::Group(group) => group.display_name(),
            Self::Stack(stack) => stack.display_name(),
        }
    }

    /// Whether some stack at or below this node can undo.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        match self {
            Self::Group(group) => group.can_undo(),
            Self::Stack(stack) => stack.can_undo(),
        }
    }

    /// Whether some stack at or below this node can redo.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        match self {
            Self::Group(group) => group.can_redo(),
            Self::Stack(stack) => stack.can_redo(),
        }
    }

    /// The group, if this node is one.
    #[must_use]
    pub fn as_group(&self) -> Option<&HistoryGroup> {
        match self {
            Self::Group(group) => Some(group),
            Self::Stack(_) => None,
        }
    }

    /// The typed stack handle, if this node is a stack over `C`.
    #[must_use]
    pub fn as_stack<C: EditContext>(&self) -> Option<HistoryStack<C>> {
        match self {
            Self::Stack(stack) => stack.as_any().downcast_ref::<HistoryStack<C>>().cloned(),
            Self::Group(_) => None,
        }
    }

    /// The stack that would act in `direction`, with its next record.
    #[must_use]
    pub fn candidate(&self, direction: Direction) -> Option<Candidate> {
        match self {
            Self::Group(group) => group.resolve(direction),
            Self::Stack(stack) => stack.peek(direction).map(|record| Candidate {
                record,
                stack: Rc::clone(stack),
            }),
        }
    }
}

impl fmt::Debug for HistoryNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Group(group) => f.debug_tuple("Group").field(&group.id()).finish(),
            Self::Stack(stack) => f.debug_tuple("Stack").field(&stack.id()).finish(),
        }
    }
}

impl From<HistoryGroup> for HistoryNode {
    fn from(group: HistoryGroup) -> Self {
        Self::Group(group)
    }
}

impl From<&HistoryGroup> for HistoryNode {
    fn from(group: &HistoryGroup) -> Self {
        Self::Group(group.clone())
    }
}

impl<C: EditContext> From<HistoryStack<C>> for HistoryNode {
    fn from(stack: HistoryStack<C>) -> Self {
        Self::Stack(Rc::new(stack))
    }
}

impl<C: EditContext> From<&HistoryStack<C>> for HistoryNode {
    fn from(stack: &HistoryStack<C>) -> Self {
        Self::stack(stack)
    }
}

/// A resolved stack together with the record it would apply.
#[derive(Clone)]
pub struct Candidate {
    /// Metadata of the next record.
    pub record: RecordMeta,
    stack: Rc<dyn StackNode>,
}

impl Candidate {
    /// Id of the stack that would act.
    #[must_use]
    pub fn stack_id(&self) -> &str {
        self.stack.id()
    }

    /// Timestamp of the record that would be applied.
    #[must_use]
    pub fn timestamp(&self) -> Timestamp {
        self.record.timestamp
    }

    /// Navigate the resolved stack.
    pub(crate) fn apply(&self, direction: Direction) -> bool {
        self.stack.navigate(direction)
    }
}

impl fmt::Debug for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Candidate")
            .field("stack", &self.stack.id())
            .field("record", &self.record)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::LogicalClock;
    use crate::context::shared;
    use crate::record::Change;

    #[derive(Debug)]
    struct Counter(i32);

    impl EditContext for Counter {
        type Snapshot = i32;

        fn snapshot(&self) -> i32 {
            self.0
        }

        fn restore(&mut self, snapshot: &i32) {
            self.0 = *snapshot;
        }

        fn is_different(a: &i32, b: &i32) -> bool {
            a != b
        }
    }

    #[derive(Debug)]
    struct Label(String);

    impl EditContext for Label {
        type Snapshot = String;

        fn snapshot(&self) -> String {
            self.0.clone()
        }

        fn restore(&mut self, snapshot: &String) {
            self.0.clone_from(snapshot);
        }

        fn is_different(a: &String, b: &String) -> bool {
            a != b
        }
    }

    #[test]
    fn typed_stack_round_trips_through_node() {
        let clock = LogicalClock::new();
        let stack = HistoryStack::new("Count", "Count", shared(Counter(0)), &clock);
        let node = HistoryNode::from(&stack);

        assert!(node.as_group().is_none());
        let back = node.as_stack::<Counter>().unwrap();
        assert!(back.ptr_eq(&stack));
        assert!(node.as_stack::<Label>().is_none());
    }

    #[test]
    fn stack_candidate_reports_next_record() {
        let clock = LogicalClock::new();
        let stack = HistoryStack::new("Count", "Count", shared(Counter(0)), &clock);
        let node: HistoryNode = stack.clone().into();
        assert!(node.candidate(Direction::Undo).is_none());

        stack.record(Change::snapshot(0, 1), "bump");
        let candidate = node.candidate(Direction::Undo).unwrap();
        assert_eq!(candidate.stack_id(), "Count");
        assert_eq!(candidate.timestamp(), Timestamp(1));
        assert!(node.candidate(Direction::Redo).is_none());

        assert!(candidate.apply(Direction::Undo));
        assert_eq!(stack.context().borrow().0, 0);
        assert!(node.can_redo());
        assert!(!node.can_undo());
    }

    #[test]
    fn debug_names_node_kind() {
        let stack = HistoryStack::standalone("Label", "Label", shared(Label(String::new())));
        let node = HistoryNode::stack(&stack);
        assert_eq!(format!("{node:?}"), "Stack(\"Label\")");
        assert_eq!(node.display_name(), "Label");
        let group = HistoryNode::from(HistoryGroup::new("Tools", "Tools"));
        assert_eq!(format!("{group:?}"), "Group(\"Tools\")");
    }
}
