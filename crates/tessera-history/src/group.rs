#![forbid(unsafe_code)]

//! Composite history nodes.
//!
//! A [`HistoryGroup`] owns named children (groups or stacks), tracks which
//! child is focused, and resolves an undo/redo to exactly one descendant
//! stack through its [`ResolutionPolicy`].
//!
//! Resolution is recursive: a child group contributes the candidate its own
//! policy picks, so a `FocusedFirst` tools group nested under a
//! `TimestampOnly` window group behaves as each one says locally.
//!
//! # Invariants
//!
//! - Child ids are unique within a group.
//! - The focused id, if set, names a live direct child.
//! - A group is never its own descendant.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::{debug, debug_span};

use crate::error::{HistoryError, HistoryResult};
use crate::node::{Candidate, HistoryNode};
use crate::policy::{FocusedFirst, ResolutionPolicy};
use crate::record::{Direction, RecordMeta};

struct GroupState {
    children: Vec<HistoryNode>,
    focused: Option<String>,
    policy: Box<dyn ResolutionPolicy>,
}

struct GroupShared {
    id: String,
    display_name: String,
    state: RefCell<GroupState>,
}

/// Cheap-clone handle to a group of history nodes.
#[derive(Clone)]
pub struct HistoryGroup {
    inner: Rc<GroupShared>,
}

impl fmt::Debug for HistoryGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("HistoryGroup")
            .field("id", &self.inner.id)
            .field("children", &state.children)
            .field("focused", &state.focused)
            .field("policy", &state.policy.name())
            .finish()
    }
}

impl HistoryGroup {
    /// Create an empty group with the [`FocusedFirst`] policy.
    #[must_use]
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            inner: Rc::new(GroupShared {
                id: id.into(),
                display_name: display_name.into(),
                state: RefCell::new(GroupState {
                    children: Vec::new(),
                    focused: None,
                    policy: Box::new(FocusedFirst),
                }),
            }),
        }
    }

    /// Builder-style policy override.
    #[must_use]
    pub fn with_policy(self, policy: impl ResolutionPolicy + 'static) -> Self {
        self.set_policy(policy);
        self
    }

    /// Replace the resolution policy.
    pub fn set_policy(&self, policy: impl ResolutionPolicy + 'static) {
        self.set_boxed_policy(Box::new(policy));
    }

    /// Replace the resolution policy with an already boxed one.
    pub fn set_boxed_policy(&self, policy: Box<dyn ResolutionPolicy>) {
        self.inner.state.borrow_mut().policy = policy;
    }

    /// Name of the current policy.
    #[must_use]
    pub fn policy_name(&self) -> String {
        self.inner.state.borrow().policy.name().to_owned()
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

    /// Whether two handles refer to the same group.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    // ========================================================================
    // Structure
    // ========================================================================

    /// Attach a child.
    ///
    /// # Errors
    ///
    /// [`HistoryError::DuplicateId`] if a direct child already uses the id,
    /// [`HistoryError::Cycle`] if `node` is this group or contains it.
    pub fn add_child(&self, node: impl Into<HistoryNode>) -> HistoryResult {
        let node = node.into();
        if let HistoryNode::Group(group) = &node
            && (group.ptr_eq(self) || group.contains_group(self))
        {
            return Err(HistoryError::Cycle {
                parent: self.inner.id.clone(),
                child: group.id().to_owned(),
            });
        }

        let mut state = self.inner.state.borrow_mut();
        if state.children.iter().any(|c| c.id() == node.id()) {
            return Err(HistoryError::DuplicateId {
                group: self.inner.id.clone(),
                id: node.id().to_owned(),
            });
        }
        debug!(
            target: "tessera.group",
            group = %self.inner.id,
            child = %node.id(),
            "child attached"
        );
        state.children.push(node);
        Ok(())
    }

    /// Detach a direct child, clearing focus if it was focused.
    ///
    /// # Errors
    ///
    /// [`HistoryError::NotFound`] if no direct child has the id.
    pub fn remove_child(&self, id: &str) -> HistoryResult<HistoryNode> {
        let mut state = self.inner.state.borrow_mut();
        let index = state
            .children
            .iter()
            .position(|c| c.id() == id)
            .ok_or_else(|| HistoryError::NotFound(id.to_owned()))?;
        let node = state.children.remove(index);
        if state.focused.as_deref() == Some(id) {
            state.focused = None;
        }
        debug!(
            target: "tessera.group",
            group = %self.inner.id,
            child = %id,
            "child detached"
        );
        Ok(node)
    }

    /// Detach the first node with `id` anywhere below this group,
    /// depth-first.
    ///
    /// # Errors
    ///
    /// [`HistoryError::NotFound`] if no descendant has the id.
    pub fn detach_descendant(&self, id: &str) -> HistoryResult<HistoryNode> {
        for child in self.children() {
            if child.id() == id {
                return self.remove_child(id);
            }
            if let HistoryNode::Group(group) = &child
                && let Ok(node) = group.detach_descendant(id)
            {
                return Ok(node);
            }
        }
        Err(HistoryError::NotFound(id.to_owned()))
    }

    /// Find a node by id, depth-first, including this group itself.
    #[must_use]
    pub fn find_by_id(&self, id: &str) -> Option<HistoryNode> {
        if self.inner.id == id {
            return Some(HistoryNode::Group(self.clone()));
        }
        self.children().into_iter().find_map(|child| match &child {
            _ if child.id() == id => Some(child.clone()),
            HistoryNode::Group(group) => group.find_by_id(id),
            HistoryNode::Stack(_) => None,
        })
    }

    fn contains_group(&self, target: &Self) -> bool {
        self.children().iter().any(|child| match child {
            HistoryNode::Group(group) => group.ptr_eq(target) || group.contains_group(target),
            HistoryNode::Stack(_) => false,
        })
    }

    /// Snapshot of the direct children, in registration order.
    #[must_use]
    pub fn children(&self) -> Vec<HistoryNode> {
        self.inner.state.borrow().children.clone()
    }

    /// Ids of the direct children, in registration order.
    #[must_use]
    pub fn children_ids(&self) -> Vec<String> {
        self.inner
            .state
            .borrow()
            .children
            .iter()
            .map(|c| c.id().to_owned())
            .collect()
    }

    /// Number of direct children.
    #[must_use]
    pub fn child_count(&self) -> usize {
        self.inner.state.borrow().children.len()
    }

    // ========================================================================
    // Focus
    // ========================================================================

    /// Focus a direct child.
    ///
    /// # Errors
    ///
    /// [`HistoryError::NotFound`] if no direct child has the id.
    pub fn focus(&self, child_id: &str) -> HistoryResult {
        let mut state = self.inner.state.borrow_mut();
        if !state.children.iter().any(|c| c.id() == child_id) {
            return Err(HistoryError::NotFound(child_id.to_owned()));
        }
        state.focused = Some(child_id.to_owned());
        debug!(
            target: "tessera.group",
            group = %self.inner.id,
            child = %child_id,
            "focus changed"
        );
        Ok(())
    }

    /// Drop focus.
    pub fn clear_focus(&self) {
        self.inner.state.borrow_mut().focused = None;
    }

    /// Id of the focused child.
    #[must_use]
    pub fn focused_child_id(&self) -> Option<String> {
        self.inner.state.borrow().focused.clone()
    }

    // ========================================================================
    // Resolution
    // ========================================================================

    /// Whether any descendant stack can undo.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.children().iter().any(HistoryNode::can_undo)
    }

    /// Whether any descendant stack can redo.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.children().iter().any(HistoryNode::can_redo)
    }

    /// Pick the stack that would act in `direction`.
    #[must_use]
    pub fn resolve(&self, direction: Direction) -> Option<Candidate> {
        let span = debug_span!(
            target: "tessera.group",
            "history.resolve",
            group = %self.inner.id,
            direction = direction.as_str()
        );
        let _guard = span.enter();

        let state = self.inner.state.borrow();
        let mut candidates: Vec<Option<Candidate>> = state
            .children
            .iter()
            .map(|child| child.candidate(direction))
            .collect();
        let timestamps: Vec<_> = candidates
            .iter()
            .map(|c| c.as_ref().map(Candidate::timestamp))
            .collect();
        let focused = state
            .focused
            .as_deref()
            .and_then(|id| state.children.iter().position(|c| c.id() == id));

        let chosen = state.policy.select(direction, focused, &timestamps);
        let candidate = chosen.and_then(|index| candidates.get_mut(index).and_then(Option::take));
        match &candidate {
            Some(c) => debug!(
                target: "tessera.group",
                policy = state.policy.name(),
                stack = %c.stack_id(),
                timestamp = c.timestamp().raw(),
                "candidate selected"
            ),
            None => debug!(
                target: "tessera.group",
                policy = state.policy.name(),
                "no candidate"
            ),
        }
        candidate
    }

    /// Metadata of the record a group-level undo would revert.
    #[must_use]
    pub fn peek_undo(&self) -> Option<RecordMeta> {
        self.resolve(Direction::Undo).map(|c| c.record)
    }

    /// Metadata of the record a group-level redo would reapply.
    #[must_use]
    pub fn peek_redo(&self) -> Option<RecordMeta> {
        self.resolve(Direction::Redo).map(|c| c.record)
    }

    /// Undo on exactly one resolved descendant stack.
    pub fn perform_undo(&self) -> bool {
        self.perform(Direction::Undo)
    }

    /// Redo on exactly one resolved descendant stack.
    pub fn perform_redo(&self) -> bool {
        self.perform(Direction::Redo)
    }

    fn perform(&self, direction: Direction) -> bool {
        match self.resolve(direction) {
            Some(candidate) => candidate.apply(direction),
            None => false,
        }
    }

    /// Clear every descendant stack.
    pub fn clear_all(&self) {
        for child in self.children() {
            match child {
                HistoryNode::Group(group) => group.clear_all(),
                HistoryNode::Stack(stack) => stack.clear(),
            }
        }
    }

    /// Indented tree of this group and its descendants.
    #[must_use]
    pub fn debug_tree(&self) -> String {
        let mut out = String::new();
        self.write_tree(&mut out, 0);
        out
    }

    fn write_tree(&self, out: &mut String, depth: usize) {
        let indent = "  ".repeat(depth);
        {
            let state = self.inner.state.borrow();
            out.push_str(&format!(
                "{indent}{} [{}] {}",
                self.inner.display_name,
                self.inner.id,
                state.policy.name()
            ));
            if let Some(focused) = &state.focused {
                out.push_str(&format!(" focus={focused}"));
            }
            out.push('\n');
        }
        for child in self.children() {
            match child {
                HistoryNode::Group(group) => group.write_tree(out, depth + 1),
                HistoryNode::Stack(stack) => {
                    out.push_str(&format!("{indent}  {}\n", stack.debug_summary()));
                }
            }
        }
    }
}
