#![forbid(unsafe_code)]

//! Process-wide history root.
//!
//! The [`HistoryManager`] owns the root [`HistoryGroup`] and the
//! [`LogicalClock`] every stack it creates shares, so timestamps are
//! comparable across the whole tree. Global undo/redo commands enter here.
//!
//! The UI thread installs one manager with [`HistoryManager::init`] and
//! reaches it with [`HistoryManager::global`]. Tests build their own with
//! [`HistoryManager::new`].

use std::cell::OnceCell;
use std::rc::Rc;

use tracing::{debug, info};

use crate::clock::LogicalClock;
use crate::config::HistoryConfig;
use crate::context::{EditContext, SharedContext};
use crate::error::{HistoryError, HistoryResult};
use crate::group::HistoryGroup;
use crate::node::HistoryNode;
use crate::policy::ResolutionPolicy;
use crate::record::RecordMeta;
use crate::stack::HistoryStack;

thread_local! {
    static GLOBAL: OnceCell<HistoryManager> = const { OnceCell::new() };
}

/// Root of the history tree.
#[derive(Debug, Clone)]
pub struct HistoryManager {
    root: HistoryGroup,
    clock: LogicalClock,
    config: Rc<HistoryConfig>,
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new(HistoryConfig::default())
    }
}

impl HistoryManager {
    /// Create a manager with a fresh clock and an empty root group.
    #[must_use]
    pub fn new(config: HistoryConfig) -> Self {
        let root = HistoryGroup::new(config.root_id.clone(), config.root_name.clone());
        root.set_boxed_policy(config.root_policy.into_policy());
        Self {
            root,
            clock: LogicalClock::new(),
            config: Rc::new(config),
        }
    }

    /// Install the thread's global manager.
    ///
    /// # Errors
    ///
    /// [`HistoryError::AlreadyInitialized`] on a second call.
    pub fn init(config: HistoryConfig) -> HistoryResult<Self> {
        GLOBAL.with(|cell| {
            if cell.get().is_some() {
                return Err(HistoryError::AlreadyInitialized);
            }
            let manager = Self::new(config);
            cell.set(manager.clone())
                .map_err(|_| HistoryError::AlreadyInitialized)?;
            info!(
                target: "tessera.history",
                root = %manager.root.id(),
                policy = %manager.root.policy_name(),
                max_depth = manager.config.max_depth,
                "history manager initialized"
            );
            Ok(manager)
        })
    }

    /// The thread's global manager, if installed.
    #[must_use]
    pub fn global() -> Option<Self> {
        GLOBAL.with(|cell| cell.get().cloned())
    }

    /// Root group.
    #[must_use]
    pub fn root(&self) -> &HistoryGroup {
        &self.root
    }

    /// Shared clock.
    #[must_use]
    pub fn clock(&self) -> &LogicalClock {
        &self.clock
    }

    /// Configuration the manager was built with.
    #[must_use]
    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    /// Replace the root resolution policy.
    pub fn set_root_policy(&self, policy: impl ResolutionPolicy + 'static) {
        self.root.set_policy(policy);
    }

    /// A stack on the shared clock with the configured depth limit.
    ///
    /// The stack is not attached anywhere yet.
    #[must_use]
    pub fn new_stack<C: EditContext>(
        &self,
        id: impl Into<String>,
        display_name: impl Into<String>,
        context: SharedContext<C>,
    ) -> HistoryStack<C> {
        HistoryStack::new(id, display_name, context, &self.clock)
            .with_max_depth(self.config.max_depth)
    }

    /// An empty detached group.
    #[must_use]
    pub fn new_group(
        &self,
        id: impl Into<String>,
        display_name: impl Into<String>,
    ) -> HistoryGroup {
        HistoryGroup::new(id, display_name)
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    /// Global undo. Returns `false` if nothing in the tree can undo.
    pub fn undo(&self) -> bool {
        let performed = self.root.perform_undo();
        debug!(target: "tessera.history", performed, "global undo");
        performed
    }

    /// Global redo. Returns `false` if nothing in the tree can redo.
    pub fn redo(&self) -> bool {
        let performed = self.root.perform_redo();
        debug!(target: "tessera.history", performed, "global redo");
        performed
    }

    /// Whether a global undo would act.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.root.can_undo()
    }

    /// Whether a global redo would act.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.root.can_redo()
    }

    /// Record a global undo would revert, for menu labels.
    #[must_use]
    pub fn peek_undo(&self) -> Option<RecordMeta> {
        self.root.peek_undo()
    }

    /// Record a global redo would reapply, for menu labels.
    #[must_use]
    pub fn peek_redo(&self) -> Option<RecordMeta> {
        self.root.peek_redo()
    }

    // ========================================================================
    // Structure
    // ========================================================================

    /// Attach a node under the root.
    ///
    /// # Errors
    ///
    /// See [`HistoryGroup::add_child`].
    pub fn add_child(&self, node: impl Into<HistoryNode>) -> HistoryResult {
        self.root.add_child(node)
    }

    /// Detach a direct child of the root.
    ///
    /// # Errors
    ///
    /// [`HistoryError::NotFound`] if the root has no such child.
    pub fn remove_child(&self, id: &str) -> HistoryResult<HistoryNode> {
        self.root.remove_child(id)
    }

    /// Find a node anywhere in the tree.
    #[must_use]
    pub fn find_by_id(&self, id: &str) -> Option<HistoryNode> {
        self.root.find_by_id(id)
    }

    /// Attach `node` under the group `parent_id`.
    ///
    /// # Errors
    ///
    /// [`HistoryError::NotFound`] if no node has `parent_id`,
    /// [`HistoryError::NotAGroup`] if it is a stack, or any
    /// [`HistoryGroup::add_child`] error.
    pub fn attach_to(&self, parent_id: &str, node: impl Into<HistoryNode>) -> HistoryResult {
        let parent = self.group(parent_id)?;
        parent.add_child(node)
    }

    /// Detach the node with `id` from wherever it sits in the tree.
    ///
    /// The detached node's history is dropped with the last handle; no
    /// global navigation reaches it afterwards.
    ///
    /// # Errors
    ///
    /// [`HistoryError::NotFound`] if no descendant of the root has `id`.
    pub fn detach(&self, id: &str) -> HistoryResult<HistoryNode> {
        self.root.detach_descendant(id)
    }

    /// Focus `child_id` inside the group `parent_id`.
    ///
    /// # Errors
    ///
    /// As [`attach_to`](Self::attach_to) for the parent lookup, then
    /// [`HistoryGroup::focus`].
    pub fn focus(&self, parent_id: &str, child_id: &str) -> HistoryResult {
        self.group(parent_id)?.focus(child_id)
    }

    /// Look up a group anywhere in the tree.
    ///
    /// # Errors
    ///
    /// [`HistoryError::NotFound`] or [`HistoryError::NotAGroup`].
    pub fn group(&self, id: &str) -> HistoryResult<HistoryGroup> {
        match self.root.find_by_id(id) {
            Some(HistoryNode::Group(group)) => Ok(group),
            Some(HistoryNode::Stack(_)) => Err(HistoryError::NotAGroup(id.to_owned())),
            None => Err(HistoryError::NotFound(id.to_owned())),
        }
    }

    /// Clear every stack in the tree.
    pub fn clear_all(&self) {
        self.root.clear_all();
    }

    /// Indented dump of the whole tree.
    #[must_use]
    pub fn debug_tree(&self) -> String {
        self.root.debug_tree()
    }
}
