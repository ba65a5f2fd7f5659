#![forbid(unsafe_code)]

//! Errors for history tree management.
//!
//! Undo/redo at a boundary is not an error: navigation returns `false`.
//! Only structural operations on the tree (attach, detach, focus) and
//! singleton installation can fail.

use thiserror::Error;

/// Result alias for fallible history operations.
pub type HistoryResult<T = ()> = Result<T, HistoryError>;

/// Structural failures of the history tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    /// A sibling with the same id is already attached.
    #[error("group '{group}' already has a child with id '{id}'")]
    DuplicateId { group: String, id: String },
    /// No node with this id exists where it was looked up.
    #[error("no history node with id '{0}'")]
    NotFound(String),
    /// The node exists but is a stack, not a group.
    #[error("history node '{0}' is not a group")]
    NotAGroup(String),
    /// Attaching the node would make a group its own descendant.
    #[error("attaching '{child}' under '{parent}' would create a cycle")]
    Cycle { parent: String, child: String },
    /// The process-wide manager was already installed.
    #[error("history manager already initialized")]
    AlreadyInitialized,
}
