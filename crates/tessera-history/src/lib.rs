#![forbid(unsafe_code)]

//! Tessera History
//!
//! Hierarchical, multi-domain undo/redo for editors with several live edit
//! histories at once: mesh topology, camera, work-plane, mesh list and a
//! dynamic set of tool windows. One global undo command decides which
//! domain acts.
//!
//! # Key Components
//!
//! - [`Record`] / [`Change`] - Reversible unit of change (snapshot, delta, batch, linked)
//! - [`HistoryStack`] - Linear undo/redo log bound to one context
//! - [`HistoryGroup`] - Composite node resolving undo/redo among children
//! - [`ResolutionPolicy`] - [`FocusedFirst`] and [`TimestampOnly`] built-ins
//! - [`HistoryManager`] - Root of the tree, shared clock, global commands
//! - [`DragSession`] - Coalesces a gesture into one record
//!
//! # Architecture
//!
//! ```text
//! HistoryManager (root group, TimestampOnly)
//! ├── HistoryStack<MeshBuffer>   "VertexEdit"
//! ├── HistoryStack<CameraPose>   "Camera"
//! └── HistoryGroup               "Tools" (FocusedFirst)
//!     ├── HistoryGroup           "Sculpt"
//!     └── HistoryGroup           "Paint"
//! ```
//!
//! Every record is stamped from one [`LogicalClock`] at push time, so undo
//! can compare edits across domains.
//!
//! # Threading
//!
//! Everything is single-threaded (`Rc`/`RefCell`). Listeners run after the
//! stack releases its borrow, so re-entering `push`/`undo`/`redo` from a
//! listener is allowed and applies at once. A push from an undo listener
//! discards the redo branch; callers defer follow-up edits to avoid that.

pub mod clock;
pub mod config;
pub mod context;
pub mod drag;
pub mod error;
pub mod group;
pub mod listener;
pub mod manager;
pub mod node;
pub mod policy;
pub mod record;
pub mod stack;

pub use clock::{LogicalClock, Timestamp};
#[cfg(feature = "config")]
pub use config::ConfigError;
pub use config::HistoryConfig;
pub use context::{EditContext, SharedContext, shared};
pub use drag::DragSession;
pub use error::{HistoryError, HistoryResult};
pub use group::HistoryGroup;
pub use listener::{ListenerId, ListenerSet, NavigationInfo};
pub use manager::HistoryManager;
pub use node::{Candidate, HistoryNode};
pub use policy::{FocusedFirst, PolicyKind, ResolutionPolicy, TimestampOnly, chronological};
pub use record::{Auxiliary, Change, Delta, Direction, Record, RecordMeta, SnapshotRestore};
pub use stack::{HistoryStack, StackNode};
