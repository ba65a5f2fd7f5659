#![forbid(unsafe_code)]

//! Standard history layout of the main editor window.
//!
//! ```text
//! <manager root>
//! └── MainWindow (TimestampOnly)
//!     ├── VertexEdit   HistoryStack<MeshBuffer>
//!     ├── Camera       HistoryStack<CameraPose>
//!     ├── WorkPlane    HistoryStack<WorkPlane>
//!     ├── MeshList     HistoryStack<MeshList>
//!     └── Tools (FocusedFirst)
//!         └── <one group per open tool window>
//! ```
//!
//! The window group is chronological: global undo reverts whichever domain
//! was edited last. Inside `Tools` the focused tool window wins.

use tessera_history::{
    DragSession, EditContext, FocusedFirst, HistoryError, HistoryGroup, HistoryManager,
    HistoryNode, HistoryResult, HistoryStack, SharedContext, TimestampOnly, shared,
};
use tracing::info;

use crate::camera::{CameraPose, camera_drag};
use crate::mesh::{MeshBuffer, vertex_drag};
use crate::mesh_list::{MeshList, MeshListEdit};
use crate::work_plane::WorkPlane;

pub const WINDOW_ID: &str = "MainWindow";
pub const VERTEX_EDIT_ID: &str = "VertexEdit";
pub const CAMERA_ID: &str = "Camera";
pub const WORK_PLANE_ID: &str = "WorkPlane";
pub const MESH_LIST_ID: &str = "MeshList";
pub const TOOLS_ID: &str = "Tools";

/// Contexts edited by the main window.
#[derive(Debug, Clone)]
pub struct EditorContexts {
    pub mesh: SharedContext<MeshBuffer>,
    pub camera: SharedContext<CameraPose>,
    pub work_plane: SharedContext<WorkPlane>,
    pub mesh_list: SharedContext<MeshList>,
}

impl Default for EditorContexts {
    fn default() -> Self {
        Self {
            mesh: shared(MeshBuffer::default()),
            camera: shared(CameraPose::default()),
            work_plane: shared(WorkPlane::default()),
            mesh_list: shared(MeshList::default()),
        }
    }
}

/// The main window's history tree, attached under a manager root.
#[derive(Debug, Clone)]
pub struct EditorHistory {
    manager: HistoryManager,
    window: HistoryGroup,
    tools: HistoryGroup,
    vertex_edit: HistoryStack<MeshBuffer>,
    camera: HistoryStack<CameraPose>,
    work_plane: HistoryStack<WorkPlane>,
    mesh_list: HistoryStack<MeshList>,
}

impl EditorHistory {
    /// Build the window tree and attach it to `manager`'s root.
    ///
    /// # Errors
    ///
    /// Fails if the root already has a child named [`WINDOW_ID`].
    pub fn attach(manager: &HistoryManager, contexts: EditorContexts) -> HistoryResult<Self> {
        let window = manager
            .new_group(WINDOW_ID, "Main Window")
            .with_policy(TimestampOnly);
        let vertex_edit = manager.new_stack(VERTEX_EDIT_ID, "Vertex Edit", contexts.mesh);
        let camera = manager.new_stack(CAMERA_ID, "Camera", contexts.camera);
        let work_plane = manager.new_stack(WORK_PLANE_ID, "Work Plane", contexts.work_plane);
        let mesh_list = manager.new_stack(MESH_LIST_ID, "Mesh List", contexts.mesh_list);
        let tools = manager.new_group(TOOLS_ID, "Tools").with_policy(FocusedFirst);

        window.add_child(&vertex_edit)?;
        window.add_child(&camera)?;
        window.add_child(&work_plane)?;
        window.add_child(&mesh_list)?;
        window.add_child(&tools)?;
        manager.add_child(&window)?;

        info!(target: "tessera.edit", window = WINDOW_ID, "editor history attached");
        Ok(Self {
            manager: manager.clone(),
            window,
            tools,
            vertex_edit,
            camera,
            work_plane,
            mesh_list,
        })
    }

    /// Detach the window tree from the manager.
    ///
    /// # Errors
    ///
    /// [`HistoryError::NotFound`] if it was already detached.
    pub fn detach(&self) -> HistoryResult {
        self.manager.detach(WINDOW_ID)?;
        info!(target: "tessera.edit", window = WINDOW_ID, "editor history detached");
        Ok(())
    }

    #[must_use]
    pub fn manager(&self) -> &HistoryManager {
        &self.manager
    }

    #[must_use]
    pub fn window(&self) -> &HistoryGroup {
        &self.window
    }

    #[must_use]
    pub fn tools(&self) -> &HistoryGroup {
        &self.tools
    }

    #[must_use]
    pub fn vertex_edit(&self) -> &HistoryStack<MeshBuffer> {
        &self.vertex_edit
    }

    #[must_use]
    pub fn camera(&self) -> &HistoryStack<CameraPose> {
        &self.camera
    }

    #[must_use]
    pub fn work_plane(&self) -> &HistoryStack<WorkPlane> {
        &self.work_plane
    }

    #[must_use]
    pub fn mesh_list(&self) -> &HistoryStack<MeshList> {
        &self.mesh_list
    }

    // ========================================================================
    // Authoring helpers
    // ========================================================================

    #[must_use]
    pub fn vertex_drag(&self) -> DragSession<MeshBuffer> {
        vertex_drag(&self.vertex_edit)
    }

    #[must_use]
    pub fn camera_drag(&self) -> DragSession<CameraPose> {
        camera_drag(&self.camera)
    }

    #[must_use]
    pub fn work_plane_session(&self) -> DragSession<WorkPlane> {
        DragSession::new(&self.work_plane)
    }

    /// Start a mesh-list edit that also restores the camera.
    #[must_use]
    pub fn mesh_list_edit(&self) -> MeshListEdit {
        MeshListEdit::begin(&self.mesh_list).with_camera(self.camera.context())
    }

    // ========================================================================
    // Tool windows
    // ========================================================================

    /// Attach a group for a tool window under `Tools` and focus it.
    ///
    /// # Errors
    ///
    /// [`HistoryError::DuplicateId`] if a tool window with this id is open.
    pub fn open_tool_window(
        &self,
        id: impl Into<String>,
        display_name: impl Into<String>,
    ) -> HistoryResult<HistoryGroup> {
        let group = self.manager.new_group(id, display_name);
        self.tools.add_child(&group)?;
        self.tools.focus(group.id())?;
        info!(target: "tessera.edit", tool = %group.id(), "tool window opened");
        Ok(group)
    }

    /// Create a stack inside an open tool window.
    ///
    /// # Errors
    ///
    /// `NotFound`/`NotAGroup` if `tool_id` is not an open tool window,
    /// `DuplicateId` if the stack id is taken inside it.
    pub fn add_tool_stack<C: EditContext>(
        &self,
        tool_id: &str,
        stack_id: impl Into<String>,
        display_name: impl Into<String>,
        context: SharedContext<C>,
    ) -> HistoryResult<HistoryStack<C>> {
        let tool = self.tool_window(tool_id)?;
        let stack = self.manager.new_stack(stack_id, display_name, context);
        tool.add_child(&stack)?;
        Ok(stack)
    }

    /// Focus an open tool window.
    ///
    /// # Errors
    ///
    /// `NotFound` if no tool window has this id.
    pub fn focus_tool(&self, id: &str) -> HistoryResult {
        self.tools.focus(id)
    }

    /// Detach a tool window. Its records become unreachable.
    ///
    /// # Errors
    ///
    /// `NotFound` if no tool window has this id.
    pub fn close_tool_window(&self, id: &str) -> HistoryResult<HistoryNode> {
        let node = self.tools.remove_child(id)?;
        info!(target: "tessera.edit", tool = %id, "tool window closed");
        Ok(node)
    }

    /// Ids of open tool windows, in opening order.
    #[must_use]
    pub fn tool_window_ids(&self) -> Vec<String> {
        self.tools.children_ids()
    }

    fn tool_window(&self, id: &str) -> HistoryResult<HistoryGroup> {
        let node = self
            .tools
            .children()
            .into_iter()
            .find(|c| c.id() == id)
            .ok_or_else(|| HistoryError::NotFound(id.to_owned()))?;
        node.as_group()
            .cloned()
            .ok_or_else(|| HistoryError::NotAGroup(id.to_owned()))
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Global undo through the manager.
    pub fn undo(&self) -> bool {
        self.manager.undo()
    }

    /// Global redo through the manager.
    pub fn redo(&self) -> bool {
        self.manager.redo()
    }

    /// Record the document state as saved. View state (camera, work plane)
    /// does not affect dirtiness.
    pub fn mark_saved(&self) {
        self.vertex_edit.mark_clean();
        self.mesh_list.mark_clean();
    }

    /// Whether the document differs from the last save.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.vertex_edit.is_dirty() || self.mesh_list.is_dirty()
    }

    /// Drop all history of the window and its tools.
    pub fn clear(&self) {
        self.window.clear_all();
    }

    #[must_use]
    pub fn debug_tree(&self) -> String {
        self.window.debug_tree()
    }
}
