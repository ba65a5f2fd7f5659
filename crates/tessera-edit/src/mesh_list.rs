#![forbid(unsafe_code)]

//! Mesh-list domain and the composite mesh-list + camera record.
//!
//! Adding or removing a mesh often reframes the camera. [`MeshListEdit`]
//! records both as one [`Change::Linked`] entry on the mesh-list stack, so
//! undoing the list edit also puts the camera back.

use std::rc::Rc;

use tessera_history::{
    Change, EditContext, HistoryStack, RecordMeta, SharedContext, SnapshotRestore,
};

use crate::camera::CameraPose;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeshEntry {
    pub name: String,
    pub visible: bool,
    pub locked: bool,
}

impl MeshEntry {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visible: true,
            locked: false,
        }
    }
}

/// Ordered meshes of a scene and the current selection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MeshList {
    pub entries: Vec<MeshEntry>,
    pub current: Option<usize>,
}

impl MeshList {
    /// Append a mesh and make it current.
    pub fn add(&mut self, name: impl Into<String>) -> usize {
        self.entries.push(MeshEntry::new(name));
        let index = self.entries.len() - 1;
        self.current = Some(index);
        index
    }

    /// Remove a mesh. The selection moves to the previous entry.
    pub fn remove(&mut self, index: usize) -> Option<MeshEntry> {
        if index >= self.entries.len() {
            return None;
        }
        let entry = self.entries.remove(index);
        self.current = match self.current {
            _ if self.entries.is_empty() => None,
            Some(c) if c > index => Some(c - 1),
            Some(c) if c == index => Some(index.saturating_sub(1)),
            other => other,
        };
        Some(entry)
    }

    /// Select an entry. Returns `false` if out of range.
    pub fn select(&mut self, index: usize) -> bool {
        if index < self.entries.len() {
            self.current = Some(index);
            true
        } else {
            false
        }
    }

    #[must_use]
    pub fn current_entry(&self) -> Option<&MeshEntry> {
        self.current.and_then(|i| self.entries.get(i))
    }

    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl EditContext for MeshList {
    type Snapshot = MeshList;

    fn snapshot(&self) -> MeshList {
        self.clone()
    }

    fn restore(&mut self, snapshot: &MeshList) {
        self.clone_from(snapshot);
    }

    fn is_different(a: &MeshList, b: &MeshList) -> bool {
        a != b
    }
}

/// In-progress mesh-list edit, optionally linked with a camera pose.
///
/// ```
/// use tessera_edit::{CameraPose, MeshList, MeshListEdit};
/// use tessera_history::{HistoryStack, shared};
///
/// let camera = shared(CameraPose::default());
/// let mesh_list = HistoryStack::standalone("MeshList", "Mesh List", shared(MeshList::default()));
///
/// let edit = MeshListEdit::begin(&mesh_list).with_camera(&camera);
/// mesh_list.context().borrow_mut().add("Head");
/// camera.borrow_mut().dolly(0.5);
/// assert!(edit.commit("Add mesh").is_some());
///
/// assert!(mesh_list.undo());
/// assert!(mesh_list.context().borrow().is_empty());
/// assert_eq!(*camera.borrow(), CameraPose::default());
/// ```
#[derive(Debug)]
pub struct MeshListEdit {
    stack: HistoryStack<MeshList>,
    before: MeshList,
    camera: Option<(SharedContext<CameraPose>, CameraPose)>,
}

impl MeshListEdit {
    /// Capture the mesh list before the edit.
    #[must_use]
    pub fn begin(stack: &HistoryStack<MeshList>) -> Self {
        Self {
            stack: stack.clone(),
            before: stack.context().borrow().snapshot(),
            camera: None,
        }
    }

    /// Also capture `camera` and restore it alongside the list.
    #[must_use]
    pub fn with_camera(mut self, camera: &SharedContext<CameraPose>) -> Self {
        let pose = *camera.borrow();
        self.camera = Some((Rc::clone(camera), pose));
        self
    }

    /// Push the edit. `None` if neither the list nor the camera changed.
    pub fn commit(self, description: impl Into<String>) -> Option<RecordMeta> {
        let after = self.stack.context().borrow().snapshot();
        let list_changed = MeshList::is_different(&self.before, &after);
        let camera = self.camera.map(|(context, before)| {
            let after = *context.borrow();
            (context, before, after)
        });
        let camera_changed = camera
            .as_ref()
            .is_some_and(|(_, before, after)| CameraPose::is_different(before, after));
        if !list_changed && !camera_changed {
            return None;
        }

        let mut change = Change::snapshot(self.before, after);
        if let Some((context, before, after)) = camera {
            change = change.with_auxiliary(SnapshotRestore::new(context, before, after));
        }
        Some(self.stack.record(change, description))
    }
}
