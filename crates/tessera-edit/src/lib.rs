#![forbid(unsafe_code)]

//! Tessera edit domains
//!
//! Concrete history domains of the mesh editor, built on
//! [`tessera_history`]:
//!
//! - [`MeshBuffer`] - vertex positions and triangles; snapshot records for
//!   topology, [`VertexMoves`] deltas for drags
//! - [`CameraPose`] - orbit camera, snapshot records
//! - [`WorkPlane`] - construction plane, discrete toggles
//! - [`MeshList`] - scene meshes; [`MeshListEdit`] links a camera pose
//! - [`EditorHistory`] - the main window tree and its tool windows

pub mod camera;
pub mod editor;
pub mod mesh;
pub mod mesh_list;
pub mod work_plane;

pub use camera::{CameraPose, camera_drag};
pub use editor::{EditorContexts, EditorHistory};
pub use mesh::{MeshBuffer, VertexMoves, vertex_drag};
pub use mesh_list::{MeshEntry, MeshList, MeshListEdit};
pub use work_plane::{WorkPlane, move_origin, toggle_visibility};
