#![forbid(unsafe_code)]

//! Vertex-edit domain.
//!
//! Topology edits (extrude, delete, weld) record whole-buffer snapshots.
//! Vertex drags record a [`VertexMoves`] delta holding only the moved
//! indices, so a drag over a large mesh stays cheap to keep in history.

use glam::Vec3;
use tessera_history::{Change, Delta, DragSession, EditContext, HistoryStack};
use tracing::warn;

/// Positions closer than this compare equal.
pub const POSITION_EPSILON: f32 = 1e-6;

/// Editable mesh: vertex positions plus triangle indices.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MeshBuffer {
    pub positions: Vec<Vec3>,
    pub triangles: Vec<[u32; 3]>,
}

impl MeshBuffer {
    #[must_use]
    pub fn new(positions: Vec<Vec3>, triangles: Vec<[u32; 3]>) -> Self {
        Self {
            positions,
            triangles,
        }
    }

    /// Unit quad in the XZ plane, two triangles.
    #[must_use]
    pub fn quad() -> Self {
        Self::new(
            vec![
                Vec3::new(-0.5, 0.0, -0.5),
                Vec3::new(0.5, 0.0, -0.5),
                Vec3::new(0.5, 0.0, 0.5),
                Vec3::new(-0.5, 0.0, 0.5),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        )
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Translate the given vertices. Out-of-range indices are skipped.
    pub fn translate(&mut self, indices: &[u32], offset: Vec3) {
        for &index in indices {
            if let Some(p) = self.positions.get_mut(index as usize) {
                *p += offset;
            }
        }
    }

    /// Scale the given vertices about their centroid.
    pub fn scale(&mut self, indices: &[u32], factor: f32) {
        let picked: Vec<Vec3> = indices
            .iter()
            .filter_map(|&i| self.positions.get(i as usize).copied())
            .collect();
        if picked.is_empty() {
            return;
        }
        let centroid = picked.iter().fold(Vec3::ZERO, |acc, p| acc + *p) / picked.len() as f32;
        for &index in indices {
            if let Some(p) = self.positions.get_mut(index as usize) {
                *p = centroid + (*p - centroid) * factor;
            }
        }
    }

    /// Append a vertex, returning its index.
    pub fn add_vertex(&mut self, position: Vec3) -> u32 {
        self.positions.push(position);
        (self.positions.len() - 1) as u32
    }

    /// Append a triangle.
    pub fn add_triangle(&mut self, triangle: [u32; 3]) {
        self.triangles.push(triangle);
    }

    fn same_positions(a: &[Vec3], b: &[Vec3]) -> bool {
        a.len() == b.len()
            && a.iter()
                .zip(b)
                .all(|(p, q)| p.abs_diff_eq(*q, POSITION_EPSILON))
    }
}

impl EditContext for MeshBuffer {
    type Snapshot = MeshBuffer;

    fn snapshot(&self) -> MeshBuffer {
        self.clone()
    }

    fn restore(&mut self, snapshot: &MeshBuffer) {
        self.clone_from(snapshot);
    }

    fn is_different(a: &MeshBuffer, b: &MeshBuffer) -> bool {
        a.triangles != b.triangles || !Self::same_positions(&a.positions, &b.positions)
    }
}

/// Position patch for a set of vertices.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VertexMoves {
    indices: Vec<u32>,
    old: Vec<Vec3>,
    new: Vec<Vec3>,
}

impl VertexMoves {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one moved vertex.
    pub fn push(&mut self, index: u32, old: Vec3, new: Vec3) {
        self.indices.push(index);
        self.old.push(old);
        self.new.push(new);
    }

    /// Builder form of [`push`](Self::push).
    #[must_use]
    pub fn with(mut self, index: u32, old: Vec3, new: Vec3) -> Self {
        self.push(index, old, new);
        self
    }

    /// Moves between two buffers of identical topology.
    ///
    /// `None` if the topology differs; the caller records a snapshot then.
    #[must_use]
    pub fn between(before: &MeshBuffer, after: &MeshBuffer) -> Option<Self> {
        if before.triangles != after.triangles || before.positions.len() != after.positions.len()
        {
            return None;
        }
        let mut moves = Self::new();
        for (index, (old, new)) in before.positions.iter().zip(&after.positions).enumerate() {
            if !old.abs_diff_eq(*new, POSITION_EPSILON) {
                moves.push(index as u32, *old, *new);
            }
        }
        Some(moves)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    #[must_use]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    fn write(&self, mesh: &mut MeshBuffer, values: &[Vec3]) {
        let len = mesh.positions.len();
        for (&index, &value) in self.indices.iter().zip(values) {
            debug_assert!(
                (index as usize) < len,
                "vertex index {index} out of range for {len} vertices"
            );
            match mesh.positions.get_mut(index as usize) {
                Some(slot) => *slot = value,
                None => warn!(
                    target: "tessera.edit",
                    index,
                    len,
                    "vertex move skipped: index out of range"
                ),
            }
        }
    }
}

impl Delta<MeshBuffer> for VertexMoves {
    fn apply(&self, context: &mut MeshBuffer) {
        self.write(context, &self.new);
    }

    fn revert(&self, context: &mut MeshBuffer) {
        self.write(context, &self.old);
    }

    fn label(&self) -> &'static str {
        "vertex-moves"
    }
}

/// Drag session that records moved vertices as a delta, falling back to a
/// snapshot when the gesture changed topology.
#[must_use]
pub fn vertex_drag(stack: &HistoryStack<MeshBuffer>) -> DragSession<MeshBuffer> {
    DragSession::new(stack).with_builder(|before, after| {
        match VertexMoves::between(before, after) {
            Some(moves) => Change::delta(moves),
            None => Change::snapshot(before.clone(), after.clone()),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_history::shared;

    fn quad_stack() -> HistoryStack<MeshBuffer> {
        HistoryStack::standalone("VertexEdit", "Vertex Edit", shared(MeshBuffer::quad()))
    }

    #[test]
    fn moves_between_detects_changed_vertices() {
        let before = MeshBuffer::quad();
        let mut after = before.clone();
        after.translate(&[1, 3], Vec3::Y);
        let moves = VertexMoves::between(&before, &after).unwrap();
        assert_eq!(moves.indices(), &[1, 3]);
        assert_eq!(moves.len(), 2);
    }

    #[test]
    fn moves_between_rejects_topology_change() {
        let before = MeshBuffer::quad();
        let mut after = before.clone();
        after.add_vertex(Vec3::ONE);
        assert!(VertexMoves::between(&before, &after).is_none());
    }

    #[test]
    fn delta_apply_and_revert() {
        let mut mesh = MeshBuffer::quad();
        let original = mesh.positions[2];
        let moves = VertexMoves::new().with(2, original, Vec3::new(4.0, 0.0, 0.0));
        moves.apply(&mut mesh);
        assert_eq!(mesh.positions[2], Vec3::new(4.0, 0.0, 0.0));
        moves.revert(&mut mesh);
        assert_eq!(mesh.positions[2], original);
        assert_eq!(moves.label(), "vertex-moves");
    }

    #[test]
    fn comparator_ignores_float_noise() {
        let a = MeshBuffer::quad();
        let mut b = a.clone();
        b.positions[0].x += 1e-8;
        assert!(!MeshBuffer::is_different(&a, &b));
        b.positions[0].x += 1e-3;
        assert!(MeshBuffer::is_different(&a, &b));
    }

    #[test]
    fn vertex_drag_records_delta() {
        let stack = quad_stack();
        let mut drag = vertex_drag(&stack);
        drag.begin_drag();
        for _ in 0..5 {
            stack.context().borrow_mut().translate(&[0], Vec3::X * 0.1);
        }
        drag.end_drag("Move vertex").unwrap();
        assert_eq!(stack.len(), 1);

        stack.undo();
        assert_eq!(*stack.context().borrow(), MeshBuffer::quad());
    }

    #[test]
    fn vertex_drag_with_new_geometry_records_snapshot() {
        let stack = quad_stack();
        let mut drag = vertex_drag(&stack);
        drag.begin_drag();
        {
            let mut mesh = stack.context().borrow_mut();
            let v = mesh.add_vertex(Vec3::new(0.0, 1.0, 0.0));
            mesh.add_triangle([0, 1, v]);
        }
        drag.end_drag("Extrude");
        stack.undo();
        assert_eq!(stack.context().borrow().vertex_count(), 4);
        stack.redo();
        assert_eq!(stack.context().borrow().triangle_count(), 3);
    }

    #[test]
    fn scale_about_centroid() {
        let mut mesh = MeshBuffer::quad();
        mesh.scale(&[0, 1, 2, 3], 2.0);
        assert!(mesh.positions[2].abs_diff_eq(Vec3::new(1.0, 0.0, 1.0), 1e-6));
        mesh.scale(&[], 3.0);
        mesh.scale(&[99], 3.0);
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "out of range")]
    fn out_of_range_move_asserts_in_debug() {
        let mut mesh = MeshBuffer::quad();
        VertexMoves::new()
            .with(42, Vec3::ZERO, Vec3::ONE)
            .apply(&mut mesh);
    }

    #[cfg(not(debug_assertions))]
    #[test]
    fn out_of_range_move_is_skipped_in_release() {
        let mut mesh = MeshBuffer::quad();
        VertexMoves::new()
            .with(42, Vec3::ZERO, Vec3::ONE)
            .with(1, mesh.positions[1], Vec3::ONE)
            .apply(&mut mesh);
        assert_eq!(mesh.positions[1], Vec3::ONE);
        assert_eq!(mesh.vertex_count(), 4);
    }
}
