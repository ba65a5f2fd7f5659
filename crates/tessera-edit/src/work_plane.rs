#![forbid(unsafe_code)]

//! Work-plane domain: a construction plane users place and show/hide.

use glam::Vec3;
use tessera_history::{DragSession, EditContext, RecordMeta};

const PLANE_EPSILON: f32 = 1e-5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkPlane {
    pub origin: Vec3,
    /// Unit normal.
    pub normal: Vec3,
    pub visible: bool,
}

impl Default for WorkPlane {
    fn default() -> Self {
        Self {
            origin: Vec3::ZERO,
            normal: Vec3::Y,
            visible: false,
        }
    }
}

impl WorkPlane {
    /// Set the normal. A zero vector keeps the current normal.
    pub fn set_normal(&mut self, normal: Vec3) {
        let n = normal.normalize_or_zero();
        if n != Vec3::ZERO {
            self.normal = n;
        }
    }

    /// Signed distance of `point` from the plane.
    #[must_use]
    pub fn signed_distance(&self, point: Vec3) -> f32 {
        (point - self.origin).dot(self.normal)
    }

    /// Orthogonal projection of `point` onto the plane.
    #[must_use]
    pub fn project(&self, point: Vec3) -> Vec3 {
        point - self.normal * self.signed_distance(point)
    }
}

impl EditContext for WorkPlane {
    type Snapshot = WorkPlane;

    fn snapshot(&self) -> WorkPlane {
        *self
    }

    fn restore(&mut self, snapshot: &WorkPlane) {
        *self = *snapshot;
    }

    fn is_different(a: &WorkPlane, b: &WorkPlane) -> bool {
        a.visible != b.visible
            || !a.origin.abs_diff_eq(b.origin, PLANE_EPSILON)
            || !a.normal.abs_diff_eq(b.normal, PLANE_EPSILON)
    }
}

/// Flip visibility and record it as one discrete entry.
pub fn toggle_visibility(session: &DragSession<WorkPlane>) -> Option<RecordMeta> {
    let context = session.stack().context();
    let before = *context.borrow();
    let after = WorkPlane {
        visible: !before.visible,
        ..before
    };
    *context.borrow_mut() = after;
    let description = if after.visible {
        "Show work plane"
    } else {
        "Hide work plane"
    };
    session.record_immediate(before, after, description)
}

/// Move the plane origin and record it, unless the origin did not change.
pub fn move_origin(session: &DragSession<WorkPlane>, origin: Vec3) -> Option<RecordMeta> {
    let context = session.stack().context();
    let before = *context.borrow();
    context.borrow_mut().origin = origin;
    let after = *context.borrow();
    session.record_immediate(before, after, "Move work plane")
}
