#![forbid(unsafe_code)]

//! Camera/view domain. Snapshot style: a pose is small and copyable.

use glam::{Mat4, Quat, Vec3};
use tessera_history::{DragSession, EditContext, HistoryStack};

const POSE_EPSILON: f32 = 1e-5;

/// Orbit camera pose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in radians.
    pub fov_y: f32,
}

impl Default for CameraPose {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, 5.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y: 45f32.to_radians(),
        }
    }
}

impl CameraPose {
    #[must_use]
    pub fn look_at(eye: Vec3, target: Vec3) -> Self {
        Self {
            eye,
            target,
            ..Self::default()
        }
    }

    /// Distance from eye to target.
    #[must_use]
    pub fn distance(&self) -> f32 {
        self.eye.distance(self.target)
    }

    /// Right-handed view matrix.
    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    /// Rotate the eye around the target about the up axis.
    pub fn orbit(&mut self, yaw: f32) {
        let rotation = Quat::from_axis_angle(self.up.normalize_or_zero(), yaw);
        self.eye = self.target + rotation * (self.eye - self.target);
    }

    /// Scale the eye-target distance by `factor`. Non-positive factors are
    /// ignored.
    pub fn dolly(&mut self, factor: f32) {
        if factor > 0.0 {
            self.eye = self.target + (self.eye - self.target) * factor;
        }
    }

    /// Move eye and target together.
    pub fn pan(&mut self, offset: Vec3) {
        self.eye += offset;
        self.target += offset;
    }
}

impl EditContext for CameraPose {
    type Snapshot = CameraPose;

    fn snapshot(&self) -> CameraPose {
        *self
    }

    fn restore(&mut self, snapshot: &CameraPose) {
        *self = *snapshot;
    }

    fn is_different(a: &CameraPose, b: &CameraPose) -> bool {
        !a.eye.abs_diff_eq(b.eye, POSE_EPSILON)
            || !a.target.abs_diff_eq(b.target, POSE_EPSILON)
            || !a.up.abs_diff_eq(b.up, POSE_EPSILON)
            || (a.fov_y - b.fov_y).abs() > POSE_EPSILON
    }
}

/// Drag session for orbit/pan/dolly gestures.
#[must_use]
pub fn camera_drag(stack: &HistoryStack<CameraPose>) -> DragSession<CameraPose> {
    DragSession::new(stack)
}
