//! The simulated capsule: position, yaw-facing and camera pitch

use glam::{Mat3, Quat, Vec3};
use gravrun_core::math::{planar_direction, project_on_plane, WORLD_FORWARD};

/// Body pose. Position is the capsule center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub position: Vec3,
    facing: Vec3,
    pitch: f32,
}

impl Body {
    /// Body at `position` facing world forward under default gravity
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            facing: WORLD_FORWARD,
            pitch: 0.0,
        }
    }

    /// Unit facing in the gravity plane
    pub fn forward(&self) -> Vec3 {
        self.facing
    }

    /// Unit right vector for the given up axis
    pub fn right(&self, up: Vec3) -> Vec3 {
        self.facing.cross(up)
    }

    /// Camera pitch in degrees, positive looking down
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Body rotation (yaw only): local -Z maps to `forward`, local +Y to `up`
    pub fn rotation(&self, up: Vec3) -> Quat {
        Quat::from_mat3(&Mat3::from_cols(self.right(up), up, -self.facing))
    }

    /// Turn counter-clockwise about `up`
    pub fn rotate_yaw(&mut self, radians: f32, up: Vec3) {
        let turned = Quat::from_axis_angle(up, radians) * self.facing;
        self.facing = planar_direction(turned, &[self.facing], up);
    }

    /// Apply a pitch delta, clamped to `±limit` degrees
    pub fn add_pitch(&mut self, degrees: f32, limit: f32) {
        self.pitch = (self.pitch + degrees).clamp(-limit, limit);
    }

    /// Face the yaw of `rotation`, keeping the facing in the plane of `up`
    pub fn set_rotation(&mut self, rotation: Quat, up: Vec3) {
        self.facing = planar_direction(
            rotation * WORLD_FORWARD,
            &[rotation * Vec3::Y, self.facing],
            up,
        );
    }

    /// Re-project the facing after the up axis changed
    ///
    /// A facing that ends up parallel to the new axis turns toward the old up,
    /// which is where a quarter turn of gravity would carry it.
    pub fn reorient(&mut self, old_up: Vec3, new_up: Vec3) {
        let preferred = project_on_plane(self.facing, new_up);
        self.facing = planar_direction(preferred, &[old_up], new_up);
    }
}
