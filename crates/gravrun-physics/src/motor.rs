//! The collision collaborator used by the movement core
//!
//! The movement controller never resolves contacts itself. Each tick it asks a
//! [`KinematicMotor`] whether probes hit anything and hands it the desired
//! translation; the motor answers with the translation it actually applied and
//! the surfaces it touched on the way.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Bit mask matching every collision group
pub const ALL_GROUPS: u32 = u32::MAX;

/// Dimensions of the player capsule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapsuleShape {
    /// Total height, cap to cap (default: 2.0m)
    pub height: f32,
    /// Radius (default: 0.5m)
    pub radius: f32,
    /// Extra reach added to ground and ceiling probes (default: 0.08m)
    pub skin_width: f32,
}

impl Default for CapsuleShape {
    fn default() -> Self {
        Self {
            height: 2.0,
            radius: 0.5,
            skin_width: 0.08,
        }
    }
}

impl CapsuleShape {
    /// Half of the total height
    pub fn half_height(&self) -> f32 {
        self.height * 0.5
    }

    /// Half length of the inner segment (excluding the hemispherical caps)
    pub fn segment_half_height(&self) -> f32 {
        (self.half_height() - self.radius).max(0.0)
    }

    /// Distance from the center to the capsule surface along a unit `normal`
    pub fn support_distance(&self, normal: Vec3, up: Vec3) -> f32 {
        self.radius + self.segment_half_height() * normal.dot(up).abs()
    }
}

/// Which sides of the body touched something during a move
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContactFlags {
    /// Something under the feet
    pub below: bool,
    /// Something over the head
    pub above: bool,
    /// Something against the sides
    pub sides: bool,
}

impl ContactFlags {
    /// Whether any contact was recorded
    pub fn any(&self) -> bool {
        self.below || self.above || self.sides
    }
}

/// Result of a collision-resolved move
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MoveOutcome {
    /// Translation that was actually applied
    pub translation: Vec3,
    /// Surfaces touched while moving
    pub contacts: ContactFlags,
}

/// Collision queries and movement resolution for a single capsule body
///
/// Positions are capsule centers. `up` is the unit axis the capsule is
/// aligned with, opposite to the current gravity direction.
pub trait KinematicMotor {
    /// Capsule dimensions used for probes and movement
    fn shape(&self) -> CapsuleShape;

    /// Sweep a sphere of `radius` from `origin` along the unit `direction`
    ///
    /// Returns true when a collider in `mask` is hit within `max_distance`.
    fn sphere_cast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        radius: f32,
        mask: u32,
    ) -> bool;

    /// Cast a ray, returning true when a collider in `mask` is hit within `max_distance`
    fn ray_cast(&self, origin: Vec3, direction: Vec3, max_distance: f32, mask: u32) -> bool;

    /// Move the body from `position` by `translation`, sliding along contacts
    fn move_body(&mut self, position: Vec3, translation: Vec3, up: Vec3, dt: f32) -> MoveOutcome;

    /// Place the body without sweeping (respawn, spawn)
    fn teleport(&mut self, _position: Vec3, _up: Vec3) {}
}
