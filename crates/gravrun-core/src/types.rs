//! Core types used throughout Gravrun

use glam::Vec3;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for placed world objects (volumes, checkpoints)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(pub Uuid);

impl EntityId {
    /// Create a new random entity ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

/// Overlap shape of a trigger volume
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TriggerShape {
    /// Sphere around a center point
    Sphere { center: Vec3, radius: f32 },
    /// Axis-aligned box given by its center and half extents
    Box { center: Vec3, half_extents: Vec3 },
}

impl TriggerShape {
    /// Create a spherical trigger
    pub fn sphere(center: Vec3, radius: f32) -> Self {
        Self::Sphere { center, radius }
    }

    /// Create an axis-aligned box trigger
    pub fn cuboid(center: Vec3, half_extents: Vec3) -> Self {
        Self::Box {
            center,
            half_extents: half_extents.abs(),
        }
    }

    /// Whether a point lies inside the trigger
    pub fn contains(&self, point: Vec3) -> bool {
        match *self {
            Self::Sphere { center, radius } => point.distance_squared(center) <= radius * radius,
            Self::Box {
                center,
                half_extents,
            } => {
                let d = (point - center).abs();
                d.x <= half_extents.x && d.y <= half_extents.y && d.z <= half_extents.z
            }
        }
    }

    /// Center of the trigger
    pub fn center(&self) -> Vec3 {
        match *self {
            Self::Sphere { center, .. } | Self::Box { center, .. } => center,
        }
    }
}
