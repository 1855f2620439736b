//! Analytic motor over infinite static planes
//!
//! Cheap and fully deterministic, which makes it the motor of choice for
//! headless runs and tests. Each plane is a half-space: points with
//! `normal · p < offset` are solid.

use glam::Vec3;

use crate::motor::{CapsuleShape, ContactFlags, KinematicMotor, MoveOutcome, ALL_GROUPS};

/// Contact tolerance used when classifying touches
const TOUCH_EPSILON: f32 = 1.0e-4;

/// Cosine above which a contact normal counts as floor or ceiling
const FLOOR_COSINE: f32 = 0.7;

/// One solid half-space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaticPlane {
    /// Unit normal pointing out of the solid
    pub normal: Vec3,
    /// Plane offset along the normal
    pub offset: f32,
    /// Collision group membership bits
    pub groups: u32,
}

impl StaticPlane {
    /// Signed distance from a point to the plane surface
    pub fn distance(&self, point: Vec3) -> f32 {
        self.normal.dot(point) - self.offset
    }
}

/// Kinematic motor resolving against a set of planes
#[derive(Debug, Clone, Default)]
pub struct PlaneMotor {
    shape: CapsuleShape,
    planes: Vec<StaticPlane>,
}

impl PlaneMotor {
    /// Create a motor with no planes
    pub fn new(shape: CapsuleShape) -> Self {
        Self {
            shape,
            planes: Vec::new(),
        }
    }

    /// Add a plane through `point` facing `normal`, in every collision group
    pub fn with_plane(self, normal: Vec3, point: Vec3) -> Self {
        self.with_plane_in_groups(normal, point, ALL_GROUPS)
    }

    /// Add a plane through `point` facing `normal`, with explicit group bits
    pub fn with_plane_in_groups(mut self, normal: Vec3, point: Vec3, groups: u32) -> Self {
        let normal = normal.normalize_or_zero();
        if normal != Vec3::ZERO {
            self.planes.push(StaticPlane {
                normal,
                offset: normal.dot(point),
                groups,
            });
        }
        self
    }

    /// All planes in the motor
    pub fn planes(&self) -> &[StaticPlane] {
        &self.planes
    }
}

impl KinematicMotor for PlaneMotor {
    fn shape(&self) -> CapsuleShape {
        self.shape
    }

    fn sphere_cast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        radius: f32,
        mask: u32,
    ) -> bool {
        self.planes
            .iter()
            .filter(|plane| plane.groups & mask != 0)
            .any(|plane| {
                let gap = plane.distance(origin) - radius;
                if gap <= 0.0 {
                    return true;
                }
                let approach = -plane.normal.dot(direction);
                approach > 0.0 && gap / approach <= max_distance
            })
    }

    fn ray_cast(&self, origin: Vec3, direction: Vec3, max_distance: f32, mask: u32) -> bool {
        self.sphere_cast(origin, direction, max_distance, 0.0, mask)
    }

    fn move_body(&mut self, position: Vec3, translation: Vec3, up: Vec3, _dt: f32) -> MoveOutcome {
        let target = position + translation;
        let mut resolved = target;
        let mut contacts = ContactFlags::default();

        for plane in &self.planes {
            let clearance =
                plane.distance(resolved) - self.shape.support_distance(plane.normal, up);
            if clearance > TOUCH_EPSILON {
                continue;
            }
            if clearance < 0.0 {
                resolved -= plane.normal * clearance;
            }

            let facing = plane.normal.dot(up);
            if facing > FLOOR_COSINE {
                contacts.below = true;
            } else if facing < -FLOOR_COSINE {
                contacts.above = true;
            } else {
                contacts.sides = true;
            }
        }

        MoveOutcome {
            translation: resolved - position,
            contacts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floor() -> PlaneMotor {
        PlaneMotor::new(CapsuleShape::default()).with_plane(Vec3::Y, Vec3::ZERO)
    }

    #[test]
    fn test_sphere_cast_hits_floor() {
        let motor = floor();
        assert!(
            motor.sphere_cast(Vec3::new(0.0, 1.0, 0.0), Vec3::NEG_Y, 0.6, 0.45, ALL_GROUPS)
        );
        assert!(
            !motor.sphere_cast(Vec3::new(0.0, 3.0, 0.0), Vec3::NEG_Y, 0.6, 0.45, ALL_GROUPS)
        );
        // Casting away from the plane never hits
        assert!(
            !motor.sphere_cast(Vec3::new(0.0, 1.0, 0.0), Vec3::Y, 10.0, 0.45, ALL_GROUPS)
        );
    }

    #[test]
    fn test_mask_filters_planes() {
        let motor = PlaneMotor::new(CapsuleShape::default()).with_plane_in_groups(
            Vec3::Y,
            Vec3::ZERO,
            0b10,
        );
        assert!(
            !motor.ray_cast(Vec3::new(0.0, 1.0, 0.0), Vec3::NEG_Y, 5.0, 0b01)
        );
        assert!(
            motor.ray_cast(Vec3::new(0.0, 1.0, 0.0), Vec3::NEG_Y, 5.0, 0b10)
        );
    }

    #[test]
    fn test_move_body_rests_on_floor() {
        let mut motor = floor();
        let outcome = motor.move_body(
            Vec3::new(0.0, 1.2, 0.0),
            Vec3::new(1.0, -1.0, 0.0),
            Vec3::Y,
            0.02,
        );
        let end = Vec3::new(0.0, 1.2, 0.0) + outcome.translation;
        assert!((end.y - 1.0).abs() < 1e-5);
        assert!((end.x - 1.0).abs() < 1e-5);
        assert!(outcome.contacts.below);
        assert!(!outcome.contacts.above);
    }

    #[test]
    fn test_move_body_ceiling_contact() {
        let mut motor = floor().with_plane(Vec3::NEG_Y, Vec3::new(0.0, 3.0, 0.0));
        let outcome = motor.move_body(
            Vec3::new(0.0, 1.5, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::Y,
            0.02,
        );
        assert!(outcome.contacts.above);
        assert!((outcome.translation.y - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_move_body_sideways_gravity() {
        // Gravity along +X: the floor is the plane facing -X
        let mut motor = PlaneMotor::new(CapsuleShape::default())
            .with_plane(Vec3::NEG_X, Vec3::new(5.0, 0.0, 0.0));
        let up = Vec3::NEG_X;
        let outcome = motor.move_body(Vec3::new(3.5, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0), up, 0.02);
        let end = Vec3::new(3.5, 0.0, 0.0) + outcome.translation;
        assert!((end.x - 4.0).abs() < 1e-5);
        assert!(outcome.contacts.below);
    }
}
