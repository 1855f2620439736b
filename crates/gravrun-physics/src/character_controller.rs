//! Capsule body using rapier3d's kinematic character controller
//!
//! Unlike a Y-up character, the capsule is re-aligned with the current up
//! axis on every move, so walls and ceilings work as floors after a gravity
//! change.

use glam::Vec3;
use nalgebra::Unit;
use rapier3d::control::{CharacterAutostep, CharacterLength, KinematicCharacterController};
use rapier3d::prelude::*;
use serde::{Deserialize, Serialize};

use crate::motor::{CapsuleShape, ContactFlags, KinematicMotor, MoveOutcome};
use crate::{aligned_isometry, mask_filter, to_vector, PhysicsWorld};

/// Blocked fraction of a requested translation that counts as a contact
const BLOCKED_EPSILON: f32 = 1.0e-3;

/// Character body configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterBodyConfig {
    /// Capsule dimensions
    pub shape: CapsuleShape,
    /// Maximum slope angle in degrees (default: 45)
    pub max_slope_angle: f32,
    /// Step height for climbing ledges (default: 0.3m)
    pub step_height: f32,
    /// Whether to snap to ground when running down slopes
    pub snap_to_ground: bool,
    /// Maximum ground snap distance
    pub ground_snap_distance: f32,
}

impl Default for CharacterBodyConfig {
    fn default() -> Self {
        Self {
            shape: CapsuleShape::default(),
            max_slope_angle: 45.0,
            step_height: 0.3,
            snap_to_ground: true,
            ground_snap_distance: 0.2,
        }
    }
}

/// Capsule collider driven by rapier's kinematic character controller
pub struct CharacterBody {
    /// Configuration
    pub config: CharacterBodyConfig,
    /// The collider handle for this body
    pub collider_handle: Option<ColliderHandle>,
    /// Rapier's kinematic character controller
    controller: KinematicCharacterController,
}

impl CharacterBody {
    /// Create a new body with default config
    pub fn new() -> Self {
        Self::with_config(CharacterBodyConfig::default())
    }

    /// Create a new body with custom config
    pub fn with_config(config: CharacterBodyConfig) -> Self {
        let mut controller = KinematicCharacterController::default();
        controller.max_slope_climb_angle = config.max_slope_angle.to_radians();
        controller.min_slope_slide_angle = config.max_slope_angle.to_radians();
        controller.autostep = Some(CharacterAutostep {
            max_height: CharacterLength::Absolute(config.step_height),
            min_width: CharacterLength::Relative(0.5),
            include_dynamic_bodies: false,
        });
        controller.snap_to_ground = if config.snap_to_ground {
            Some(CharacterLength::Absolute(config.ground_snap_distance))
        } else {
            None
        };
        controller.offset = CharacterLength::Absolute(config.shape.skin_width * 0.25);

        Self {
            config,
            collider_handle: None,
            controller,
        }
    }

    /// Spawn the capsule in the physics world, centered at `position`
    pub fn spawn(
        &mut self,
        physics: &mut PhysicsWorld,
        position: Vec3,
        up: Vec3,
    ) -> ColliderHandle {
        let shape = self.config.shape;
        let half_segment = shape.segment_half_height().max(0.01);
        let collider = ColliderBuilder::capsule_y(half_segment, shape.radius)
            .position(aligned_isometry(position, up))
            .friction(0.0)
            .restitution(0.0)
            .build();

        let handle = physics.add_static_collider(collider);
        self.collider_handle = Some(handle);
        handle
    }

    /// Move the capsule with collision detection
    pub fn move_shape(
        &mut self,
        physics: &mut PhysicsWorld,
        position: Vec3,
        translation: Vec3,
        up: Vec3,
        dt: f32,
    ) -> MoveOutcome {
        let Some(collider_handle) = self.collider_handle else {
            return MoveOutcome {
                translation,
                contacts: ContactFlags::default(),
            };
        };

        let Some(collider) = physics.collider_set.get(collider_handle) else {
            return MoveOutcome {
                translation,
                contacts: ContactFlags::default(),
            };
        };

        self.controller.up = Unit::new_normalize(to_vector(up));
        let shape = collider.shape();
        let current_pos = aligned_isometry(position, up);

        let movement = self.controller.move_shape(
            dt,
            &physics.rigid_body_set,
            &physics.collider_set,
            &physics.query_pipeline,
            shape,
            &current_pos,
            to_vector(translation),
            QueryFilter::default().exclude_collider(collider_handle),
            |_| {},
        );

        let applied = Vec3::new(
            movement.translation.x,
            movement.translation.y,
            movement.translation.z,
        );
        let contacts = classify_contacts(translation, applied, up, movement.grounded);

        self.sync_collider(physics, position + applied, up);

        MoveOutcome {
            translation: applied,
            contacts,
        }
    }

    /// Move the collider to `position` aligned with `up`
    pub fn sync_collider(&self, physics: &mut PhysicsWorld, position: Vec3, up: Vec3) {
        if let Some(handle) = self.collider_handle {
            if let Some(collider) = physics.collider_set.get_mut(handle) {
                collider.set_position(aligned_isometry(position, up));
            }
            physics.update_queries();
        }
    }
}

impl Default for CharacterBody {
    fn default() -> Self {
        Self::new()
    }
}

/// Derive touched sides from how much of the requested move was blocked
fn classify_contacts(desired: Vec3, applied: Vec3, up: Vec3, grounded: bool) -> ContactFlags {
    let desired_up = desired.dot(up);
    let applied_up = applied.dot(up);
    let desired_flat = desired - up * desired_up;
    let applied_flat = applied - up * applied_up;

    ContactFlags {
        below: grounded,
        above: desired_up > BLOCKED_EPSILON && applied_up < desired_up - BLOCKED_EPSILON,
        sides: desired_flat.length() - applied_flat.length() > BLOCKED_EPSILON,
    }
}

/// A [`KinematicMotor`] backed by a rapier world and a capsule body
pub struct RapierMotor {
    /// Static course geometry
    pub world: PhysicsWorld,
    /// The player capsule
    pub body: CharacterBody,
}

impl RapierMotor {
    /// Spawn `body` into `world` at `position` and wrap both
    pub fn new(mut world: PhysicsWorld, mut body: CharacterBody, position: Vec3, up: Vec3) -> Self {
        body.spawn(&mut world, position, up);
        Self { world, body }
    }

    fn filter(&self, mask: u32) -> QueryFilter<'static> {
        match self.body.collider_handle {
            Some(handle) => mask_filter(mask).exclude_collider(handle),
            None => mask_filter(mask),
        }
    }
}

impl KinematicMotor for RapierMotor {
    fn shape(&self) -> CapsuleShape {
        self.body.config.shape
    }

    fn sphere_cast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        radius: f32,
        mask: u32,
    ) -> bool {
        self.world
            .sphere_cast(origin, direction, max_distance, radius, self.filter(mask))
            .is_some()
    }

    fn ray_cast(&self, origin: Vec3, direction: Vec3, max_distance: f32, mask: u32) -> bool {
        self.world
            .raycast(origin, direction, max_distance, self.filter(mask))
            .is_some()
    }

    fn move_body(&mut self, position: Vec3, translation: Vec3, up: Vec3, dt: f32) -> MoveOutcome {
        self.body.move_shape(&mut self.world, position, translation, up, dt)
    }

    fn teleport(&mut self, position: Vec3, up: Vec3) {
        self.body.sync_collider(&mut self.world, position, up);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ALL_GROUPS;

    #[test]
    fn test_character_body_config() {
        let config = CharacterBodyConfig::default();
        assert_eq!(config.shape.height, 2.0);
        assert_eq!(config.shape.radius, 0.5);
        assert_eq!(config.max_slope_angle, 45.0);
    }

    #[test]
    fn test_classify_contacts() {
        let flags = classify_contacts(
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, 0.2, 0.0),
            Vec3::Y,
            false,
        );
        assert!(flags.above);
        assert!(!flags.sides);

        let flags = classify_contacts(Vec3::new(1.0, 0.0, 0.0), Vec3::ZERO, Vec3::Y, true);
        assert!(flags.sides);
        assert!(flags.below);
        assert!(!flags.above);
    }

    #[test]
    fn test_ground_probe_excludes_own_capsule() {
        let mut world = PhysicsWorld::new();
        world.create_ground(0.0);
        let motor = RapierMotor::new(
            world,
            CharacterBody::new(),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::Y,
        );

        // Probe upward from inside the capsule: nothing but the capsule itself is there
        assert!(
            !motor.sphere_cast(Vec3::new(0.0, 1.0, 0.0), Vec3::Y, 0.6, 0.45, ALL_GROUPS)
        );
        assert!(
            motor.sphere_cast(Vec3::new(0.0, 1.0, 0.0), Vec3::NEG_Y, 0.63, 0.45, ALL_GROUPS)
        );
    }

    #[test]
    fn test_move_stops_at_ground() {
        let mut world = PhysicsWorld::new();
        world.create_ground(0.0);
        let mut motor = RapierMotor::new(
            world,
            CharacterBody::new(),
            Vec3::new(0.0, 2.0, 0.0),
            Vec3::Y,
        );

        let outcome = motor.move_body(
            Vec3::new(0.0, 2.0, 0.0),
            Vec3::new(0.0, -5.0, 0.0),
            Vec3::Y,
            1.0 / 50.0,
        );
        let end = Vec3::new(0.0, 2.0, 0.0) + outcome.translation;
        assert!(end.y > 0.9);
        assert!(end.y < 1.1);
    }
}
