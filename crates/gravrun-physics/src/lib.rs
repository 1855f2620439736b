//! Gravrun Physics - Collision queries using rapier3d
//!
//! Provides the static course geometry, a kinematic capsule body, and the
//! [`KinematicMotor`] seam the movement core drives each tick.

mod character_controller;
mod motor;
mod plane_motor;

pub use character_controller::{CharacterBody, CharacterBodyConfig, RapierMotor};
pub use motor::{CapsuleShape, ContactFlags, KinematicMotor, MoveOutcome, ALL_GROUPS};
pub use plane_motor::{PlaneMotor, StaticPlane};

use glam::{Quat, Vec3};
use nalgebra::{Isometry3, Quaternion, Translation3, Unit, UnitQuaternion};
use rapier3d::prelude::*;

/// Collision groups for a static collider that belongs to `membership` and collides with everything
pub fn static_groups(membership: u32) -> InteractionGroups {
    InteractionGroups::new(Group::from_bits_truncate(membership), Group::ALL)
}

/// Query filter that only accepts colliders whose membership intersects `mask`
pub fn mask_filter(mask: u32) -> QueryFilter<'static> {
    QueryFilter::default().groups(InteractionGroups::new(
        Group::ALL,
        Group::from_bits_truncate(mask),
    ))
}

/// Convert a glam vector into a rapier vector
pub(crate) fn to_vector(v: Vec3) -> Vector<Real> {
    vector![v.x, v.y, v.z]
}

/// Pose of a Y-aligned shape centered at `center` whose local Y is rotated onto `up`
pub(crate) fn aligned_isometry(center: Vec3, up: Vec3) -> Isometry<Real> {
    let q = Quat::from_rotation_arc(Vec3::Y, up);
    let rotation = UnitQuaternion::new_normalize(Quaternion::new(q.w, q.x, q.y, q.z));
    Isometry3::from_parts(Translation3::new(center.x, center.y, center.z), rotation)
}

/// The static collision world the player moves through
pub struct PhysicsWorld {
    /// Rigid body storage (queries need it even for a static course)
    pub rigid_body_set: RigidBodySet,
    /// Collider storage
    pub collider_set: ColliderSet,
    /// Query pipeline for raycasts and shape casts
    query_pipeline: QueryPipeline,
}

impl PhysicsWorld {
    /// Create an empty physics world
    pub fn new() -> Self {
        Self {
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            query_pipeline: QueryPipeline::new(),
        }
    }

    /// Rebuild the query acceleration structure after colliders moved or changed
    pub fn update_queries(&mut self) {
        self.query_pipeline.update(&self.collider_set);
    }

    /// Add a static collider (ground, walls, etc.)
    pub fn add_static_collider(&mut self, collider: Collider) -> ColliderHandle {
        let handle = self.collider_set.insert(collider);
        self.update_queries();
        handle
    }

    /// Get a collider by handle
    pub fn get_collider(&self, handle: ColliderHandle) -> Option<&Collider> {
        self.collider_set.get(handle)
    }

    /// Create a solid half-space through `point` whose surface faces `normal`
    pub fn create_plane(&mut self, normal: Vec3, point: Vec3, membership: u32) -> ColliderHandle {
        let normal = Unit::new_normalize(to_vector(normal));
        let plane = ColliderBuilder::halfspace(normal)
            .translation(to_vector(point))
            .friction(0.0)
            .restitution(0.0)
            .collision_groups(static_groups(membership))
            .build();
        self.add_static_collider(plane)
    }

    /// Create a ground plane collider at height `y`
    pub fn create_ground(&mut self, y: f32) -> ColliderHandle {
        self.create_plane(Vec3::Y, Vec3::new(0.0, y, 0.0), ALL_GROUPS)
    }

    /// Create a static box collider
    pub fn create_static_box(
        &mut self,
        half_extents: Vec3,
        position: Vec3,
        membership: u32,
    ) -> ColliderHandle {
        let collider = ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            .translation(to_vector(position))
            .friction(0.0)
            .collision_groups(static_groups(membership))
            .build();
        self.add_static_collider(collider)
    }

    /// Cast a ray and return the first hit distance
    pub fn raycast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        filter: QueryFilter,
    ) -> Option<(ColliderHandle, f32)> {
        let ray = Ray::new(point![origin.x, origin.y, origin.z], to_vector(direction));

        self.query_pipeline.cast_ray(
            &self.rigid_body_set,
            &self.collider_set,
            &ray,
            max_distance,
            true,
            filter,
        )
    }

    /// Sweep a ball along `direction` and return the first hit distance
    pub fn sphere_cast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        radius: f32,
        filter: QueryFilter,
    ) -> Option<(ColliderHandle, f32)> {
        let ball = rapier3d::parry::shape::Ball::new(radius);
        let pose = Isometry::translation(origin.x, origin.y, origin.z);

        self.query_pipeline
            .cast_shape(
                &self.rigid_body_set,
                &self.collider_set,
                &pose,
                &to_vector(direction),
                &ball,
                rapier3d::parry::query::ShapeCastOptions::with_max_time_of_impact(max_distance),
                filter,
            )
            .map(|(handle, hit)| (handle, hit.time_of_impact))
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}
