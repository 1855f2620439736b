//! Vector helpers for motion under an arbitrary gravity axis
//!
//! "Horizontal" always means the plane orthogonal to the current gravity
//! direction. Nothing in here assumes world Y is up.

use glam::{Quat, Vec3};

/// Squared length below which a direction is treated as degenerate
pub const DEGENERATE_EPSILON: f32 = 1.0e-6;

/// World forward, used as the last-resort facing reference
pub const WORLD_FORWARD: Vec3 = Vec3::NEG_Z;

/// Remove the component of `v` along the unit `normal`
pub fn project_on_plane(v: Vec3, normal: Vec3) -> Vec3 {
    v - normal * v.dot(normal)
}

/// Normalize `v`, or return `None` when it is too short or not finite
pub fn try_normalize(v: Vec3) -> Option<Vec3> {
    if !v.is_finite() || v.length_squared() < DEGENERATE_EPSILON {
        None
    } else {
        Some(v.normalize())
    }
}

/// Unit direction in the plane orthogonal to `up`, preferring `preferred`
///
/// Falls through `preferred`, then each of `fallbacks`, then world forward,
/// and finally any vector orthogonal to `up`. Never returns NaN for a unit `up`.
pub fn planar_direction(preferred: Vec3, fallbacks: &[Vec3], up: Vec3) -> Vec3 {
    std::iter::once(preferred)
        .chain(fallbacks.iter().copied())
        .chain(std::iter::once(WORLD_FORWARD))
        .find_map(|candidate| try_normalize(project_on_plane(candidate, up)))
        .unwrap_or_else(|| up.any_orthonormal_vector())
}

/// Move a vector towards a target by a maximum delta
pub fn move_towards(current: Vec3, target: Vec3, max_delta: f32) -> Vec3 {
    let diff = target - current;
    let distance = diff.length();

    if distance <= max_delta || distance == 0.0 {
        target
    } else {
        current + diff / distance * max_delta
    }
}

/// Rotate the unit `current` towards the unit `target` about `axis`, by at most `max_radians`
///
/// Both directions are expected to lie in the plane orthogonal to `axis`.
pub fn rotate_towards(current: Vec3, target: Vec3, axis: Vec3, max_radians: f32) -> Vec3 {
    let angle = signed_angle(current, target, axis);
    if angle.abs() <= max_radians {
        return target;
    }
    Quat::from_axis_angle(axis, max_radians.copysign(angle)) * current
}

/// Signed angle from `from` to `to`, measured counter-clockwise about `axis`
pub fn signed_angle(from: Vec3, to: Vec3, axis: Vec3) -> f32 {
    let sin = from.cross(to).dot(axis);
    let cos = from.dot(to);
    sin.atan2(cos)
}

/// Hermite ease-in/ease-out of `t` in `[0, 1]`
pub fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}
