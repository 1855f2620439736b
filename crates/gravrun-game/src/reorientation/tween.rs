//! Eased yaw interpolation

use gravrun_core::math::smoothstep;

/// Yaw tween with smoothstep easing
///
/// Hands out per-step angle deltas whose sum is exactly the total turn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationTween {
    total: f32,
    duration: f32,
    elapsed: f32,
    applied: f32,
}

impl RotationTween {
    pub fn new(total: f32, duration: f32) -> Self {
        Self {
            total,
            duration,
            elapsed: 0.0,
            applied: 0.0,
        }
    }

    /// Advance by `dt`, returning the angle to apply this step
    pub fn advance(&mut self, dt: f32) -> f32 {
        self.elapsed += dt.max(0.0);
        let progress = if self.duration > 0.0 {
            self.elapsed / self.duration
        } else {
            1.0
        };
        let target = if progress >= 1.0 {
            self.total
        } else {
            self.total * smoothstep(progress)
        };
        let delta = target - self.applied;
        self.applied = target;
        delta
    }

    pub fn is_finished(&self) -> bool {
        self.applied == self.total && (self.duration <= 0.0 || self.elapsed >= self.duration)
    }
}
