//! Aggregate game configuration and its validation
//!
//! Every tunable has a documented default. [`GameConfig::validate`] runs once
//! at setup so that nothing has to be re-checked mid-tick.

use gravrun_core::TimeConfig;
use gravrun_physics::{CapsuleShape, CharacterBodyConfig};
use serde::{Deserialize, Serialize};

use crate::momentum::{MomentumConfig, PowerUpConfig};
use crate::player::MovementConfig;
use crate::reorientation::ReorientationConfig;

/// Configuration problems detected at setup time
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f32 },

    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f32 },

    #[error("grace period ({grace}s) must be shorter than buffer duration ({buffer}s)")]
    GraceExceedsBuffer { grace: f32, buffer: f32 },

    #[error("slow-motion scale must be in (0, 1], got {0}")]
    SlowMotionScale(f32),

    #[error("pitch limit must be in (0, 90) degrees, got {0}")]
    PitchLimit(f32),

    #[error("acceleration curve keyframes must be sorted, within [0, 1] and non-decreasing")]
    NonMonotonicCurve,

    #[error("capsule radius {radius} does not fit in height {height}")]
    Capsule { radius: f32, height: f32 },

    #[error("motor capsule {motor:?} differs from configured body {configured:?}")]
    MotorShape {
        configured: CapsuleShape,
        motor: CapsuleShape,
    },
}

/// Fail unless `value` is finite and strictly positive
pub(crate) fn ensure_positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

/// Fail unless `value` is finite and not negative
pub(crate) fn ensure_non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}

/// All game settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub time: TimeConfig,
    pub body: CharacterBodyConfig,
    pub movement: MovementConfig,
    pub reorientation: ReorientationConfig,
    pub momentum: MomentumConfig,
    pub power_up: PowerUpConfig,
}

impl GameConfig {
    /// Check every section, returning the first problem found
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("time.fixed_timestep", self.time.fixed_timestep)?;
        ensure_positive("time.time_scale", self.time.time_scale)?;
        ensure_positive("time.max_delta_time", self.time.max_delta_time)?;

        let shape = self.body.shape;
        ensure_positive("body.shape.height", shape.height)?;
        ensure_positive("body.shape.radius", shape.radius)?;
        ensure_non_negative("body.shape.skin_width", shape.skin_width)?;
        if shape.radius * 2.0 > shape.height {
            return Err(ConfigError::Capsule {
                radius: shape.radius,
                height: shape.height,
            });
        }

        self.movement.validate()?;
        self.reorientation.validate()?;
        self.momentum.validate()?;
        self.power_up.validate()
    }
}
