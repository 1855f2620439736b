//! Gravity and rotation reorientation
//!
//! Entering a reorientation volume starts a session: simulated time slows
//! down, directional input is ignored for a short grace window, then the
//! first decisive move input picks a new gravity direction (or a yaw turn).
//! Without a pick the session falls back to a default when its real-time
//! buffer runs out.

mod sequencer;
mod tween;
mod volume;

use serde::{Deserialize, Serialize};

use crate::config::{ensure_non_negative, ensure_positive, ConfigError};

pub use sequencer::{Completion, GravityReorientationSequencer, SequencerPhase, SessionOutcome};
pub use tween::RotationTween;
pub use volume::{ReorientationVolume, VolumeKind, YawTurn};

/// Gravity picked when a gravity session times out
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeoutPolicy {
    /// Keep the gravity direction the session started with
    #[default]
    KeepCurrent,
    /// Fall back to world down
    WorldDown,
}

/// Reorientation session timing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReorientationConfig {
    /// Real seconds a session waits for a pick
    pub buffer_duration: f32,
    /// Real seconds at the start of a session during which input is ignored
    pub grace_period: f32,
    /// Time scale while a session is open
    pub slow_motion_scale: f32,
    /// Seconds the yaw tween of a rotation commit takes
    pub rotation_duration: f32,
    /// Move-axis magnitude that counts as a pick
    pub selection_threshold: f32,
    pub timeout_policy: TimeoutPolicy,
}

impl Default for ReorientationConfig {
    fn default() -> Self {
        Self {
            buffer_duration: 0.5,
            grace_period: 0.1,
            slow_motion_scale: 0.1,
            rotation_duration: 0.2,
            selection_threshold: 0.5,
            timeout_policy: TimeoutPolicy::default(),
        }
    }
}

impl ReorientationConfig {
    /// Check ranges, returning the first problem found
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("reorientation.buffer_duration", self.buffer_duration)?;
        ensure_non_negative("reorientation.grace_period", self.grace_period)?;
        ensure_non_negative("reorientation.rotation_duration", self.rotation_duration)?;
        ensure_positive(
            "reorientation.selection_threshold",
            self.selection_threshold,
        )?;
        if self.grace_period >= self.buffer_duration {
            return Err(ConfigError::GraceExceedsBuffer {
                grace: self.grace_period,
                buffer: self.buffer_duration,
            });
        }
        if !(self.slow_motion_scale > 0.0 && self.slow_motion_scale <= 1.0) {
            return Err(ConfigError::SlowMotionScale(self.slow_motion_scale));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slow_motion_scale_range() {
        let config = ReorientationConfig {
            slow_motion_scale: 0.0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::SlowMotionScale(0.0)));
        assert_eq!(ReorientationConfig::default().validate(), Ok(()));
    }
}
