//! Movement configuration and constants

use glam::Vec2;
use gravrun_physics::ALL_GROUPS;
use serde::{Deserialize, Serialize};

use super::curve::SpeedCurve;
use crate::config::{ensure_non_negative, ensure_positive, ConfigError};

/// What happens to speed carried above the run cap when the body is grounded
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeedCarryPolicy {
    /// Cut straight down to the cap on the first grounded tick
    Clamp,
    /// Bleed the excess off at `rate` m/s^2 until the cap is reached
    Decay { rate: f32 },
}

impl Default for SpeedCarryPolicy {
    fn default() -> Self {
        Self::Clamp
    }
}

/// Climb-jump against walls in a dedicated collision group
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WallClimbConfig {
    /// Collision groups that count as climbable
    pub climbable_mask: u32,
    /// Reach of the wall rays
    pub check_distance: f32,
    /// Height of the wall rays above the body center
    pub height_offset: f32,
    /// Angle of the two side rays from forward, in degrees
    pub fan_angle: f32,
    /// Apex height of the climb jump
    pub climb_height: f32,
    /// Speed added along the wall-facing direction
    pub push_speed: f32,
}

impl Default for WallClimbConfig {
    fn default() -> Self {
        Self {
            climbable_mask: 0b10,
            check_distance: 1.0,
            height_offset: 0.2,
            fan_angle: 30.0,
            climb_height: 2.5,
            push_speed: 8.0,
        }
    }
}

/// Movement configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Run speed cap in meters per second
    pub run_speed: f32,
    /// Seconds of held input to reach the run cap
    pub acceleration_time: f32,
    /// Shape of the run-speed ramp
    pub acceleration_curve: SpeedCurve,
    /// Treatment of speed above the cap while grounded
    pub speed_carry: SpeedCarryPolicy,
    /// Airborne steering rate in m/s^2
    pub air_control: f32,
    /// Speed locked in on slide entry
    pub slide_speed: f32,
    /// Seconds the slide holds full speed
    pub slide_duration: f32,
    /// Seconds to decay from slide speed to zero after the hold
    pub slide_decay_time: f32,
    /// Slide steering rate in degrees per second
    pub slide_turn_rate: f32,
    /// Dash speed
    pub dash_speed: f32,
    /// Dash duration in seconds
    pub dash_duration: f32,
    /// Seconds between dashes
    pub dash_cooldown: f32,
    /// Jump apex height in meters
    pub jump_height: f32,
    /// Gravity acceleration in m/s^2
    pub gravity_strength: f32,
    /// Allow one extra jump while airborne
    pub can_double_jump: bool,
    /// Refuse the air jump until the body has started falling
    pub double_jump_requires_descent: bool,
    /// Forward speed added to a jump with move input held
    pub jump_forward_boost: f32,
    /// Seconds after a launch during which the ground probe is skipped
    pub jump_grace_time: f32,
    /// Downward speed that keeps a grounded body glued to the floor
    pub ground_stick_velocity: f32,
    /// Vertical velocity at or below which grounded sticking applies
    pub ground_stick_threshold: f32,
    /// Collision groups the ground probe accepts
    pub ground_mask: u32,
    /// Ground/ceiling probe radius as a fraction of the capsule radius
    pub probe_radius_scale: f32,
    /// Look sensitivity in degrees per input unit (x = yaw, y = pitch)
    pub look_sensitivity: Vec2,
    /// Pitch clamp in degrees
    pub pitch_limit: f32,
    /// Move input magnitude below which input counts as released
    pub input_deadzone: f32,
    /// Climb jump, disabled when absent
    pub wall_climb: Option<WallClimbConfig>,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            run_speed: 8.0,
            acceleration_time: 0.3,
            acceleration_curve: SpeedCurve::default(),
            speed_carry: SpeedCarryPolicy::default(),
            air_control: 20.0,
            slide_speed: 14.0,
            slide_duration: 0.5,
            slide_decay_time: 0.6,
            slide_turn_rate: 120.0,
            dash_speed: 25.0,
            dash_duration: 0.2,
            dash_cooldown: 0.8,
            jump_height: 2.0,
            gravity_strength: 9.81 * 3.0,
            can_double_jump: true,
            double_jump_requires_descent: false,
            jump_forward_boost: 2.0,
            jump_grace_time: 0.1,
            ground_stick_velocity: 3.0,
            ground_stick_threshold: 0.01,
            ground_mask: ALL_GROUPS,
            probe_radius_scale: 0.9,
            look_sensitivity: Vec2::new(0.1, 0.1),
            pitch_limit: 85.0,
            input_deadzone: 0.1,
            wall_climb: Some(WallClimbConfig::default()),
        }
    }
}

impl MovementConfig {
    /// Launch speed that reaches `height` under this gravity
    pub fn launch_speed_for(&self, height: f32) -> f32 {
        (2.0 * height.max(0.0) * self.gravity_strength).sqrt()
    }

    /// Initial vertical velocity of a jump
    pub fn jump_velocity(&self) -> f32 {
        self.launch_speed_for(self.jump_height)
    }

    /// Slide speed lost per second once the hold expires
    pub fn slide_decay_rate(&self) -> f32 {
        self.slide_speed / self.slide_decay_time
    }

    /// Check ranges, returning the first problem found
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("movement.run_speed", self.run_speed)?;
        ensure_non_negative("movement.acceleration_time", self.acceleration_time)?;
        ensure_non_negative("movement.air_control", self.air_control)?;
        ensure_positive("movement.slide_speed", self.slide_speed)?;
        ensure_non_negative("movement.slide_duration", self.slide_duration)?;
        ensure_positive("movement.slide_decay_time", self.slide_decay_time)?;
        ensure_non_negative("movement.slide_turn_rate", self.slide_turn_rate)?;
        ensure_positive("movement.dash_speed", self.dash_speed)?;
        ensure_positive("movement.dash_duration", self.dash_duration)?;
        ensure_non_negative("movement.dash_cooldown", self.dash_cooldown)?;
        ensure_positive("movement.jump_height", self.jump_height)?;
        ensure_positive("movement.gravity_strength", self.gravity_strength)?;
        ensure_non_negative("movement.jump_forward_boost", self.jump_forward_boost)?;
        ensure_non_negative("movement.jump_grace_time", self.jump_grace_time)?;
        ensure_non_negative("movement.ground_stick_velocity", self.ground_stick_velocity)?;
        ensure_positive("movement.probe_radius_scale", self.probe_radius_scale)?;
        ensure_non_negative("movement.input_deadzone", self.input_deadzone)?;
        if let SpeedCarryPolicy::Decay { rate } = self.speed_carry {
            ensure_positive("movement.speed_carry.rate", rate)?;
        }
        if !(self.pitch_limit > 0.0 && self.pitch_limit < 90.0) {
            return Err(ConfigError::PitchLimit(self.pitch_limit));
        }
        if !self.acceleration_curve.is_monotonic() {
            return Err(ConfigError::NonMonotonicCurve);
        }
        if let Some(climb) = &self.wall_climb {
            ensure_positive("movement.wall_climb.check_distance", climb.check_distance)?;
            ensure_positive("movement.wall_climb.climb_height", climb.climb_height)?;
            ensure_non_negative("movement.wall_climb.push_speed", climb.push_speed)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jump_velocity_reaches_height() {
        let config = MovementConfig::default();
        let v = config.jump_velocity();
        // v^2 / 2g == h
        let apex = v * v / (2.0 * config.gravity_strength);
        assert!((apex - config.jump_height).abs() < 1e-4);
    }

    #[test]
    fn test_slide_decay_rate() {
        let config = MovementConfig {
            slide_speed: 12.0,
            slide_decay_time: 0.5,
            ..Default::default()
        };
        assert_eq!(config.slide_decay_rate(), 24.0);
    }

    #[test]
    fn test_validate_pitch_limit() {
        let config = MovementConfig {
            pitch_limit: 95.0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::PitchLimit(95.0)));
    }

    #[test]
    fn test_validate_curve() {
        let config = MovementConfig {
            acceleration_curve: SpeedCurve::Keyframes(vec![[0.0, 1.0], [1.0, 0.0]]),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::NonMonotonicCurve));
    }
}
