//! Game clock for Gravrun
//!
//! Tracks scaled and unscaled frame time and feeds a fixed-timestep
//! accumulator. Slow motion scales both the simulated delta and the fixed
//! step, so the number of physics steps per real second stays constant while
//! each step covers less simulated time.

use serde::{Deserialize, Serialize};

/// Configuration for game time
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeConfig {
    /// How many in-game seconds pass per real second under normal flow
    pub time_scale: f32,
    /// Fixed timestep for physics at normal flow (in seconds)
    pub fixed_timestep: f32,
    /// Maximum delta time to prevent spiral of death
    pub max_delta_time: f32,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            time_scale: 1.0,
            fixed_timestep: 1.0 / 50.0,
            max_delta_time: 0.25,
        }
    }
}

/// Errors raised by clock manipulation
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TimeError {
    #[error("Time scale must be finite and in (0, 1], got {0}")]
    InvalidScale(f32),
}

/// Game time tracking
#[derive(Debug, Clone)]
pub struct GameTime {
    /// Configuration (normal-flow values)
    pub config: TimeConfig,
    /// Simulated time since start in seconds
    pub total_time: f64,
    /// Real time since start in seconds
    pub total_unscaled_time: f64,
    /// Scaled delta time for this frame (clamped)
    pub delta_time: f32,
    /// Unscaled delta time for this frame (clamped)
    pub unscaled_delta_time: f32,
    /// Frame counter
    pub frame_count: u64,
    /// Current time scale
    time_scale: f32,
    /// Current fixed step, scaled along with the time scale
    fixed_timestep: f32,
    /// Accumulated time for fixed timestep
    fixed_accumulator: f32,
}

impl Default for GameTime {
    fn default() -> Self {
        Self::new(TimeConfig::default())
    }
}

impl GameTime {
    /// Create a new game time with custom config
    pub fn new(config: TimeConfig) -> Self {
        Self {
            time_scale: config.time_scale,
            fixed_timestep: config.fixed_timestep * config.time_scale,
            config,
            total_time: 0.0,
            total_unscaled_time: 0.0,
            delta_time: 0.0,
            unscaled_delta_time: 0.0,
            frame_count: 0,
            fixed_accumulator: 0.0,
        }
    }

    /// Update the game time with the raw delta from the previous frame
    pub fn update(&mut self, raw_delta: f32) {
        self.unscaled_delta_time = raw_delta.clamp(0.0, self.config.max_delta_time);
        self.frame_count += 1;
        self.total_unscaled_time += self.unscaled_delta_time as f64;

        self.delta_time = self.unscaled_delta_time * self.time_scale;
        self.total_time += self.delta_time as f64;
        self.fixed_accumulator += self.delta_time;
    }

    /// Get the number of fixed timesteps to process this frame
    pub fn fixed_steps(&mut self) -> u32 {
        let mut steps = 0;
        while self.fixed_accumulator >= self.fixed_timestep {
            self.fixed_accumulator -= self.fixed_timestep;
            steps += 1;
        }
        steps
    }

    /// Simulated duration of one fixed step at the current time scale
    pub fn fixed_timestep(&self) -> f32 {
        self.fixed_timestep
    }

    /// Current time scale
    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Whether the clock is running slower than normal flow
    pub fn is_slowed(&self) -> bool {
        self.time_scale < self.config.time_scale
    }

    /// Get the interpolation factor for rendering between physics steps
    pub fn fixed_interpolation(&self) -> f32 {
        self.fixed_accumulator / self.fixed_timestep
    }

    /// Slow simulated time down, scaling the fixed step proportionally
    pub fn enter_slow_motion(&mut self, scale: f32) -> Result<(), TimeError> {
        if !scale.is_finite() || scale <= 0.0 || scale > 1.0 {
            return Err(TimeError::InvalidScale(scale));
        }
        self.time_scale = self.config.time_scale * scale;
        self.fixed_timestep = self.config.fixed_timestep * self.time_scale;
        Ok(())
    }

    /// Restore the configured time scale and fixed step
    pub fn restore_normal_flow(&mut self) {
        self.time_scale = self.config.time_scale;
        self.fixed_timestep = self.config.fixed_timestep * self.time_scale;
        // Leftover slow-motion time is smaller than one slowed step
        self.fixed_accumulator = self.fixed_accumulator.min(self.fixed_timestep);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_time() {
        let mut time = GameTime::default();
        time.update(0.016);

        assert!(time.delta_time > 0.0);
        assert_eq!(time.frame_count, 1);
        assert_eq!(time.delta_time, time.unscaled_delta_time);
    }

    #[test]
    fn test_fixed_steps_accumulate() {
        let mut time = GameTime::new(TimeConfig {
            fixed_timestep: 0.25,
            ..Default::default()
        });
        time.update(0.125);
        assert_eq!(time.fixed_steps(), 0);
        time.update(0.125);
        assert_eq!(time.fixed_steps(), 1);
        assert_eq!(time.fixed_interpolation(), 0.0);
    }

    #[test]
    fn test_slow_motion_scales_step() {
        let mut time = GameTime::new(TimeConfig {
            fixed_timestep: 0.25,
            ..Default::default()
        });
        time.enter_slow_motion(0.5).unwrap();
        assert!(time.is_slowed());
        assert_eq!(time.fixed_timestep(), 0.125);

        time.update(0.25);
        assert_eq!(time.delta_time, 0.125);
        assert_eq!(time.unscaled_delta_time, 0.25);
        // Same number of steps per real second as normal flow
        assert_eq!(time.fixed_steps(), 1);

        time.restore_normal_flow();
        assert!(!time.is_slowed());
        assert_eq!(time.fixed_timestep(), 0.25);
    }

    #[test]
    fn test_invalid_slow_motion_rejected() {
        let mut time = GameTime::default();
        assert_eq!(
            time.enter_slow_motion(0.0),
            Err(TimeError::InvalidScale(0.0))
        );
        assert!(time.enter_slow_motion(f32::NAN).is_err());
        assert!(time.enter_slow_motion(2.0).is_err());
        assert_eq!(time.time_scale(), 1.0);
    }

    #[test]
    fn test_delta_clamped() {
        let mut time = GameTime::default();
        time.update(3.0);
        assert_eq!(time.unscaled_delta_time, time.config.max_delta_time);
    }
}
