//! Bounded resource filled by horizontal speed

use serde::{Deserialize, Serialize};

use crate::config::{ensure_non_negative, ensure_positive, ConfigError};

/// Momentum meter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MomentumConfig {
    /// Meter gained per meter travelled
    pub gain_ratio: f32,
    /// Upper bound of the meter
    pub max_value: f32,
    /// Meter lost per second while standing still
    pub idle_decay: f32,
}

impl Default for MomentumConfig {
    fn default() -> Self {
        Self {
            gain_ratio: 0.1,
            max_value: 450.0,
            idle_decay: 5.0,
        }
    }
}

impl MomentumConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_non_negative("momentum.gain_ratio", self.gain_ratio)?;
        ensure_positive("momentum.max_value", self.max_value)?;
        ensure_non_negative("momentum.idle_decay", self.idle_decay)
    }
}

/// Accumulates horizontal speed into a value in `[0, max_value]`
#[derive(Debug, Clone, Default)]
pub struct MomentumMeter {
    config: MomentumConfig,
    value: f32,
}

impl MomentumMeter {
    pub fn new(config: MomentumConfig) -> Self {
        Self { config, value: 0.0 }
    }

    /// Integrate one step of horizontal `speed`
    pub fn update(&mut self, speed: f32, dt: f32) {
        if speed > 0.0 {
            self.value += speed * self.config.gain_ratio * dt;
        } else {
            self.value -= self.config.idle_decay * dt;
        }
        self.value = self.value.clamp(0.0, self.config.max_value);
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    /// Overwrite the value (checkpoint restore), clamped into range
    pub fn set(&mut self, value: f32) {
        self.value = if value.is_finite() {
            value.clamp(0.0, self.config.max_value)
        } else {
            0.0
        };
    }

    pub fn reset(&mut self) {
        self.value = 0.0;
    }

    /// Fill level in `[0, 1]`
    pub fn fraction(&self) -> f32 {
        self.value / self.config.max_value
    }
}
