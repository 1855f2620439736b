//! Super jump fuelled by the momentum meter

use serde::{Deserialize, Serialize};
use tracing::info;

use super::MomentumMeter;
use crate::config::{ensure_non_negative, ensure_positive, ConfigError};
use crate::player::MovementController;

/// Super jump configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerUpConfig {
    /// Meter value required to activate
    pub threshold: f32,
    /// Launch speed of the boost
    pub force: f32,
    /// Launch angle above the body's forward, in degrees
    pub elevation: f32,
    /// Seconds before the power-up can fire again
    pub lockout: f32,
}

impl Default for PowerUpConfig {
    fn default() -> Self {
        Self {
            threshold: 100.0,
            force: 10.0,
            elevation: 45.0,
            lockout: 0.3,
        }
    }
}

impl PowerUpConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_non_negative("power_up.threshold", self.threshold)?;
        ensure_positive("power_up.force", self.force)?;
        ensure_non_negative("power_up.lockout", self.lockout)
    }
}

/// Power-up trigger state
#[derive(Debug, Clone, Default)]
pub struct PowerUps {
    config: PowerUpConfig,
    lockout_remaining: f32,
}

impl PowerUps {
    pub fn new(config: PowerUpConfig) -> Self {
        Self {
            config,
            lockout_remaining: 0.0,
        }
    }

    pub fn update(&mut self, dt: f32) {
        self.lockout_remaining = (self.lockout_remaining - dt).max(0.0);
    }

    /// Whether a super jump is still in its lockout
    pub fn is_active(&self) -> bool {
        self.lockout_remaining > 0.0
    }

    /// Spend a full meter on a forward-and-up boost
    pub fn try_activate(
        &mut self,
        meter: &mut MomentumMeter,
        controller: &mut MovementController,
    ) -> bool {
        if self.is_active() || meter.value() < self.config.threshold {
            return false;
        }

        let (sin, cos) = self.config.elevation.to_radians().sin_cos();
        let direction = controller.forward() * cos + controller.up() * sin;
        controller.apply_impulse(direction * self.config.force);

        info!(meter = meter.value(), "super jump");
        meter.reset();
        self.lockout_remaining = self.config.lockout;
        true
    }
}
