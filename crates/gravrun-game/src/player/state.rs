//! Movement modes and their timers

use serde::{Deserialize, Serialize};

/// The active movement mode, re-derived every tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MovementState {
    GroundedIdle,
    GroundedRun,
    Sliding,
    #[default]
    Airborne,
    Dashing,
}

/// Per-mode countdowns and counters
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MovementTimers {
    /// Seconds spent in the current slide
    pub slide_elapsed: f32,
    /// Set when a slide decays to zero; cleared when move input is released
    pub slide_locked: bool,
    /// Seconds left in the active dash
    pub dash_remaining: f32,
    /// Seconds until the next dash is allowed
    pub dash_cooldown: f32,
    /// Jumps since the last landing
    pub jump_count: u32,
    /// Seconds during which the ground probe is forced negative
    pub jump_grace: f32,
}

impl MovementTimers {
    /// Count every timer down by `dt`, returning true if a dash expired
    pub fn advance(&mut self, dt: f32) -> bool {
        self.dash_cooldown = (self.dash_cooldown - dt).max(0.0);
        self.jump_grace = (self.jump_grace - dt).max(0.0);
        if self.dash_remaining > 0.0 {
            self.dash_remaining -= dt;
            if self.dash_remaining <= 0.0 {
                self.dash_remaining = 0.0;
                return true;
            }
        }
        false
    }

    /// Reset the slide bookkeeping (lock excluded)
    pub fn reset_slide(&mut self) {
        self.slide_elapsed = 0.0;
    }
}
