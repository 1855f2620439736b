//! Gravrun Core - Foundation types for the Gravrun movement core
//!
//! This crate provides the foundational types used throughout the game:
//! - Mathematical primitives (re-exported from glam)
//! - Gravity-plane vector helpers
//! - Trigger shapes and entity identifiers
//! - The game clock with slow-motion support

pub mod math;
pub mod time;
pub mod types;

pub use glam::{Quat, Vec2, Vec3};
pub use time::{GameTime, TimeConfig, TimeError};
pub use types::{EntityId, TriggerShape};
