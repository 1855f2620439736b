//! Momentum meter and the power-up that spends it

mod meter;
mod power_up;

pub use meter::{MomentumConfig, MomentumMeter};
pub use power_up::{PowerUpConfig, PowerUps};
