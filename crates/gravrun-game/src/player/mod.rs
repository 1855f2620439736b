//! Player movement
//!
//! Kinematic first-person movement whose notion of "horizontal" follows the
//! current gravity axis.

mod body;
mod controller;
mod curve;
mod movement;
mod state;

pub use body::Body;
pub use controller::{GravityError, MovementController};
pub use curve::SpeedCurve;
pub use movement::{MovementConfig, SpeedCarryPolicy, WallClimbConfig};
pub use state::{MovementState, MovementTimers};
