//! Gravrun Game - Movement core and gameplay systems
//!
//! Provides the movement controller, the gravity reorientation sequencer,
//! the momentum meter, checkpoints and the per-frame scheduler.

pub mod checkpoint;
pub mod config;
pub mod events;
pub mod input;
pub mod momentum;
pub mod player;
pub mod reorientation;
pub mod simulation;

pub use checkpoint::{CheckpointSnapshot, CheckpointStore, CheckpointVolume};
pub use config::{ConfigError, GameConfig};
pub use events::{Landed, MoveInputChanged, Observers};
pub use input::{FrameInput, InputAction, InputEvent};
pub use momentum::{MomentumConfig, MomentumMeter, PowerUpConfig, PowerUps};
pub use player::{
    GravityError, MovementConfig, MovementController, MovementState, SpeedCarryPolicy, SpeedCurve,
    WallClimbConfig,
};
pub use reorientation::{
    Completion, GravityReorientationSequencer, ReorientationConfig, ReorientationVolume,
    SequencerPhase, SessionOutcome, TimeoutPolicy, VolumeKind, YawTurn,
};
pub use simulation::{FrameSummary, Simulation};
