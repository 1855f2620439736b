//! Per-frame scheduler
//!
//! One [`Simulation::frame`] call is one scheduling pass:
//!
//! 1. Advance the clock with the raw frame delta.
//! 2. Latch this frame's input into the controller.
//! 3. Advance the reorientation sequencer in real time, reading the same input.
//! 4. Run the fixed movement steps for the scaled time that accumulated.
//! 5. Feed the momentum meter, fire the power-up.
//! 6. Check trigger volumes against the new position.

use std::collections::HashSet;

use glam::Vec3;
use gravrun_core::{EntityId, GameTime};
use gravrun_physics::KinematicMotor;
use tracing::debug;

use crate::checkpoint::{CheckpointStore, CheckpointVolume};
use crate::config::{ConfigError, GameConfig};
use crate::input::{FrameInput, InputAction};
use crate::momentum::{MomentumMeter, PowerUps};
use crate::player::MovementController;
use crate::reorientation::{Completion, GravityReorientationSequencer, ReorientationVolume};

/// What happened during one frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameSummary {
    /// Fixed movement steps that ran
    pub fixed_steps: u32,
    /// Reorientation session committed this frame
    pub completion: Option<Completion>,
    /// Whether the super jump fired
    pub power_up: bool,
}

/// The movement core wired to a collision motor
pub struct Simulation<M: KinematicMotor> {
    time: GameTime,
    controller: MovementController,
    sequencer: GravityReorientationSequencer,
    meter: MomentumMeter,
    power_ups: PowerUps,
    checkpoints: CheckpointStore,
    volumes: Vec<ReorientationVolume>,
    inside: HashSet<EntityId>,
    checkpoint_volumes: Vec<CheckpointVolume>,
    motor: M,
}

impl<M: KinematicMotor> Simulation<M> {
    /// Validate `config` against `motor` and place the player at `spawn` (capsule center)
    pub fn new(config: GameConfig, mut motor: M, spawn: Vec3) -> Result<Self, ConfigError> {
        config.validate()?;
        if motor.shape() != config.body.shape {
            return Err(ConfigError::MotorShape {
                configured: config.body.shape,
                motor: motor.shape(),
            });
        }

        let controller = MovementController::new(config.movement, spawn);
        motor.teleport(spawn, controller.up());

        Ok(Self {
            time: GameTime::new(config.time),
            controller,
            sequencer: GravityReorientationSequencer::new(config.reorientation),
            meter: MomentumMeter::new(config.momentum),
            power_ups: PowerUps::new(config.power_up),
            checkpoints: CheckpointStore::new(),
            volumes: Vec::new(),
            inside: HashSet::new(),
            checkpoint_volumes: Vec::new(),
            motor,
        })
    }

    /// Run one frame of `raw_dt` real seconds
    pub fn frame(&mut self, raw_dt: f32, input: &FrameInput) -> FrameSummary {
        self.time.update(raw_dt);
        let real_dt = self.time.unscaled_delta_time;

        self.controller.set_move_input(input.move_axis);
        self.controller.set_look_input(input.look_delta);
        self.controller.set_slide_held(input.slide_held);
        if input.is_just_pressed(InputAction::Jump) {
            self.controller.request_jump();
        }
        if input.is_just_pressed(InputAction::Dash) {
            self.controller.request_dash();
        }

        let completion = self.sequencer.advance(
            real_dt,
            input.move_axis,
            &mut self.controller,
            &mut self.time,
        );
        if let Some(completion) = &completion {
            self.remove_volume(completion.volume);
        }

        let fixed_steps = self.time.fixed_steps();
        let step = self.time.fixed_timestep();
        for _ in 0..fixed_steps {
            self.controller.tick(&mut self.motor, step);
            self.meter.update(self.controller.speed(), step);
            self.power_ups.update(step);
        }

        let power_up = input.is_just_pressed(InputAction::PowerUp)
            && self
                .power_ups
                .try_activate(&mut self.meter, &mut self.controller);

        self.evaluate_volumes();

        FrameSummary {
            fixed_steps,
            completion,
            power_up,
        }
    }

    /// Restore the last checkpoint, abandoning any open reorientation session
    pub fn respawn(&mut self) -> bool {
        self.sequencer.cancel(&mut self.controller, &mut self.time);
        self.checkpoints
            .respawn(&mut self.controller, &mut self.meter, &mut self.motor)
    }

    pub fn add_volume(&mut self, volume: ReorientationVolume) -> EntityId {
        let id = volume.id;
        self.volumes.push(volume);
        id
    }

    pub fn remove_volume(&mut self, id: EntityId) -> bool {
        let before = self.volumes.len();
        self.volumes.retain(|volume| volume.id != id);
        self.inside.remove(&id);
        self.volumes.len() != before
    }

    pub fn add_checkpoint(&mut self, volume: CheckpointVolume) {
        self.checkpoint_volumes.push(volume);
    }

    pub fn volumes(&self) -> &[ReorientationVolume] {
        &self.volumes
    }

    pub fn controller(&self) -> &MovementController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut MovementController {
        &mut self.controller
    }

    pub fn sequencer(&self) -> &GravityReorientationSequencer {
        &self.sequencer
    }

    pub fn time(&self) -> &GameTime {
        &self.time
    }

    pub fn meter(&self) -> &MomentumMeter {
        &self.meter
    }

    pub fn meter_mut(&mut self) -> &mut MomentumMeter {
        &mut self.meter
    }

    pub fn checkpoints(&self) -> &CheckpointStore {
        &self.checkpoints
    }

    pub fn motor(&self) -> &M {
        &self.motor
    }

    /// Entry edges: a volume fires when the body moves into it, not while it stays
    fn evaluate_volumes(&mut self) {
        let position = self.controller.position();

        for volume in &self.volumes {
            let inside = volume.contains(position);
            let entered = inside && self.inside.insert(volume.id);
            if !inside {
                self.inside.remove(&volume.id);
            }
            if entered {
                debug!(volume = ?volume.id, "entered reorientation volume");
                self.sequencer
                    .try_begin(volume, &mut self.controller, &mut self.time);
            }
        }

        for checkpoint in &mut self.checkpoint_volumes {
            if !checkpoint.activated && checkpoint.shape.contains(position) {
                checkpoint.activated = true;
                self.checkpoints
                    .save(checkpoint.index, &self.controller, &self.meter);
            }
        }
    }
}
