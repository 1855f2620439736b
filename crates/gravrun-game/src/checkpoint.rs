//! Checkpoint snapshots and respawn
//!
//! The store keeps one snapshot and only replaces it with a strictly higher
//! index. How snapshots are persisted is up to the caller; they are plain
//! serde data.

use glam::{Quat, Vec3};
use gravrun_core::TriggerShape;
use gravrun_physics::KinematicMotor;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::momentum::MomentumMeter;
use crate::player::MovementController;

/// Everything needed to put the player back at a checkpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointSnapshot {
    pub index: u32,
    pub position: Vec3,
    pub orientation: Quat,
    pub gravity_direction: Vec3,
    pub vertical_velocity: f32,
    pub horizontal_velocity: Vec3,
    pub momentum_value: f32,
}

impl CheckpointSnapshot {
    /// Capture the current player state under `index`
    pub fn capture(index: u32, controller: &MovementController, meter: &MomentumMeter) -> Self {
        Self {
            index,
            position: controller.position(),
            orientation: controller.orientation(),
            gravity_direction: controller.gravity_direction(),
            vertical_velocity: controller.vertical_velocity(),
            horizontal_velocity: controller.horizontal_velocity(),
            momentum_value: meter.value(),
        }
    }
}

/// Holds the latest checkpoint
#[derive(Debug, Clone, Default)]
pub struct CheckpointStore {
    last: Option<CheckpointSnapshot>,
}

impl CheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store loaded from persisted data
    pub fn with_snapshot(snapshot: CheckpointSnapshot) -> Self {
        Self {
            last: Some(snapshot),
        }
    }

    pub fn snapshot(&self) -> Option<&CheckpointSnapshot> {
        self.last.as_ref()
    }

    pub fn last_index(&self) -> Option<u32> {
        self.last.as_ref().map(|snapshot| snapshot.index)
    }

    /// Save the player state if `index` is past the stored checkpoint
    pub fn save(
        &mut self,
        index: u32,
        controller: &MovementController,
        meter: &MomentumMeter,
    ) -> bool {
        if let Some(last) = self.last_index() {
            if index <= last {
                debug!(index, last, "checkpoint not newer, skipped");
                return false;
            }
        }
        let snapshot = CheckpointSnapshot::capture(index, controller, meter);
        info!(index, position = ?snapshot.position, "checkpoint saved");
        self.last = Some(snapshot);
        true
    }

    /// Put the player back at the stored checkpoint with zeroed velocity
    ///
    /// Returns false, and changes nothing, when no checkpoint was saved yet.
    pub fn respawn(
        &self,
        controller: &mut MovementController,
        meter: &mut MomentumMeter,
        motor: &mut impl KinematicMotor,
    ) -> bool {
        let Some(snapshot) = &self.last else {
            warn!("respawn requested without a checkpoint");
            return false;
        };

        if let Err(err) = controller.set_gravity_direction(snapshot.gravity_direction) {
            warn!(%err, "checkpoint gravity rejected, keeping current");
        }
        controller.set_orientation(snapshot.orientation);
        controller.set_position(snapshot.position);
        controller.set_velocity(Vec3::ZERO);
        meter.set(snapshot.momentum_value);
        motor.teleport(snapshot.position, controller.up());

        info!(index = snapshot.index, "respawned at checkpoint");
        true
    }
}

/// Trigger that saves a checkpoint on first entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointVolume {
    pub index: u32,
    pub shape: TriggerShape,
    pub activated: bool,
}

impl CheckpointVolume {
    pub fn new(index: u32, shape: TriggerShape) -> Self {
        Self {
            index,
            shape,
            activated: false,
        }
    }
}
