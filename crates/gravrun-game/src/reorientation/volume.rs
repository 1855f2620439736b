//! Trigger volumes that open a reorientation session

use std::f32::consts::{FRAC_PI_2, PI};

use glam::{Vec2, Vec3};
use gravrun_core::{EntityId, TriggerShape};
use serde::{Deserialize, Serialize};

/// What a volume reorients
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum VolumeKind {
    /// Picks one of four gravity directions
    Gravity,
    /// Picks one of four yaw turns, optionally launching along the new forward
    Rotation { launch_speed: Option<f32> },
}

/// Discrete yaw change picked in a rotation session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum YawTurn {
    Forward,
    Right,
    Back,
    Left,
}

impl YawTurn {
    /// Counter-clockwise angle about up
    pub fn radians(self) -> f32 {
        match self {
            Self::Forward => 0.0,
            Self::Right => -FRAC_PI_2,
            Self::Back => PI,
            Self::Left => FRAC_PI_2,
        }
    }

    /// Turn picked by `input`: right, left, back, then forward
    pub fn select(input: Vec2, threshold: f32) -> Option<Self> {
        if input.x > threshold {
            Some(Self::Right)
        } else if input.x < -threshold {
            Some(Self::Left)
        } else if input.y < -threshold {
            Some(Self::Back)
        } else if input.y > threshold {
            Some(Self::Forward)
        } else {
            None
        }
    }
}

/// Gravity picked by `input`: up, down, left, then right
///
/// Up and down pick world up and world down. Left and right pull toward the
/// body's left or right side.
pub fn select_gravity(input: Vec2, threshold: f32, right: Vec3) -> Option<Vec3> {
    if input.y > threshold {
        Some(Vec3::Y)
    } else if input.y < -threshold {
        Some(Vec3::NEG_Y)
    } else if input.x < -threshold {
        Some(-right)
    } else if input.x > threshold {
        Some(right)
    } else {
        None
    }
}

/// A placed reorientation trigger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReorientationVolume {
    pub id: EntityId,
    pub shape: TriggerShape,
    pub kind: VolumeKind,
}

impl ReorientationVolume {
    pub fn gravity(shape: TriggerShape) -> Self {
        Self {
            id: EntityId::new(),
            shape,
            kind: VolumeKind::Gravity,
        }
    }

    pub fn rotation(shape: TriggerShape, launch_speed: Option<f32>) -> Self {
        Self {
            id: EntityId::new(),
            shape,
            kind: VolumeKind::Rotation { launch_speed },
        }
    }

    pub fn contains(&self, point: Vec3) -> bool {
        self.shape.contains(point)
    }
}
