//! Logical input surface
//!
//! The movement core consumes already-decoded actions, not device state.
//! [`FrameInput`] accumulates the events of one frame: continuous values are
//! latched (the last value wins) and triggers are collected until
//! [`FrameInput::clear_frame`].

use std::collections::HashSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Named logical actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputAction {
    /// 2D move vector (x = strafe, y = forward)
    Move,
    /// 2D look delta
    Look,
    /// One-shot jump
    Jump,
    /// One-shot dash
    Dash,
    /// Held slide
    Slide,
    /// One-shot momentum power-up
    PowerUp,
}

/// A decoded input event
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    Move(Vec2),
    Look(Vec2),
    Jump,
    Dash,
    Slide(bool),
    PowerUp,
}

impl InputEvent {
    /// The action this event belongs to
    pub fn action(&self) -> InputAction {
        match self {
            Self::Move(_) => InputAction::Move,
            Self::Look(_) => InputAction::Look,
            Self::Jump => InputAction::Jump,
            Self::Dash => InputAction::Dash,
            Self::Slide(_) => InputAction::Slide,
            Self::PowerUp => InputAction::PowerUp,
        }
    }
}

/// Input captured for one frame
#[derive(Debug, Clone, Default)]
pub struct FrameInput {
    /// Latest move vector
    pub move_axis: Vec2,
    /// Look delta accumulated this frame
    pub look_delta: Vec2,
    /// Whether slide is held
    pub slide_held: bool,
    /// Triggers fired this frame
    pub just_pressed: HashSet<InputAction>,
}

impl FrameInput {
    /// Create a new empty input state
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one event into the frame
    pub fn apply(&mut self, event: InputEvent) {
        match event {
            InputEvent::Move(axis) => self.move_axis = axis,
            InputEvent::Look(delta) => self.look_delta += delta,
            InputEvent::Slide(held) => self.slide_held = held,
            InputEvent::Jump | InputEvent::Dash | InputEvent::PowerUp => {
                self.just_pressed.insert(event.action());
            }
        }
    }

    /// Builder-style [`FrameInput::apply`]
    pub fn with(mut self, event: InputEvent) -> Self {
        self.apply(event);
        self
    }

    /// Check if a trigger fired this frame
    pub fn is_just_pressed(&self, action: InputAction) -> bool {
        self.just_pressed.contains(&action)
    }

    /// Clear frame-specific data (call at end of frame)
    pub fn clear_frame(&mut self) {
        self.just_pressed.clear();
        self.look_delta = Vec2::ZERO;
    }
}
