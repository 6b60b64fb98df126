//! Host input, normalized
//!
//! The host classifies every pointer event by what it landed on. Only
//! [`InputTarget::Background`] presses reach the ambient field; presses on
//! controls are UI; presses inside the game area go to the active session in
//! area-local coordinates.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::modes::GameInput;

/// What a pointer event landed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputTarget {
    /// Empty backdrop: feeds the ambient field
    Background,
    /// Buttons, links, inputs and other interactive chrome
    Chrome,
    /// The mini-game drawing surface
    GameArea,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Space,
    Up,
    Down,
    Left,
    Right,
    Other,
}

impl Key {
    /// Map a DOM `KeyboardEvent.key` value
    pub fn from_code(code: &str) -> Self {
        match code {
            " " | "Space" | "Spacebar" => Key::Space,
            "ArrowUp" | "w" | "W" => Key::Up,
            "ArrowDown" | "s" | "S" => Key::Down,
            "ArrowLeft" | "a" | "A" => Key::Left,
            "ArrowRight" | "d" | "D" => Key::Right,
            _ => Key::Other,
        }
    }
}

/// One host event. Positions are in the coordinate space of `target`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PressStart { pos: Vec2, target: InputTarget },
    PressEnd { pos: Vec2, target: InputTarget },
    Move { pos: Vec2, target: InputTarget },
    KeyDown(Key),
    KeyUp(Key),
    /// Decorative click target activated at `pos` (backdrop coordinates)
    Trigger { pos: Vec2 },
}

impl InputEvent {
    /// The session-facing form of this event, if any reaches the game area
    pub fn to_game(&self) -> Option<GameInput> {
        match *self {
            InputEvent::PressStart {
                pos,
                target: InputTarget::GameArea,
            } => Some(GameInput::PressStart(pos)),
            // releases end holds even when the pointer left the area
            InputEvent::PressEnd { pos, .. } => Some(GameInput::PressEnd(pos)),
            InputEvent::Move {
                pos,
                target: InputTarget::GameArea,
            } => Some(GameInput::Move(pos)),
            InputEvent::KeyDown(key) => Some(GameInput::KeyDown(key)),
            InputEvent::KeyUp(key) => Some(GameInput::KeyUp(key)),
            _ => None,
        }
    }
}

/// Held horizontal steering keys
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeldKeys {
    pub left: bool,
    pub right: bool,
}

impl HeldKeys {
    pub fn apply(&mut self, input: &GameInput) {
        let (key, down) = match *input {
            GameInput::KeyDown(key) => (key, true),
            GameInput::KeyUp(key) => (key, false),
            _ => return,
        };
        match key {
            Key::Left => self.left = down,
            Key::Right => self.right = down,
            _ => {}
        }
    }

    /// -1, 0 or 1
    pub fn axis(&self) -> f32 {
        match (self.left, self.right) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        }
    }
}
