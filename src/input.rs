use std::collections::HashSet;

use glam::Vec2;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Identifier for a physical keyboard key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyCode {
    Named(NamedKey),
    Character(char),
}

/// Friendly names for the non-character keys the viewer cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NamedKey {
    Space,
    Escape,
    LeftShift,
    RightShift,
    Up,
    Down,
    Left,
    Right,
}

/// Thread-safe input snapshot fed by the window event loop.
///
/// Key state is level-triggered (held keys are queried every frame); mouse
/// and scroll offsets accumulate between frames and are drained once per
/// frame by the camera step.
#[derive(Debug, Default)]
pub struct InputState {
    keys: RwLock<HashSet<KeyCode>>,
    mouse_delta: RwLock<Vec2>,
    scroll_delta: RwLock<f32>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_key_down(&self, key: KeyCode) {
        self.keys.write().insert(key);
    }

    pub fn set_key_up(&self, key: KeyCode) {
        self.keys.write().remove(&key);
    }

    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.keys.read().contains(&key)
    }

    /// Adds a raw mouse offset; positive y means looking up.
    pub fn push_mouse_delta(&self, delta: Vec2) {
        *self.mouse_delta.write() += delta;
    }

    /// Returns the accumulated mouse offset and resets it.
    pub fn take_mouse_delta(&self) -> Vec2 {
        std::mem::take(&mut *self.mouse_delta.write())
    }

    /// Adds a scroll-wheel offset; positive means scrolling away.
    pub fn push_scroll_delta(&self, delta: f32) {
        *self.scroll_delta.write() += delta;
    }

    /// Returns the accumulated scroll offset and resets it.
    pub fn take_scroll_delta(&self) -> f32 {
        std::mem::take(&mut *self.scroll_delta.write())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_state_tracks_keys() {
        let state = InputState::new();
        state.set_key_down(KeyCode::Character('W'));
        assert!(state.is_key_down(KeyCode::Character('W')));
        assert!(!state.is_key_down(KeyCode::Named(NamedKey::Space)));
        state.set_key_up(KeyCode::Character('W'));
        assert!(!state.is_key_down(KeyCode::Character('W')));
    }

    #[test]
    fn mouse_delta_accumulates_and_drains() {
        let state = InputState::new();
        state.push_mouse_delta(Vec2::new(2.0, -1.0));
        state.push_mouse_delta(Vec2::new(0.5, 3.0));
        assert_eq!(state.take_mouse_delta(), Vec2::new(2.5, 2.0));
        assert_eq!(state.take_mouse_delta(), Vec2::ZERO);
    }

    #[test]
    fn scroll_delta_accumulates_and_drains() {
        let state = InputState::new();
        state.push_scroll_delta(1.0);
        state.push_scroll_delta(0.5);
        assert_eq!(state.take_scroll_delta(), 1.5);
        assert_eq!(state.take_scroll_delta(), 0.0);
    }
}
