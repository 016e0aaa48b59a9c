//! Keyboard state for driving terrain regeneration and observer movement.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Keys the terrain viewer reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Forward,
    Back,
    Left,
    Right,
    Up,
    Down,
    /// Regenerate the landscape.
    Generate,
    /// Flatten the landscape.
    Reset,
}

impl Key {
    /// Key bound to a single character, WASD style (`g` regenerates, `r` resets).
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'w' => Some(Self::Forward),
            's' => Some(Self::Back),
            'a' => Some(Self::Left),
            'd' => Some(Self::Right),
            'e' => Some(Self::Up),
            'q' => Some(Self::Down),
            'g' => Some(Self::Generate),
            'r' => Some(Self::Reset),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyState {
    Pressed,
    Released,
}

/// Manages input state for the current frame.
#[derive(Debug, Default)]
pub struct InputState {
    /// Keys currently held down.
    keys_held: HashSet<Key>,
    /// Keys pressed this frame.
    keys_pressed: HashSet<Key>,
    /// Keys released this frame.
    keys_released: HashSet<Key>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear per-frame state. Call at the start of each frame.
    pub fn begin_frame(&mut self) {
        self.keys_pressed.clear();
        self.keys_released.clear();
    }

    /// Process a keyboard event.
    pub fn process_keyboard(&mut self, key: Key, state: KeyState) {
        match state {
            KeyState::Pressed => {
                if !self.keys_held.contains(&key) {
                    self.keys_pressed.insert(key);
                }
                self.keys_held.insert(key);
            }
            KeyState::Released => {
                self.keys_held.remove(&key);
                self.keys_released.insert(key);
            }
        }
        log::trace!("{:?} {:?}", key, state);
    }

    /// Check if a key is currently held.
    pub fn is_key_held(&self, key: Key) -> bool {
        self.keys_held.contains(&key)
    }

    /// Check if a key was pressed this frame.
    pub fn is_key_pressed(&self, key: Key) -> bool {
        self.keys_pressed.contains(&key)
    }

    /// Check if a key was released this frame.
    pub fn is_key_released(&self, key: Key) -> bool {
        self.keys_released.contains(&key)
    }

    /// Movement axes from held keys: (right, up, forward), each in -1..=1.
    pub fn movement_axes(&self) -> (f32, f32, f32) {
        let axis = |pos: Key, neg: Key| {
            (self.is_key_held(pos) as i32 - self.is_key_held(neg) as i32) as f32
        };
        (
            axis(Key::Right, Key::Left),
            axis(Key::Up, Key::Down),
            axis(Key::Forward, Key::Back),
        )
    }
}
