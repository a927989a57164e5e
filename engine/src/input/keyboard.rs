//! Keyboard Input Module
//!
//! Generic key codes and a pressed-key tracker that reports edges
//! ("pressed this frame"), independent of any windowing system.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Generic key codes, independent of windowing system.
///
/// Pointer buttons are included so they can be bound like keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum KeyCode {
    // Letter keys used by the builder
    B,
    E,
    G,
    Q,
    R,
    T,

    // Number keys
    Digit1,
    Digit2,
    Digit3,
    Digit4,
    Digit5,
    Digit6,
    Digit7,
    Digit8,
    Digit9,

    // Arrow keys
    ArrowLeft,
    ArrowRight,

    // Punctuation
    Comma,
    Period,

    // Control keys
    Escape,
    ControlLeft,
    ShiftLeft,

    // Pointer buttons
    MouseLeft,
    MouseRight,
    MouseMiddle,

    /// Catch-all for unhandled keys
    Unknown,
}

impl KeyCode {
    /// Slot index (0-based) for the number row, `None` for other keys.
    pub fn digit_slot(self) -> Option<usize> {
        match self {
            KeyCode::Digit1 => Some(0),
            KeyCode::Digit2 => Some(1),
            KeyCode::Digit3 => Some(2),
            KeyCode::Digit4 => Some(3),
            KeyCode::Digit5 => Some(4),
            KeyCode::Digit6 => Some(5),
            KeyCode::Digit7 => Some(6),
            KeyCode::Digit8 => Some(7),
            KeyCode::Digit9 => Some(8),
            _ => None,
        }
    }
}

/// Tracks held keys and the keys that went down since the last frame.
#[derive(Debug, Clone, Default)]
pub struct KeyboardState {
    held: HashSet<KeyCode>,
    just_pressed: HashSet<KeyCode>,
}

impl KeyboardState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle a key press or release event.
    pub fn handle_key(&mut self, key: KeyCode, pressed: bool) {
        if pressed {
            // Key repeat does not count as a new press
            if self.held.insert(key) {
                self.just_pressed.insert(key);
            }
        } else {
            self.held.remove(&key);
        }
    }

    pub fn is_held(&self, key: KeyCode) -> bool {
        self.held.contains(&key)
    }

    pub fn was_pressed(&self, key: KeyCode) -> bool {
        self.just_pressed.contains(&key)
    }

    pub fn pressed_this_frame(&self) -> &HashSet<KeyCode> {
        &self.just_pressed
    }

    /// Clear the per-frame edges. Call once at the end of every frame.
    pub fn end_frame(&mut self) {
        self.just_pressed.clear();
    }

    pub fn reset(&mut self) {
        self.held.clear();
        self.just_pressed.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_edge_only_once() {
        let mut keys = KeyboardState::new();
        keys.handle_key(KeyCode::Q, true);
        assert!(keys.was_pressed(KeyCode::Q));
        keys.end_frame();

        // Held key repeating is not a new press
        keys.handle_key(KeyCode::Q, true);
        assert!(keys.is_held(KeyCode::Q));
        assert!(!keys.was_pressed(KeyCode::Q));
    }

    #[test]
    fn test_release_and_repress() {
        let mut keys = KeyboardState::new();
        keys.handle_key(KeyCode::E, true);
        keys.end_frame();
        keys.handle_key(KeyCode::E, false);
        assert!(!keys.is_held(KeyCode::E));
        keys.handle_key(KeyCode::E, true);
        assert!(keys.was_pressed(KeyCode::E));
    }

    #[test]
    fn test_digit_slot() {
        assert_eq!(KeyCode::Digit1.digit_slot(), Some(0));
        assert_eq!(KeyCode::Digit5.digit_slot(), Some(4));
        assert_eq!(KeyCode::B.digit_slot(), None);
    }
}
