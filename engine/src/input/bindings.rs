//! Input Bindings Module
//!
//! Maps physical keys to builder actions, allowing key remapping without
//! touching the placement logic.

use std::collections::{HashMap, HashSet};

use super::KeyCode;

/// Logical builder actions that can be bound to physical keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BuildAction {
    /// Enter / leave build mode (default: B)
    ToggleBuildMode,
    /// Turn the preview counter-clockwise (default: Q)
    RotateLeft,
    /// Turn the preview clockwise (default: E)
    RotateRight,
    /// Commit the preview (default: left mouse)
    Place,
    /// Step through the ranked snap candidates (default: T)
    CycleSnap,
    /// Select the next piece in the catalog (default: right arrow)
    NextPiece,
    /// Select the previous piece in the catalog (default: left arrow)
    PreviousPiece,
    /// Select a catalog slot directly (defaults: 1-5)
    SelectSlot(u8),
    /// Toggle whether snapping also rotates the preview (default: G)
    ToggleRotationSnap,
}

/// Maps physical keys to logical actions, supporting customizable key bindings.
#[derive(Debug, Clone)]
pub struct KeyBindings {
    /// Map from physical key to logical action
    key_to_action: HashMap<KeyCode, BuildAction>,
    /// Map from logical action to physical key (for reverse lookup and display)
    action_to_key: HashMap<BuildAction, KeyCode>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyBindings {
    /// Create a new KeyBindings instance with default key mappings.
    ///
    /// Default bindings:
    /// - B = ToggleBuildMode
    /// - Q / E = RotateLeft / RotateRight
    /// - Left mouse = Place
    /// - T = CycleSnap
    /// - Right / Left arrow = NextPiece / PreviousPiece
    /// - 1..5 = SelectSlot(0..4)
    /// - G = ToggleRotationSnap
    pub fn new() -> Self {
        let mut bindings = Self {
            key_to_action: HashMap::new(),
            action_to_key: HashMap::new(),
        };

        bindings.bind(KeyCode::B, BuildAction::ToggleBuildMode);
        bindings.bind(KeyCode::Q, BuildAction::RotateLeft);
        bindings.bind(KeyCode::E, BuildAction::RotateRight);
        bindings.bind(KeyCode::MouseLeft, BuildAction::Place);
        bindings.bind(KeyCode::T, BuildAction::CycleSnap);
        bindings.bind(KeyCode::ArrowRight, BuildAction::NextPiece);
        bindings.bind(KeyCode::ArrowLeft, BuildAction::PreviousPiece);
        bindings.bind(KeyCode::G, BuildAction::ToggleRotationSnap);
        for key in [
            KeyCode::Digit1,
            KeyCode::Digit2,
            KeyCode::Digit3,
            KeyCode::Digit4,
            KeyCode::Digit5,
        ] {
            if let Some(slot) = key.digit_slot() {
                bindings.bind(key, BuildAction::SelectSlot(slot as u8));
            }
        }

        bindings
    }

    /// Bind a physical key to a logical action.
    ///
    /// If the key was previously bound to another action, that binding is removed.
    /// If the action was previously bound to another key, that binding is also removed.
    pub fn bind(&mut self, key: KeyCode, action: BuildAction) {
        if let Some(old_action) = self.key_to_action.remove(&key) {
            self.action_to_key.remove(&old_action);
        }
        if let Some(old_key) = self.action_to_key.remove(&action) {
            self.key_to_action.remove(&old_key);
        }

        self.key_to_action.insert(key, action);
        self.action_to_key.insert(action, key);
    }

    /// Remove the binding for a specific key.
    pub fn unbind_key(&mut self, key: KeyCode) {
        if let Some(action) = self.key_to_action.remove(&key) {
            self.action_to_key.remove(&action);
        }
    }

    /// Remove the binding for a specific action.
    pub fn unbind_action(&mut self, action: BuildAction) {
        if let Some(key) = self.action_to_key.remove(&action) {
            self.key_to_action.remove(&key);
        }
    }

    /// Get the action bound to a physical key, if any.
    pub fn get_action(&self, key: KeyCode) -> Option<BuildAction> {
        self.key_to_action.get(&key).copied()
    }

    /// Get the key bound to a logical action, if any.
    pub fn get_key(&self, action: BuildAction) -> Option<KeyCode> {
        self.action_to_key.get(&action).copied()
    }

    /// Check if a specific action was triggered, given a set of pressed keys.
    pub fn is_action_pressed(&self, action: BuildAction, pressed_keys: &HashSet<KeyCode>) -> bool {
        self.action_to_key
            .get(&action)
            .is_some_and(|key| pressed_keys.contains(key))
    }

    /// Translate a set of pressed keys into actions, in a stable order.
    pub fn actions_for(&self, pressed_keys: &HashSet<KeyCode>) -> Vec<BuildAction> {
        let mut actions: Vec<BuildAction> = pressed_keys
            .iter()
            .filter_map(|key| self.get_action(*key))
            .collect();
        actions.sort();
        actions
    }
}
