//! Frame Input
//!
//! The snapshot of input the builder polls once per frame: the pointer hit,
//! how far the pointer moved, and which actions fired.

use glam::{Vec2, Vec3};

use super::{BuildAction, KeyBindings, KeyboardState};
use crate::camera::SurfaceHit;

/// Everything the placement session reads from input in one frame.
#[derive(Debug, Clone, Default)]
pub struct FrameInput {
    /// Where the pointer ray hit the scene, if anywhere
    pub hit: Option<SurfaceHit>,
    /// Pointer movement this frame, in screen pixels
    pub pointer_delta: Vec2,
    /// Scroll wheel delta (positive = next piece)
    pub scroll: f32,
    /// Actions that fired this frame
    pub actions: Vec<BuildAction>,
    /// Player position, for the placement range check
    pub player_position: Option<Vec3>,
}

impl FrameInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a frame from the keys that went down since the last frame.
    pub fn from_keyboard(keyboard: &KeyboardState, bindings: &KeyBindings) -> Self {
        Self {
            actions: bindings.actions_for(keyboard.pressed_this_frame()),
            ..Self::default()
        }
    }

    pub fn with_hit(mut self, hit: SurfaceHit) -> Self {
        self.hit = Some(hit);
        self
    }

    pub fn with_action(mut self, action: BuildAction) -> Self {
        self.actions.push(action);
        self
    }

    pub fn with_pointer_delta(mut self, delta: Vec2) -> Self {
        self.pointer_delta = delta;
        self
    }

    pub fn with_player(mut self, position: Vec3) -> Self {
        self.player_position = Some(position);
        self
    }

    pub fn with_scroll(mut self, scroll: f32) -> Self {
        self.scroll = scroll;
        self
    }

    pub fn triggered(&self, action: BuildAction) -> bool {
        self.actions.contains(&action)
    }
}
