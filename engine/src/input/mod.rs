//! Input Module
//!
//! Platform-agnostic input for the builder: key codes, rebindable action
//! bindings, and the per-frame [`FrameInput`] snapshot.
//!
//! # Example
//!
//! ```rust,ignore
//! use snapforge_engine::input::{FrameInput, KeyBindings, KeyCode, KeyboardState};
//!
//! let bindings = KeyBindings::new();
//! let mut keyboard = KeyboardState::new();
//! keyboard.handle_key(KeyCode::B, true);
//!
//! let frame = FrameInput::from_keyboard(&keyboard, &bindings);
//! session.update(&frame, &mut world, None, dt);
//! keyboard.end_frame();
//! ```

pub mod bindings;
pub mod frame;
pub mod keyboard;

pub use bindings::{BuildAction, KeyBindings};
pub use frame::FrameInput;
pub use keyboard::{KeyCode, KeyboardState};
