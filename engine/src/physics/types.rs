//! Physics type re-exports from glam
//!
//! Core mathematical types used by the placement math, re-exported so game
//! code does not need to name glam directly.
//!
//! Conventions: Y is up, +Z is forward, +X is right. Yaw angles are in
//! degrees, measured around +Y from +Z towards +X.

pub use glam::{EulerRot, Quat, Vec2, Vec3};

/// World up axis.
pub const WORLD_UP: Vec3 = Vec3::Y;

/// World forward axis (yaw 0).
pub const WORLD_FORWARD: Vec3 = Vec3::Z;

/// Lengths below this are treated as degenerate directions.
pub const DIRECTION_EPSILON: f32 = 1e-6;
