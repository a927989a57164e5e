//! Camera Module
//!
//! Pointer-ray construction and ray casts. Window-system agnostic: it only
//! deals with camera math.

pub mod raycast;

pub use raycast::{Ray, SurfaceHit, raycast_ground, screen_to_ray};
