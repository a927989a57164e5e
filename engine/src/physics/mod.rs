//! Physics module
//!
//! The geometry the building system needs, built without a physics engine:
//! a pose value type and the overlap and ray tests used by placement.
//!
//! # Unit System
//!
//! **1 unit = 1 meter**, angles in degrees at API boundaries.
//!
//! # Submodules
//!
//! - [`types`] - Core mathematical types (Vec3, Quat) re-exported from glam
//! - [`pose`] - `Pose` (position + rotation) and yaw helpers
//! - [`collision`] - AABB/OBB/sphere overlap tests and ray casts

pub mod collision;
pub mod pose;
pub mod types;

pub use collision::{Aabb, Obb, Sphere, ray_aabb_intersect, ray_obb_intersect};
pub use pose::{Pose, delta_degrees, normalize_degrees, quantize_degrees, yaw_of_direction};
pub use types::{Quat, Vec3};
