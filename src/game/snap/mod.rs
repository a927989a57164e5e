//! Snap Module
//!
//! The snap-point engine: anchor data, the compatibility resolver, the
//! search/ranking pass with hold hysteresis, and the transform solver.
//!
//! Control flow per frame:
//! pointer hit → [`rank_candidates`] → [`SnapTracker::update`] →
//! [`solve_placement`] → placement gate (in `builder`).

pub mod anchor;
pub mod compat;
pub mod search;
pub mod solver;
pub mod types;

pub use anchor::{Anchor, WorldAnchor, DEFAULT_ROTATION_STEP};
pub use compat::{
    angle_between, can_connect, can_connect_either, classify_angle, determine_optimal_connection_type,
    is_angle45_compatible, is_elevated_floor_compatible, optimal_shared_connection, resolve_connection,
    ANGLE_TOLERANCE,
};
pub use search::{
    adaptive_search_radius, find_all_compatible, find_nearest_compatible, rank_candidates, HoldPolicy,
    SearchQuery, SnapCandidate, SnapEvent, SnapTracker,
};
pub use solver::{preserve_user_rotation, snap_yaw_to_step, solve_placement, SolveRequest};
pub use types::{ConnectionType, SnapDirection, SnapType, UnknownName};
