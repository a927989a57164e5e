//! World Module
//!
//! World-space plumbing shared by the building system: grid snapping,
//! collision layers and the broad-phase spatial index.

pub mod grid;
pub mod layers;
pub mod spatial;

pub use grid::{GridConfig, snap_to_grid};
pub use layers::LayerMask;
pub use spatial::{DEFAULT_CELL_SIZE, GridIndex, LinearIndex, SpatialIndex};
