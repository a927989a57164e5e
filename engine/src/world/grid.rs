//! Grid Configuration Module
//!
//! Grid snapping for free (unsnapped) placement.
//!
//! 1 unit = 1 meter. Unlike terrain placement, building previews snap on
//! all three axes so stacked pieces land on whole grid heights.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Grid snapping configuration.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Grid cell size in meters (Unity: 1.0)
    pub grid_size: f32,
    /// Grid snapping on/off
    pub snap_enabled: bool,
    /// Also snap the Y coordinate
    pub snap_vertical: bool,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            grid_size: 1.0,
            snap_enabled: true,
            snap_vertical: true,
        }
    }
}

impl GridConfig {
    pub fn new(grid_size: f32, snap_enabled: bool) -> Self {
        Self {
            grid_size,
            snap_enabled,
            ..Self::default()
        }
    }

    /// Snap a position to the grid if snapping is enabled.
    pub fn snap(&self, pos: Vec3) -> Vec3 {
        if !self.snap_enabled {
            return pos;
        }
        let snapped = snap_to_grid(pos, self.grid_size);
        if self.snap_vertical {
            snapped
        } else {
            Vec3::new(snapped.x, pos.y, snapped.z)
        }
    }
}

/// Round every axis of `pos` to the nearest multiple of `grid_size`.
///
/// A non-positive grid size returns the position unchanged.
pub fn snap_to_grid(pos: Vec3, grid_size: f32) -> Vec3 {
    if !grid_size.is_finite() || grid_size <= 0.0 {
        return pos;
    }
    (pos / grid_size).round() * grid_size
}
