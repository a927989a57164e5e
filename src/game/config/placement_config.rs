//! Placement Configuration
//!
//! Tuning for the placement session: snap radii and hysteresis, grid and
//! rotation steps, reach limits, blocking layers and the surfaces a free
//! preview may sit on. Every field has a default, so a JSON file only
//! needs the values it changes.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::camera::SurfaceHit;
use crate::game::snap::HoldPolicy;
use crate::world::{GridConfig, LayerMask};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read placement config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid placement config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Surfaces an unsnapped preview may follow. An empty filter accepts
/// every surface.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceFilter {
    pub tags: Vec<String>,
    pub layers: LayerMask,
}

impl SurfaceFilter {
    pub fn tagged(tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            tags: tags.into_iter().map(Into::into).collect(),
            layers: LayerMask::NONE,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty() && self.layers.is_empty()
    }

    pub fn accepts(&self, hit: &SurfaceHit) -> bool {
        if self.is_empty() {
            return true;
        }
        let tag_ok = hit
            .tag
            .as_deref()
            .is_some_and(|tag| self.tags.iter().any(|t| t == tag));
        tag_ok || self.layers.intersects(hit.layer)
    }
}

/// Tuning for one placement session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    /// Base broad-phase radius around the preview
    pub snap_detection_radius: f32,
    /// Anchor pairs scoring at or above this never snap
    pub snap_max_distance: f32,
    /// Pointer this far from the held anchor counts as breaking away
    pub snap_priority_distance: f32,
    /// Seconds a hold survives with no candidates
    pub snap_stability_threshold: f32,
    /// Score multiplier for the held target
    pub held_snap_discount: f32,
    /// Relative improvement a rival needs to displace the hold
    pub switch_margin: f32,
    /// Pointer motion (pixels per frame) that breaks a hold
    pub pointer_break_threshold: f32,
    /// Hit within this of the held anchor keeps the hold on its own
    pub snap_tolerance: f32,

    pub apply_rotation_during_snap: bool,
    pub use_visual_offsets: bool,

    pub grid_size: f32,
    pub use_grid_snapping: bool,

    /// Pointer ray length
    pub max_build_distance: f32,
    /// Horizontal reach from the player; `None` disables the check
    pub max_placement_distance: Option<f32>,

    /// Degrees per RotateLeft/RotateRight press
    pub manual_rotation_step: f32,

    pub blocking_layers: LayerMask,
    /// Piece bounds are shrunk by this before the overlap test
    pub overlap_shrink: f32,

    /// Seconds the feedback keeps a validity verdict before it may flip
    pub validity_lock_time: f32,

    pub valid_surfaces: SurfaceFilter,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            snap_detection_radius: 1.0,
            snap_max_distance: 0.5,
            snap_priority_distance: 2.0,
            snap_stability_threshold: 0.5,
            held_snap_discount: 0.7,
            switch_margin: 0.2,
            pointer_break_threshold: 1.5,
            snap_tolerance: 0.1,
            apply_rotation_during_snap: true,
            use_visual_offsets: true,
            grid_size: 1.0,
            use_grid_snapping: true,
            max_build_distance: 10.0,
            max_placement_distance: Some(5.0),
            manual_rotation_step: 15.0,
            blocking_layers: LayerMask::BUILDINGS | LayerMask::PLAYER | LayerMask::CRITICAL,
            overlap_shrink: 0.9,
            validity_lock_time: 0.3,
            valid_surfaces: SurfaceFilter::default(),
        }
    }
}

impl PlacementConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: PlacementConfig = serde_json::from_str(json)?;
        Ok(config.sanitized())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_json_str(&std::fs::read_to_string(path)?)
    }

    /// Replace values that would break the session with defaults.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        let fix = |name: &str, value: &mut f32, fallback: f32, allow_zero: bool| {
            let bad = !value.is_finite() || *value < 0.0 || (!allow_zero && *value == 0.0);
            if bad {
                warn!(field = name, value = *value, fallback, "[Config] Invalid value, using default");
                *value = fallback;
            }
        };

        fix("snap_detection_radius", &mut self.snap_detection_radius, defaults.snap_detection_radius, false);
        fix("snap_max_distance", &mut self.snap_max_distance, defaults.snap_max_distance, false);
        fix("snap_priority_distance", &mut self.snap_priority_distance, defaults.snap_priority_distance, false);
        fix("snap_stability_threshold", &mut self.snap_stability_threshold, defaults.snap_stability_threshold, true);
        fix("pointer_break_threshold", &mut self.pointer_break_threshold, defaults.pointer_break_threshold, false);
        fix("snap_tolerance", &mut self.snap_tolerance, defaults.snap_tolerance, true);
        fix("grid_size", &mut self.grid_size, defaults.grid_size, false);
        fix("max_build_distance", &mut self.max_build_distance, defaults.max_build_distance, false);
        fix("manual_rotation_step", &mut self.manual_rotation_step, defaults.manual_rotation_step, false);
        fix("validity_lock_time", &mut self.validity_lock_time, defaults.validity_lock_time, true);

        if !(0.0..=1.0).contains(&self.held_snap_discount) {
            warn!(value = self.held_snap_discount, "[Config] held_snap_discount outside 0..=1, using default");
            self.held_snap_discount = defaults.held_snap_discount;
        }
        if !(0.0..1.0).contains(&self.switch_margin) {
            warn!(value = self.switch_margin, "[Config] switch_margin outside 0..1, using default");
            self.switch_margin = defaults.switch_margin;
        }
        if !(self.overlap_shrink > 0.0 && self.overlap_shrink <= 1.0) {
            warn!(value = self.overlap_shrink, "[Config] overlap_shrink outside (0, 1], using default");
            self.overlap_shrink = defaults.overlap_shrink;
        }
        if let Some(reach) = self.max_placement_distance {
            if !reach.is_finite() || reach <= 0.0 {
                warn!(value = reach, "[Config] max_placement_distance not positive, disabling the reach check");
                self.max_placement_distance = None;
            }
        }
        self
    }

    pub fn hold_policy(&self) -> HoldPolicy {
        HoldPolicy {
            switch_margin: self.switch_margin,
            stability_threshold: self.snap_stability_threshold,
        }
    }

    pub fn grid(&self) -> GridConfig {
        GridConfig::new(self.grid_size, self.use_grid_snapping)
    }
}
