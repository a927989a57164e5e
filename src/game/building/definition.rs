//! Piece Definitions
//!
//! Static, shared description of a buildable piece: what it is called,
//! what it costs, how big it is and which anchors it carries. Placed
//! pieces reference their definition through an `Arc`.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::game::economy::ResourceRequirement;
use crate::game::snap::Anchor;
use crate::physics::{Obb, Pose};
use crate::world::LayerMask;

/// Health a piece starts with unless its definition says otherwise.
pub const DEFAULT_MAX_HEALTH: f32 = 100.0;

/// Broad grouping used by the build menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PieceCategory {
    #[default]
    Foundation,
    Wall,
    Floor,
    Roof,
    Utility,
}

/// Local-space box around a piece.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PieceBounds {
    pub center: Vec3,
    pub half_extents: Vec3,
}

impl Default for PieceBounds {
    fn default() -> Self {
        Self {
            center: Vec3::ZERO,
            half_extents: Vec3::splat(0.5),
        }
    }
}

impl PieceBounds {
    pub fn new(center: Vec3, half_extents: Vec3) -> Self {
        Self { center, half_extents }
    }

    /// World box for a piece standing at `pose`.
    pub fn obb_at(&self, pose: &Pose) -> Obb {
        Obb::from_pose(pose, self.center, self.half_extents)
    }

    /// Radius from the piece origin that encloses the box.
    pub fn bounding_radius(&self) -> f32 {
        self.center.length() + self.half_extents.abs().length()
    }
}

fn default_layer() -> LayerMask {
    LayerMask::BUILDINGS
}

fn default_max_health() -> f32 {
    DEFAULT_MAX_HEALTH
}

/// A buildable piece.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieceDefinition {
    pub name: String,
    #[serde(default)]
    pub category: PieceCategory,
    /// Asset spawned for the real piece
    #[serde(default)]
    pub prefab: String,
    /// Asset used for the ghost; falls back to `prefab`
    #[serde(default)]
    pub preview_prefab: Option<String>,
    #[serde(default)]
    pub requirements: Vec<ResourceRequirement>,
    #[serde(default)]
    pub bounds: PieceBounds,
    #[serde(default)]
    pub anchors: Vec<Anchor>,
    #[serde(default = "default_max_health")]
    pub max_health: f32,
    #[serde(default = "default_layer")]
    pub layer: LayerMask,
}

impl PieceDefinition {
    pub fn new(name: impl Into<String>, category: PieceCategory) -> Self {
        let name = name.into();
        Self {
            prefab: name.clone(),
            name,
            category,
            preview_prefab: None,
            requirements: Vec::new(),
            bounds: PieceBounds::default(),
            anchors: Vec::new(),
            max_health: DEFAULT_MAX_HEALTH,
            layer: default_layer(),
        }
    }

    pub fn with_bounds(mut self, center: Vec3, half_extents: Vec3) -> Self {
        self.bounds = PieceBounds::new(center, half_extents);
        self
    }

    pub fn with_anchor(mut self, anchor: Anchor) -> Self {
        self.anchors.push(anchor);
        self
    }

    pub fn with_cost(mut self, requirement: ResourceRequirement) -> Self {
        self.requirements.push(requirement);
        self
    }

    pub fn with_max_health(mut self, max_health: f32) -> Self {
        self.max_health = max_health;
        self
    }

    pub fn preview_prefab(&self) -> &str {
        self.preview_prefab.as_deref().unwrap_or(&self.prefab)
    }

    pub fn obb_at(&self, pose: &Pose) -> Obb {
        self.bounds.obb_at(pose)
    }
}
