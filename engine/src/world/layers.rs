//! Collision layers
//!
//! A small bit set naming what a volume is, so overlap queries can ask for
//! "anything that blocks building" without knowing every kind of object.

use std::ops::{BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};

/// Bit set of collision layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const NONE: LayerMask = LayerMask(0);
    pub const ALL: LayerMask = LayerMask(u32::MAX);

    /// Terrain and other placement surfaces.
    pub const GROUND: LayerMask = LayerMask(1 << 0);
    /// Placed building pieces.
    pub const BUILDINGS: LayerMask = LayerMask(1 << 1);
    /// Player characters.
    pub const PLAYER: LayerMask = LayerMask(1 << 2);
    /// Objects that must never be built over (spawn points, depots, ...).
    pub const CRITICAL: LayerMask = LayerMask(1 << 3);
    /// Preview ghosts; never blocks anything.
    pub const PREVIEW: LayerMask = LayerMask(1 << 4);

    pub fn contains(self, other: LayerMask) -> bool {
        self.0 & other.0 == other.0
    }

    /// True if the two masks share at least one layer.
    pub fn intersects(self, other: LayerMask) -> bool {
        self.0 & other.0 != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Look up a layer by its name, as used in config files and the CLI.
    pub fn from_name(name: &str) -> Option<LayerMask> {
        match name.to_ascii_lowercase().as_str() {
            "ground" => Some(Self::GROUND),
            "buildings" => Some(Self::BUILDINGS),
            "player" => Some(Self::PLAYER),
            "critical" => Some(Self::CRITICAL),
            "preview" => Some(Self::PREVIEW),
            _ => None,
        }
    }
}

impl BitOr for LayerMask {
    type Output = LayerMask;

    fn bitor(self, rhs: LayerMask) -> LayerMask {
        LayerMask(self.0 | rhs.0)
    }
}

impl BitOrAssign for LayerMask {
    fn bitor_assign(&mut self, rhs: LayerMask) {
        self.0 |= rhs.0;
    }
}
