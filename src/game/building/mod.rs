//! Building Pieces
//!
//! Piece definitions and the catalog they are loaded from, placed piece
//! instances with health, and the world that owns them and their anchors.

pub mod catalog;
pub mod definition;
pub mod piece;
pub mod world;

pub use catalog::{CatalogError, PieceCatalog};
pub use definition::{DEFAULT_MAX_HEALTH, PieceBounds, PieceCategory, PieceDefinition};
pub use piece::{BuildingPiece, PieceState};
pub use world::{AnchorId, BlockingVolume, Overlap, PieceId, PieceWorld, PlacedAnchor, SceneLifecycle};

#[cfg(test)]
pub(crate) mod test_support {
    use glam::Vec3;

    use super::{AnchorId, PieceId};
    use crate::game::snap::{ConnectionType, SnapCandidate};

    /// `n` distinct anchor handles, each on its own piece.
    pub fn arena_ids(n: usize) -> Vec<AnchorId> {
        (0..n as u32).map(|i| AnchorId::from_parts(i, 0)).collect()
    }

    /// Unscored candidate at `distance` from source anchor 0.
    pub fn candidate(target: AnchorId, distance: f32) -> SnapCandidate {
        SnapCandidate {
            source_index: 0,
            target,
            target_piece: PieceId::from_parts(target.index(), 0),
            connection: ConnectionType::Opposite,
            distance,
            score: distance,
            target_position: Vec3::new(distance, 0.0, 0.0),
        }
    }
}
