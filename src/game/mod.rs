//! Game Module
//!
//! The building system on top of the engine: snap anchors and their rules,
//! piece definitions and the world of placed pieces, resource costs, and
//! the build mode session that ties them together.

pub mod builder;
pub mod building;
pub mod config;
pub mod economy;
pub mod snap;

pub use builder::{CommitOutcome, FrameOutcome, PlacementSession, PlacementVerdict, PreviewFeedback, SessionState};
pub use building::{
    AnchorId, BuildingPiece, CatalogError, PieceCatalog, PieceCategory, PieceDefinition, PieceId, PieceWorld,
    SceneLifecycle,
};
pub use config::{ConfigError, PlacementConfig, SurfaceFilter};
pub use economy::{ResourceRequirement, ResourceStorage, ResourceType, Resources, StorageDepot};
pub use snap::{Anchor, ConnectionType, SnapDirection, SnapType, WorldAnchor};
