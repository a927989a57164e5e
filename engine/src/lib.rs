//! Snapforge Engine Library
//!
//! A modular building system: pieces connect through directional snap
//! points, and a preview ("ghost") piece is matched every frame against the
//! nearest compatible anchor in the scene before it is committed.
//!
//! # Modules
//!
//! - [`physics`] - Pose value type, overlap tests and ray casts
//! - [`world`] - Grid snapping, collision layers, broad-phase spatial index
//! - [`input`] - Key codes, rebindable builder actions, per-frame input
//! - [`camera`] - Pointer rays and surface hits
//! - [`game`] - Snap points, compatibility rules, search, solver, pieces and
//!   the placement session
//!
//! # Example
//!
//! ```ignore
//! use snapforge_engine::game::{PieceCatalog, PieceWorld, PlacementConfig, PlacementSession};
//! use snapforge_engine::input::{BuildAction, FrameInput};
//!
//! let catalog = PieceCatalog::load("pieces.json")?;
//! let mut world = PieceWorld::new();
//! let mut session = PlacementSession::new(catalog, PlacementConfig::default());
//!
//! let frame = FrameInput::new().with_action(BuildAction::ToggleBuildMode);
//! session.update(&frame, &mut world, None, 1.0 / 60.0);
//! ```

pub mod camera;
pub mod input;
pub mod physics;
pub mod world;

// Building system (located in src/game/ directory)
#[path = "../../src/game/mod.rs"]
pub mod game;

// Re-export commonly used types at crate level
pub use physics::Pose;
pub use world::{GridConfig, LayerMask, SpatialIndex};
pub use input::{BuildAction, FrameInput, KeyBindings, KeyCode};
