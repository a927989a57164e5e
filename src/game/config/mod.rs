//! Config Module
//!
//! Tuning for the placement session.

pub mod placement_config;

pub use placement_config::{ConfigError, PlacementConfig, SurfaceFilter};
