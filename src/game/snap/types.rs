//! Snap Point Types
//!
//! The closed vocabularies a snap point is described with: its
//! architectural role ([`SnapType`]), the angular relation it demands of a
//! partner ([`ConnectionType`]) and the local axis it points along
//! ([`SnapDirection`]).

use std::fmt;
use std::str::FromStr;

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Architectural role of a snap point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum SnapType {
    // Basic
    #[default]
    None,
    Any,

    // Foundation
    FoundationTopEdge,
    FoundationTopCorner,
    FoundationSide,
    FoundationBottom,

    // Wall
    WallBottom,
    WallTop,
    WallSide,

    // Floor / ceiling
    FloorEdge,
    FloorCorner,
    Ceiling,
    UpperFloorEdge,
    LowerFloorEdge,

    // Roof
    RoofBottomEdge,
    RoofRidge,
    RoofGableEdge,
    RoofValley,
    RoofHip,

    // Doors and windows
    DoorFrameBottom,
    DoorFrameSide,
    DoorFrameTop,
    WindowSill,
    WindowFrameSide,
    WindowFrameTop,

    // Structural supports
    PillarTop,
    PillarBottom,
    BeamEnd,
    BeamSide,

    // Stairs and fences
    StairBottom,
    StairTop,
    StairSide,
    StairLanding,
    FencePostBottom,
    FencePostTop,
    FenceRailMount,

    // Fixture mounts
    WallSurfaceMount,
    CeilingMount,
    FloorMount,
}

impl SnapType {
    pub const ALL: [SnapType; 39] = [
        SnapType::None,
        SnapType::Any,
        SnapType::FoundationTopEdge,
        SnapType::FoundationTopCorner,
        SnapType::FoundationSide,
        SnapType::FoundationBottom,
        SnapType::WallBottom,
        SnapType::WallTop,
        SnapType::WallSide,
        SnapType::FloorEdge,
        SnapType::FloorCorner,
        SnapType::Ceiling,
        SnapType::UpperFloorEdge,
        SnapType::LowerFloorEdge,
        SnapType::RoofBottomEdge,
        SnapType::RoofRidge,
        SnapType::RoofGableEdge,
        SnapType::RoofValley,
        SnapType::RoofHip,
        SnapType::DoorFrameBottom,
        SnapType::DoorFrameSide,
        SnapType::DoorFrameTop,
        SnapType::WindowSill,
        SnapType::WindowFrameSide,
        SnapType::WindowFrameTop,
        SnapType::PillarTop,
        SnapType::PillarBottom,
        SnapType::BeamEnd,
        SnapType::BeamSide,
        SnapType::StairBottom,
        SnapType::StairTop,
        SnapType::StairSide,
        SnapType::StairLanding,
        SnapType::FencePostBottom,
        SnapType::FencePostTop,
        SnapType::FenceRailMount,
        SnapType::WallSurfaceMount,
        SnapType::CeilingMount,
        SnapType::FloorMount,
    ];
}

/// Required angular relationship between two snap directions.
///
/// Declaration order is the order auto-adjustment tries the types in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum ConnectionType {
    /// Facing each other (~180°)
    #[default]
    Opposite,
    /// At right angles (~90°)
    Perpendicular,
    /// Diagonal (~45° or ~135°)
    Angle45,
    /// Same direction (~0°)
    Parallel,
    /// Direction is not checked
    Any,
}

impl ConnectionType {
    pub const ALL: [ConnectionType; 5] = [
        ConnectionType::Opposite,
        ConnectionType::Perpendicular,
        ConnectionType::Angle45,
        ConnectionType::Parallel,
        ConnectionType::Any,
    ];
}

/// Local axis a snap point faces along. Directions should point out of
/// the piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SnapDirection {
    /// +Z
    #[default]
    Forward,
    /// -Z
    Back,
    /// +Y
    Up,
    /// -Y
    Down,
    /// -X
    Left,
    /// +X
    Right,
}

impl SnapDirection {
    pub const ALL: [SnapDirection; 6] = [
        SnapDirection::Forward,
        SnapDirection::Back,
        SnapDirection::Up,
        SnapDirection::Down,
        SnapDirection::Left,
        SnapDirection::Right,
    ];

    /// Unit axis in the snap point's local frame.
    pub fn local_axis(self) -> Vec3 {
        match self {
            SnapDirection::Forward => Vec3::Z,
            SnapDirection::Back => Vec3::NEG_Z,
            SnapDirection::Up => Vec3::Y,
            SnapDirection::Down => Vec3::NEG_Y,
            SnapDirection::Left => Vec3::NEG_X,
            SnapDirection::Right => Vec3::X,
        }
    }

    pub fn is_vertical(self) -> bool {
        matches!(self, SnapDirection::Up | SnapDirection::Down)
    }
}

// ============================================================================
// NAME PARSING
// ============================================================================

/// A name that does not match any variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{name}'")]
pub struct UnknownName {
    pub kind: &'static str,
    pub name: String,
}

fn parse_by_debug_name<T: Copy + fmt::Debug>(all: &[T], kind: &'static str, s: &str) -> Result<T, UnknownName> {
    let wanted: String = s.chars().filter(|c| *c != '_' && *c != '-').collect();
    all.iter()
        .copied()
        .find(|v| format!("{:?}", v).eq_ignore_ascii_case(&wanted))
        .ok_or_else(|| UnknownName {
            kind,
            name: s.to_string(),
        })
}

macro_rules! display_and_parse {
    ($ty:ty, $kind:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{:?}", self)
            }
        }

        impl FromStr for $ty {
            type Err = UnknownName;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                parse_by_debug_name(&<$ty>::ALL, $kind, s)
            }
        }
    };
}

display_and_parse!(SnapType, "snap type");
display_and_parse!(ConnectionType, "connection type");
display_and_parse!(SnapDirection, "snap direction");
