//! Snap Anchors
//!
//! An [`Anchor`] is one typed, directional connection point authored on a
//! piece. It stores only local data; everything world-space goes through a
//! [`WorldAnchor`] view built from the owner's current pose, so the
//! direction is always derived from the owner and never cached.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::types::{ConnectionType, SnapDirection, SnapType};
use crate::physics::Pose;

/// Default yaw step used when an anchor locks rotation.
pub const DEFAULT_ROTATION_STEP: f32 = 45.0;

/// Default editor test radius for connection gizmos.
pub const DEFAULT_CONNECTION_TEST_RADIUS: f32 = 1.5;

/// A connection point, in its owner's local space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Anchor {
    /// Architectural role of this point
    pub point_type: SnapType,
    /// Roles this point accepts as a partner
    pub accepted_types: Vec<SnapType>,
    /// Required angular relation to the partner
    pub connection_type: ConnectionType,
    /// Local axis the point faces along
    pub direction: SnapDirection,
    /// Offset from the owner's origin
    pub local_position: Vec3,
    /// Extra rotation relative to the owner
    pub local_rotation: Quat,
    /// Counts as structural support when used as a placement target
    pub provides_support: bool,
    /// Placing through this point quantizes yaw to `rotation_step`
    pub lock_rotation: bool,
    /// Yaw step in degrees
    pub rotation_step: f32,
    /// Pick the connection type from `allowed_connection_types` at match time
    pub auto_adjust_connection: bool,
    /// Candidates for auto-adjustment; empty means all five
    pub allowed_connection_types: Vec<ConnectionType>,
    /// Cosmetic offset applied to a piece snapped onto this point
    pub visual_offset: Vec3,
    /// Cosmetic rotation applied to a piece snapped onto this point
    pub visual_rotation_offset: Quat,
    /// Radius used by authoring tools when listing candidate partners
    pub connection_test_radius: f32,
}

impl Default for Anchor {
    fn default() -> Self {
        Self {
            point_type: SnapType::None,
            accepted_types: Vec::new(),
            connection_type: ConnectionType::Opposite,
            direction: SnapDirection::Forward,
            local_position: Vec3::ZERO,
            local_rotation: Quat::IDENTITY,
            provides_support: true,
            lock_rotation: false,
            rotation_step: DEFAULT_ROTATION_STEP,
            auto_adjust_connection: true,
            allowed_connection_types: Vec::new(),
            visual_offset: Vec3::ZERO,
            visual_rotation_offset: Quat::IDENTITY,
            connection_test_radius: DEFAULT_CONNECTION_TEST_RADIUS,
        }
    }
}

impl Anchor {
    pub fn new(point_type: SnapType, direction: SnapDirection) -> Self {
        Self {
            point_type,
            direction,
            ..Self::default()
        }
    }

    pub fn at(mut self, local_position: Vec3) -> Self {
        self.local_position = local_position;
        self
    }

    pub fn with_local_rotation(mut self, rotation: Quat) -> Self {
        self.local_rotation = rotation;
        self
    }

    pub fn accepting(mut self, types: impl IntoIterator<Item = SnapType>) -> Self {
        self.accepted_types = types.into_iter().collect();
        self
    }

    /// Use exactly this connection type (auto-adjust off).
    pub fn with_fixed_connection(mut self, connection: ConnectionType) -> Self {
        self.connection_type = connection;
        self.auto_adjust_connection = false;
        self
    }

    /// Auto-adjust among `allowed` (empty = all five).
    pub fn auto_adjusting(mut self, allowed: impl IntoIterator<Item = ConnectionType>) -> Self {
        self.auto_adjust_connection = true;
        self.allowed_connection_types = allowed.into_iter().collect();
        self
    }

    pub fn with_support(mut self, provides_support: bool) -> Self {
        self.provides_support = provides_support;
        self
    }

    pub fn locking_rotation(mut self, step: f32) -> Self {
        self.lock_rotation = true;
        self.rotation_step = step;
        self
    }

    pub fn with_visual_offset(mut self, offset: Vec3, rotation: Quat) -> Self {
        self.visual_offset = offset;
        self.visual_rotation_offset = rotation;
        self
    }

    /// Facing direction in the owner's local frame.
    pub fn local_direction(&self) -> Vec3 {
        self.local_rotation * self.direction.local_axis()
    }

    /// Connection types auto-adjustment may pick from.
    pub fn effective_allowed(&self) -> &[ConnectionType] {
        if self.allowed_connection_types.is_empty() {
            &ConnectionType::ALL
        } else {
            &self.allowed_connection_types
        }
    }

    /// Persist a connection type found by the resolver.
    pub fn adopt_connection(&mut self, connection: ConnectionType) {
        self.connection_type = connection;
    }

    /// World view of this anchor on an owner at `owner`.
    pub fn in_world(&self, owner: Pose) -> WorldAnchor<'_> {
        WorldAnchor { anchor: self, owner }
    }
}

/// An anchor seen through its owner's current pose.
#[derive(Debug, Clone, Copy)]
pub struct WorldAnchor<'a> {
    pub anchor: &'a Anchor,
    pub owner: Pose,
}

impl<'a> WorldAnchor<'a> {
    pub fn new(anchor: &'a Anchor, owner: Pose) -> Self {
        Self { anchor, owner }
    }

    pub fn position(&self) -> Vec3 {
        self.owner.transform_point(self.anchor.local_position)
    }

    pub fn rotation(&self) -> Quat {
        self.owner.rotation * self.anchor.local_rotation
    }

    /// World facing direction, recomputed from the owner every call.
    pub fn direction(&self) -> Vec3 {
        self.rotation() * self.anchor.direction.local_axis()
    }

    pub fn pose(&self) -> Pose {
        Pose::new(self.position(), self.rotation())
    }
}
