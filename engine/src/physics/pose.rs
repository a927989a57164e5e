//! Pose Module
//!
//! `Pose` is the position + orientation value every placed piece, preview and
//! anchor is expressed in. It replaces engine transforms: nothing here owns a
//! scene node, so poses are cheap to copy and compare.

use glam::{EulerRot, Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::types::DIRECTION_EPSILON;

/// A rigid transform: world position plus world rotation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Pose {
    pub const IDENTITY: Pose = Pose {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
        }
    }

    /// Pose with a pure yaw rotation (degrees around +Y).
    pub fn from_yaw_degrees(position: Vec3, yaw: f32) -> Self {
        Self {
            position,
            rotation: Quat::from_rotation_y(yaw.to_radians()),
        }
    }

    /// Transform a point from this pose's local space into world space.
    #[inline]
    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        self.position + self.rotation * local
    }

    /// Rotate a local direction into world space (no translation).
    #[inline]
    pub fn transform_direction(&self, local: Vec3) -> Vec3 {
        self.rotation * local
    }

    /// Transform a world point into this pose's local space.
    pub fn inverse_transform_point(&self, world: Vec3) -> Vec3 {
        self.rotation.inverse() * (world - self.position)
    }

    /// Compose a child pose expressed in this pose's local space.
    pub fn compose(&self, child: &Pose) -> Pose {
        Pose {
            position: self.transform_point(child.position),
            rotation: (self.rotation * child.rotation).normalize(),
        }
    }

    #[inline]
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }

    #[inline]
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    #[inline]
    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    /// Yaw of this pose in degrees, normalized to [0, 360).
    pub fn yaw_degrees(&self) -> f32 {
        let (yaw, _, _) = self.rotation.to_euler(EulerRot::YXZ);
        normalize_degrees(yaw.to_degrees())
    }

    /// Same pitch/roll, new yaw (degrees).
    pub fn with_yaw_degrees(&self, yaw: f32) -> Pose {
        let (_, pitch, roll) = self.rotation.to_euler(EulerRot::YXZ);
        Pose {
            position: self.position,
            rotation: Quat::from_euler(EulerRot::YXZ, yaw.to_radians(), pitch, roll),
        }
    }

    /// Rotate around world +Y by `delta` degrees.
    pub fn rotated_yaw(&self, delta: f32) -> Pose {
        Pose {
            position: self.position,
            rotation: (Quat::from_rotation_y(delta.to_radians()) * self.rotation).normalize(),
        }
    }

    pub fn with_position(&self, position: Vec3) -> Pose {
        Pose {
            position,
            rotation: self.rotation,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.rotation.is_finite()
    }
}

/// Wrap an angle in degrees into [0, 360).
pub fn normalize_degrees(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can return 360.0 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Shortest signed difference `to - from` in degrees, in (-180, 180].
pub fn delta_degrees(from: f32, to: f32) -> f32 {
    let d = (to - from).rem_euclid(360.0);
    if d > 180.0 { d - 360.0 } else { d }
}

/// Round an angle to the nearest multiple of `step` degrees.
///
/// A non-positive or non-finite step disables quantization.
pub fn quantize_degrees(angle: f32, step: f32) -> f32 {
    if !step.is_finite() || step <= 0.0 {
        return angle;
    }
    normalize_degrees((normalize_degrees(angle) / step).round() * step)
}

/// Yaw (degrees, [0, 360)) of the horizontal projection of `dir`.
///
/// Returns `None` for vertical or degenerate directions.
pub fn yaw_of_direction(dir: Vec3) -> Option<f32> {
    let flat = glam::Vec2::new(dir.x, dir.z);
    if !flat.is_finite() || flat.length_squared() < DIRECTION_EPSILON {
        return None;
    }
    Some(normalize_degrees(dir.x.atan2(dir.z).to_degrees()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < EPS
    }

    #[test]
    fn test_identity_axes() {
        let pose = Pose::IDENTITY;
        assert!(pose.forward().abs_diff_eq(Vec3::Z, EPS));
        assert!(pose.up().abs_diff_eq(Vec3::Y, EPS));
        assert!(pose.right().abs_diff_eq(Vec3::X, EPS));
    }

    #[test]
    fn test_yaw_90_turns_forward_to_right() {
        let pose = Pose::from_yaw_degrees(Vec3::ZERO, 90.0);
        assert!(pose.forward().abs_diff_eq(Vec3::X, EPS));
        assert!(approx(pose.yaw_degrees(), 90.0));
    }

    #[test]
    fn test_transform_point_roundtrip() {
        let pose = Pose::from_yaw_degrees(Vec3::new(3.0, 1.0, -2.0), 30.0);
        let local = Vec3::new(0.5, 0.25, 1.0);
        let world = pose.transform_point(local);
        assert!(pose.inverse_transform_point(world).abs_diff_eq(local, EPS));
    }

    #[test]
    fn test_with_yaw_keeps_position() {
        let pose = Pose::from_yaw_degrees(Vec3::new(1.0, 2.0, 3.0), 10.0);
        let turned = pose.with_yaw_degrees(200.0);
        assert_eq!(turned.position, pose.position);
        assert!(approx(turned.yaw_degrees(), 200.0));
    }

    #[test]
    fn test_quantize_degrees() {
        assert!(approx(quantize_degrees(52.0, 45.0), 45.0));
        assert!(approx(quantize_degrees(68.0, 45.0), 90.0));
        assert!(approx(quantize_degrees(-52.0, 45.0), 315.0));
        assert!(approx(quantize_degrees(359.0, 45.0), 0.0));
        // Non-positive step leaves the angle alone
        assert!(approx(quantize_degrees(52.0, 0.0), 52.0));
        assert!(approx(quantize_degrees(52.0, -15.0), 52.0));
    }

    #[test]
    fn test_delta_degrees_wraps() {
        assert!(approx(delta_degrees(350.0, 10.0), 20.0));
        assert!(approx(delta_degrees(10.0, 350.0), -20.0));
        assert!(approx(delta_degrees(0.0, 180.0), 180.0));
    }

    #[test]
    fn test_yaw_of_direction() {
        assert!(approx(yaw_of_direction(Vec3::Z).unwrap(), 0.0));
        assert!(approx(yaw_of_direction(Vec3::X).unwrap(), 90.0));
        assert!(approx(yaw_of_direction(-Vec3::Z).unwrap(), 180.0));
        assert!(approx(yaw_of_direction(-Vec3::X).unwrap(), 270.0));
        assert!(yaw_of_direction(Vec3::Y).is_none());
        assert!(yaw_of_direction(Vec3::ZERO).is_none());
        assert!(yaw_of_direction(Vec3::new(f32::NAN, 0.0, 1.0)).is_none());
    }
}
