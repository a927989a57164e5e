//! Placement Transform Solver
//!
//! Given the held (source, target) pair, compute where the preview goes:
//! turn it (yaw only) so the source anchor takes the facing its connection
//! type asks for, then translate it so both anchors coincide.

use glam::{Quat, Vec3};

use super::anchor::{Anchor, WorldAnchor};
use super::types::ConnectionType;
use crate::physics::{Pose, delta_degrees, quantize_degrees, yaw_of_direction};

/// Everything the solver needs for one pair.
#[derive(Debug, Clone, Copy)]
pub struct SolveRequest<'a> {
    /// Anchor on the mover
    pub source: &'a Anchor,
    pub target: WorldAnchor<'a>,
    /// Connection type the pair resolved with
    pub connection: ConnectionType,
    /// Mover pose before solving
    pub mover: Pose,
    /// Rotate the mover to face the target (otherwise only translate)
    pub apply_rotation: bool,
    /// The user turned the mover by hand since the last snap
    pub user_rotated: bool,
    pub use_visual_offsets: bool,
}

/// Solve the mover's pose for a snapped pair.
pub fn solve_placement(req: &SolveRequest<'_>) -> Pose {
    let rotation = if !req.apply_rotation {
        req.mover.rotation
    } else if req.user_rotated {
        preserve_user_rotation(req.mover, req.source).rotation
    } else {
        aligned_rotation(req)
    };

    // Source anchor lands exactly on the target anchor
    let target_position = req.target.position();
    let mut pose = Pose::new(target_position - rotation * req.source.local_position, rotation);

    if req.use_visual_offsets {
        pose.position += req.target.rotation() * req.target.anchor.visual_offset;
        if req.apply_rotation {
            pose.rotation = (pose.rotation * req.target.anchor.visual_rotation_offset).normalize();
        }
    }
    pose
}

fn aligned_rotation(req: &SolveRequest<'_>) -> Quat {
    let current_dir = req.mover.rotation * req.source.local_direction();
    let desired = desired_source_direction(req.connection, req.target.direction(), req.mover);

    // Yaw-only: vertical anchors carry no heading, so the yaw stays as is
    let turned = match (yaw_of_direction(current_dir), yaw_of_direction(desired)) {
        (Some(from), Some(to)) => req.mover.rotated_yaw(delta_degrees(from, to)),
        _ => req.mover,
    };

    if req.source.lock_rotation {
        snap_yaw_to_step(turned, req.source.rotation_step).rotation
    } else {
        turned.rotation
    }
}

/// World facing the source anchor should end up with.
pub fn desired_source_direction(connection: ConnectionType, target_dir: Vec3, mover: Pose) -> Vec3 {
    match connection {
        ConnectionType::Opposite => -target_dir,
        ConnectionType::Parallel => target_dir,
        ConnectionType::Perpendicular => perpendicular_direction(target_dir),
        ConnectionType::Angle45 => angle45_direction(target_dir),
        ConnectionType::Any => closest_step_direction(target_dir, mover.forward()),
    }
}

/// Horizontal right angle: `(z, y, -x)`.
pub fn perpendicular_direction(dir: Vec3) -> Vec3 {
    Vec3::new(dir.z, dir.y, -dir.x).normalize_or_zero()
}

pub fn angle45_direction(dir: Vec3) -> Vec3 {
    (dir + perpendicular_direction(dir)).normalize_or_zero()
}

/// `base` turned by the multiple of 45° that brings it closest to
/// `current_forward`.
pub fn closest_step_direction(base: Vec3, current_forward: Vec3) -> Vec3 {
    let (Some(base_yaw), Some(forward_yaw)) = (yaw_of_direction(base), yaw_of_direction(current_forward)) else {
        return base;
    };
    let offset = delta_degrees(base_yaw, forward_yaw);
    let step = (offset / 45.0).round() * 45.0;
    Quat::from_rotation_y(step.to_radians()) * base
}

/// Round the pose's yaw to a multiple of `step`, keeping pitch and roll.
pub fn snap_yaw_to_step(pose: Pose, step: f32) -> Pose {
    pose.with_yaw_degrees(quantize_degrees(pose.yaw_degrees(), step))
}

/// Keep the user's own yaw, quantized when the anchor locks rotation.
pub fn preserve_user_rotation(current: Pose, source: &Anchor) -> Pose {
    if source.lock_rotation {
        snap_yaw_to_step(current, source.rotation_step)
    } else {
        current
    }
}
