//! Connection Compatibility Resolver
//!
//! Pure functions deciding whether a source anchor may join a target
//! anchor. Two tests must both pass:
//!
//! 1. **Type**: the target's role is in the source's accepted list, or a
//!    stair/floor pairing applies.
//! 2. **Direction**: the angle between the two world directions fits the
//!    source's connection type, within a ±15° band. `Any` on either side
//!    skips the angle.
//!
//! The test is one-way. `can_connect(a, b)` and `can_connect(b, a)` read
//! different accepted lists and connection types; use [`can_connect_either`]
//! when a join is valid from either side.
//!
//! Auto-adjusting anchors try their allowed types in order and report the
//! first that fits. Nothing here mutates an anchor: the caller persists
//! the result with [`Anchor::adopt_connection`](super::Anchor::adopt_connection).

use glam::Vec3;

use super::anchor::WorldAnchor;
use super::types::{ConnectionType, SnapType};
use crate::physics::types::DIRECTION_EPSILON;

/// Half-width of every angular acceptance band, in degrees.
pub const ANGLE_TOLERANCE: f32 = 15.0;

/// Unsigned angle between two directions in degrees (0..=180).
///
/// `None` for zero-length or non-finite input.
pub fn angle_between(a: Vec3, b: Vec3) -> Option<f32> {
    if !a.is_finite() || !b.is_finite() {
        return None;
    }
    if a.length_squared() < DIRECTION_EPSILON || b.length_squared() < DIRECTION_EPSILON {
        return None;
    }
    let cos = a.normalize().dot(b.normalize()).clamp(-1.0, 1.0);
    Some(cos.acos().to_degrees())
}

/// Stair/floor pairings accepted regardless of the accepted list.
pub fn is_elevated_floor_compatible(source: SnapType, target: SnapType) -> bool {
    matches!(
        (source, target),
        (SnapType::StairTop, SnapType::FloorEdge)
            | (SnapType::StairBottom, SnapType::FloorEdge | SnapType::FoundationTopEdge)
            | (SnapType::FloorEdge, SnapType::StairTop | SnapType::StairBottom)
    )
}

pub fn is_type_compatible(source: &WorldAnchor<'_>, target: &WorldAnchor<'_>) -> bool {
    source.anchor.accepted_types.contains(&target.anchor.point_type)
        || is_elevated_floor_compatible(source.anchor.point_type, target.anchor.point_type)
}

/// 45° ± 15° or 135° ± 15°. The 225° and 315° bands are included for
/// callers passing signed or full-circle angles.
pub fn is_angle45_compatible(angle: f32) -> bool {
    let bands = [(30.0, 60.0), (120.0, 150.0), (210.0, 240.0), (300.0, 330.0)];
    bands.iter().any(|&(lo, hi)| (lo..=hi).contains(&angle))
}

/// Does `angle` satisfy `connection`?
pub fn angle_fits(connection: ConnectionType, angle: f32) -> bool {
    match connection {
        ConnectionType::Opposite => angle >= 180.0 - ANGLE_TOLERANCE,
        ConnectionType::Perpendicular => {
            (90.0 - ANGLE_TOLERANCE..=90.0 + ANGLE_TOLERANCE).contains(&angle)
        }
        ConnectionType::Angle45 => is_angle45_compatible(angle),
        ConnectionType::Parallel => angle <= ANGLE_TOLERANCE,
        ConnectionType::Any => true,
    }
}

/// Direction test for a source using `connection` against a target using
/// `target_connection`.
fn direction_fits(
    connection: ConnectionType,
    target_connection: ConnectionType,
    angle: Option<f32>,
) -> bool {
    if connection == ConnectionType::Any || target_connection == ConnectionType::Any {
        return true;
    }
    angle.is_some_and(|a| angle_fits(connection, a))
}

/// Resolve the connection type the source would join the target with.
///
/// Returns `None` when the pair is incompatible. For a fixed anchor the
/// result is its own connection type; for an auto-adjusting anchor it is
/// the first allowed type whose direction test passes.
pub fn resolve_connection(source: &WorldAnchor<'_>, target: &WorldAnchor<'_>) -> Option<ConnectionType> {
    if !is_type_compatible(source, target) {
        return None;
    }

    let angle = angle_between(source.direction(), target.direction());
    let target_connection = target.anchor.connection_type;

    if source.anchor.auto_adjust_connection {
        source
            .anchor
            .effective_allowed()
            .iter()
            .copied()
            .find(|c| direction_fits(*c, target_connection, angle))
    } else {
        let own = source.anchor.connection_type;
        direction_fits(own, target_connection, angle).then_some(own)
    }
}

/// One-way compatibility: may `source` snap onto `target`?
pub fn can_connect(source: &WorldAnchor<'_>, target: &WorldAnchor<'_>) -> bool {
    resolve_connection(source, target).is_some()
}

/// Compatible when either side accepts the other.
pub fn can_connect_either(a: &WorldAnchor<'_>, b: &WorldAnchor<'_>) -> bool {
    can_connect(a, b) || can_connect(b, a)
}

/// Classify the measured angle into the best-fitting connection type.
///
/// Looser than [`angle_fits`]: used to suggest a value, not to gate.
/// Degenerate directions classify as `Any`.
pub fn determine_optimal_connection_type(a: &WorldAnchor<'_>, b: &WorldAnchor<'_>) -> ConnectionType {
    match angle_between(a.direction(), b.direction()) {
        Some(angle) => classify_angle(angle),
        None => ConnectionType::Any,
    }
}

pub fn classify_angle(angle: f32) -> ConnectionType {
    if angle > 180.0 - ANGLE_TOLERANCE {
        ConnectionType::Opposite
    } else if angle < ANGLE_TOLERANCE {
        ConnectionType::Parallel
    } else if (75.0..=105.0).contains(&angle) {
        ConnectionType::Perpendicular
    } else if (30.0..=60.0).contains(&angle) || (120.0..=150.0).contains(&angle) {
        ConnectionType::Angle45
    } else {
        ConnectionType::Any
    }
}

/// Connection type both anchors can agree on.
///
/// Intersects both allowed sets (empty = all five). The classified optimum
/// wins if shared, otherwise the first shared type in the source's order.
/// Returns `None` if the source does not auto-adjust or nothing is shared.
pub fn optimal_shared_connection(source: &WorldAnchor<'_>, target: &WorldAnchor<'_>) -> Option<ConnectionType> {
    if !source.anchor.auto_adjust_connection {
        return None;
    }
    let theirs = target.anchor.effective_allowed();
    let common: Vec<ConnectionType> = source
        .anchor
        .effective_allowed()
        .iter()
        .copied()
        .filter(|c| theirs.contains(c))
        .collect();

    let optimal = determine_optimal_connection_type(source, target);
    if common.contains(&optimal) {
        Some(optimal)
    } else {
        common.first().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::snap::{Anchor, SnapDirection};
    use crate::physics::Pose;

    fn fixed(point: SnapType, dir: SnapDirection, accepts: &[SnapType], c: ConnectionType) -> Anchor {
        Anchor::new(point, dir)
            .accepting(accepts.iter().copied())
            .with_fixed_connection(c)
    }

    /// Target facing +Z, source owner yawed so its forward anchor sits
    /// `angle` degrees away.
    fn pair_at_angle<'a>(source: &'a Anchor, target: &'a Anchor, angle: f32) -> (WorldAnchor<'a>, WorldAnchor<'a>) {
        (
            source.in_world(Pose::from_yaw_degrees(Vec3::ZERO, angle)),
            target.in_world(Pose::IDENTITY),
        )
    }

    #[test]
    fn test_angle_between_degenerate() {
        assert_eq!(angle_between(Vec3::ZERO, Vec3::X), None);
        assert_eq!(angle_between(Vec3::new(f32::NAN, 0.0, 0.0), Vec3::X), None);
        assert!((angle_between(Vec3::X, -Vec3::X).unwrap() - 180.0).abs() < 1e-3);
        assert!((angle_between(Vec3::X, Vec3::Z * 3.0).unwrap() - 90.0).abs() < 1e-3);
    }

    #[test]
    fn test_opposite_boundary() {
        let s = fixed(SnapType::WallSide, SnapDirection::Forward, &[SnapType::WallSide], ConnectionType::Opposite);
        let t = fixed(SnapType::WallSide, SnapDirection::Forward, &[], ConnectionType::Opposite);
        let (a, b) = pair_at_angle(&s, &t, 180.0);
        assert!(can_connect(&a, &b));
        let (a, b) = pair_at_angle(&s, &t, 166.0);
        assert!(can_connect(&a, &b));
        let (a, b) = pair_at_angle(&s, &t, 160.0);
        assert!(!can_connect(&a, &b));
    }

    #[test]
    fn test_perpendicular_band() {
        let s = fixed(SnapType::WallSide, SnapDirection::Forward, &[SnapType::WallSide], ConnectionType::Perpendicular);
        let t = fixed(SnapType::WallSide, SnapDirection::Forward, &[], ConnectionType::Opposite);
        for (angle, expected) in [(90.0, true), (76.0, true), (104.0, true), (70.0, false), (110.0, false)] {
            let (a, b) = pair_at_angle(&s, &t, angle);
            assert_eq!(can_connect(&a, &b), expected, "angle {}", angle);
        }
    }

    #[test]
    fn test_angle45_bands() {
        assert!(is_angle45_compatible(45.0));
        assert!(is_angle45_compatible(135.0));
        assert!(is_angle45_compatible(225.0));
        assert!(is_angle45_compatible(315.0));
        assert!(!is_angle45_compatible(90.0));
        assert!(!is_angle45_compatible(0.0));
        assert!(!is_angle45_compatible(180.0));
    }

    #[test]
    fn test_any_on_either_side_skips_angle() {
        let any_src = fixed(SnapType::WallSide, SnapDirection::Forward, &[SnapType::WallSide], ConnectionType::Any);
        let opp_tgt = fixed(SnapType::WallSide, SnapDirection::Forward, &[], ConnectionType::Opposite);
        let (a, b) = pair_at_angle(&any_src, &opp_tgt, 10.0);
        assert!(can_connect(&a, &b));

        let opp_src = fixed(SnapType::WallSide, SnapDirection::Forward, &[SnapType::WallSide], ConnectionType::Opposite);
        let any_tgt = fixed(SnapType::WallSide, SnapDirection::Forward, &[], ConnectionType::Any);
        let (a, b) = pair_at_angle(&opp_src, &any_tgt, 10.0);
        assert!(can_connect(&a, &b));
    }

    #[test]
    fn test_type_mismatch_fails_even_with_any() {
        let s = fixed(SnapType::WallSide, SnapDirection::Forward, &[SnapType::WallTop], ConnectionType::Any);
        let t = fixed(SnapType::WallSide, SnapDirection::Forward, &[], ConnectionType::Any);
        let (a, b) = pair_at_angle(&s, &t, 180.0);
        assert!(!can_connect(&a, &b));
    }

    #[test]
    fn test_elevated_floor_exception() {
        assert!(is_elevated_floor_compatible(SnapType::StairTop, SnapType::FloorEdge));
        assert!(is_elevated_floor_compatible(SnapType::StairBottom, SnapType::FoundationTopEdge));
        assert!(is_elevated_floor_compatible(SnapType::FloorEdge, SnapType::StairBottom));
        assert!(!is_elevated_floor_compatible(SnapType::StairTop, SnapType::FoundationTopEdge));
        assert!(!is_elevated_floor_compatible(SnapType::FoundationTopEdge, SnapType::StairBottom));

        // Empty accepted list still joins through the exception
        let stair = fixed(SnapType::StairTop, SnapDirection::Forward, &[], ConnectionType::Opposite);
        let floor = fixed(SnapType::FloorEdge, SnapDirection::Forward, &[], ConnectionType::Opposite);
        let (a, b) = pair_at_angle(&stair, &floor, 180.0);
        assert!(can_connect(&a, &b));
    }

    #[test]
    fn test_auto_adjust_picks_first_fitting() {
        let s = Anchor::new(SnapType::WallSide, SnapDirection::Forward)
            .accepting([SnapType::WallSide])
            .auto_adjusting([ConnectionType::Perpendicular, ConnectionType::Opposite]);
        let t = fixed(SnapType::WallSide, SnapDirection::Forward, &[], ConnectionType::Opposite);

        let (a, b) = pair_at_angle(&s, &t, 90.0);
        assert_eq!(resolve_connection(&a, &b), Some(ConnectionType::Perpendicular));
        let (a, b) = pair_at_angle(&s, &t, 180.0);
        assert_eq!(resolve_connection(&a, &b), Some(ConnectionType::Opposite));
        let (a, b) = pair_at_angle(&s, &t, 10.0);
        assert_eq!(resolve_connection(&a, &b), None);
    }

    #[test]
    fn test_auto_adjust_empty_list_tries_all() {
        let s = Anchor::new(SnapType::WallSide, SnapDirection::Forward)
            .accepting([SnapType::WallSide])
            .auto_adjusting([]);
        let t = fixed(SnapType::WallSide, SnapDirection::Forward, &[], ConnectionType::Opposite);
        let (a, b) = pair_at_angle(&s, &t, 45.0);
        assert_eq!(resolve_connection(&a, &b), Some(ConnectionType::Angle45));
        // Nothing but Any fits 20 degrees
        let (a, b) = pair_at_angle(&s, &t, 20.0);
        assert_eq!(resolve_connection(&a, &b), Some(ConnectionType::Any));
    }

    #[test]
    fn test_degenerate_direction_incompatible() {
        let s = fixed(SnapType::WallSide, SnapDirection::Forward, &[SnapType::WallSide], ConnectionType::Opposite);
        let t = fixed(SnapType::WallSide, SnapDirection::Forward, &[], ConnectionType::Opposite);
        let broken = Pose::new(Vec3::ZERO, glam::Quat::from_xyzw(0.0, 0.0, 0.0, 0.0));
        let a = s.in_world(broken);
        let b = t.in_world(Pose::IDENTITY);
        assert!(!can_connect(&a, &b));
    }

    #[test]
    fn test_classify_angle() {
        assert_eq!(classify_angle(170.0), ConnectionType::Opposite);
        assert_eq!(classify_angle(5.0), ConnectionType::Parallel);
        assert_eq!(classify_angle(95.0), ConnectionType::Perpendicular);
        assert_eq!(classify_angle(40.0), ConnectionType::Angle45);
        assert_eq!(classify_angle(140.0), ConnectionType::Angle45);
        assert_eq!(classify_angle(20.0), ConnectionType::Any);
        assert_eq!(classify_angle(110.0), ConnectionType::Any);
    }

    #[test]
    fn test_optimal_shared_connection() {
        let s = Anchor::new(SnapType::WallSide, SnapDirection::Forward)
            .auto_adjusting([ConnectionType::Opposite, ConnectionType::Perpendicular]);
        let t_all = Anchor::new(SnapType::WallSide, SnapDirection::Forward).auto_adjusting([]);
        let t_parallel = Anchor::new(SnapType::WallSide, SnapDirection::Forward).auto_adjusting([ConnectionType::Parallel]);
        let t_perp = Anchor::new(SnapType::WallSide, SnapDirection::Forward)
            .auto_adjusting([ConnectionType::Perpendicular, ConnectionType::Opposite]);

        // Optimum (Perpendicular) is shared
        let (a, b) = pair_at_angle(&s, &t_all, 90.0);
        assert_eq!(optimal_shared_connection(&a, &b), Some(ConnectionType::Perpendicular));

        // Optimum (Angle45) not shared: first common type in source order
        let (a, b) = pair_at_angle(&s, &t_perp, 45.0);
        assert_eq!(optimal_shared_connection(&a, &b), Some(ConnectionType::Opposite));

        // Nothing shared
        let (a, b) = pair_at_angle(&s, &t_parallel, 0.0);
        assert_eq!(optimal_shared_connection(&a, &b), None);

        // Fixed source never adjusts
        let fixed_src = fixed(SnapType::WallSide, SnapDirection::Forward, &[], ConnectionType::Opposite);
        let (a, b) = pair_at_angle(&fixed_src, &t_all, 90.0);
        assert_eq!(optimal_shared_connection(&a, &b), None);
    }

    #[test]
    fn test_either_direction() {
        let a_anchor = fixed(SnapType::WallBottom, SnapDirection::Down, &[SnapType::FloorEdge], ConnectionType::Opposite);
        let b_anchor = fixed(SnapType::FloorEdge, SnapDirection::Up, &[], ConnectionType::Opposite);
        let a = a_anchor.in_world(Pose::IDENTITY);
        let b = b_anchor.in_world(Pose::IDENTITY);
        assert!(can_connect(&a, &b));
        assert!(!can_connect(&b, &a));
        assert!(can_connect_either(&a, &b));
        assert!(can_connect_either(&b, &a));
    }
}
