//! Snap Property Tests
//!
//! Randomised checks of the angle helpers, the resolver and the solver.

use glam::{Quat, Vec3};
use proptest::prelude::*;
use snapforge_engine::game::snap::compat::angle_fits;
use snapforge_engine::game::snap::{
    Anchor, ConnectionType, SnapDirection, SnapType, SolveRequest, angle_between, can_connect, resolve_connection,
    solve_placement,
};
use snapforge_engine::physics::{Pose, delta_degrees, quantize_degrees};

fn arb_connection() -> impl Strategy<Value = ConnectionType> {
    prop::sample::select(ConnectionType::ALL.to_vec())
}

fn arb_step() -> impl Strategy<Value = f32> {
    prop::sample::select(vec![5.0f32, 10.0, 15.0, 30.0, 45.0, 60.0, 90.0])
}

fn arb_direction() -> impl Strategy<Value = Vec3> {
    (-1.0f32..1.0, -1.0f32..1.0, -1.0f32..1.0).prop_filter("non-zero", |(x, y, z)| x * x + y * y + z * z > 1e-3)
        .prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

proptest! {
    #[test]
    fn angle_between_is_symmetric_and_bounded(a in arb_direction(), b in arb_direction()) {
        let ab = angle_between(a, b).unwrap();
        let ba = angle_between(b, a).unwrap();
        prop_assert!((0.0..=180.0).contains(&ab));
        prop_assert!((ab - ba).abs() < 1e-3);
    }

    #[test]
    fn quantized_yaw_is_nearest_step(angle in -720.0f32..720.0, step in arb_step()) {
        let q = quantize_degrees(angle, step);
        prop_assert!((0.0..360.0).contains(&q));
        prop_assert!(((q / step).round() * step - q).abs() < 1e-3);
        prop_assert!(delta_degrees(angle, q).abs() <= step / 2.0 + 1e-3);
    }

    #[test]
    fn fixed_anchor_connects_exactly_when_angle_fits(connection in arb_connection(), yaw in 0.0f32..360.0) {
        let source = Anchor::new(SnapType::BeamEnd, SnapDirection::Forward)
            .accepting([SnapType::BeamEnd])
            .with_fixed_connection(connection);
        let target = Anchor::new(SnapType::BeamEnd, SnapDirection::Forward);
        let a = source.in_world(Pose::IDENTITY);
        let b = target.in_world(Pose::from_yaw_degrees(Vec3::ZERO, yaw));

        let angle = angle_between(a.direction(), b.direction()).unwrap();
        prop_assert_eq!(can_connect(&a, &b), angle_fits(connection, angle));
    }

    #[test]
    fn any_target_accepts_every_direction(connection in arb_connection(), dir in arb_direction()) {
        let source = Anchor::new(SnapType::BeamEnd, SnapDirection::Forward)
            .accepting([SnapType::BeamSide])
            .with_fixed_connection(connection);
        let target = Anchor::new(SnapType::BeamSide, SnapDirection::Forward)
            .with_local_rotation(Quat::from_rotation_arc(Vec3::Z, dir.normalize()))
            .with_fixed_connection(ConnectionType::Any);
        prop_assert!(can_connect(&source.in_world(Pose::IDENTITY), &target.in_world(Pose::IDENTITY)));
    }

    #[test]
    fn auto_adjusted_type_always_fits(yaw in 0.0f32..360.0) {
        let source = Anchor::new(SnapType::BeamEnd, SnapDirection::Forward)
            .accepting([SnapType::BeamEnd])
            .auto_adjusting([ConnectionType::Opposite, ConnectionType::Perpendicular, ConnectionType::Parallel]);
        let target = Anchor::new(SnapType::BeamEnd, SnapDirection::Forward);
        let a = source.in_world(Pose::IDENTITY);
        let b = target.in_world(Pose::from_yaw_degrees(Vec3::ZERO, yaw));

        if let Some(resolved) = resolve_connection(&a, &b) {
            let angle = angle_between(a.direction(), b.direction()).unwrap();
            prop_assert!(angle_fits(resolved, angle));
            prop_assert!(source.effective_allowed().contains(&resolved));
        }
    }

    #[test]
    fn solved_anchor_lands_on_target(
        x in -50.0f32..50.0,
        z in -50.0f32..50.0,
        target_yaw in 0.0f32..360.0,
        mover_yaw in 0.0f32..360.0,
        locked in any::<bool>(),
    ) {
        let mut source = Anchor::new(SnapType::WallSide, SnapDirection::Forward)
            .at(Vec3::new(0.0, 0.5, 1.0))
            .accepting([SnapType::WallSide]);
        if locked {
            source = source.locking_rotation(45.0);
        }
        let target_anchor = Anchor::new(SnapType::WallSide, SnapDirection::Forward).at(Vec3::new(0.0, 0.0, 1.0));
        let target = target_anchor.in_world(Pose::from_yaw_degrees(Vec3::new(x, 0.0, z), target_yaw));

        let solved = solve_placement(&SolveRequest {
            source: &source,
            target,
            connection: ConnectionType::Opposite,
            mover: Pose::from_yaw_degrees(Vec3::new(x + 3.0, 0.0, z), mover_yaw),
            apply_rotation: true,
            user_rotated: false,
            use_visual_offsets: false,
        });

        prop_assert!((source.in_world(solved).position() - target.position()).length() < 1e-3);
        if locked {
            let off = delta_degrees(quantize_degrees(solved.yaw_degrees(), 45.0), solved.yaw_degrees());
            prop_assert!(off.abs() < 1e-2);
        }
    }
}
