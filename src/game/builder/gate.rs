//! Placement Validity Gate
//!
//! Decides whether a preview at a given pose may become a real piece.
//! Four checks, all required:
//! - nothing on the blocking layers overlaps the (slightly shrunk) bounds
//! - the storage can pay the piece's cost
//! - a snapped preview hangs off an anchor that provides support
//! - the player can reach the spot

use glam::Vec3;

use crate::game::building::{AnchorId, PieceDefinition, PieceId, PieceWorld};
use crate::game::config::PlacementConfig;
use crate::game::economy::ResourceStorage;
use crate::physics::Pose;

/// Outcome of every gate check for one pose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementVerdict {
    pub blocked: bool,
    pub has_resources: bool,
    pub supported: bool,
    pub in_range: bool,
}

impl PlacementVerdict {
    pub const VALID: PlacementVerdict = PlacementVerdict {
        blocked: false,
        has_resources: true,
        supported: true,
        in_range: true,
    };

    pub fn is_valid(&self) -> bool {
        !self.blocked && self.has_resources && self.supported && self.in_range
    }

    /// Name of the first failing check, for logs.
    pub fn failure(&self) -> Option<&'static str> {
        if !self.in_range {
            Some("out of range")
        } else if self.blocked {
            Some("blocked")
        } else if !self.supported {
            Some("no support")
        } else if !self.has_resources {
            Some("insufficient resources")
        } else {
            None
        }
    }
}

/// What is being placed, and where.
#[derive(Debug, Clone, Copy)]
pub struct GateRequest<'a> {
    pub definition: &'a PieceDefinition,
    pub pose: Pose,
    /// Target anchor of the current snap, if snapped
    pub held_target: Option<AnchorId>,
    pub player: Option<Vec3>,
    /// The mover's own piece, never counted as an obstacle
    pub exclude: Option<PieceId>,
}

/// Horizontal reach check. No player position or no limit passes.
pub fn within_reach(player: Option<Vec3>, target: Vec3, max_distance: Option<f32>) -> bool {
    match (player, max_distance) {
        (Some(player), Some(max)) => {
            let d = (target - player) * Vec3::new(1.0, 0.0, 1.0);
            d.length() <= max
        }
        _ => true,
    }
}

/// Run every check for `request`.
///
/// Without a storage only free pieces pass the resource check.
pub fn evaluate(
    world: &PieceWorld,
    config: &PlacementConfig,
    storage: Option<&dyn ResourceStorage>,
    request: &GateRequest<'_>,
) -> PlacementVerdict {
    let footprint = request.definition.obb_at(&request.pose).scaled(config.overlap_shrink);
    let blocked = !world.overlap_box(&footprint, config.blocking_layers, request.exclude).is_empty();

    let requirements = &request.definition.requirements;
    let has_resources = match storage {
        Some(storage) => storage.can_afford(requirements),
        None => requirements.iter().all(|r| r.amount <= 0),
    };

    let supported = match request.held_target {
        Some(target) => world.anchor(target).is_some_and(|a| a.anchor.provides_support),
        None => true,
    };

    let in_range = within_reach(request.player, request.pose.position, config.max_placement_distance);

    PlacementVerdict {
        blocked,
        has_resources,
        supported,
        in_range,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::game::building::{BlockingVolume, PieceCategory};
    use crate::game::economy::{ResourceRequirement, ResourceType, Resources};
    use crate::game::snap::{Anchor, SnapDirection, SnapType};
    use crate::physics::Obb;
    use crate::world::LayerMask;

    fn wall() -> PieceDefinition {
        PieceDefinition::new("Wall", PieceCategory::Wall)
            .with_bounds(Vec3::new(0.0, 1.0, 0.0), Vec3::new(1.0, 1.0, 0.1))
            .with_cost(ResourceRequirement::new(ResourceType::Wood, 5))
    }

    fn request(def: &PieceDefinition, position: Vec3) -> GateRequest<'_> {
        GateRequest {
            definition: def,
            pose: Pose::from_position(position),
            held_target: None,
            player: None,
            exclude: None,
        }
    }

    #[test]
    fn test_clear_spot_is_valid() {
        let world = PieceWorld::new();
        let def = wall();
        let wood = Resources::new().with(ResourceType::Wood, 10);
        let verdict = evaluate(&world, &PlacementConfig::default(), Some(&wood), &request(&def, Vec3::ZERO));
        assert_eq!(verdict, PlacementVerdict::VALID);
        assert_eq!(verdict.failure(), None);
    }

    #[test]
    fn test_blocking_volume() {
        let mut world = PieceWorld::new();
        world.add_blocking_volume(BlockingVolume {
            obb: Obb::axis_aligned(Vec3::new(0.5, 1.0, 0.0), Vec3::splat(0.3)),
            layer: LayerMask::CRITICAL,
            tag: None,
        });
        let def = wall();
        let wood = Resources::new().with(ResourceType::Wood, 10);
        let verdict = evaluate(&world, &PlacementConfig::default(), Some(&wood), &request(&def, Vec3::ZERO));
        assert!(verdict.blocked);
        assert!(!verdict.is_valid());
        assert_eq!(verdict.failure(), Some("blocked"));
    }

    #[test]
    fn test_non_blocking_layer_ignored() {
        let mut world = PieceWorld::new();
        world.add_blocking_volume(BlockingVolume {
            obb: Obb::axis_aligned(Vec3::new(0.0, 0.0, 0.0), Vec3::new(10.0, 0.1, 10.0)),
            layer: LayerMask::GROUND,
            tag: Some("Ground".into()),
        });
        let def = wall();
        let verdict = evaluate(
            &world,
            &PlacementConfig::default(),
            Some(&Resources::new().with(ResourceType::Wood, 5)),
            &request(&def, Vec3::ZERO),
        );
        assert!(!verdict.blocked);
    }

    #[test]
    fn test_touching_neighbour_not_blocked_after_shrink() {
        let mut world = PieceWorld::new();
        let def = Arc::new(wall());
        world.insert_piece(def.clone(), Pose::from_position(Vec3::new(2.0, 0.0, 0.0)), true);
        let verdict = evaluate(&world, &PlacementConfig::default(), None, &request(&def, Vec3::ZERO));
        assert!(!verdict.blocked);
    }

    #[test]
    fn test_missing_resources() {
        let world = PieceWorld::new();
        let def = wall();
        let poor = Resources::new().with(ResourceType::Wood, 4);
        let verdict = evaluate(&world, &PlacementConfig::default(), Some(&poor), &request(&def, Vec3::ZERO));
        assert!(!verdict.has_resources);
        assert!(!evaluate(&world, &PlacementConfig::default(), None, &request(&def, Vec3::ZERO)).has_resources);

        let free = PieceDefinition::new("Marker", PieceCategory::Utility);
        assert!(evaluate(&world, &PlacementConfig::default(), None, &request(&free, Vec3::ZERO)).has_resources);
    }

    #[test]
    fn test_unsupported_anchor() {
        let mut world = PieceWorld::new();
        let rail = Arc::new(
            PieceDefinition::new("Railing", PieceCategory::Utility)
                .with_anchor(Anchor::new(SnapType::FenceRailMount, SnapDirection::Up).with_support(false)),
        );
        let id = world.insert_piece(rail, Pose::from_position(Vec3::new(0.0, 0.0, 10.0)), true);
        let target = world.piece(id).unwrap().anchors[0];

        let def = PieceDefinition::new("Marker", PieceCategory::Utility);
        let mut req = request(&def, Vec3::ZERO);
        req.held_target = Some(target);
        let verdict = evaluate(&world, &PlacementConfig::default(), None, &req);
        assert!(!verdict.supported);
        assert_eq!(verdict.failure(), Some("no support"));
    }

    #[test]
    fn test_reach_is_horizontal() {
        assert!(within_reach(Some(Vec3::ZERO), Vec3::new(3.0, 20.0, 4.0), Some(5.0)));
        assert!(!within_reach(Some(Vec3::ZERO), Vec3::new(3.0, 0.0, 4.1), Some(5.0)));
        assert!(within_reach(None, Vec3::splat(100.0), Some(5.0)));
        assert!(within_reach(Some(Vec3::ZERO), Vec3::splat(100.0), None));
    }
}
