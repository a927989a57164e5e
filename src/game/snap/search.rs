//! Snap Search & Ranking
//!
//! Finds anchor pairs between a moving preview and the placed pieces around
//! it, then decides which pair the preview holds on to.
//!
//! Ranking is by distance between the paired anchors. The currently held
//! target gets a discount so two nearly equidistant anchors do not flicker,
//! unless the pointer has clearly moved away from it. On top of the
//! ranking, [`SnapTracker`] applies hold hysteresis: a held pair is only
//! abandoned for a clearly better one, when its anchor disappears, or
//! after a grace period with nothing to snap to.

use glam::Vec3;
use tracing::{debug, trace};

use super::anchor::{Anchor, WorldAnchor};
use super::compat::{can_connect_either, resolve_connection};
use super::types::ConnectionType;
use crate::game::building::{AnchorId, PieceId, PieceWorld};
use crate::physics::Pose;

/// One ranked (source, target) pairing.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapCandidate {
    /// Index into the mover's anchor list
    pub source_index: usize,
    pub target: AnchorId,
    pub target_piece: PieceId,
    /// Connection type the source resolved against the target
    pub connection: ConnectionType,
    /// Raw distance between the two anchors
    pub distance: f32,
    /// Distance after the held-target discount; lower ranks first
    pub score: f32,
    pub target_position: Vec3,
}

/// Inputs for one ranking pass.
#[derive(Debug, Clone)]
pub struct SearchQuery<'a> {
    /// Anchors on the mover, in the mover's local space
    pub sources: &'a [Anchor],
    /// Mover pose the source anchors are evaluated at
    pub mover: Pose,
    /// Centre of the broad-phase sphere
    pub center: Vec3,
    pub radius: f32,
    /// Pairs scoring at or above this are dropped
    pub max_distance: f32,
    /// The mover's own piece, never a target
    pub exclude: Option<PieceId>,
    /// Target currently held, for the stability discount
    pub held: Option<AnchorId>,
    pub held_discount: f32,
    /// Last pointer hit; far from the held target means "breaking away"
    pub pointer: Option<Vec3>,
    pub priority_distance: f32,
}

/// Rank every compatible (source, target) pair near the mover.
///
/// Sorted by score, ties broken by raw distance then by source index.
pub fn rank_candidates(world: &PieceWorld, query: &SearchQuery<'_>) -> Vec<SnapCandidate> {
    let mut ranked = Vec::new();
    if query.sources.is_empty() {
        return ranked;
    }

    for piece_id in world.query_nearby(query.center, query.radius) {
        if Some(piece_id) == query.exclude {
            continue;
        }
        for (target_id, target) in world.anchors_of(piece_id) {
            let target_position = target.position();
            for (source_index, source_anchor) in query.sources.iter().enumerate() {
                let source = source_anchor.in_world(query.mover);
                let Some(connection) = resolve_connection(&source, &target) else {
                    continue;
                };
                let distance = source.position().distance(target_position);
                if !distance.is_finite() {
                    continue;
                }

                let breaking_away = query
                    .pointer
                    .is_some_and(|p| p.distance(target_position) > query.priority_distance);
                let score = if query.held == Some(target_id) && !breaking_away {
                    distance * query.held_discount
                } else {
                    distance
                };
                trace!(?target_id, source_index, distance, score, "[Snap] Candidate");

                if score < query.max_distance {
                    ranked.push(SnapCandidate {
                        source_index,
                        target: target_id,
                        target_piece: piece_id,
                        connection,
                        distance,
                        score,
                        target_position,
                    });
                }
            }
        }
    }

    ranked.sort_by(|a, b| {
        a.score
            .total_cmp(&b.score)
            .then(a.distance.total_cmp(&b.distance))
            .then(a.source_index.cmp(&b.source_index))
    });
    ranked
}

/// Search radius for this frame.
///
/// Shrinks while the pointer is pulling away from a held snap, widens
/// while holding one, and uses `priority_distance` when free.
pub fn adaptive_search_radius(
    detection_radius: f32,
    priority_distance: f32,
    snapped: bool,
    pointer_far_from_held: bool,
) -> f32 {
    match (snapped, pointer_far_from_held) {
        (true, true) => detection_radius * 0.7,
        (true, false) => detection_radius * 1.5,
        (false, _) => priority_distance,
    }
}

/// Nearest anchor within `radius` that pairs with `anchor` in either
/// direction.
pub fn find_nearest_compatible(
    world: &PieceWorld,
    anchor: &WorldAnchor<'_>,
    radius: f32,
    exclude: Option<PieceId>,
) -> Option<AnchorId> {
    let origin = anchor.position();
    find_all_compatible(world, anchor, radius, exclude)
        .into_iter()
        .filter_map(|id| world.world_anchor(id).map(|w| (id, w.position().distance(origin))))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(id, _)| id)
}

/// Every anchor within `radius` that pairs with `anchor` in either
/// direction.
pub fn find_all_compatible(
    world: &PieceWorld,
    anchor: &WorldAnchor<'_>,
    radius: f32,
    exclude: Option<PieceId>,
) -> Vec<AnchorId> {
    let origin = anchor.position();
    let mut found = Vec::new();
    for piece_id in world.query_nearby(origin, radius) {
        if Some(piece_id) == exclude {
            continue;
        }
        for (id, other) in world.anchors_of(piece_id) {
            if other.position().distance(origin) <= radius && can_connect_either(anchor, &other) {
                found.push(id);
            }
        }
    }
    found
}

// ============================================================================
// HOLD HYSTERESIS
// ============================================================================

/// When a held snap may be given up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoldPolicy {
    /// A rival must be this much closer (relative) to displace the hold
    pub switch_margin: f32,
    /// Seconds a hold survives with no candidates at all
    pub stability_threshold: f32,
}

impl Default for HoldPolicy {
    fn default() -> Self {
        Self {
            switch_margin: 0.2,
            stability_threshold: 0.5,
        }
    }
}

/// What happened to the hold this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapEvent {
    /// Nothing held, nothing found
    Idle,
    Acquired,
    Kept,
    Switched,
    Released,
    Cycled,
}

/// Keeps the held snap stable across frames.
#[derive(Debug, Clone, Default)]
pub struct SnapTracker {
    held: Option<SnapCandidate>,
    ranked: Vec<SnapCandidate>,
    stability_timer: f32,
    /// Set by cycling; keeps a deliberately chosen pair while it is valid
    pinned: bool,
}

impl SnapTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn held(&self) -> Option<&SnapCandidate> {
        self.held.as_ref()
    }

    pub fn held_target(&self) -> Option<AnchorId> {
        self.held.as_ref().map(|c| c.target)
    }

    pub fn is_snapped(&self) -> bool {
        self.held.is_some()
    }

    /// Candidates from the last update, best first.
    pub fn candidates(&self) -> &[SnapCandidate] {
        &self.ranked
    }

    pub fn stability_timer(&self) -> f32 {
        self.stability_timer
    }

    /// Drop the hold. Returns true if something was held.
    pub fn release(&mut self) -> bool {
        self.stability_timer = 0.0;
        self.pinned = false;
        self.held.take().is_some()
    }

    /// Feed this frame's ranking and decide what to hold.
    ///
    /// `held_alive` is false when the held target anchor no longer exists;
    /// the hold is then dropped at once.
    pub fn update(&mut self, ranked: Vec<SnapCandidate>, held_alive: bool, dt: f32, policy: &HoldPolicy) -> SnapEvent {
        self.ranked = ranked;

        let Some(held) = self.held.clone() else {
            return match self.ranked.first() {
                Some(best) => {
                    self.held = Some(best.clone());
                    self.stability_timer = 0.0;
                    SnapEvent::Acquired
                }
                None => SnapEvent::Idle,
            };
        };

        if !held_alive {
            debug!(target = ?held.target, "[Snap] Held anchor destroyed");
            self.release();
            return match self.ranked.first() {
                Some(best) => {
                    self.held = Some(best.clone());
                    SnapEvent::Switched
                }
                None => SnapEvent::Released,
            };
        }

        let current = self
            .ranked
            .iter()
            .find(|c| c.target == held.target && c.source_index == held.source_index)
            .or_else(|| self.ranked.iter().find(|c| c.target == held.target))
            .cloned();

        match (current, self.ranked.first().cloned()) {
            (Some(current), Some(best)) => {
                self.stability_timer = 0.0;
                if self.pinned {
                    self.held = Some(current);
                    SnapEvent::Kept
                } else if best.target == held.target {
                    self.held = Some(best);
                    SnapEvent::Kept
                } else if best.distance < current.distance * (1.0 - policy.switch_margin) {
                    self.held = Some(best);
                    SnapEvent::Switched
                } else {
                    self.held = Some(current);
                    SnapEvent::Kept
                }
            }
            (None, Some(best)) => {
                self.stability_timer = 0.0;
                self.pinned = false;
                self.held = Some(best);
                SnapEvent::Switched
            }
            _ => {
                self.stability_timer += dt;
                if self.stability_timer > policy.stability_threshold {
                    self.release();
                    SnapEvent::Released
                } else {
                    SnapEvent::Kept
                }
            }
        }
    }

    /// Move the hold to the next ranked candidate, wrapping around.
    pub fn cycle(&mut self) -> SnapEvent {
        if self.ranked.is_empty() {
            return SnapEvent::Idle;
        }
        let next = match &self.held {
            Some(held) => self
                .ranked
                .iter()
                .position(|c| c.target == held.target && c.source_index == held.source_index)
                .map_or(0, |i| (i + 1) % self.ranked.len()),
            None => 0,
        };
        self.held = Some(self.ranked[next].clone());
        self.pinned = true;
        self.stability_timer = 0.0;
        SnapEvent::Cycled
    }
}
