//! Piece World
//!
//! Owns every placed piece and every anchor in two generational arenas,
//! keeps a broad-phase index over the pieces, and answers the scene
//! queries the builder needs: nearby pieces, box/sphere overlaps against
//! pieces and static blocking volumes, and pointer ray casts.
//!
//! Handles (`PieceId`, `AnchorId`) carry a generation, so a handle to a
//! removed piece or anchor never resolves to whatever reuses its slot.

use std::sync::Arc;

use glam::Vec3;
use tracing::{debug, info};

use super::definition::PieceDefinition;
use super::piece::BuildingPiece;
use crate::camera::{Ray, SurfaceHit};
use crate::game::snap::{Anchor, WorldAnchor};
use crate::physics::{Obb, Pose, Sphere, ray_obb_intersect};
use crate::world::{GridIndex, LayerMask, SpatialIndex};

// ============================================================================
// HANDLES & ARENA
// ============================================================================

macro_rules! arena_handle {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name {
            index: u32,
            generation: u32,
        }

        impl $name {
            #[allow(dead_code)]
            pub(crate) fn from_parts(index: u32, generation: u32) -> Self {
                Self { index, generation }
            }

            pub fn index(&self) -> u32 {
                self.index
            }
        }
    };
}

arena_handle!(PieceId);
arena_handle!(AnchorId);

#[derive(Debug, Clone)]
struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

#[derive(Debug, Clone)]
struct Arena<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    len: usize,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }
}

impl<T> Arena<T> {
    fn insert(&mut self, value: T) -> (u32, u32) {
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.value = Some(value);
            return (index, slot.generation);
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            value: Some(value),
        });
        (index, 0)
    }

    fn get(&self, index: u32, generation: u32) -> Option<&T> {
        self.slots
            .get(index as usize)
            .filter(|s| s.generation == generation)
            .and_then(|s| s.value.as_ref())
    }

    fn get_mut(&mut self, index: u32, generation: u32) -> Option<&mut T> {
        self.slots
            .get_mut(index as usize)
            .filter(|s| s.generation == generation)
            .and_then(|s| s.value.as_mut())
    }

    fn remove(&mut self, index: u32, generation: u32) -> Option<T> {
        let slot = self.slots.get_mut(index as usize)?;
        if slot.generation != generation {
            return None;
        }
        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(index);
        self.len -= 1;
        Some(value)
    }

    fn iter(&self) -> impl Iterator<Item = (u32, u32, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.value.as_ref().map(|v| (i as u32, s.generation, v)))
    }
}

// ============================================================================
// SCENE TYPES
// ============================================================================

/// An anchor instance in the world, owned by one piece.
#[derive(Debug, Clone)]
pub struct PlacedAnchor {
    pub anchor: Anchor,
    pub owner: PieceId,
}

/// Static obstacle that is not a piece (rocks, the player capsule, ...).
#[derive(Debug, Clone)]
pub struct BlockingVolume {
    pub obb: Obb,
    pub layer: LayerMask,
    pub tag: Option<String>,
}

/// One hit of an overlap query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlap {
    Piece(PieceId),
    /// Index into the world's blocking volumes
    Volume(usize),
}

/// Spawn/teardown hooks the placement session drives.
pub trait SceneLifecycle {
    /// Create a real piece. `grounded` records whether it rests on
    /// something that supports it.
    fn spawn_piece(&mut self, definition: Arc<PieceDefinition>, pose: Pose, grounded: bool) -> PieceId;

    fn destroy_piece(&mut self, id: PieceId) -> bool;

    /// The ghost for `definition` was shown.
    fn preview_created(&mut self, _definition: &PieceDefinition) {}

    /// The ghost was hidden.
    fn preview_destroyed(&mut self) {}
}

// ============================================================================
// PIECE WORLD
// ============================================================================

#[derive(Debug)]
pub struct PieceWorld {
    pieces: Arena<BuildingPiece>,
    anchors: Arena<PlacedAnchor>,
    index: Box<dyn SpatialIndex<PieceId>>,
    volumes: Vec<BlockingVolume>,
    preview: Option<String>,
}

impl Default for PieceWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl PieceWorld {
    /// Empty world using a uniform grid for broad-phase queries.
    pub fn new() -> Self {
        Self::with_index(Box::new(GridIndex::default()))
    }

    pub fn with_index(index: Box<dyn SpatialIndex<PieceId>>) -> Self {
        Self {
            pieces: Arena::default(),
            anchors: Arena::default(),
            index,
            volumes: Vec::new(),
            preview: None,
        }
    }

    /// Add a piece, creating one world anchor per definition anchor.
    pub fn insert_piece(&mut self, definition: Arc<PieceDefinition>, pose: Pose, grounded: bool) -> PieceId {
        let anchors = definition.anchors.clone();
        let radius = reach_radius(&definition);
        let (index, generation) = self.pieces.insert(BuildingPiece::new(definition, pose, grounded));
        let id = PieceId::from_parts(index, generation);

        let handles: Vec<AnchorId> = anchors
            .into_iter()
            .map(|anchor| {
                let (i, g) = self.anchors.insert(PlacedAnchor { anchor, owner: id });
                AnchorId::from_parts(i, g)
            })
            .collect();
        if let Some(piece) = self.pieces.get_mut(index, generation) {
            piece.anchors = handles;
        }

        self.index.insert(id, pose.position, radius);
        id
    }

    /// Remove a piece together with its anchors.
    pub fn remove_piece(&mut self, id: PieceId) -> Option<BuildingPiece> {
        let piece = self.pieces.remove(id.index, id.generation)?;
        for anchor in &piece.anchors {
            self.anchors.remove(anchor.index, anchor.generation);
        }
        self.index.remove(id);
        Some(piece)
    }

    pub fn piece(&self, id: PieceId) -> Option<&BuildingPiece> {
        self.pieces.get(id.index, id.generation)
    }

    pub fn piece_mut(&mut self, id: PieceId) -> Option<&mut BuildingPiece> {
        self.pieces.get_mut(id.index, id.generation)
    }

    pub fn anchor(&self, id: AnchorId) -> Option<&PlacedAnchor> {
        self.anchors.get(id.index, id.generation)
    }

    pub fn anchor_mut(&mut self, id: AnchorId) -> Option<&mut PlacedAnchor> {
        self.anchors.get_mut(id.index, id.generation)
    }

    /// World-space view of an anchor at its owner's current pose.
    pub fn world_anchor(&self, id: AnchorId) -> Option<WorldAnchor<'_>> {
        let placed = self.anchor(id)?;
        let owner = self.piece(placed.owner)?;
        Some(WorldAnchor::new(&placed.anchor, owner.pose))
    }

    pub fn anchors_of(&self, id: PieceId) -> impl Iterator<Item = (AnchorId, WorldAnchor<'_>)> + '_ {
        self.piece(id)
            .into_iter()
            .flat_map(move |piece| piece.anchors.iter())
            .filter_map(move |&anchor| self.world_anchor(anchor).map(|w| (anchor, w)))
    }

    pub fn pieces(&self) -> impl Iterator<Item = (PieceId, &BuildingPiece)> {
        self.pieces
            .iter()
            .map(|(index, generation, piece)| (PieceId::from_parts(index, generation), piece))
    }

    pub fn len(&self) -> usize {
        self.pieces.len
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.len == 0
    }

    pub fn anchor_count(&self) -> usize {
        self.anchors.len
    }

    /// Pieces whose reach touches the sphere.
    pub fn query_nearby(&self, center: Vec3, radius: f32) -> Vec<PieceId> {
        self.index.query_nearby(center, radius)
    }

    // ------------------------------------------------------------------
    // Health
    // ------------------------------------------------------------------

    /// Damage a piece; a destroyed piece leaves the world with its anchors.
    /// Returns true if the piece was destroyed.
    pub fn damage_piece(&mut self, id: PieceId, amount: f32) -> bool {
        let destroyed = self.piece_mut(id).is_some_and(|p| p.take_damage(amount));
        if destroyed {
            if let Some(piece) = self.remove_piece(id) {
                info!(piece = %piece.name(), "[World] Piece destroyed");
            }
        }
        destroyed
    }

    pub fn repair_piece(&mut self, id: PieceId, amount: f32) -> bool {
        match self.piece_mut(id) {
            Some(piece) => {
                piece.repair(amount);
                true
            }
            None => false,
        }
    }

    // ------------------------------------------------------------------
    // Overlap queries
    // ------------------------------------------------------------------

    pub fn add_blocking_volume(&mut self, volume: BlockingVolume) -> usize {
        self.volumes.push(volume);
        self.volumes.len() - 1
    }

    pub fn blocking_volumes(&self) -> &[BlockingVolume] {
        &self.volumes
    }

    /// Pieces and volumes on `mask` overlapping the box, skipping `exclude`.
    pub fn overlap_box(&self, obb: &Obb, mask: LayerMask, exclude: Option<PieceId>) -> Vec<Overlap> {
        let mut hits = Vec::new();
        for id in self.query_nearby(obb.center, obb.half_extents.length()) {
            if Some(id) == exclude {
                continue;
            }
            if let Some(piece) = self.piece(id) {
                if mask.intersects(piece.definition.layer) && piece.obb().intersects(obb) {
                    hits.push(Overlap::Piece(id));
                }
            }
        }
        for (i, volume) in self.volumes.iter().enumerate() {
            if mask.intersects(volume.layer) && volume.obb.intersects(obb) {
                hits.push(Overlap::Volume(i));
            }
        }
        hits
    }

    pub fn overlap_sphere(&self, sphere: &Sphere, mask: LayerMask, exclude: Option<PieceId>) -> Vec<Overlap> {
        let mut hits = Vec::new();
        for id in self.query_nearby(sphere.center, sphere.radius) {
            if Some(id) == exclude {
                continue;
            }
            if let Some(piece) = self.piece(id) {
                if mask.intersects(piece.definition.layer) && piece.obb().intersects_sphere(sphere) {
                    hits.push(Overlap::Piece(id));
                }
            }
        }
        for (i, volume) in self.volumes.iter().enumerate() {
            if mask.intersects(volume.layer) && volume.obb.intersects_sphere(sphere) {
                hits.push(Overlap::Volume(i));
            }
        }
        hits
    }

    /// Closest piece or volume on `mask` along the ray.
    pub fn raycast(&self, ray: &Ray, max_distance: f32, mask: LayerMask) -> Option<SurfaceHit> {
        let pieces = self
            .pieces()
            .filter(|(_, p)| mask.intersects(p.definition.layer))
            .map(|(_, p)| (p.obb(), p.definition.layer, Some(p.name().to_string())));
        let volumes = self
            .volumes
            .iter()
            .filter(|v| mask.intersects(v.layer))
            .map(|v| (v.obb, v.layer, v.tag.clone()));

        let mut best: Option<(f32, Obb, LayerMask, Option<String>)> = None;
        for (obb, layer, tag) in pieces.chain(volumes) {
            let Some(t) = ray_obb_intersect(ray.origin, ray.direction, &obb) else {
                continue;
            };
            if t <= max_distance && best.as_ref().is_none_or(|b| t < b.0) {
                best = Some((t, obb, layer, tag));
            }
        }

        best.map(|(t, obb, layer, tag)| {
            let point = ray.at(t);
            let mut hit = SurfaceHit::new(point, layer).with_normal(box_normal(&obb, point));
            hit.distance = t;
            hit.tag = tag;
            hit
        })
    }

    /// Name of the piece currently shown as the ghost, if any.
    pub fn preview(&self) -> Option<&str> {
        self.preview.as_deref()
    }
}

impl SceneLifecycle for PieceWorld {
    fn spawn_piece(&mut self, definition: Arc<PieceDefinition>, pose: Pose, grounded: bool) -> PieceId {
        let name = definition.name.clone();
        let id = self.insert_piece(definition, pose, grounded);
        debug!(piece = %name, ?id, grounded, "[World] Spawned");
        id
    }

    fn destroy_piece(&mut self, id: PieceId) -> bool {
        self.remove_piece(id).is_some()
    }

    fn preview_created(&mut self, definition: &PieceDefinition) {
        self.preview = Some(definition.preview_prefab().to_string());
    }

    fn preview_destroyed(&mut self) {
        self.preview = None;
    }
}

/// Distance from the piece origin that covers its bounds and anchors.
fn reach_radius(definition: &PieceDefinition) -> f32 {
    definition
        .anchors
        .iter()
        .map(|a| a.local_position.length())
        .fold(definition.bounds.bounding_radius(), f32::max)
}

/// Outward face normal of the box face nearest to `point`.
fn box_normal(obb: &Obb, point: Vec3) -> Vec3 {
    let local = point - obb.center;
    let mut best = (f32::NEG_INFINITY, Vec3::Y);
    for (axis, half) in obb.axes.iter().zip(obb.half_extents.to_array()) {
        let d = local.dot(*axis);
        let closeness = d.abs() / half.max(f32::EPSILON);
        if closeness > best.0 {
            best = (closeness, *axis * d.signum());
        }
    }
    best.1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::building::PieceCategory;
    use crate::game::snap::{SnapDirection, SnapType};
    use crate::world::LinearIndex;

    fn foundation() -> Arc<PieceDefinition> {
        Arc::new(
            PieceDefinition::new("Foundation", PieceCategory::Foundation)
                .with_bounds(Vec3::ZERO, Vec3::new(1.0, 0.25, 1.0))
                .with_anchor(Anchor::new(SnapType::FoundationTopEdge, SnapDirection::Up).at(Vec3::new(0.0, 0.25, 1.0)))
                .with_anchor(Anchor::new(SnapType::FoundationSide, SnapDirection::Right).at(Vec3::new(1.0, 0.0, 0.0))),
        )
    }

    #[test]
    fn test_insert_creates_anchors() {
        let mut world = PieceWorld::new();
        let id = world.insert_piece(foundation(), Pose::from_position(Vec3::new(5.0, 0.0, 0.0)), true);
        assert_eq!(world.len(), 1);
        assert_eq!(world.anchor_count(), 2);

        let anchors: Vec<_> = world.anchors_of(id).collect();
        assert_eq!(anchors.len(), 2);
        assert!((anchors[1].1.position() - Vec3::new(6.0, 0.0, 0.0)).length() < 1e-5);
        assert_eq!(world.anchor(anchors[0].0).map(|a| a.owner), Some(id));
    }

    #[test]
    fn test_anchor_follows_owner_pose() {
        let mut world = PieceWorld::new();
        let id = world.insert_piece(foundation(), Pose::IDENTITY, true);
        let side = world.piece(id).unwrap().anchors[1];

        world.piece_mut(id).unwrap().pose = Pose::from_yaw_degrees(Vec3::ZERO, 90.0);
        let dir = world.world_anchor(side).unwrap().direction();
        // Right (+X) turned 90 degrees about Y faces -Z
        assert!((dir - Vec3::NEG_Z).length() < 1e-5);
    }

    #[test]
    fn test_stale_handles_do_not_resolve() {
        let mut world = PieceWorld::new();
        let old = world.insert_piece(foundation(), Pose::IDENTITY, true);
        let old_anchor = world.piece(old).unwrap().anchors[0];
        assert!(world.remove_piece(old).is_some());
        assert_eq!(world.anchor_count(), 0);

        let new = world.insert_piece(foundation(), Pose::IDENTITY, true);
        assert_eq!(new.index(), old.index());
        assert!(world.piece(old).is_none());
        assert!(world.world_anchor(old_anchor).is_none());
        assert!(world.piece(new).is_some());
    }

    #[test]
    fn test_query_nearby() {
        let mut world = PieceWorld::with_index(Box::new(LinearIndex::new()));
        let near = world.insert_piece(foundation(), Pose::IDENTITY, true);
        world.insert_piece(foundation(), Pose::from_position(Vec3::new(50.0, 0.0, 0.0)), true);
        assert_eq!(world.query_nearby(Vec3::new(2.0, 0.0, 0.0), 1.0), vec![near]);
    }

    #[test]
    fn test_overlap_box_layers_and_exclude() {
        let mut world = PieceWorld::new();
        let id = world.insert_piece(foundation(), Pose::IDENTITY, true);
        world.add_blocking_volume(BlockingVolume {
            obb: Obb::axis_aligned(Vec3::new(3.0, 0.0, 0.0), Vec3::splat(0.5)),
            layer: LayerMask::PLAYER,
            tag: Some("Player".into()),
        });

        let query_box = Obb::axis_aligned(Vec3::new(1.5, 0.0, 0.0), Vec3::new(1.2, 0.5, 0.5));
        let all = world.overlap_box(&query_box, LayerMask::ALL, None);
        assert_eq!(all, vec![Overlap::Piece(id), Overlap::Volume(0)]);

        assert_eq!(world.overlap_box(&query_box, LayerMask::PLAYER, None), vec![Overlap::Volume(0)]);
        assert_eq!(world.overlap_box(&query_box, LayerMask::BUILDINGS, Some(id)), Vec::new());
    }

    #[test]
    fn test_overlap_sphere() {
        let mut world = PieceWorld::new();
        let id = world.insert_piece(foundation(), Pose::IDENTITY, true);
        let hits = world.overlap_sphere(&Sphere::new(Vec3::new(0.0, 1.0, 0.0), 0.8), LayerMask::ALL, None);
        assert_eq!(hits, vec![Overlap::Piece(id)]);
        let misses = world.overlap_sphere(&Sphere::new(Vec3::new(0.0, 2.0, 0.0), 0.5), LayerMask::ALL, None);
        assert!(misses.is_empty());
    }

    #[test]
    fn test_raycast_hits_top_face() {
        let mut world = PieceWorld::new();
        world.insert_piece(foundation(), Pose::IDENTITY, true);
        let ray = Ray::new(Vec3::new(0.0, 10.0, 0.0), Vec3::NEG_Y).unwrap();
        let hit = world.raycast(&ray, 20.0, LayerMask::ALL).unwrap();
        assert!((hit.point.y - 0.25).abs() < 1e-4);
        assert!((hit.normal - Vec3::Y).length() < 1e-5);
        assert_eq!(hit.tag.as_deref(), Some("Foundation"));
        assert!(world.raycast(&ray, 5.0, LayerMask::ALL).is_none());
    }

    #[test]
    fn test_damage_removes_destroyed_piece() {
        let mut world = PieceWorld::new();
        let id = world.insert_piece(foundation(), Pose::IDENTITY, true);
        assert!(!world.damage_piece(id, 40.0));
        assert!(world.repair_piece(id, 10.0));
        assert_eq!(world.piece(id).unwrap().health, 70.0);
        assert!(world.damage_piece(id, 100.0));
        assert!(world.is_empty());
        assert_eq!(world.anchor_count(), 0);
        assert!(world.query_nearby(Vec3::ZERO, 5.0).is_empty());
    }

    #[test]
    fn test_lifecycle_hooks() {
        let mut world = PieceWorld::new();
        let def = foundation();
        world.preview_created(&def);
        assert_eq!(world.preview(), Some("Foundation"));
        world.preview_destroyed();
        assert_eq!(world.preview(), None);

        let id = world.spawn_piece(def, Pose::IDENTITY, false);
        assert!(!world.piece(id).unwrap().grounded);
        assert!(world.destroy_piece(id));
        assert!(!world.destroy_piece(id));
    }
}
