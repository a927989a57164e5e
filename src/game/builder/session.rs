//! Placement Session
//!
//! The per-player build mode driver. Once per frame it reads a
//! [`FrameInput`], moves the ghost, keeps or changes the held snap, shows
//! the validity of the spot and, on `Place`, commits a real piece.
//!
//! States:
//! - `Idle` - not in build mode, nothing shown
//! - `Aiming` - ghost follows the pointer over valid surfaces
//! - `Snapped` - ghost is held by an anchor pair
//!
//! A commit spawns the piece, pays for it and drops back to `Aiming` with
//! the same piece selected.

use std::sync::Arc;

use glam::Vec3;
use tracing::{debug, info};

use super::feedback::{PreviewFeedback, ValidityLatch};
use super::gate::{GateRequest, PlacementVerdict, evaluate, within_reach};
use crate::camera::{Ray, SurfaceHit, raycast_ground};
use crate::game::building::{PieceCatalog, PieceDefinition, PieceId, PieceWorld, SceneLifecycle};
use crate::game::config::PlacementConfig;
use crate::game::economy::ResourceStorage;
use crate::game::snap::{
    Anchor, SearchQuery, SnapCandidate, SnapEvent, SnapTracker, SolveRequest, adaptive_search_radius,
    optimal_shared_connection, rank_candidates, solve_placement,
};
use crate::input::{BuildAction, FrameInput};
use crate::physics::{Pose, Quat};
use crate::world::LayerMask;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Aiming,
    Snapped,
}

/// Why a frame did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NotBuilding,
    NoPieceSelected,
    NoHit,
    InvalidSurface,
    OutOfRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Placed(PieceId),
    Denied(PlacementVerdict),
}

/// Result of one `update`.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameOutcome {
    pub state: SessionState,
    pub event: SnapEvent,
    pub feedback: PreviewFeedback,
    /// Ghost pose, when shown
    pub preview: Option<Pose>,
    /// Raw gate result for the ghost pose
    pub verdict: Option<PlacementVerdict>,
    pub commit: Option<CommitOutcome>,
    pub skipped: Option<SkipReason>,
    /// Build mode was switched on this frame (pick a storage now)
    pub entered_build_mode: bool,
}

impl FrameOutcome {
    fn new(state: SessionState) -> Self {
        Self {
            state,
            event: SnapEvent::Idle,
            feedback: PreviewFeedback::Hidden,
            preview: None,
            verdict: None,
            commit: None,
            skipped: None,
            entered_build_mode: false,
        }
    }
}

pub struct PlacementSession {
    catalog: PieceCatalog,
    config: PlacementConfig,
    state: SessionState,
    selected: Option<usize>,
    /// Index of the piece whose ghost the scene currently shows
    shown_preview: Option<usize>,
    /// The ghost's anchors, carrying connection types adopted while snapping
    source_anchors: Vec<Anchor>,
    /// Ghost rotation, kept across piece switches
    rotation: Quat,
    user_rotated: bool,
    apply_rotation: bool,
    tracker: SnapTracker,
    latch: ValidityLatch,
    preview: Option<Pose>,
    /// Surface the free ghost stands on
    surface: Option<SurfaceHit>,
    verdict: Option<PlacementVerdict>,
}

impl PlacementSession {
    pub fn new(catalog: PieceCatalog, config: PlacementConfig) -> Self {
        let config = config.sanitized();
        Self {
            catalog,
            apply_rotation: config.apply_rotation_during_snap,
            config,
            state: SessionState::Idle,
            selected: None,
            shown_preview: None,
            source_anchors: Vec::new(),
            rotation: Quat::IDENTITY,
            user_rotated: false,
            tracker: SnapTracker::new(),
            latch: ValidityLatch::new(),
            preview: None,
            surface: None,
            verdict: None,
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_building(&self) -> bool {
        self.state != SessionState::Idle
    }

    pub fn catalog(&self) -> &PieceCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &PlacementConfig {
        &self.config
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_definition(&self) -> Option<&Arc<PieceDefinition>> {
        self.selected.and_then(|i| self.catalog.get(i))
    }

    pub fn held(&self) -> Option<&SnapCandidate> {
        self.tracker.held()
    }

    pub fn tracker(&self) -> &SnapTracker {
        &self.tracker
    }

    /// Anchors of the ghost, with any connection types adopted so far.
    pub fn source_anchors(&self) -> &[Anchor] {
        &self.source_anchors
    }

    pub fn preview_pose(&self) -> Option<Pose> {
        self.preview
    }

    pub fn preview_yaw(&self) -> f32 {
        Pose::new(Vec3::ZERO, self.rotation).yaw_degrees()
    }

    pub fn user_rotated(&self) -> bool {
        self.user_rotated
    }

    pub fn applies_rotation(&self) -> bool {
        self.apply_rotation
    }

    pub fn feedback(&self) -> PreviewFeedback {
        self.latch.feedback(self.preview.is_some(), self.tracker.is_snapped())
    }

    // ------------------------------------------------------------------
    // Mode & selection
    // ------------------------------------------------------------------

    /// Enter or leave build mode. Returns true when entering.
    pub fn toggle_build_mode(&mut self) -> bool {
        if self.is_building() {
            self.state = SessionState::Idle;
            self.clear_snap();
            self.preview = None;
            self.surface = None;
            info!("[Builder] Build mode off");
            false
        } else {
            self.state = SessionState::Aiming;
            if self.selected.is_none() && !self.catalog.is_empty() {
                self.select(0);
            }
            info!(piece = ?self.selected_definition().map(|d| d.name.as_str()), "[Builder] Build mode on");
            true
        }
    }

    /// Select a piece by catalog index. Out-of-range indices are ignored.
    pub fn select(&mut self, index: usize) -> bool {
        let Some(definition) = self.catalog.get(index) else {
            return false;
        };
        if self.selected == Some(index) {
            return true;
        }
        self.source_anchors = definition.anchors.clone();
        info!(piece = %definition.name, index, "[Builder] Selected piece");
        self.selected = Some(index);
        self.clear_snap();
        true
    }

    pub fn next_piece(&mut self) -> bool {
        self.step_selection(1)
    }

    pub fn previous_piece(&mut self) -> bool {
        self.step_selection(-1)
    }

    fn step_selection(&mut self, step: isize) -> bool {
        let len = self.catalog.len() as isize;
        if len == 0 {
            return false;
        }
        let current = self.selected.map_or(if step > 0 { -1 } else { 0 }, |i| i as isize);
        self.select((current + step).rem_euclid(len) as usize)
    }

    /// Turn the ghost by `degrees` about +Y.
    pub fn rotate(&mut self, degrees: f32) {
        self.rotation = (Quat::from_rotation_y(degrees.to_radians()) * self.rotation).normalize();
        self.user_rotated = true;
    }

    pub fn toggle_rotation_during_snap(&mut self) -> bool {
        self.apply_rotation = !self.apply_rotation;
        info!(enabled = self.apply_rotation, "[Builder] Rotation during snap");
        self.apply_rotation
    }

    /// Give up the current snap and any adopted connection types.
    fn clear_snap(&mut self) {
        if self.tracker.release() {
            debug!("[Builder] Snap released");
        }
        self.user_rotated = false;
        self.latch.reset();
        self.verdict = None;
    }

    fn sync_preview(&mut self, scene: &mut dyn SceneLifecycle) {
        let wanted = if self.is_building() { self.selected } else { None };
        if wanted == self.shown_preview {
            return;
        }
        if self.shown_preview.is_some() {
            scene.preview_destroyed();
        }
        if let Some(definition) = wanted.and_then(|i| self.catalog.get(i)) {
            scene.preview_created(definition);
        }
        self.shown_preview = wanted;
    }

    /// Surface under the pointer: the nearer of placed geometry and the
    /// ground plane at `y = 0`, within `max_build_distance`.
    pub fn pointer_hit(&self, world: &PieceWorld, ray: &Ray) -> Option<SurfaceHit> {
        let reach = self.config.max_build_distance;
        let geometry = world.raycast(ray, reach, LayerMask::GROUND | LayerMask::BUILDINGS | LayerMask::CRITICAL);
        let ground = raycast_ground(ray, 0.0, reach);
        match (geometry, ground) {
            (Some(a), Some(b)) => Some(if a.distance <= b.distance { a } else { b }),
            (a, b) => a.or(b),
        }
    }

    // ------------------------------------------------------------------
    // Frame update
    // ------------------------------------------------------------------

    /// Drive one frame.
    pub fn update(
        &mut self,
        frame: &FrameInput,
        world: &mut PieceWorld,
        storage: Option<&mut dyn ResourceStorage>,
        dt: f32,
    ) -> FrameOutcome {
        let mut outcome = FrameOutcome::new(self.state);

        if frame.triggered(BuildAction::ToggleBuildMode) {
            outcome.entered_build_mode = self.toggle_build_mode();
        }
        if !self.is_building() {
            self.sync_preview(world);
            outcome.state = self.state;
            outcome.skipped = Some(SkipReason::NotBuilding);
            return outcome;
        }

        self.apply_actions(frame);
        self.sync_preview(world);

        let Some(definition) = self.selected_definition().cloned() else {
            self.preview = None;
            outcome.skipped = Some(SkipReason::NoPieceSelected);
            return outcome;
        };

        let (event, skipped) = self.track(frame, world, dt);
        outcome.event = event;
        outcome.skipped = skipped;

        if frame.triggered(BuildAction::CycleSnap) && self.tracker.is_snapped() {
            outcome.event = self.tracker.cycle();
            self.adopt_held();
            self.solve_held(world);
            debug!(target = ?self.tracker.held_target(), "[Builder] Snap cycled");
        }

        self.state = if self.tracker.is_snapped() {
            SessionState::Snapped
        } else {
            SessionState::Aiming
        };

        // Reach check hides the ghost
        if let Some(pose) = self.preview {
            if !within_reach(frame.player_position, pose.position, self.config.max_placement_distance) {
                self.preview = None;
                outcome.skipped = Some(SkipReason::OutOfRange);
            }
        }

        self.verdict = self.preview.map(|pose| {
            evaluate(
                world,
                &self.config,
                storage.as_deref(),
                &GateRequest {
                    definition: &definition,
                    pose,
                    held_target: self.tracker.held_target(),
                    player: frame.player_position,
                    exclude: None,
                },
            )
        });
        let raw_valid = self.verdict.is_some_and(|v| v.is_valid());
        self.latch
            .update(self.preview.is_some(), raw_valid, dt, self.config.validity_lock_time);

        if frame.triggered(BuildAction::Place) {
            outcome.commit = self.try_commit(frame, world, storage, &definition);
        }

        outcome.state = self.state;
        outcome.preview = self.preview;
        outcome.verdict = self.verdict;
        outcome.feedback = self.feedback();
        outcome
    }

    fn apply_actions(&mut self, frame: &FrameInput) {
        for action in &frame.actions {
            match *action {
                BuildAction::NextPiece => {
                    self.next_piece();
                }
                BuildAction::PreviousPiece => {
                    self.previous_piece();
                }
                BuildAction::SelectSlot(slot) => {
                    self.select(slot as usize);
                }
                BuildAction::RotateLeft => self.rotate(-self.config.manual_rotation_step),
                BuildAction::RotateRight => self.rotate(self.config.manual_rotation_step),
                BuildAction::ToggleRotationSnap => {
                    self.toggle_rotation_during_snap();
                }
                BuildAction::ToggleBuildMode | BuildAction::Place | BuildAction::CycleSnap => {}
            }
        }
        if frame.scroll > 0.0 {
            self.next_piece();
        } else if frame.scroll < 0.0 {
            self.previous_piece();
        }
    }

    /// Break detection, ranking, hysteresis and ghost positioning.
    fn track(&mut self, frame: &FrameInput, world: &PieceWorld, dt: f32) -> (SnapEvent, Option<SkipReason>) {
        let hit = frame.hit.as_ref();
        let hit_point = hit.map(|h| h.point);
        let aim = hit_point.map(|p| Pose::new(self.config.grid().snap(p), self.rotation));

        // Breaking away from a held snap
        let mut broke = false;
        if let Some(held) = self.tracker.held() {
            let pointer_far = hit_point.is_some_and(|p| p.distance(held.target_position) > self.config.snap_priority_distance);
            let jerked = frame.pointer_delta.length() > self.config.pointer_break_threshold;
            if pointer_far || jerked {
                debug!(pointer_far, jerked, "[Builder] Breaking snap");
                self.clear_snap();
                broke = true;
            }
        }

        // Search from the held ghost while snapped, from the pointer otherwise
        let snapped = self.tracker.is_snapped();
        let mover = match (snapped, self.preview, aim) {
            (true, Some(pose), _) => Pose::new(pose.position, self.rotation),
            (_, _, Some(aim)) => aim,
            _ => {
                self.preview = None;
                self.surface = None;
                return (if broke { SnapEvent::Released } else { SnapEvent::Idle }, Some(SkipReason::NoHit));
            }
        };

        let held_far = match (self.tracker.held(), hit_point) {
            (Some(held), Some(p)) => p.distance(held.target_position) > self.config.snap_priority_distance,
            _ => false,
        };
        let radius = adaptive_search_radius(
            self.config.snap_detection_radius,
            self.config.snap_priority_distance,
            snapped,
            held_far,
        );
        let ranked = rank_candidates(
            world,
            &SearchQuery {
                sources: &self.source_anchors,
                mover,
                center: mover.position,
                radius,
                max_distance: self.config.snap_max_distance,
                exclude: None,
                held: self.tracker.held_target(),
                held_discount: self.config.held_snap_discount,
                pointer: hit_point,
                priority_distance: self.config.snap_priority_distance,
            },
        );

        let held_alive = self.tracker.held_target().is_none_or(|t| world.world_anchor(t).is_some());
        // Pointer resting on the held anchor keeps the hold alive
        let resting = ranked.is_empty()
            && match (self.tracker.held(), hit_point) {
                (Some(held), Some(p)) => p.distance(held.target_position) < self.config.snap_tolerance,
                _ => false,
            };
        let step = if resting { 0.0 } else { dt };

        let event = self.tracker.update(ranked, held_alive, step, &self.config.hold_policy());
        let event = match (broke, event) {
            (true, SnapEvent::Idle) => SnapEvent::Released,
            (true, SnapEvent::Acquired) => SnapEvent::Switched,
            (_, event) => event,
        };
        match event {
            SnapEvent::Acquired | SnapEvent::Switched => {
                debug!(target = ?self.tracker.held_target(), ?event, "[Builder] Snap");
                self.adopt_held();
            }
            SnapEvent::Released => {
                debug!("[Builder] Snap released");
                self.user_rotated = false;
            }
            _ => {}
        }

        if self.tracker.is_snapped() {
            self.preview = Some(mover);
            self.surface = None;
            self.solve_held(world);
            return (event, None);
        }

        // Free placement over accepted surfaces only
        match (aim, hit) {
            (Some(aim), Some(hit)) if self.config.valid_surfaces.accepts(hit) => {
                self.preview = Some(aim);
                self.surface = Some(hit.clone());
                (event, None)
            }
            (Some(_), Some(_)) => {
                self.preview = None;
                self.surface = None;
                (event, Some(SkipReason::InvalidSurface))
            }
            _ => {
                self.preview = None;
                self.surface = None;
                (event, Some(SkipReason::NoHit))
            }
        }
    }

    /// Persist the connection type the held pair resolved with.
    fn adopt_held(&mut self) {
        let Some(held) = self.tracker.held() else {
            return;
        };
        if let Some(source) = self.source_anchors.get_mut(held.source_index) {
            source.adopt_connection(held.connection);
        }
    }

    /// Move the ghost onto the held pair.
    fn solve_held(&mut self, world: &PieceWorld) {
        let (Some(held), Some(current)) = (self.tracker.held(), self.preview) else {
            return;
        };
        let Some(source) = self.source_anchors.get(held.source_index) else {
            return;
        };
        let Some(target) = world.world_anchor(held.target) else {
            return;
        };

        let mover = Pose::new(current.position, self.rotation);
        let source_world = source.in_world(mover);
        let connection = optimal_shared_connection(&source_world, &target).unwrap_or(held.connection);

        let mut request = SolveRequest {
            source,
            target,
            connection,
            mover,
            apply_rotation: self.apply_rotation,
            user_rotated: self.user_rotated,
            use_visual_offsets: false,
        };
        // Keep the un-offset rotation so offsets never accumulate frame to frame
        let base = solve_placement(&request);
        request.use_visual_offsets = self.config.use_visual_offsets;
        let shown = solve_placement(&request);

        // Manual yaw stays raw so presses add up; only the shown pose is quantized
        if !self.user_rotated {
            self.rotation = base.rotation;
        }
        self.preview = Some(shown);
    }

    /// Re-check the ghost and spawn the real piece if it passes.
    fn try_commit(
        &mut self,
        frame: &FrameInput,
        world: &mut PieceWorld,
        mut storage: Option<&mut dyn ResourceStorage>,
        definition: &Arc<PieceDefinition>,
    ) -> Option<CommitOutcome> {
        let pose = self.preview?;
        let held_target = self.tracker.held_target();

        let verdict = evaluate(
            world,
            &self.config,
            storage.as_deref(),
            &GateRequest {
                definition,
                pose,
                held_target,
                player: frame.player_position,
                exclude: None,
            },
        );
        if !verdict.is_valid() {
            debug!(piece = %definition.name, reason = verdict.failure(), "[Builder] Placement denied");
            return Some(CommitOutcome::Denied(verdict));
        }

        if let Some(storage) = storage.as_deref_mut() {
            if !storage.pay(&definition.requirements) {
                let verdict = PlacementVerdict {
                    has_resources: false,
                    ..verdict
                };
                debug!(piece = %definition.name, "[Builder] Placement denied, payment failed");
                return Some(CommitOutcome::Denied(verdict));
            }
        }

        let grounded = match held_target {
            Some(target) => world.anchor(target).is_some_and(|a| {
                a.anchor.provides_support && world.piece(a.owner).is_some_and(|p| p.grounded)
            }),
            None => self
                .surface
                .as_ref()
                .is_some_and(|s| s.layer.intersects(LayerMask::GROUND)),
        };

        let id = world.spawn_piece(Arc::clone(definition), pose, grounded);
        info!(piece = %definition.name, ?id, x = pose.position.x, y = pose.position.y, z = pose.position.z, grounded, "[Builder] Placed piece");

        // Back to aiming with the same piece
        self.source_anchors = definition.anchors.clone();
        self.clear_snap();
        self.state = SessionState::Aiming;
        Some(CommitOutcome::Placed(id))
    }
}
