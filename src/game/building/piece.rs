//! Placed Pieces
//!
//! A `BuildingPiece` is one committed instance of a definition, with its
//! own pose, health and handles to the anchors it owns in the world arena.

use std::sync::Arc;

use super::definition::PieceDefinition;
use super::world::AnchorId;
use crate::physics::{Obb, Pose};

/// Health state machine: Alive -> Destroyed, never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PieceState {
    Alive,
    Destroyed,
}

#[derive(Debug, Clone)]
pub struct BuildingPiece {
    pub definition: Arc<PieceDefinition>,
    pub pose: Pose,
    pub health: f32,
    pub max_health: f32,
    pub state: PieceState,
    /// Anchors created for this piece, in definition order
    pub anchors: Vec<AnchorId>,
    /// Placed on a surface, or snapped to a supporting anchor
    pub grounded: bool,
}

impl BuildingPiece {
    pub fn new(definition: Arc<PieceDefinition>, pose: Pose, grounded: bool) -> Self {
        let max_health = definition.max_health.max(1.0);
        Self {
            definition,
            pose,
            health: max_health,
            max_health,
            state: PieceState::Alive,
            anchors: Vec::new(),
            grounded,
        }
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn is_alive(&self) -> bool {
        self.state == PieceState::Alive
    }

    /// Apply damage. Returns true if this hit destroyed the piece.
    pub fn take_damage(&mut self, amount: f32) -> bool {
        if !self.is_alive() || !amount.is_finite() || amount <= 0.0 {
            return false;
        }
        self.health -= amount;
        if self.health <= 0.0 {
            self.health = 0.0;
            self.state = PieceState::Destroyed;
            return true;
        }
        false
    }

    /// Restore health up to the maximum. Destroyed pieces stay destroyed.
    pub fn repair(&mut self, amount: f32) {
        if !self.is_alive() || !amount.is_finite() || amount <= 0.0 {
            return;
        }
        self.health = (self.health + amount).min(self.max_health);
    }

    pub fn health_fraction(&self) -> f32 {
        self.health / self.max_health
    }

    pub fn obb(&self) -> Obb {
        self.definition.obb_at(&self.pose)
    }
}
