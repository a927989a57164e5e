//! Resource Management
//!
//! Building costs and the storage they are paid from. The placement code
//! only talks to [`ResourceStorage`]; [`Resources`] is the in-memory
//! inventory and [`StorageDepot`] a placed store the builder draws from.

use std::collections::HashMap;

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Depots farther than this from the player are not used.
pub const STORAGE_SEARCH_RADIUS: f32 = 20.0;

/// Types of resources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResourceType {
    Wood,
    Stone,
    Iron,
    Gold,
    Thatch,
}

impl ResourceType {
    pub const ALL: [ResourceType; 5] = [
        ResourceType::Wood,
        ResourceType::Stone,
        ResourceType::Iron,
        ResourceType::Gold,
        ResourceType::Thatch,
    ];

    /// Display name
    pub fn name(&self) -> &'static str {
        match self {
            ResourceType::Wood => "Wood",
            ResourceType::Stone => "Stone",
            ResourceType::Iron => "Iron",
            ResourceType::Gold => "Gold",
            ResourceType::Thatch => "Thatch",
        }
    }
}

/// One line of a piece's cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRequirement {
    pub resource: ResourceType,
    pub amount: i32,
}

impl ResourceRequirement {
    pub fn new(resource: ResourceType, amount: i32) -> Self {
        Self { resource, amount }
    }
}

/// External store the builder checks and pays costs against.
pub trait ResourceStorage {
    fn check_resources(&self, resource: ResourceType, amount: i32) -> bool;

    /// Take `amount` out. Returns false, and takes nothing, if short.
    fn consume_resources(&mut self, resource: ResourceType, amount: i32) -> bool;

    /// True when every requirement can be met. Repeated resource types
    /// are added up first.
    fn can_afford(&self, requirements: &[ResourceRequirement]) -> bool {
        total_cost(requirements)
            .iter()
            .all(|r| self.check_resources(r.resource, r.amount))
    }

    /// Check everything first, then consume each resource type once.
    fn pay(&mut self, requirements: &[ResourceRequirement]) -> bool {
        if !self.can_afford(requirements) {
            return false;
        }
        total_cost(requirements)
            .iter()
            .all(|r| self.consume_resources(r.resource, r.amount))
    }
}

/// One requirement per resource type, amounts summed, in first-seen order.
pub fn total_cost(requirements: &[ResourceRequirement]) -> Vec<ResourceRequirement> {
    let mut totals: Vec<ResourceRequirement> = Vec::with_capacity(requirements.len());
    for r in requirements {
        match totals.iter_mut().find(|t| t.resource == r.resource) {
            Some(total) => total.amount = total.amount.saturating_add(r.amount),
            None => totals.push(*r),
        }
    }
    totals
}

/// In-memory resource inventory
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Resources {
    amounts: HashMap<ResourceType, i32>,
}

impl Resources {
    /// Empty inventory
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, res_type: ResourceType, amount: i32) -> Self {
        self.set(res_type, amount);
        self
    }

    /// Get current amount of a resource
    pub fn get(&self, res_type: ResourceType) -> i32 {
        self.amounts.get(&res_type).copied().unwrap_or(0)
    }

    /// Set amount of a resource (never below zero)
    pub fn set(&mut self, res_type: ResourceType, amount: i32) {
        self.amounts.insert(res_type, amount.max(0));
    }

    pub fn add(&mut self, res_type: ResourceType, amount: i32) {
        let current = self.get(res_type);
        self.set(res_type, current.saturating_add(amount));
    }

    /// Remove from a resource (returns false if insufficient)
    pub fn remove(&mut self, res_type: ResourceType, amount: i32) -> bool {
        let current = self.get(res_type);
        if current >= amount {
            self.amounts.insert(res_type, current - amount);
            true
        } else {
            false
        }
    }

    /// Check if we have enough of a resource
    pub fn has(&self, res_type: ResourceType, amount: i32) -> bool {
        self.get(res_type) >= amount
    }

    /// Get all resource amounts
    pub fn all(&self) -> impl Iterator<Item = (ResourceType, i32)> + '_ {
        self.amounts.iter().map(|(&t, &a)| (t, a))
    }
}

impl ResourceStorage for Resources {
    fn check_resources(&self, resource: ResourceType, amount: i32) -> bool {
        self.has(resource, amount)
    }

    fn consume_resources(&mut self, resource: ResourceType, amount: i32) -> bool {
        self.remove(resource, amount)
    }
}

/// A placed storage building with its own inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageDepot {
    pub name: String,
    pub position: Vec3,
    pub resources: Resources,
}

impl StorageDepot {
    pub fn new(name: impl Into<String>, position: Vec3, resources: Resources) -> Self {
        Self {
            name: name.into(),
            position,
            resources,
        }
    }
}

impl ResourceStorage for StorageDepot {
    fn check_resources(&self, resource: ResourceType, amount: i32) -> bool {
        self.resources.check_resources(resource, amount)
    }

    fn consume_resources(&mut self, resource: ResourceType, amount: i32) -> bool {
        self.resources.consume_resources(resource, amount)
    }
}

/// Index of the nearest depot within `radius` of `position`.
pub fn find_nearest_storage(depots: &[StorageDepot], position: Vec3, radius: f32) -> Option<usize> {
    depots
        .iter()
        .enumerate()
        .map(|(i, d)| (i, d.position.distance(position)))
        .filter(|(_, dist)| *dist <= radius)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(i, _)| i)
}
