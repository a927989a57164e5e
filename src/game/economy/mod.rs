//! Economy Module
//!
//! Resource costs and storage used by placement commits.

pub mod resources;

pub use resources::{
    find_nearest_storage, total_cost, ResourceRequirement, ResourceStorage, ResourceType, Resources, StorageDepot,
    STORAGE_SEARCH_RADIUS,
};
