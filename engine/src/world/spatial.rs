//! Spatial Index Module
//!
//! Broad-phase lookup of objects near a point. Every object is registered
//! as a bounding sphere; `query_nearby` returns the keys whose sphere
//! touches the query sphere, sorted and deduplicated.
//!
//! Two implementations:
//! - [`GridIndex`] - uniform hash grid, the default
//! - [`LinearIndex`] - scans everything, useful for tiny scenes and tests

use std::collections::{BTreeMap, HashMap};
use std::fmt::Debug;
use std::hash::Hash;

use glam::{IVec3, Vec3};

/// Default cell edge for [`GridIndex`], about one building piece wide.
pub const DEFAULT_CELL_SIZE: f32 = 4.0;

/// Broad-phase provider keyed by `K` (usually a piece handle).
pub trait SpatialIndex<K>: Debug
where
    K: Copy + Ord + Hash + Debug,
{
    /// Insert or move an object. Re-inserting a key replaces its bounds.
    fn insert(&mut self, key: K, center: Vec3, radius: f32);

    /// Remove an object. Returns false if it was not present.
    fn remove(&mut self, key: K) -> bool;

    /// Keys whose bounding sphere overlaps the query sphere.
    fn query_nearby(&self, center: Vec3, radius: f32) -> Vec<K>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Copy)]
struct Bounds {
    center: Vec3,
    radius: f32,
}

impl Bounds {
    fn overlaps(&self, center: Vec3, radius: f32) -> bool {
        let r = self.radius + radius;
        self.center.distance_squared(center) <= r * r
    }
}

// ============================================================================
// UNIFORM GRID
// ============================================================================

/// Uniform hash grid. Objects are stored in every cell their bounding box
/// touches, so queries only look at the cells around the query sphere.
#[derive(Debug, Clone)]
pub struct GridIndex<K> {
    cell_size: f32,
    cells: HashMap<IVec3, Vec<K>>,
    entries: HashMap<K, (Bounds, Vec<IVec3>)>,
}

impl<K> Default for GridIndex<K>
where
    K: Copy + Ord + Hash + Debug,
{
    fn default() -> Self {
        Self::new(DEFAULT_CELL_SIZE)
    }
}

impl<K> GridIndex<K>
where
    K: Copy + Ord + Hash + Debug,
{
    /// Create a grid with the given cell size. Non-positive sizes fall back
    /// to [`DEFAULT_CELL_SIZE`].
    pub fn new(cell_size: f32) -> Self {
        let cell_size = if cell_size.is_finite() && cell_size > 0.0 {
            cell_size
        } else {
            DEFAULT_CELL_SIZE
        };
        Self {
            cell_size,
            cells: HashMap::new(),
            entries: HashMap::new(),
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    fn cell_of(&self, p: Vec3) -> IVec3 {
        (p / self.cell_size).floor().as_ivec3()
    }

    fn cells_covering(&self, center: Vec3, radius: f32) -> Vec<IVec3> {
        let r = Vec3::splat(radius.max(0.0));
        let lo = self.cell_of(center - r);
        let hi = self.cell_of(center + r);
        let mut out = Vec::new();
        for x in lo.x..=hi.x {
            for y in lo.y..=hi.y {
                for z in lo.z..=hi.z {
                    out.push(IVec3::new(x, y, z));
                }
            }
        }
        out
    }
}

impl<K> SpatialIndex<K> for GridIndex<K>
where
    K: Copy + Ord + Hash + Debug,
{
    fn insert(&mut self, key: K, center: Vec3, radius: f32) {
        self.remove(key);
        let cells = self.cells_covering(center, radius);
        for cell in &cells {
            self.cells.entry(*cell).or_default().push(key);
        }
        self.entries.insert(key, (Bounds { center, radius: radius.max(0.0) }, cells));
    }

    fn remove(&mut self, key: K) -> bool {
        let Some((_, cells)) = self.entries.remove(&key) else {
            return false;
        };
        for cell in cells {
            if let Some(bucket) = self.cells.get_mut(&cell) {
                bucket.retain(|k| *k != key);
                if bucket.is_empty() {
                    self.cells.remove(&cell);
                }
            }
        }
        true
    }

    fn query_nearby(&self, center: Vec3, radius: f32) -> Vec<K> {
        if !center.is_finite() || !radius.is_finite() {
            return Vec::new();
        }
        let mut found: Vec<K> = self
            .cells_covering(center, radius)
            .iter()
            .filter_map(|cell| self.cells.get(cell))
            .flatten()
            .copied()
            .filter(|key| {
                self.entries
                    .get(key)
                    .is_some_and(|(bounds, _)| bounds.overlaps(center, radius))
            })
            .collect();
        found.sort();
        found.dedup();
        found
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

// ============================================================================
// LINEAR SCAN
// ============================================================================

/// Naive O(n) index.
#[derive(Debug, Clone)]
pub struct LinearIndex<K> {
    entries: BTreeMap<K, Bounds>,
}

impl<K: Ord> Default for LinearIndex<K> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<K> LinearIndex<K>
where
    K: Copy + Ord + Hash + Debug,
{
    pub fn new() -> Self {
        Self::default()
    }
}

impl<K> SpatialIndex<K> for LinearIndex<K>
where
    K: Copy + Ord + Hash + Debug,
{
    fn insert(&mut self, key: K, center: Vec3, radius: f32) {
        self.entries.insert(key, Bounds { center, radius: radius.max(0.0) });
    }

    fn remove(&mut self, key: K) -> bool {
        self.entries.remove(&key).is_some()
    }

    fn query_nearby(&self, center: Vec3, radius: f32) -> Vec<K> {
        // BTreeMap iteration is already sorted by key
        self.entries
            .iter()
            .filter(|(_, bounds)| bounds.overlaps(center, radius))
            .map(|(key, _)| *key)
            .collect()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn populate(index: &mut dyn SpatialIndex<u32>) {
        index.insert(1, Vec3::new(0.0, 0.0, 0.0), 1.0);
        index.insert(2, Vec3::new(3.0, 0.0, 0.0), 1.0);
        index.insert(3, Vec3::new(20.0, 0.0, 0.0), 1.0);
        index.insert(4, Vec3::new(-9.0, 4.0, 2.0), 0.5);
    }

    #[test]
    fn test_grid_and_linear_agree() {
        let mut grid = GridIndex::<u32>::new(4.0);
        let mut linear = LinearIndex::<u32>::new();
        populate(&mut grid);
        populate(&mut linear);

        for (center, radius) in [
            (Vec3::ZERO, 1.0),
            (Vec3::new(1.5, 0.0, 0.0), 0.6),
            (Vec3::new(18.5, 0.0, 0.0), 1.0),
            (Vec3::new(-9.0, 4.0, 2.0), 0.1),
            (Vec3::ZERO, 100.0),
        ] {
            assert_eq!(
                grid.query_nearby(center, radius),
                linear.query_nearby(center, radius),
                "Mismatch at {:?} r={}",
                center,
                radius
            );
        }
    }

    #[test]
    fn test_query_sorted_and_deduplicated() {
        let mut grid = GridIndex::<u32>::new(1.0);
        // Large object spans many cells
        grid.insert(7, Vec3::ZERO, 5.0);
        grid.insert(2, Vec3::new(1.0, 0.0, 0.0), 0.5);
        assert_eq!(grid.query_nearby(Vec3::ZERO, 3.0), vec![2, 7]);
    }

    #[test]
    fn test_reinsert_moves_object() {
        let mut grid = GridIndex::<u32>::default();
        grid.insert(1, Vec3::ZERO, 0.5);
        grid.insert(1, Vec3::new(50.0, 0.0, 0.0), 0.5);
        assert_eq!(grid.len(), 1);
        assert!(grid.query_nearby(Vec3::ZERO, 1.0).is_empty());
        assert_eq!(grid.query_nearby(Vec3::new(50.0, 0.0, 0.0), 1.0), vec![1]);
    }

    #[test]
    fn test_remove() {
        let mut grid = GridIndex::<u32>::default();
        grid.insert(1, Vec3::ZERO, 0.5);
        assert!(grid.remove(1));
        assert!(!grid.remove(1));
        assert!(grid.is_empty());
        assert!(grid.query_nearby(Vec3::ZERO, 10.0).is_empty());
    }

    #[test]
    fn test_invalid_cell_size_falls_back() {
        let grid = GridIndex::<u32>::new(0.0);
        assert_eq!(grid.cell_size(), DEFAULT_CELL_SIZE);
    }
}
