//! Collision detection module
//!
//! Overlap tests used by the placement gate and the scene queries:
//!
//! - [`Aabb`] - axis-aligned boxes, used for broad bounds and ray casts
//! - [`Obb`] - oriented boxes, the footprint of a rotated piece
//! - [`Sphere`] - the snap detection volume
//!
//! OBB/OBB uses the separating axis test over the 15 candidate axes.
//! Touching boxes count as overlapping.
//!
//! # Ray-AABB Intersection
//!
//! The slab method is used for ray-AABB intersection, which finds the
//! intersection points by computing entry and exit times for each axis.
//!
//! # Example
//!
//! ```ignore
//! use snapforge_engine::physics::collision::{Obb, ray_aabb_intersect};
//! use snapforge_engine::physics::Pose;
//! use glam::Vec3;
//!
//! let wall = Obb::from_pose(&Pose::from_yaw_degrees(Vec3::ZERO, 45.0), Vec3::ZERO, Vec3::new(2.0, 1.5, 0.1));
//! let crate_box = Obb::axis_aligned(Vec3::new(0.5, 0.0, 0.0), Vec3::splat(0.5));
//! assert!(wall.intersects(&crate_box));
//! ```

use glam::Vec3;

use super::pose::Pose;

/// Slack added to the rotation matrix terms so near-parallel edges do not
/// produce a false separating axis from a zero cross product.
const SAT_EPSILON: f32 = 1e-6;

// ============================================================================
// AABB
// ============================================================================

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        let half = half_extents.abs();
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    pub fn contains_point(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// Radius of the sphere centred on the box that encloses it.
    pub fn bounding_radius(&self) -> f32 {
        self.half_extents().length()
    }

    /// Outward normal of the face closest to `point`.
    pub fn surface_normal(&self, point: Vec3) -> Vec3 {
        let local = point - self.center();
        let half = self.half_extents().max(Vec3::splat(SAT_EPSILON));
        let scaled = (local / half).abs();
        if scaled.x >= scaled.y && scaled.x >= scaled.z {
            Vec3::new(local.x.signum(), 0.0, 0.0)
        } else if scaled.y >= scaled.z {
            Vec3::new(0.0, local.y.signum(), 0.0)
        } else {
            Vec3::new(0.0, 0.0, local.z.signum())
        }
    }
}

// ============================================================================
// OBB
// ============================================================================

/// Oriented bounding box in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obb {
    pub center: Vec3,
    pub half_extents: Vec3,
    /// Local X, Y, Z axes in world space, unit length.
    pub axes: [Vec3; 3],
}

impl Obb {
    pub fn axis_aligned(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            center,
            half_extents: half_extents.abs(),
            axes: [Vec3::X, Vec3::Y, Vec3::Z],
        }
    }

    /// Box whose local centre and extents are given in `pose`'s local space.
    pub fn from_pose(pose: &Pose, local_center: Vec3, half_extents: Vec3) -> Self {
        Self {
            center: pose.transform_point(local_center),
            half_extents: half_extents.abs(),
            axes: [pose.right(), pose.up(), pose.forward()],
        }
    }

    /// Same box scaled around its centre (`factor` < 1 shrinks it).
    pub fn scaled(&self, factor: f32) -> Self {
        Self {
            half_extents: self.half_extents * factor.max(0.0),
            ..*self
        }
    }

    /// Smallest AABB enclosing this box.
    pub fn enclosing_aabb(&self) -> Aabb {
        let e = self.half_extents;
        let reach = self.axes[0].abs() * e.x + self.axes[1].abs() * e.y + self.axes[2].abs() * e.z;
        Aabb::from_center_half_extents(self.center, reach)
    }

    pub fn closest_point(&self, point: Vec3) -> Vec3 {
        let d = point - self.center;
        let e = self.half_extents.to_array();
        let mut result = self.center;
        for (axis, extent) in self.axes.iter().zip(e) {
            let dist = d.dot(*axis).clamp(-extent, extent);
            result += *axis * dist;
        }
        result
    }

    /// Separating axis test against another oriented box.
    pub fn intersects(&self, other: &Obb) -> bool {
        let a = &self.axes;
        let b = &other.axes;
        let ea = self.half_extents.to_array();
        let eb = other.half_extents.to_array();

        // Rotation expressing `other` in this box's frame
        let mut r = [[0.0f32; 3]; 3];
        let mut abs_r = [[0.0f32; 3]; 3];
        for i in 0..3 {
            for j in 0..3 {
                r[i][j] = a[i].dot(b[j]);
                abs_r[i][j] = r[i][j].abs() + SAT_EPSILON;
            }
        }

        let d = other.center - self.center;
        let t = [d.dot(a[0]), d.dot(a[1]), d.dot(a[2])];

        // Face axes of self
        for i in 0..3 {
            let ra = ea[i];
            let rb = eb[0] * abs_r[i][0] + eb[1] * abs_r[i][1] + eb[2] * abs_r[i][2];
            if t[i].abs() > ra + rb {
                return false;
            }
        }

        // Face axes of other
        for j in 0..3 {
            let ra = ea[0] * abs_r[0][j] + ea[1] * abs_r[1][j] + ea[2] * abs_r[2][j];
            let rb = eb[j];
            let tj = t[0] * r[0][j] + t[1] * r[1][j] + t[2] * r[2][j];
            if tj.abs() > ra + rb {
                return false;
            }
        }

        // Edge cross products
        for i in 0..3 {
            let (i1, i2) = ((i + 1) % 3, (i + 2) % 3);
            for j in 0..3 {
                let (j1, j2) = ((j + 1) % 3, (j + 2) % 3);
                let ra = ea[i1] * abs_r[i2][j] + ea[i2] * abs_r[i1][j];
                let rb = eb[j1] * abs_r[i][j2] + eb[j2] * abs_r[i][j1];
                let tl = t[i2] * r[i1][j] - t[i1] * r[i2][j];
                if tl.abs() > ra + rb {
                    return false;
                }
            }
        }

        true
    }

    pub fn intersects_sphere(&self, sphere: &Sphere) -> bool {
        sphere.intersects_obb(self)
    }
}

impl From<Aabb> for Obb {
    fn from(aabb: Aabb) -> Self {
        Obb::axis_aligned(aabb.center(), aabb.half_extents())
    }
}

// ============================================================================
// SPHERE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self {
            center,
            radius: radius.max(0.0),
        }
    }

    pub fn contains_point(&self, point: Vec3) -> bool {
        self.center.distance_squared(point) <= self.radius * self.radius
    }

    pub fn intersects_sphere(&self, other: &Sphere) -> bool {
        let r = self.radius + other.radius;
        self.center.distance_squared(other.center) <= r * r
    }

    pub fn intersects_obb(&self, obb: &Obb) -> bool {
        self.contains_point(obb.closest_point(self.center))
    }
}

// ============================================================================
// RAY CASTS
// ============================================================================

/// Tests ray-AABB intersection using the slab method.
///
/// # Arguments
///
/// * `ray_origin` - Starting point of the ray
/// * `ray_dir` - Direction of the ray (should be normalized)
/// * `aabb_min` - Minimum corner of the AABB
/// * `aabb_max` - Maximum corner of the AABB
///
/// # Returns
///
/// Distance along the ray to the nearest hit, or `None` if the ray misses.
/// A ray starting inside the box reports the exit distance.
pub fn ray_aabb_intersect(
    ray_origin: Vec3,
    ray_dir: Vec3,
    aabb_min: Vec3,
    aabb_max: Vec3,
) -> Option<f32> {
    // Near-zero components get a huge inverse so that slab never limits the ray
    let inv = |d: f32| if d.abs() > 1e-10 { 1.0 / d } else { f32::MAX * d.signum() };
    let inv_dir = Vec3::new(inv(ray_dir.x), inv(ray_dir.y), inv(ray_dir.z));

    let t1 = (aabb_min - ray_origin) * inv_dir;
    let t2 = (aabb_max - ray_origin) * inv_dir;

    let t_min = t1.min(t2).max_element();
    let t_max = t1.max(t2).min_element();

    if t_max >= t_min && t_max >= 0.0 {
        if t_min >= 0.0 { Some(t_min) } else { Some(t_max) }
    } else {
        None
    }
}

/// Ray against an oriented box, done in the box's local frame.
pub fn ray_obb_intersect(ray_origin: Vec3, ray_dir: Vec3, obb: &Obb) -> Option<f32> {
    let d = ray_origin - obb.center;
    let local_origin = Vec3::new(d.dot(obb.axes[0]), d.dot(obb.axes[1]), d.dot(obb.axes[2]));
    let local_dir = Vec3::new(
        ray_dir.dot(obb.axes[0]),
        ray_dir.dot(obb.axes[1]),
        ray_dir.dot(obb.axes[2]),
    );
    ray_aabb_intersect(local_origin, local_dir, -obb.half_extents, obb.half_extents)
}
