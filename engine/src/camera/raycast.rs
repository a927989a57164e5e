//! Raycast Module
//!
//! Pointer rays and the hits they produce. The builder only ever sees a
//! [`SurfaceHit`]; where it came from (ground plane, a piece, a host
//! engine's physics) is up to the caller.

use glam::Vec3;

use crate::world::LayerMask;

/// A half-line with a unit direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Returns `None` when `direction` cannot be normalized.
    pub fn new(origin: Vec3, direction: Vec3) -> Option<Self> {
        let direction = direction.try_normalize()?;
        Some(Self { origin, direction })
    }

    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Distance along the ray to the horizontal plane `y = height`.
    pub fn intersect_plane(&self, height: f32) -> Option<f32> {
        if self.direction.y.abs() < 1e-4 {
            // Parallel to the plane
            return None;
        }
        let t = (height - self.origin.y) / self.direction.y;
        (t >= 0.0).then_some(t)
    }
}

/// What the pointer ray hit this frame.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceHit {
    pub point: Vec3,
    pub normal: Vec3,
    pub distance: f32,
    /// Layer of the surface that was hit
    pub layer: LayerMask,
    /// Free-form surface tag ("Ground", "Foundation", ...)
    pub tag: Option<String>,
}

impl SurfaceHit {
    pub fn new(point: Vec3, layer: LayerMask) -> Self {
        Self {
            point,
            normal: Vec3::Y,
            distance: 0.0,
            layer,
            tag: None,
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn with_normal(mut self, normal: Vec3) -> Self {
        self.normal = normal;
        self
    }
}

/// Convert screen coordinates to a world-space ray
///
/// # Arguments
/// * `screen_x` - Screen X coordinate
/// * `screen_y` - Screen Y coordinate
/// * `screen_width` - Screen width in pixels
/// * `screen_height` - Screen height in pixels
/// * `camera_position` - Camera position in world space
/// * `camera_forward` - Camera forward direction (normalized)
/// * `camera_right` - Camera right direction (normalized)
/// * `camera_fov` - Vertical field of view in radians
///
/// # Returns
/// The pointer ray, or `None` for a degenerate camera basis.
#[allow(clippy::too_many_arguments)]
pub fn screen_to_ray(
    screen_x: f32,
    screen_y: f32,
    screen_width: f32,
    screen_height: f32,
    camera_position: Vec3,
    camera_forward: Vec3,
    camera_right: Vec3,
    camera_fov: f32,
) -> Option<Ray> {
    if screen_width <= 0.0 || screen_height <= 0.0 {
        return None;
    }
    // Normalized device coordinates (-1 to 1), Y flipped
    let ndc_x = (2.0 * screen_x / screen_width) - 1.0;
    let ndc_y = 1.0 - (2.0 * screen_y / screen_height);

    let up = camera_right.cross(camera_forward).try_normalize()?;
    let aspect = screen_width / screen_height;
    let half_fov_tan = (camera_fov / 2.0).tan();

    let dir = camera_forward + camera_right * ndc_x * half_fov_tan * aspect + up * ndc_y * half_fov_tan;
    Ray::new(camera_position, dir)
}

/// Cast against the ground plane `y = height`, up to `max_distance`.
pub fn raycast_ground(ray: &Ray, height: f32, max_distance: f32) -> Option<SurfaceHit> {
    let t = ray.intersect_plane(height)?;
    if t > max_distance {
        return None;
    }
    Some(SurfaceHit {
        point: ray.at(t),
        normal: Vec3::Y,
        distance: t,
        layer: LayerMask::GROUND,
        tag: Some("Ground".to_string()),
    })
}
