//! Single-ray intersection queries.
//!
//! The engine only ever needs one ray at a time: the downward cast from a
//! target onto the reference surface, and the secondary upward cast against
//! the target's own geometry when resolving the extent offset. Both go
//! through [`SurfaceMesh::intersect`], which walks the triangle list with
//! Möller–Trumbore and keeps the closest hit by signed ray parameter —
//! required because the triangle list carries no spatial ordering.
//!
//! [`SurfaceMesh::intersect`]: crate::scene::SurfaceMesh::intersect

use glam::Vec3;

/// Default numerical tolerance for intersection queries.
pub const DEFAULT_TOLERANCE: f32 = 1e-10;

/// Back-offset applied to pipeline ray origins, in units of the ray
/// direction.
///
/// An object already resting on the surface casts from a point that lies
/// exactly on the geometry, where rounding can push the intersection
/// parameter just below zero and turn a contact into a miss. Starting the
/// cast slightly behind the origin keeps the ray line identical but leaves
/// the contact comfortably in front of it.
pub const CONTACT_BIAS: f32 = 1e-3;

/// A world-space ray. `direction` need not be normalized; the hit
/// parameter `t` is measured in units of `direction`.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    #[must_use]
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Point at parameter `t` along the ray.
    #[inline]
    #[must_use]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Result of a successful intersection query. Valid for a single query;
/// the scene may change before the next one.
#[derive(Debug, Clone, Copy)]
pub struct RayHit {
    /// Hit point, world space.
    pub point: Vec3,
    /// Unit surface normal at the hit, world space.
    pub normal: Vec3,
    /// Index of the intersected face in the surface's triangle list.
    pub face: u32,
    /// Signed ray parameter of the hit.
    pub t: f32,
}

/// Möller–Trumbore ray/triangle intersection.
///
/// Returns the signed ray parameter, or `None` when the ray is parallel to
/// the triangle plane (within `tolerance`), the hit lies outside the
/// triangle, or the hit is behind the origin. `t == 0` is accepted so a ray
/// starting exactly on the surface still reports the contact.
pub(crate) fn ray_triangle(
    origin: Vec3,
    direction: Vec3,
    v0: Vec3,
    v1: Vec3,
    v2: Vec3,
    tolerance: f32,
) -> Option<f32> {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;

    let h = direction.cross(edge2);
    let det = edge1.dot(h);
    if det.abs() <= tolerance {
        return None;
    }

    let inv_det = 1.0 / det;
    let s = origin - v0;
    let u = s.dot(h) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = direction.dot(q) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = edge2.dot(q) * inv_det;
    (t >= -tolerance).then_some(t)
}

#[cfg(test)]
mod tests {
    use super::*;

    const V0: Vec3 = Vec3::new(-1.0, 0.0, -1.0);
    const V1: Vec3 = Vec3::new(1.0, 0.0, -1.0);
    const V2: Vec3 = Vec3::new(0.0, 0.0, 1.0);

    #[test]
    fn hits_triangle_from_above() {
        let t = ray_triangle(Vec3::new(0.0, 2.0, 0.0), Vec3::NEG_Y, V0, V1, V2, DEFAULT_TOLERANCE);
        assert!((t.unwrap() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn respects_unnormalized_direction() {
        // Direction of length 2: the same hit sits at half the parameter.
        let t = ray_triangle(
            Vec3::new(0.0, 2.0, 0.0),
            Vec3::new(0.0, -2.0, 0.0),
            V0,
            V1,
            V2,
            DEFAULT_TOLERANCE,
        );
        assert!((t.unwrap() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn misses_outside_triangle() {
        let t = ray_triangle(Vec3::new(5.0, 2.0, 0.0), Vec3::NEG_Y, V0, V1, V2, DEFAULT_TOLERANCE);
        assert!(t.is_none());
    }

    #[test]
    fn misses_when_parallel() {
        let t = ray_triangle(Vec3::new(0.0, 2.0, 0.0), Vec3::X, V0, V1, V2, DEFAULT_TOLERANCE);
        assert!(t.is_none());
    }

    #[test]
    fn misses_behind_origin() {
        let t = ray_triangle(Vec3::new(0.0, -2.0, 0.0), Vec3::NEG_Y, V0, V1, V2, DEFAULT_TOLERANCE);
        assert!(t.is_none());
    }

    #[test]
    fn accepts_origin_on_surface() {
        let t = ray_triangle(Vec3::new(0.0, 0.0, 0.0), Vec3::NEG_Y, V0, V1, V2, DEFAULT_TOLERANCE);
        assert!(t.unwrap().abs() <= DEFAULT_TOLERANCE);
    }
}
