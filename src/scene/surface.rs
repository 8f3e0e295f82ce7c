use glam::{Affine3A, Vec3};
use smallvec::SmallVec;

use crate::raycast::{self, Ray, RayHit};

// ============================================================================
// Bounding box
// ============================================================================

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    /// Smallest box enclosing `points`. Empty input yields the default box.
    #[must_use]
    pub fn from_points<'a, I: IntoIterator<Item = &'a Vec3>>(points: I) -> Self {
        let mut iter = points.into_iter();
        let Some(&first) = iter.next() else {
            return Self::default();
        };
        let mut bb = Self { min: first, max: first };
        for &p in iter {
            bb.min = bb.min.min(p);
            bb.max = bb.max.max(p);
        }
        bb
    }

    #[must_use]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    #[must_use]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Box enclosing this box's 8 corners transformed by `mat`. Not minimal
    /// for the transformed contents, but tracks orientation.
    #[must_use]
    pub fn transformed(&self, mat: &Affine3A) -> Self {
        let mut corners = [Vec3::ZERO; 8];
        for (i, corner) in corners.iter_mut().enumerate() {
            let pick = |bit: usize, min: f32, max: f32| if i >> bit & 1 == 0 { min } else { max };
            *corner = mat.transform_point3(Vec3::new(
                pick(0, self.min.x, self.max.x),
                pick(1, self.min.y, self.max.y),
                pick(2, self.min.z, self.max.z),
            ));
        }
        Self::from_points(corners.iter())
    }
}

// ============================================================================
// Surface mesh
// ============================================================================

/// An indexed triangle mesh in object space.
///
/// This is the only geometry representation the engine needs: the reference
/// surface is intersected by the primary downward ray, and a target's own
/// mesh by the secondary upward ray of the extent offset. Vertex positions
/// are stored in object space; queries take the owning node's world matrix.
#[derive(Debug, Clone)]
pub struct SurfaceMesh {
    positions: Vec<Vec3>,
    faces: Vec<[u32; 3]>,
    bounds: BoundingBox,
}

impl SurfaceMesh {
    /// Builds a mesh from vertex positions and triangle indices. Faces with
    /// out-of-range indices are dropped with a warning.
    #[must_use]
    pub fn new(positions: Vec<Vec3>, faces: Vec<[u32; 3]>) -> Self {
        let vertex_count = positions.len() as u32;
        let valid: Vec<[u32; 3]> = faces
            .into_iter()
            .filter(|f| {
                let ok = f.iter().all(|&i| i < vertex_count);
                if !ok {
                    log::warn!("Dropping face {f:?}: index out of range (vertex count {vertex_count})");
                }
                ok
            })
            .collect();
        let bounds = BoundingBox::from_points(positions.iter());
        Self { positions, faces: valid, bounds }
    }

    /// Horizontal quad in the XZ plane, centered at the origin, spanning
    /// `±half_extent`, facing +Y.
    #[must_use]
    pub fn plane(half_extent: f32) -> Self {
        let e = half_extent;
        Self::new(
            vec![
                Vec3::new(-e, 0.0, -e),
                Vec3::new(e, 0.0, -e),
                Vec3::new(e, 0.0, e),
                Vec3::new(-e, 0.0, e),
            ],
            vec![[0, 2, 1], [0, 3, 2]],
        )
    }

    /// Axis-aligned box between `min` and `max`, faces wound outward.
    #[must_use]
    pub fn cuboid(min: Vec3, max: Vec3) -> Self {
        let (n, x) = (min, max);
        let positions = vec![
            Vec3::new(n.x, n.y, n.z),
            Vec3::new(x.x, n.y, n.z),
            Vec3::new(x.x, x.y, n.z),
            Vec3::new(n.x, x.y, n.z),
            Vec3::new(n.x, n.y, x.z),
            Vec3::new(x.x, n.y, x.z),
            Vec3::new(x.x, x.y, x.z),
            Vec3::new(n.x, x.y, x.z),
        ];
        let faces = vec![
            // -Z
            [0, 2, 1],
            [0, 3, 2],
            // +Z
            [4, 5, 6],
            [4, 6, 7],
            // -X
            [0, 4, 7],
            [0, 7, 3],
            // +X
            [1, 2, 6],
            [1, 6, 5],
            // -Y
            [0, 1, 5],
            [0, 5, 4],
            // +Y
            [3, 7, 6],
            [3, 6, 2],
        ];
        Self::new(positions, faces)
    }

    #[inline]
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// A mesh with no triangles has no renderable geometry.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Object-space bounding box over all vertices.
    #[inline]
    #[must_use]
    pub fn bounds(&self) -> &BoundingBox {
        &self.bounds
    }

    /// Object-space unit normal of face `face`, or `None` for an invalid
    /// index or a degenerate triangle.
    #[must_use]
    pub fn face_normal(&self, face: u32) -> Option<Vec3> {
        let [a, b, c] = *self.faces.get(face as usize)?;
        let v0 = self.positions[a as usize];
        let v1 = self.positions[b as usize];
        let v2 = self.positions[c as usize];
        (v1 - v0).cross(v2 - v0).try_normalize()
    }

    /// Intersects a world-space ray with this mesh placed by `world`.
    ///
    /// The ray is taken into object space for the triangle tests; an affine
    /// map preserves the ray parameter, so candidate hits from the
    /// unordered triangle list are compared by signed `t` directly and the
    /// closest one wins. The returned hit point and normal are world space,
    /// the normal renormalized after the transform.
    #[must_use]
    pub fn intersect(&self, world: &Affine3A, ray: &Ray, tolerance: f32) -> Option<RayHit> {
        let inv = world.inverse();
        let origin = inv.transform_point3(ray.origin);
        let direction = inv.transform_vector3(ray.direction);

        let mut candidates: SmallVec<[(f32, u32); 4]> = SmallVec::new();
        for (i, &[a, b, c]) in self.faces.iter().enumerate() {
            let v0 = self.positions[a as usize];
            let v1 = self.positions[b as usize];
            let v2 = self.positions[c as usize];
            if let Some(t) = raycast::ray_triangle(origin, direction, v0, v1, v2, tolerance) {
                candidates.push((t, i as u32));
            }
        }

        let (t, face) = candidates.into_iter().min_by(|a, b| a.0.total_cmp(&b.0))?;
        let normal = world.transform_vector3(self.face_normal(face)?).try_normalize()?;
        Some(RayHit { point: ray.at(t), normal, face, t })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raycast::DEFAULT_TOLERANCE;

    #[test]
    fn plane_faces_up() {
        let plane = SurfaceMesh::plane(1.0);
        assert_eq!(plane.face_count(), 2);
        for face in 0..2 {
            let n = plane.face_normal(face).unwrap();
            assert!((n - Vec3::Y).length() < 1e-6);
        }
    }

    #[test]
    fn cuboid_normals_point_outward() {
        let mesh = SurfaceMesh::cuboid(Vec3::splat(-1.0), Vec3::splat(1.0));
        let center = mesh.bounds().center();
        for face in 0..mesh.face_count() as u32 {
            let [a, _, _] = mesh.faces[face as usize];
            let on_face = mesh.positions[a as usize];
            let n = mesh.face_normal(face).unwrap();
            assert!(n.dot(on_face - center) > 0.0, "face {face} points inward");
        }
    }

    #[test]
    fn invalid_faces_are_dropped() {
        let mesh = SurfaceMesh::new(vec![Vec3::ZERO, Vec3::X, Vec3::Y], vec![[0, 1, 2], [0, 1, 9]]);
        assert_eq!(mesh.face_count(), 1);
    }

    #[test]
    fn transformed_bounds_track_translation() {
        let bb = BoundingBox { min: Vec3::splat(-1.0), max: Vec3::splat(1.0) };
        let moved = bb.transformed(&Affine3A::from_translation(Vec3::new(0.0, 5.0, 0.0)));
        assert!((moved.min.y - 4.0).abs() < 1e-6);
        assert!((moved.max.y - 6.0).abs() < 1e-6);
        // Translation leaves the extent itself unchanged.
        assert!((moved.size() - bb.size()).length() < 1e-6);
    }

    #[test]
    fn intersect_scaled_surface_keeps_world_point() {
        let plane = SurfaceMesh::plane(1.0);
        // Scaled 10x: world extent ±10.
        let world = Affine3A::from_scale(Vec3::splat(10.0));
        let ray = Ray::new(Vec3::new(5.0, 3.0, 5.0), Vec3::NEG_Y);
        let hit = plane.intersect(&world, &ray, DEFAULT_TOLERANCE).unwrap();
        assert!((hit.point - Vec3::new(5.0, 0.0, 5.0)).length() < 1e-5);
        assert!((hit.normal - Vec3::Y).length() < 1e-6);
        assert!((hit.t - 3.0).abs() < 1e-5);
    }
}
