//! Extent offset resolver.
//!
//! A hit point puts the object's pivot on the surface; unless the pivot
//! happens to sit at the object's lowest point, the geometry ends up
//! intersecting the ground. The resolver measures how far the pivot sits
//! above the object's own underside and returns that as a vertical
//! displacement to add to the hit point.

use glam::Vec3;

use crate::raycast::{self, Ray};
use crate::scene::{NodeHandle, Scene, Space};

/// Resolves the vertical displacement to add to `hit_point` before writing
/// the target's position.
///
/// With `use_bounding_box` set, a secondary ray is cast from the hit point
/// straight up against the target's own geometry; the offset is the
/// vertical distance between the target's pivot and that secondary hit.
/// Measuring the underside with a ray is preferred over the static
/// bounding-box minimum because a rotated object's lowest point moves with
/// its orientation. When the secondary ray misses (the object does not
/// overlap the projected column), the world-space bounding-box minimum is
/// used instead.
///
/// `user_offset` is added on top in every mode. Targets without geometry
/// (curves, locators) have no extent to rest on the surface and receive
/// the user offset alone.
#[must_use]
pub fn resolve_offset(
    scene: &Scene,
    target: NodeHandle,
    hit_point: Vec3,
    use_bounding_box: bool,
    user_offset: f32,
) -> Vec3 {
    let user = Vec3::Y * user_offset;
    if !use_bounding_box {
        return user;
    }

    let Some(node) = scene.get_node(target) else {
        return user;
    };
    let Some(mesh) = node.mesh.and_then(|key| scene.meshes.get(key)) else {
        // Non-volumetric target: bounding offset is not applicable.
        return user;
    };
    if mesh.is_empty() {
        return user;
    }

    let world = node.transform.world_matrix;
    let pivot = Vec3::from(world.translation);

    // The probe starts just below the hit so an underside already touching
    // the surface still registers.
    let probe = Ray::new(hit_point - Vec3::Y * raycast::CONTACT_BIAS, Vec3::Y);
    if let Some(hit) = mesh.intersect(&world, &probe, raycast::DEFAULT_TOLERANCE) {
        return Vec3::Y * (pivot.y - hit.point.y) + user;
    }

    // Column miss: the object does not overlap the vertical through the hit
    // point. Fall back to the bounding-box minimum.
    match scene.bounding_box_min(target, Space::World) {
        Some(min) => Vec3::Y * (pivot.y - min.y) + user,
        None => user,
    }
}
