//! Frame builder: derives the rotation that rests an object on a surface.
//!
//! The strategy is heading-preserving quaternion alignment: the object's up
//! axis is driven onto the surface normal while its rotation about the
//! world vertical (its heading) is kept. The alternative — re-aiming the
//! forward axis along the slope — is intentionally not implemented; only
//! the up axis is driven.

use glam::{Quat, Vec3};

use crate::errors::Result;
use crate::math;

/// Builds the world-space rotation aligning an object's up axis to
/// `surface_normal`.
///
/// With `heading_only` set, the object's pitch and roll are discarded first
/// and only its heading (rotation about world +Y) survives into the
/// reference orientation. Without accumulated tilt in the reference, a
/// second alignment against the same surface reproduces the same frame
/// instead of compounding. With `heading_only` clear, the full current
/// orientation (rebuilt as an orthonormal basis from `object_forward` and
/// `object_up`) is kept and tilted onto the normal.
///
/// Degenerate inputs — a forward axis parallel to the vertical or to the up
/// axis — fall back to a deterministic substitute axis, so equal inputs
/// always produce equal frames. The result is a unit quaternion
/// renormalized after composition.
pub fn build_frame(
    object_forward: Vec3,
    object_up: Vec3,
    heading_only: bool,
    surface_normal: Vec3,
) -> Result<Quat> {
    let normal = math::normalize_checked(surface_normal, "surface normal")?;

    // Rebuild the object's orientation as an orthonormal basis; drift from
    // previous compositions is corrected here.
    let orientation = Quat::from_mat3(&math::orthonormal_basis(object_forward, object_up)?);
    let reference = if heading_only {
        math::heading_quat(orientation)
    } else {
        orientation
    };

    // Minimal rotation taking the world vertical onto the surface normal,
    // applied on top of the reference orientation.
    let tilt = math::quat_between(Vec3::Y, normal)?;

    Ok((tilt * reference).normalize())
}
