//! Vector and basis primitives shared by the alignment pipeline.
//!
//! Everything here is a pure function over glam types. The frame builder
//! and transform writer compose these; nothing in this module touches the
//! scene.

use glam::{Mat3, Quat, Vec3};
use std::f32::consts::PI;

use crate::errors::{Result, TalusError};

/// Magnitude below which a vector cannot be normalized.
pub const DEGENERATE_EPS: f32 = 1e-10;

/// Two unit vectors with |dot| above `1 - PARALLEL_EPS` are treated as parallel.
pub const PARALLEL_EPS: f32 = 1e-6;

/// Normalizes `v`, failing with [`TalusError::DegenerateVector`] when the
/// magnitude is at or below [`DEGENERATE_EPS`].
///
/// `context` names the quantity being normalized and ends up in the error
/// message.
pub fn normalize_checked(v: Vec3, context: &'static str) -> Result<Vec3> {
    let len = v.length();
    if !len.is_finite() || len <= DEGENERATE_EPS {
        return Err(TalusError::DegenerateVector(context));
    }
    Ok(v / len)
}

/// Deterministic substitute side axis for a degenerate cross product:
/// world X, or world Z when `v` is already aligned with X.
#[inline]
#[must_use]
pub fn fallback_side_axis(v: Vec3) -> Vec3 {
    if v.x.abs() > 1.0 - PARALLEL_EPS {
        Vec3::Z
    } else {
        Vec3::X
    }
}

/// Minimal rotation mapping `from` onto `to`.
///
/// Identity when the vectors already coincide. The anti-parallel case has
/// no unique axis; a perpendicular is chosen deterministically through
/// [`fallback_side_axis`] so repeated calls on the same input agree.
pub fn quat_between(from: Vec3, to: Vec3) -> Result<Quat> {
    let from = normalize_checked(from, "rotation source vector")?;
    let to = normalize_checked(to, "rotation target vector")?;

    let dot = from.dot(to).clamp(-1.0, 1.0);
    if dot > 1.0 - PARALLEL_EPS {
        return Ok(Quat::IDENTITY);
    }
    if dot < -1.0 + PARALLEL_EPS {
        let axis = normalize_checked(from.cross(fallback_side_axis(from)), "anti-parallel rotation axis")?;
        return Ok(Quat::from_axis_angle(axis, PI));
    }
    Ok(Quat::from_rotation_arc(from, to))
}

/// Heading of a rotation: the twist factor of its swing-twist
/// decomposition about world +Y, discarding pitch and roll.
///
/// The twist is the projection of the quaternion onto the Y-rotation
/// subspace, renormalized. Composing a swing whose axis is horizontal on
/// top of a heading leaves the twist unchanged, so extracting the heading
/// after a previous surface alignment recovers the original heading
/// exactly — repeated alignments cannot accumulate drift.
///
/// A half-turn about a horizontal axis (w and y both zero) has no defined
/// heading; identity is returned so equal inputs keep producing equal
/// outputs.
#[must_use]
pub fn heading_quat(rotation: Quat) -> Quat {
    let twist = Quat::from_xyzw(0.0, rotation.y, 0.0, rotation.w);
    if twist.length_squared() <= DEGENERATE_EPS {
        return Quat::IDENTITY;
    }
    twist.normalize()
}

/// Builds a right-handed orthonormal basis with columns X = side, Y = up,
/// Z = forward.
///
/// `side` is recomputed as `up × forward` and `up` as `forward × side`, so
/// the result is orthonormal even when the inputs have drifted. When `up`
/// and `forward` are parallel the side axis is undefined; the deterministic
/// [`fallback_side_axis`] is projected perpendicular to `forward` instead.
///
/// Fails with [`TalusError::DegenerateBasis`] only if the fallback axis is
/// also unusable.
pub fn orthonormal_basis(forward: Vec3, up: Vec3) -> Result<Mat3> {
    let forward = normalize_checked(forward, "basis forward axis")?;
    let up = normalize_checked(up, "basis up axis")?;

    let mut side = up.cross(forward);
    if side.length() <= DEGENERATE_EPS {
        let candidate = fallback_side_axis(forward);
        log::warn!("up and forward axes are parallel; substituting {candidate} as side axis");
        side = candidate - forward * candidate.dot(forward);
        if side.length() <= DEGENERATE_EPS {
            return Err(TalusError::DegenerateBasis);
        }
    }
    let side = side.normalize();
    let up = forward.cross(side).normalize();

    Ok(Mat3::from_cols(side, up, forward))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quat_between_identity_on_coincident() {
        let q = quat_between(Vec3::Y, Vec3::Y).unwrap();
        assert_eq!(q, Quat::IDENTITY);
    }

    #[test]
    fn quat_between_maps_from_onto_to() {
        let q = quat_between(Vec3::Y, Vec3::X).unwrap();
        assert!((q * Vec3::Y - Vec3::X).length() < 1e-6);
    }

    #[test]
    fn quat_between_anti_parallel_is_half_turn() {
        let q = quat_between(Vec3::Y, -Vec3::Y).unwrap();
        assert!((q * Vec3::Y + Vec3::Y).length() < 1e-6);
        // Deterministic: a second call must produce the same quaternion.
        let q2 = quat_between(Vec3::Y, -Vec3::Y).unwrap();
        assert_eq!(q, q2);
    }

    #[test]
    fn quat_between_rejects_zero_vector() {
        assert!(matches!(
            quat_between(Vec3::ZERO, Vec3::Y),
            Err(TalusError::DegenerateVector(_))
        ));
    }

    #[test]
    fn heading_of_pure_yaw_is_the_yaw() {
        let yaw = Quat::from_rotation_y(0.8);
        assert!(heading_quat(yaw).angle_between(yaw) < 1e-6);
    }

    #[test]
    fn heading_survives_horizontal_swing() {
        let yaw = Quat::from_rotation_y(0.8);
        let swing = Quat::from_rotation_x(0.5);
        assert!(heading_quat(swing * yaw).angle_between(yaw) < 1e-6);
    }

    #[test]
    fn heading_of_pitch_is_identity() {
        let pitch = Quat::from_rotation_x(std::f32::consts::FRAC_PI_2);
        assert!(heading_quat(pitch).angle_between(Quat::IDENTITY) < 1e-6);
    }

    #[test]
    fn heading_of_horizontal_half_turn_is_identity() {
        let flip = Quat::from_rotation_x(PI);
        assert_eq!(heading_quat(flip), Quat::IDENTITY);
    }

    #[test]
    fn basis_is_right_handed() {
        let m = orthonormal_basis(Vec3::Z, Vec3::Y).unwrap();
        assert!((m.x_axis.cross(m.y_axis) - m.z_axis).length() < 1e-6);
    }

    #[test]
    fn basis_parallel_axes_fall_back() {
        let m = orthonormal_basis(Vec3::Y, Vec3::Y).unwrap();
        assert!((m.x_axis.length() - 1.0).abs() < 1e-6);
        assert!(m.x_axis.is_finite());
    }
}
