//! Transform writer: commits a computed world-space placement to a node.

use glam::{Affine3A, Quat, Vec3};

use crate::errors::Result;
use crate::scene::{NodeHandle, Scene};
use crate::snap::AlignFlags;

/// Commits `position`/`rotation` (world space) to `target`, gated per
/// channel by `align`. Returns the world-space position and rotation in
/// effect after the write.
///
/// Three paths:
/// - both channels gated off: exact no-op, the node is not touched;
/// - the target carries an offset override: the placement is written in
///   world space through [`Scene::set_world_trs`], which resolves the full
///   upstream chain — composing the authored local channels against the
///   parent matrix here would apply the offset layer a second time;
/// - plain transform: the desired world placement is converted into the
///   parent's space by the parent's inverse world matrix and the gated
///   local channels are written (for roots the parent matrix is identity,
///   so local equals world).
///
/// Scale is never read into the composition from the write side and never
/// written. The commit is a single transform write per target, followed by
/// a subtree world-matrix refresh so the mutation is observable by
/// subsequent targets in the same batch.
pub fn apply(
    scene: &mut Scene,
    target: NodeHandle,
    position: Vec3,
    rotation: Quat,
    align: AlignFlags,
) -> Result<(Vec3, Quat)> {
    let (current_position, current_rotation, world_scale) = scene.world_trs(target)?;

    if align.is_empty() {
        return Ok((current_position, current_rotation));
    }

    let new_position = align.contains(AlignFlags::POSITION).then_some(position);
    let new_rotation = align.contains(AlignFlags::ROTATION).then_some(rotation);

    if scene.has_offset_override(target) {
        scene.set_world_trs(target, new_position, new_rotation)?;
    } else {
        let desired = Affine3A::from_scale_rotation_translation(
            world_scale,
            new_rotation.unwrap_or(current_rotation),
            new_position.unwrap_or(current_position),
        );
        let local = scene.parent_world_matrix(target).inverse() * desired;
        let (_, local_rotation, local_position) = local.to_scale_rotation_translation();
        scene.set_local_trs(
            target,
            new_position.map(|_| local_position),
            new_rotation.map(|_| local_rotation),
        )?;
    }

    let (applied_position, applied_rotation, _) = scene.world_trs(target)?;
    Ok((applied_position, applied_rotation))
}
