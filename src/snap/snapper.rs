//! Per-target alignment pipeline and the batch orchestrator.

use bitflags::bitflags;
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::errors::{Result, TalusError};
use crate::raycast::{self, Ray};
use crate::scene::{NodeHandle, Scene};
use crate::snap::{frame, offset, writer};

bitflags! {
    /// Which transform channels an alignment is allowed to touch.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct AlignFlags: u32 {
        const ROTATION = 1 << 0;
        const POSITION = 1 << 1;
    }
}

/// Caller configuration for one alignment, minus the object handles.
///
/// Serializable so tool presets can be stored and restored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapOptions {
    /// Channels to write. Both by default.
    pub align: AlignFlags,
    /// Measure the target's own underside to rest it on the surface,
    /// instead of using `user_offset` alone.
    pub use_bounding_box: bool,
    /// Extra vertical offset, added in every mode.
    pub user_offset: f32,
    /// Discard the target's accumulated pitch/roll and keep only its
    /// heading when building the new frame.
    pub heading_only: bool,
    /// Ray direction of the primary cast. Straight down by default, which
    /// covers the overwhelming majority of ground-snapping setups.
    pub ray_direction: Vec3,
    /// Numerical tolerance for intersection queries.
    pub tolerance: f32,
}

impl Default for SnapOptions {
    fn default() -> Self {
        Self {
            align: AlignFlags::ROTATION | AlignFlags::POSITION,
            use_bounding_box: true,
            user_offset: 0.0,
            heading_only: true,
            ray_direction: Vec3::NEG_Y,
            tolerance: raycast::DEFAULT_TOLERANCE,
        }
    }
}

/// One alignment invocation: a target, a reference surface, and options.
/// Built per call; never persisted.
#[derive(Debug, Clone, Copy)]
pub struct AlignmentRequest {
    pub target: NodeHandle,
    pub reference_surface: NodeHandle,
    pub options: SnapOptions,
}

/// Outcome of one target's alignment.
#[derive(Debug, Clone)]
pub struct AlignmentResult {
    /// World-space position in effect after the pass.
    pub applied_position: Vec3,
    /// World-space rotation in effect after the pass.
    pub applied_rotation: Quat,
    /// Whether the target was aligned.
    pub success: bool,
    /// The per-target failure, when `success` is false.
    pub failure: Option<TalusError>,
}

impl AlignmentResult {
    fn applied(position: Vec3, rotation: Quat) -> Self {
        Self {
            applied_position: position,
            applied_rotation: rotation,
            success: true,
            failure: None,
        }
    }

    fn failed(position: Vec3, rotation: Quat, failure: TalusError) -> Self {
        Self {
            applied_position: position,
            applied_rotation: rotation,
            success: false,
            failure: Some(failure),
        }
    }
}

/// Runs the alignment pipeline for a single target:
/// raycast → build frame → resolve offset → write transform.
///
/// Geometric failures are recorded in the returned result, never raised;
/// the scene is left untouched for a failed target. World matrices are
/// refreshed up front — a previous target's write (or any other edit) may
/// have moved this target since the last pass.
pub fn align_one(scene: &mut Scene, request: &AlignmentRequest) -> AlignmentResult {
    scene.update_hierarchy();

    let opts = &request.options;
    let (current_position, current_rotation, _) = match scene.world_trs(request.target) {
        Ok(trs) => trs,
        Err(e) => return AlignmentResult::failed(Vec3::ZERO, Quat::IDENTITY, e),
    };

    // Cast from slightly behind the pivot so a target already in contact
    // with the surface still registers the hit.
    let back_bias = opts.ray_direction.normalize_or_zero() * raycast::CONTACT_BIAS;
    let ray = Ray::new(current_position - back_bias, opts.ray_direction);
    let hit = match scene.intersect(request.reference_surface, &ray, opts.tolerance) {
        Ok(Some(hit)) => hit,
        Ok(None) => {
            return AlignmentResult::failed(current_position, current_rotation, TalusError::NoIntersection);
        }
        Err(e) => return AlignmentResult::failed(current_position, current_rotation, e),
    };

    // Object axes from the current world matrix: X = side, Y = up, Z = forward.
    let world = match scene.world_matrix(request.target) {
        Ok(m) => m,
        Err(e) => return AlignmentResult::failed(current_position, current_rotation, e),
    };
    let rotation = match frame::build_frame(
        world.matrix3.z_axis.into(),
        world.matrix3.y_axis.into(),
        opts.heading_only,
        hit.normal,
    ) {
        Ok(q) => q,
        Err(e) => return AlignmentResult::failed(current_position, current_rotation, e),
    };

    let displacement = offset::resolve_offset(
        scene,
        request.target,
        hit.point,
        opts.use_bounding_box,
        opts.user_offset,
    );

    match writer::apply(scene, request.target, hit.point + displacement, rotation, opts.align) {
        Ok((position, rotation)) => AlignmentResult::applied(position, rotation),
        Err(e) => AlignmentResult::failed(current_position, current_rotation, e),
    }
}

/// Snaps selected objects onto a reference surface underneath them.
///
/// Holds the reference surface and the options between invocations; every
/// alignment re-queries the scene fresh.
#[derive(Debug, Default)]
pub struct GroundSnapper {
    surface: Option<NodeHandle>,
    pub options: SnapOptions,
}

impl GroundSnapper {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_options(options: SnapOptions) -> Self {
        Self { surface: None, options }
    }

    /// Sets the reference surface, validating that it carries geometry.
    pub fn set_surface(&mut self, scene: &Scene, surface: NodeHandle) -> Result<()> {
        scene.validate_surface(surface)?;
        self.surface = Some(surface);
        Ok(())
    }

    #[must_use]
    pub fn surface(&self) -> Option<NodeHandle> {
        self.surface
    }

    /// Aligns a single target. Configuration errors (no or invalid
    /// surface) are returned as `Err`; geometric failures end up in the
    /// result.
    pub fn align(&self, scene: &mut Scene, target: NodeHandle) -> Result<AlignmentResult> {
        let mut results = self.align_batch(scene, &[target])?;
        Ok(results.remove(0))
    }

    /// Aligns every target in caller order, one result per target.
    ///
    /// Configuration errors abort before any scene mutation: an empty
    /// selection is `NoSelection`, and the surface is re-validated against
    /// the current scene even if `set_surface` accepted it earlier. After
    /// that point failures are per-target and the batch always runs to the
    /// end (partial-failure semantics).
    pub fn align_batch(&self, scene: &mut Scene, targets: &[NodeHandle]) -> Result<Vec<AlignmentResult>> {
        if targets.is_empty() {
            return Err(TalusError::NoSelection);
        }
        let surface = self
            .surface
            .ok_or_else(|| TalusError::InvalidSurface("no reference surface set".into()))?;
        scene.validate_surface(surface)?;

        let results = targets
            .iter()
            .map(|&target| {
                let request = AlignmentRequest {
                    target,
                    reference_surface: surface,
                    options: self.options,
                };
                let result = align_one(scene, &request);
                match &result.failure {
                    Some(failure) => log::debug!("target {target:?} not aligned: {failure}"),
                    None => log::debug!("target {target:?} aligned at {}", result.applied_position),
                }
                result
            })
            .collect();
        Ok(results)
    }
}
