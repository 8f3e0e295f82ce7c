#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod errors;
pub mod math;
pub mod raycast;
pub mod scene;
pub mod snap;

pub use errors::{Result, TalusError};
pub use raycast::{Ray, RayHit};
pub use scene::{BoundingBox, MeshKey, Node, NodeHandle, Scene, Space, SurfaceMesh, Transform};
pub use snap::{
    AlignFlags, AlignmentRequest, AlignmentResult, GroundSnapper, SnapOptions, align_one,
    build_frame, resolve_offset,
};
