//! The surface-alignment engine.
//!
//! One pass per target, no state across calls:
//! raycast onto the reference surface → build a heading-preserving rotation
//! frame from the hit normal → resolve the extent offset so the target's
//! underside rests on the surface → commit position and rotation, honoring
//! parent transforms and offset overrides.

pub mod frame;
pub mod offset;
pub mod snapper;
pub mod writer;

pub use frame::build_frame;
pub use offset::resolve_offset;
pub use snapper::{
    AlignFlags, AlignmentRequest, AlignmentResult, GroundSnapper, SnapOptions, align_one,
};
pub use writer::apply;
