//! Scene graph module.
//!
//! Manages the hierarchy and the components the alignment engine reads:
//! - Node: scene node (parent/child links, transform, mesh, offset layer)
//! - Transform: TRS component with cached matrices and dirty checking
//! - Scene: container, world-matrix pipeline, query/commit surface
//! - SurfaceMesh: indexed triangle geometry for intersection queries

pub mod node;
pub mod scene;
pub mod surface;
pub mod transform;

pub use node::Node;
pub use scene::{Scene, Space};
pub use surface::{BoundingBox, SurfaceMesh};
pub use transform::Transform;

use slotmap::new_key_type;

new_key_type! {
    /// Handle addressing a [`Node`] in a [`Scene`].
    pub struct NodeHandle;
    /// Handle addressing a [`SurfaceMesh`] in a [`Scene`]'s mesh pool.
    pub struct MeshKey;
}
