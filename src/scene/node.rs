use glam::Affine3A;

use crate::scene::transform::Transform;
use crate::scene::{MeshKey, NodeHandle};

/// A scene node: hierarchy links, a TRS transform, and the components the
/// alignment engine reads.
///
/// # Hierarchy
///
/// Nodes form a tree through parent-child relationships:
/// - `parent`: optional handle to the parent node (None for roots)
/// - `children`: list of child node handles
///
/// # Offset override
///
/// A node may carry an `offset_matrix`: an extra matrix layer applied
/// upstream of the authored local transform, so that
/// `world = parent_world * offset * local`. This models placements driven
/// downstream of the authored channels (a rig control behind an offset
/// layer). [`has_offset_override`] reports the capability; callers that
/// want to commit a world-space transform to such a node must go through
/// [`Scene::set_world_trs`] rather than composing local channels
/// themselves.
///
/// [`has_offset_override`]: Node::has_offset_override
/// [`Scene::set_world_trs`]: crate::scene::Scene::set_world_trs
#[derive(Debug, Clone, Default)]
pub struct Node {
    pub(crate) parent: Option<NodeHandle>,
    pub(crate) children: Vec<NodeHandle>,

    /// Transform component (hot data, traversed on every hierarchy update).
    pub transform: Transform,

    /// Triangle geometry attached to this node, if any.
    pub mesh: Option<MeshKey>,

    /// Upstream offset layer. None for plain transforms.
    pub(crate) offset_matrix: Option<Affine3A>,
}

impl Node {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Node with a mesh component attached.
    #[must_use]
    pub fn with_mesh(mesh: MeshKey) -> Self {
        Self {
            mesh: Some(mesh),
            ..Self::default()
        }
    }

    /// Returns the parent node handle, if any.
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<NodeHandle> {
        self.parent
    }

    /// Returns a read-only slice of child node handles.
    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeHandle] {
        &self.children
    }

    /// Whether this node's final placement is driven through an upstream
    /// offset layer rather than its authored local channels alone.
    #[inline]
    #[must_use]
    pub fn has_offset_override(&self) -> bool {
        self.offset_matrix.is_some()
    }

    /// Installs or removes the upstream offset layer.
    pub fn set_offset_matrix(&mut self, offset: Option<Affine3A>) {
        self.offset_matrix = offset;
        self.transform.mark_dirty();
    }

    /// Returns a reference to the world transformation matrix.
    ///
    /// Updated by [`Scene::update_hierarchy`].
    ///
    /// [`Scene::update_hierarchy`]: crate::scene::Scene::update_hierarchy
    #[inline]
    #[must_use]
    pub fn world_matrix(&self) -> &Affine3A {
        &self.transform.world_matrix
    }
}
