use glam::{Affine3A, Quat, Vec3};
use slotmap::SlotMap;

use crate::errors::{Result, TalusError};
use crate::raycast::{Ray, RayHit};
use crate::scene::node::Node;
use crate::scene::surface::SurfaceMesh;
use crate::scene::{MeshKey, NodeHandle};

/// Coordinate space selector for bounding-box queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Space {
    /// The node's own object space.
    Object,
    /// World space, via the node's current world matrix.
    World,
}

/// Scene graph container.
///
/// Pure data layer: a slotmap arena of nodes, the root list, and the mesh
/// pool. Also carries the query/commit surface the alignment engine
/// consumes — world-space reads, parent matrices, intersection queries and
/// world-space transform writes — so the engine itself never walks the
/// hierarchy.
pub struct Scene {
    pub nodes: SlotMap<NodeHandle, Node>,
    pub root_nodes: Vec<NodeHandle>,
    pub meshes: SlotMap<MeshKey, SurfaceMesh>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            root_nodes: Vec::new(),
            meshes: SlotMap::with_key(),
        }
    }

    // ========================================================================
    // Construction
    // ========================================================================

    /// Adds a node to the scene as a root.
    pub fn add_node(&mut self, node: Node) -> NodeHandle {
        let handle = self.nodes.insert(node);
        self.root_nodes.push(handle);
        handle
    }

    /// Adds a node as a child of `parent`.
    pub fn add_child(&mut self, node: Node, parent: NodeHandle) -> NodeHandle {
        let handle = self.nodes.insert(node);
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.push(handle);
            if let Some(c) = self.nodes.get_mut(handle) {
                c.parent = Some(parent);
            }
        } else {
            log::error!("Parent node not found; adding as root instead");
            self.root_nodes.push(handle);
        }
        handle
    }

    /// Registers a mesh in the pool.
    pub fn add_mesh(&mut self, mesh: SurfaceMesh) -> MeshKey {
        self.meshes.insert(mesh)
    }

    /// Re-parents `child` under `parent`.
    pub fn attach(&mut self, child: NodeHandle, parent: NodeHandle) {
        if child == parent {
            log::warn!("Cannot attach node to itself!");
            return;
        }

        // Detach from the old parent (or the root list).
        let old_parent = self.nodes.get(child).and_then(|n| n.parent);
        if let Some(p) = old_parent {
            if let Some(n) = self.nodes.get_mut(p)
                && let Some(i) = n.children.iter().position(|&x| x == child)
            {
                n.children.remove(i);
            }
        } else if let Some(i) = self.root_nodes.iter().position(|&x| x == child) {
            self.root_nodes.remove(i);
        }

        // Attach to the new one.
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.push(child);
        } else {
            log::error!("Parent node not found during attach!");
            self.root_nodes.push(child);
            return;
        }

        if let Some(c) = self.nodes.get_mut(child) {
            c.parent = Some(parent);
            c.transform.mark_dirty();
        }
    }

    /// Read-only node access.
    #[must_use]
    pub fn get_node(&self, handle: NodeHandle) -> Option<&Node> {
        self.nodes.get(handle)
    }

    /// Mutable node access (for editing TRS channels).
    pub fn get_node_mut(&mut self, handle: NodeHandle) -> Option<&mut Node> {
        self.nodes.get_mut(handle)
    }

    // ========================================================================
    // World-matrix pipeline
    // ========================================================================

    /// Updates world matrices for the whole scene.
    ///
    /// Iterative (explicit stack) to keep deep hierarchies off the call
    /// stack. A node's world matrix is `parent_world * offset * local`,
    /// where `offset` is the node's upstream offset layer if present.
    pub fn update_hierarchy(&mut self) {
        let mut stack: Vec<(NodeHandle, Affine3A, bool)> = Vec::with_capacity(64);
        for &root in self.root_nodes.iter().rev() {
            stack.push((root, Affine3A::IDENTITY, false));
        }

        while let Some((handle, parent_world, parent_changed)) = stack.pop() {
            let Some(node) = self.nodes.get_mut(handle) else {
                continue;
            };

            let local_changed = node.transform.update_local_matrix();
            let needs_update = local_changed || parent_changed;

            if needs_update {
                let upstream = match node.offset_matrix {
                    Some(offset) => parent_world * offset,
                    None => parent_world,
                };
                let new_world = upstream * *node.transform.local_matrix();
                node.transform.set_world_matrix(new_world);
            }

            let current_world = node.transform.world_matrix;
            for i in (0..node.children.len()).rev() {
                if let Some(node) = self.nodes.get(handle)
                    && let Some(&child) = node.children.get(i)
                {
                    stack.push((child, current_world, needs_update));
                }
            }
        }
    }

    /// Updates world matrices for `root` and its descendants only, seeding
    /// from the parent's current world matrix.
    pub fn update_subtree(&mut self, root: NodeHandle) {
        let Some(node) = self.nodes.get(root) else {
            return;
        };
        let parent_world = node
            .parent
            .and_then(|p| self.nodes.get(p))
            .map_or(Affine3A::IDENTITY, |p| p.transform.world_matrix);

        let mut stack: Vec<(NodeHandle, Affine3A)> = vec![(root, parent_world)];
        while let Some((handle, parent_world)) = stack.pop() {
            let Some(node) = self.nodes.get_mut(handle) else {
                continue;
            };
            node.transform.update_local_matrix();
            let upstream = match node.offset_matrix {
                Some(offset) => parent_world * offset,
                None => parent_world,
            };
            let new_world = upstream * *node.transform.local_matrix();
            node.transform.set_world_matrix(new_world);

            let current_world = node.transform.world_matrix;
            for i in (0..node.children.len()).rev() {
                if let Some(node) = self.nodes.get(handle)
                    && let Some(&child) = node.children.get(i)
                {
                    stack.push((child, current_world));
                }
            }
        }
    }

    // ========================================================================
    // Queries consumed by the alignment engine
    // ========================================================================

    /// World-space position of a node (current world matrix translation).
    pub fn world_position(&self, handle: NodeHandle) -> Result<Vec3> {
        self.nodes
            .get(handle)
            .map(|n| Vec3::from(n.transform.world_matrix.translation))
            .ok_or(TalusError::NodeNotFound)
    }

    /// World-space TRS of a node, decomposed from its world matrix.
    pub fn world_trs(&self, handle: NodeHandle) -> Result<(Vec3, Quat, Vec3)> {
        let node = self.nodes.get(handle).ok_or(TalusError::NodeNotFound)?;
        let (scale, rotation, position) = node.transform.world_matrix.to_scale_rotation_translation();
        Ok((position, rotation, scale))
    }

    /// Current world matrix of a node.
    pub fn world_matrix(&self, handle: NodeHandle) -> Result<Affine3A> {
        self.nodes
            .get(handle)
            .map(|n| n.transform.world_matrix)
            .ok_or(TalusError::NodeNotFound)
    }

    /// Parent handle of a node, if any.
    #[must_use]
    pub fn parent(&self, handle: NodeHandle) -> Option<NodeHandle> {
        self.nodes.get(handle).and_then(|n| n.parent)
    }

    /// World matrix of a node's parent; identity for roots.
    #[must_use]
    pub fn parent_world_matrix(&self, handle: NodeHandle) -> Affine3A {
        self.parent(handle)
            .and_then(|p| self.nodes.get(p))
            .map_or(Affine3A::IDENTITY, |p| p.transform.world_matrix)
    }

    /// Whether the node's final placement bypasses its authored local
    /// channels (an upstream offset layer is installed).
    #[must_use]
    pub fn has_offset_override(&self, handle: NodeHandle) -> bool {
        self.nodes.get(handle).is_some_and(Node::has_offset_override)
    }

    /// Bounding-box minimum of the node's mesh in the requested space, or
    /// `None` for nodes without geometry.
    #[must_use]
    pub fn bounding_box_min(&self, handle: NodeHandle, space: Space) -> Option<Vec3> {
        let node = self.nodes.get(handle)?;
        let mesh = self.meshes.get(node.mesh?)?;
        if mesh.is_empty() {
            return None;
        }
        match space {
            Space::Object => Some(mesh.bounds().min),
            Space::World => Some(mesh.bounds().transformed(&node.transform.world_matrix).min),
        }
    }

    // ========================================================================
    // Intersection
    // ========================================================================

    /// Casts a world-space ray against the geometry of `surface`.
    ///
    /// `Err(InvalidSurface)` when the handle is stale or carries no
    /// geometry; `Ok(None)` for a clean miss (including a surface whose
    /// mesh has zero triangles).
    pub fn intersect(&self, surface: NodeHandle, ray: &Ray, tolerance: f32) -> Result<Option<RayHit>> {
        let node = self
            .nodes
            .get(surface)
            .ok_or_else(|| TalusError::InvalidSurface("node not found".into()))?;
        let mesh_key = node
            .mesh
            .ok_or_else(|| TalusError::InvalidSurface("node has no geometry".into()))?;
        let mesh = self
            .meshes
            .get(mesh_key)
            .ok_or_else(|| TalusError::InvalidSurface("mesh not found".into()))?;
        if mesh.is_empty() {
            return Ok(None);
        }
        Ok(mesh.intersect(&node.transform.world_matrix, ray, tolerance))
    }

    /// Validates that `surface` can serve as a reference surface: the node
    /// exists, has a mesh, and the mesh has at least one triangle.
    pub fn validate_surface(&self, surface: NodeHandle) -> Result<()> {
        let node = self
            .nodes
            .get(surface)
            .ok_or_else(|| TalusError::InvalidSurface("node not found".into()))?;
        let mesh_key = node
            .mesh
            .ok_or_else(|| TalusError::InvalidSurface("node has no geometry".into()))?;
        let mesh = self
            .meshes
            .get(mesh_key)
            .ok_or_else(|| TalusError::InvalidSurface("mesh not found".into()))?;
        if mesh.is_empty() {
            return Err(TalusError::InvalidSurface("mesh has zero polygons".into()));
        }
        Ok(())
    }

    // ========================================================================
    // Commits
    // ========================================================================

    /// Writes a world-space position and/or rotation into a node's local
    /// channels, resolving the full upstream chain
    /// (`parent_world * offset`) in one step.
    ///
    /// This is the world-space write path for offset-override nodes:
    /// composing against the parent matrix alone would apply the offset
    /// layer twice. `None` channels are left untouched, as is scale. The
    /// node's subtree is refreshed so the commit is immediately observable.
    pub fn set_world_trs(
        &mut self,
        handle: NodeHandle,
        position: Option<Vec3>,
        rotation: Option<Quat>,
    ) -> Result<()> {
        let node = self.nodes.get(handle).ok_or(TalusError::NodeNotFound)?;
        let upstream = match node.offset_matrix {
            Some(offset) => self.parent_world_matrix(handle) * offset,
            None => self.parent_world_matrix(handle),
        };

        let (world_scale, world_rotation, world_position) =
            node.transform.world_matrix.to_scale_rotation_translation();
        let desired = Affine3A::from_scale_rotation_translation(
            world_scale,
            rotation.unwrap_or(world_rotation),
            position.unwrap_or(world_position),
        );
        let local = upstream.inverse() * desired;
        let (_, local_rotation, local_position) = local.to_scale_rotation_translation();

        let node = self.nodes.get_mut(handle).ok_or(TalusError::NodeNotFound)?;
        if position.is_some() {
            node.transform.set_position(local_position);
        }
        if rotation.is_some() {
            node.transform.set_rotation(local_rotation.normalize());
        }
        self.update_subtree(handle);
        Ok(())
    }

    /// Writes local-space position and/or rotation channels directly.
    /// `None` channels and scale are left untouched.
    pub fn set_local_trs(
        &mut self,
        handle: NodeHandle,
        position: Option<Vec3>,
        rotation: Option<Quat>,
    ) -> Result<()> {
        let node = self.nodes.get_mut(handle).ok_or(TalusError::NodeNotFound)?;
        if let Some(p) = position {
            node.transform.set_position(p);
        }
        if let Some(r) = rotation {
            node.transform.set_rotation(r.normalize());
        }
        self.update_subtree(handle);
        Ok(())
    }
}
