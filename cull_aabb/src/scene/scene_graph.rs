/// Scene-graph seam consumed by the culling system.
///
/// The culling core never talks to an engine directly. Everything it needs
/// from the host (creating cell and portal nodes, moving geometry between
/// parents, toggling visibility, reading world bounds) goes through the
/// `SceneGraph` trait, and the cull-region markers come from a
/// `LevelSource`. Nodes are addressed by `NodeId` slotmap keys owned by
/// the implementation.

use glam::Vec3;
use slotmap::new_key_type;
use crate::error::Result;
use crate::geometry::BoundingVolume;

// ===== SLOT MAP KEY =====

new_key_type! {
    /// Stable key for a node of a scene graph.
    ///
    /// Keys stay valid while other nodes are removed. Using the key of a
    /// removed node is an error, except for `remove_node` which reports
    /// it as already gone.
    pub struct NodeId;
}

/// What to preserve when a node moves to a new parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReparentMode {
    /// Keep the local transform; the world position follows the new parent
    KeepLocal,
    /// Keep the world position; the local transform is recomputed
    KeepWorld,
}

/// Portal node description, in the space of the node it is attached to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortalDesc {
    /// Cell node the portal is seen from
    pub cell_in: NodeId,
    /// Cell node visible through the portal
    pub cell_out: NodeId,
    /// Quad corners relative to the portal node position
    pub vertices: [Vec3; 4],
}

/// Scene operations used to build and drive visibility cells.
///
/// Transforms are translation only as far as culling is concerned: a node
/// has a local position relative to its parent and a world position.
pub trait SceneGraph {
    /// Root of the scene; static geometry falls back here.
    fn root(&self) -> NodeId;

    /// Create an empty named child of `parent`.
    fn create_node(&mut self, parent: NodeId, name: &str) -> Result<NodeId>;

    /// Create a portal node as a child of `parent`.
    fn attach_portal(&mut self, parent: NodeId, name: &str, portal: PortalDesc) -> Result<NodeId>;

    /// Remove a node and its subtree.
    ///
    /// Returns false if the node was already removed (or is the root).
    fn remove_node(&mut self, node: NodeId) -> bool;

    /// Whether the node is still alive.
    fn contains(&self, node: NodeId) -> bool;

    fn name(&self, node: NodeId) -> Option<&str>;

    /// Position relative to the parent.
    fn position(&self, node: NodeId) -> Result<Vec3>;

    fn set_position(&mut self, node: NodeId, position: Vec3) -> Result<()>;

    /// Position in world space.
    fn world_position(&self, node: NodeId) -> Result<Vec3>;

    /// World-space bounds of all geometry below `node`, None if it has none.
    fn tight_bounds(&self, node: NodeId) -> Result<Option<BoundingVolume>>;

    fn show(&mut self, node: NodeId) -> Result<()>;

    fn hide(&mut self, node: NodeId) -> Result<()>;

    fn is_hidden(&self, node: NodeId) -> Result<bool>;

    fn parent(&self, node: NodeId) -> Option<NodeId>;

    fn children(&self, node: NodeId) -> Vec<NodeId>;

    /// Move `node` under `parent`.
    fn reparent(&mut self, node: NodeId, parent: NodeId, mode: ReparentMode) -> Result<()>;
}

/// Level content queried for cull-region markers.
pub trait LevelSource {
    /// Nodes whose `IsA` tag equals `kind`.
    fn nodes_of_kind(&self, kind: &str) -> Vec<NodeId>;
}
