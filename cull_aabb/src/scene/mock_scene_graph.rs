/// In-memory scene graph for tests and engine-less hosts.
///
/// A slotmap arena of named nodes with translation-only transforms, a
/// hidden flag, optional local-space geometry bounds, string tags and an
/// optional portal payload. Implements both `SceneGraph` and
/// `LevelSource` so a level can be authored and culled in one place.

use rustc_hash::FxHashMap;
use slotmap::SlotMap;
use glam::Vec3;
use crate::cull_bail;
use crate::error::Result;
use crate::geometry::BoundingVolume;
use super::scene_graph::{LevelSource, NodeId, PortalDesc, ReparentMode, SceneGraph};

const SOURCE: &str = "cullaabb::MockSceneGraph";

/// Tag key used to mark level nodes with their kind.
pub const IS_A_TAG: &str = "IsA";

#[derive(Debug, Clone)]
struct MockNode {
    name: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    /// Relative to the parent
    position: Vec3,
    hidden: bool,
    /// Local-space bounds of the geometry carried by this node
    geometry: Option<BoundingVolume>,
    tags: FxHashMap<String, String>,
    portal: Option<PortalDesc>,
}

impl MockNode {
    fn new(name: &str, parent: Option<NodeId>) -> Self {
        Self {
            name: name.to_string(),
            parent,
            children: Vec::new(),
            position: Vec3::ZERO,
            hidden: false,
            geometry: None,
            tags: FxHashMap::default(),
            portal: None,
        }
    }
}

/// Arena-backed `SceneGraph`.
#[derive(Debug, Clone)]
pub struct MockSceneGraph {
    nodes: SlotMap<NodeId, MockNode>,
    /// Live nodes in creation order; slot order changes once slots are reused
    order: Vec<NodeId>,
    root: NodeId,
}

impl MockSceneGraph {
    /// Scene with a single root node named `render`.
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(MockNode::new("render", None));
        Self { nodes, order: vec![root], root }
    }

    fn node(&self, id: NodeId) -> Result<&MockNode> {
        match self.nodes.get(id) {
            Some(node) => Ok(node),
            None => cull_bail!(SceneGraph, SOURCE, "Unknown node {:?}", id),
        }
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut MockNode> {
        match self.nodes.get_mut(id) {
            Some(node) => Ok(node),
            None => cull_bail!(SceneGraph, SOURCE, "Unknown node {:?}", id),
        }
    }

    fn insert_child(&mut self, parent: NodeId, node: MockNode) -> Result<NodeId> {
        self.node(parent)?;
        let id = self.nodes.insert(node);
        self.order.push(id);
        self.node_mut(parent)?.children.push(id);
        Ok(id)
    }

    /// Create a node carrying geometry with the given local bounds, placed
    /// at `position` under `parent`.
    pub fn add_geometry(
        &mut self,
        parent: NodeId,
        name: &str,
        position: Vec3,
        bounds: BoundingVolume,
    ) -> Result<NodeId> {
        let mut node = MockNode::new(name, Some(parent));
        node.position = position;
        node.geometry = Some(bounds);
        self.insert_child(parent, node)
    }

    /// Create a cull-region marker: a box of geometry tagged `IsA = kind`
    /// directly under the root, spanning `bounds` in world space.
    pub fn add_region(&mut self, kind: &str, bounds: BoundingVolume) -> Result<NodeId> {
        let centre = bounds.centroid();
        let local = BoundingVolume::new(bounds.min - centre, bounds.max - centre);
        let id = self.add_geometry(self.root, kind, centre, local)?;
        self.set_tag(id, IS_A_TAG, kind)?;
        Ok(id)
    }

    pub fn set_tag(&mut self, node: NodeId, key: &str, value: &str) -> Result<()> {
        self.node_mut(node)?.tags.insert(key.to_string(), value.to_string());
        Ok(())
    }

    pub fn tag(&self, node: NodeId, key: &str) -> Option<&str> {
        self.nodes.get(node)?.tags.get(key).map(String::as_str)
    }

    /// Portal payload of a node created with `attach_portal`.
    pub fn portal(&self, node: NodeId) -> Option<&PortalDesc> {
        self.nodes.get(node)?.portal.as_ref()
    }

    /// Live nodes, root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Live nodes with the given name, in creation order.
    pub fn nodes_named(&self, name: &str) -> Vec<NodeId> {
        self.order
            .iter()
            .copied()
            .filter(|&id| self.nodes.get(id).is_some_and(|node| node.name == name))
            .collect()
    }

    /// Whether the node would be drawn: neither it nor any ancestor is hidden.
    pub fn is_visible(&self, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            match self.nodes.get(id) {
                Some(n) if !n.hidden => current = n.parent,
                _ => return false,
            }
        }
        true
    }

    fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.nodes.get(id).and_then(|n| n.parent);
        }
        false
    }

    fn collect_subtree(&self, node: NodeId, out: &mut Vec<NodeId>) {
        out.push(node);
        if let Some(n) = self.nodes.get(node) {
            for &child in &n.children {
                self.collect_subtree(child, out);
            }
        }
    }
}

impl Default for MockSceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph for MockSceneGraph {
    fn root(&self) -> NodeId {
        self.root
    }

    fn create_node(&mut self, parent: NodeId, name: &str) -> Result<NodeId> {
        self.insert_child(parent, MockNode::new(name, Some(parent)))
    }

    fn attach_portal(&mut self, parent: NodeId, name: &str, portal: PortalDesc) -> Result<NodeId> {
        let mut node = MockNode::new(name, Some(parent));
        node.portal = Some(portal);
        self.insert_child(parent, node)
    }

    fn remove_node(&mut self, node: NodeId) -> bool {
        if node == self.root || !self.nodes.contains_key(node) {
            return false;
        }

        let mut subtree = Vec::new();
        self.collect_subtree(node, &mut subtree);

        if let Some(parent) = self.nodes.get(node).and_then(|n| n.parent) {
            if let Some(p) = self.nodes.get_mut(parent) {
                p.children.retain(|&child| child != node);
            }
        }
        for id in subtree {
            self.nodes.remove(id);
        }
        let nodes = &self.nodes;
        self.order.retain(|&id| nodes.contains_key(id));
        true
    }

    fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(node)
    }

    fn name(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(node).map(|n| n.name.as_str())
    }

    fn position(&self, node: NodeId) -> Result<Vec3> {
        Ok(self.node(node)?.position)
    }

    fn set_position(&mut self, node: NodeId, position: Vec3) -> Result<()> {
        self.node_mut(node)?.position = position;
        Ok(())
    }

    fn world_position(&self, node: NodeId) -> Result<Vec3> {
        let mut world = Vec3::ZERO;
        let mut current = Some(node);
        while let Some(id) = current {
            let n = self.node(id)?;
            world += n.position;
            current = n.parent;
        }
        Ok(world)
    }

    fn tight_bounds(&self, node: NodeId) -> Result<Option<BoundingVolume>> {
        self.node(node)?;
        let mut subtree = Vec::new();
        self.collect_subtree(node, &mut subtree);

        let mut bounds: Option<BoundingVolume> = None;
        for id in subtree {
            let Some(geometry) = self.node(id)?.geometry else {
                continue;
            };
            let offset = self.world_position(id)?;
            let world = BoundingVolume::new(geometry.min + offset, geometry.max + offset);
            bounds = Some(match bounds {
                Some(b) => BoundingVolume::new(b.min.min(world.min), b.max.max(world.max)),
                None => world,
            });
        }
        Ok(bounds)
    }

    fn show(&mut self, node: NodeId) -> Result<()> {
        self.node_mut(node)?.hidden = false;
        Ok(())
    }

    fn hide(&mut self, node: NodeId) -> Result<()> {
        self.node_mut(node)?.hidden = true;
        Ok(())
    }

    fn is_hidden(&self, node: NodeId) -> Result<bool> {
        Ok(self.node(node)?.hidden)
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node)?.parent
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.nodes.get(node).map_or_else(Vec::new, |n| n.children.clone())
    }

    fn reparent(&mut self, node: NodeId, parent: NodeId, mode: ReparentMode) -> Result<()> {
        if node == self.root {
            cull_bail!(SceneGraph, SOURCE, "The root node can not be reparented");
        }
        self.node(parent)?;
        if self.is_ancestor(node, parent) {
            cull_bail!(SceneGraph, SOURCE, "Reparenting {:?} under its own subtree", node);
        }

        let world = self.world_position(node)?;
        let old_parent = self.node(node)?.parent;

        if let Some(old) = old_parent {
            self.node_mut(old)?.children.retain(|&child| child != node);
        }
        self.node_mut(parent)?.children.push(node);

        let local = match mode {
            ReparentMode::KeepLocal => self.node(node)?.position,
            ReparentMode::KeepWorld => world - self.world_position(parent)?,
        };
        let n = self.node_mut(node)?;
        n.parent = Some(parent);
        n.position = local;
        Ok(())
    }
}

impl LevelSource for MockSceneGraph {
    fn nodes_of_kind(&self, kind: &str) -> Vec<NodeId> {
        self.order
            .iter()
            .copied()
            .filter(|&id| {
                self.nodes
                    .get(id)
                    .and_then(|node| node.tags.get(IS_A_TAG))
                    .is_some_and(|k| k == kind)
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "mock_scene_graph_tests.rs"]
mod tests;
