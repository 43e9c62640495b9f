/// VisibilityCellManager: cell nodes, portals and observer tracking.
///
/// Lifecycle: `Unbuilt -> build -> Built -> start -> Active`, with `stop`
/// going back to `Built` and `destroy` back to `Unbuilt` from anywhere.
///
/// A build turns every cull-region marker of the level into one hidden
/// `cell` node at the centre of its box, links neighbouring cells with a
/// pair of portal nodes, and indexes the boxes in a `SpatialPartitionTree`.
/// While active, `update` shows the cell holding the observer and hides
/// the one it left. Static geometry is moved into cells with
/// `assign_to_cell` so it is drawn only when its cell is.

use slotmap::{new_key_type, SlotMap};
use glam::Vec3;
use crate::config::CullConfig;
use crate::error::Result;
use crate::geometry::BoundingVolume;
use crate::partition::SpatialPartitionTree;
use crate::portal::{detect_portals, PortalGraph};
use crate::scene::{LevelSource, NodeId, PortalDesc, ReparentMode, SceneGraph};
use crate::{cull_bail, cull_debug, cull_info, cull_warn};
use super::frame_task::{FrameContext, FrameTask, TaskStatus};

const SOURCE: &str = "cullaabb::CellManager";

// ===== SLOT MAP KEY =====

new_key_type! {
    /// Stable key for a visibility cell.
    ///
    /// Keys are invalidated by `destroy` and by every rebuild.
    pub struct CellKey;
}

/// Lifecycle state of the manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CullState {
    /// No cells exist
    Unbuilt,
    /// Cells and portals exist, observer not tracked
    Built,
    /// Observer tracked every frame
    Active,
}

/// Outcome of one `update`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellTransition {
    /// The manager is not active; nothing was checked
    Inactive,
    /// The observer is still in the same cell (or still outside all cells)
    Unchanged,
    /// The observer entered `to`, coming from `from` or from outside
    Entered {
        from: Option<CellKey>,
        to: CellKey,
    },
    /// The observer left `from` and is in no cell
    Left {
        from: CellKey,
    },
}

/// One visibility cell.
#[derive(Debug, Clone)]
pub struct Cell {
    /// Index of the region box in build order
    index: usize,
    /// Region box after portal adjustment
    bounds: BoundingVolume,
    /// Scene node parenting everything drawn in this cell
    node: NodeId,
    /// Portal nodes leading out of this cell
    portal_nodes: Vec<NodeId>,
}

impl Cell {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn bounds(&self) -> &BoundingVolume {
        &self.bounds
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn portal_nodes(&self) -> &[NodeId] {
        &self.portal_nodes
    }

    /// Inclusive containment test against the cell box.
    pub fn contains(&self, point: Vec3) -> bool {
        self.bounds.contains_point(point)
    }
}

/// Owns the cells, the partition tree and the portal graph of one level.
pub struct VisibilityCellManager {
    config: CullConfig,
    state: CullState,
    cells: SlotMap<CellKey, Cell>,
    /// Cell key per region index
    cell_keys: Vec<CellKey>,
    tree: Option<SpatialPartitionTree>,
    portals: Option<PortalGraph>,
    /// Cell currently holding the observer
    observer_cell: Option<CellKey>,
}

impl VisibilityCellManager {
    /// Create an unbuilt manager.
    pub fn new(config: CullConfig) -> Self {
        Self {
            config,
            state: CullState::Unbuilt,
            cells: SlotMap::with_key(),
            cell_keys: Vec::new(),
            tree: None,
            portals: None,
            observer_cell: None,
        }
    }

    // ===== LIFECYCLE =====

    /// Build cells and portals from the cull regions of `level`.
    ///
    /// Any previous build is torn down first. On error the manager is left
    /// unbuilt with no nodes in the scene.
    ///
    /// # Errors
    ///
    /// - `GeometryInconsistency` if the regions violate the face rules
    /// - `SceneGraph` if a scene operation fails
    pub fn build(&mut self, scene: &mut dyn SceneGraph, level: &dyn LevelSource) -> Result<()> {
        self.destroy(scene);

        let markers = level.nodes_of_kind(&self.config.region_kind);
        let mut bounds = Vec::with_capacity(markers.len());
        for marker in markers {
            match scene.tight_bounds(marker)? {
                Some(b) => bounds.push(b),
                None => cull_warn!(SOURCE, "Cull region {:?} has no geometry, skipped", marker),
            }
        }

        if self.config.debug {
            cull_info!(SOURCE, "Found {} bounding boxes for the culling system", bounds.len());
        }

        // Detection first: a bad layout must not leave nodes behind
        let graph = detect_portals(&bounds, self.config.overlap)?;

        if self.config.debug {
            cull_info!(SOURCE, "Found {} portals for the culling system", graph.adjacency_count());
        }

        let tree = SpatialPartitionTree::build_with_settings(graph.volumes(), &self.config.partition);

        if let Err(err) = self.create_nodes(scene, &graph) {
            self.destroy(scene);
            return Err(err);
        }

        cull_debug!(
            SOURCE,
            "Built {} cells, {} portal nodes, tree depth {}",
            self.cells.len(),
            graph.portals().len(),
            tree.depth()
        );

        self.tree = Some(tree);
        self.portals = Some(graph);
        self.observer_cell = None;
        self.state = CullState::Built;
        Ok(())
    }

    fn create_nodes(&mut self, scene: &mut dyn SceneGraph, graph: &PortalGraph) -> Result<()> {
        let root = scene.root();

        for (index, volume) in graph.volumes().iter().enumerate() {
            let node = scene.create_node(root, "cell")?;
            // Tracked before configuring so a failure below still gets cleaned up
            let key = self.cells.insert(Cell {
                index,
                bounds: *volume,
                node,
                portal_nodes: Vec::new(),
            });
            self.cell_keys.push(key);

            scene.set_position(node, volume.centroid())?;
            scene.hide(node)?;
        }

        for (index, portal) in graph.portals().iter().enumerate() {
            let owner = self.cell_keys[portal.cell_in];
            let in_node = self.cells[owner].node;
            let out_node = self.cells[self.cell_keys[portal.cell_out]].node;

            // Twins follow their original in the graph
            let name = if index % 2 == 0 { "portal1" } else { "portal2" };
            let centre = portal.centroid();
            let desc = PortalDesc {
                cell_in: in_node,
                cell_out: out_node,
                vertices: portal.local_vertices(centre),
            };

            let node = scene.attach_portal(in_node, name, desc)?;
            self.cells[owner].portal_nodes.push(node);

            let cell_position = scene.world_position(in_node)?;
            scene.set_position(node, centre - cell_position)?;
        }

        Ok(())
    }

    /// Begin tracking the observer: `Built -> Active`.
    ///
    /// # Errors
    ///
    /// `InvalidState` if the manager was never built.
    pub fn start(&mut self) -> Result<()> {
        match self.state {
            CullState::Unbuilt => {
                cull_bail!(InvalidState, SOURCE, "Culling system started before it was built")
            }
            CullState::Built => {
                self.state = CullState::Active;
                Ok(())
            }
            CullState::Active => Ok(()),
        }
    }

    /// Stop tracking: `Active -> Built`. Cell visibility is left as is.
    pub fn stop(&mut self) {
        if self.state == CullState::Active {
            self.state = CullState::Built;
        }
    }

    /// Remove every cell and portal node and return to `Unbuilt`.
    ///
    /// Geometry that was assigned to a cell moves back under the scene
    /// root at the same world position. Nodes already removed by the host
    /// are skipped, so destroy can run any number of times.
    pub fn destroy(&mut self, scene: &mut dyn SceneGraph) {
        for cell in self.cells.values() {
            for &portal in &cell.portal_nodes {
                scene.remove_node(portal);
            }
        }

        let root = scene.root();
        for cell in self.cells.values() {
            if !scene.contains(cell.node) {
                continue;
            }
            for child in scene.children(cell.node) {
                if let Err(err) = scene.reparent(child, root, ReparentMode::KeepWorld) {
                    cull_warn!(SOURCE, "Could not release {:?} from cell {}: {}", child, cell.index, err);
                }
            }
            scene.remove_node(cell.node);
        }

        self.cells.clear();
        self.cell_keys.clear();
        self.tree = None;
        self.portals = None;
        self.observer_cell = None;
        self.state = CullState::Unbuilt;
    }

    // ===== PER FRAME =====

    /// Track the observer and toggle cell visibility.
    ///
    /// Does nothing unless active. While the observer stays inside its
    /// tracked cell the tree is not queried.
    pub fn update(&mut self, scene: &mut dyn SceneGraph, observer: Vec3) -> Result<CellTransition> {
        if self.state != CullState::Active {
            return Ok(CellTransition::Inactive);
        }

        let previous = self.observer_cell;
        if let Some(key) = previous {
            if self.cells.get(key).is_some_and(|cell| cell.contains(observer)) {
                return Ok(CellTransition::Unchanged);
            }
        }

        let found = self.cell_at(observer);
        if found == previous {
            return Ok(CellTransition::Unchanged);
        }

        if let Some(old) = previous.and_then(|key| self.cells.get(key)) {
            scene.hide(old.node)?;
        }
        self.observer_cell = found;

        match found {
            Some(key) => {
                scene.show(self.cells[key].node)?;
                if self.config.debug {
                    cull_debug!(SOURCE, "Observer entered cell {}", self.cells[key].index);
                }
                Ok(CellTransition::Entered { from: previous, to: key })
            }
            None => {
                if self.config.debug {
                    cull_debug!(SOURCE, "Observer left all cells at {}", observer);
                }
                match previous {
                    Some(from) => Ok(CellTransition::Left { from }),
                    None => Ok(CellTransition::Unchanged),
                }
            }
        }
    }

    /// Move a static node into the cell containing it.
    ///
    /// The node keeps its local transform under the cell, then is shifted
    /// by the cell's world position. Outside every cell it goes under the
    /// scene root instead. Returns the cell it was assigned to.
    pub fn assign_to_cell(&self, scene: &mut dyn SceneGraph, node: NodeId) -> Result<Option<CellKey>> {
        let position = scene.world_position(node)?;

        match self.cell_at(position) {
            Some(key) => {
                let cell_node = self.cells[key].node;
                scene.reparent(node, cell_node, ReparentMode::KeepLocal)?;
                let offset = scene.world_position(cell_node)?;
                let local = scene.position(node)?;
                scene.set_position(node, local - offset)?;
                Ok(Some(key))
            }
            None => {
                let root = scene.root();
                scene.reparent(node, root, ReparentMode::KeepLocal)?;
                Ok(None)
            }
        }
    }

    // ===== ACCESSORS =====

    /// Cell whose box contains `point`, if any.
    pub fn cell_at(&self, point: Vec3) -> Option<CellKey> {
        let index = self.tree.as_ref()?.query(point)?;
        self.cell_keys.get(index).copied()
    }

    pub fn state(&self) -> CullState {
        self.state
    }

    pub fn config(&self) -> &CullConfig {
        &self.config
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Portal records, two per adjacency.
    pub fn portal_count(&self) -> usize {
        self.portals.as_ref().map_or(0, |graph| graph.portals().len())
    }

    pub fn observer_cell(&self) -> Option<CellKey> {
        self.observer_cell
    }

    pub fn cell(&self, key: CellKey) -> Option<&Cell> {
        self.cells.get(key)
    }

    /// Cell built from the region at `index`.
    pub fn cell_for_region(&self, index: usize) -> Option<CellKey> {
        self.cell_keys.get(index).copied()
    }

    pub fn cells(&self) -> impl Iterator<Item = (CellKey, &Cell)> + '_ {
        self.cells.iter()
    }

    pub fn tree(&self) -> Option<&SpatialPartitionTree> {
        self.tree.as_ref()
    }

    pub fn portal_graph(&self) -> Option<&PortalGraph> {
        self.portals.as_ref()
    }
}

impl FrameTask for VisibilityCellManager {
    fn name(&self) -> &str {
        "Culling Updater"
    }

    fn run(&mut self, scene: &mut dyn SceneGraph, context: &FrameContext) -> Result<TaskStatus> {
        if self.state != CullState::Active {
            return Ok(TaskStatus::Done);
        }
        self.update(scene, context.observer)?;
        Ok(TaskStatus::Continue)
    }
}

#[cfg(test)]
#[path = "visibility_cell_manager_tests.rs"]
mod tests;
