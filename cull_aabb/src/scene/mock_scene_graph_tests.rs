use glam::Vec3;
use crate::error::Error;
use crate::geometry::BoundingVolume;
use crate::scene::{LevelSource, PortalDesc, ReparentMode, SceneGraph};
use super::*;

fn unit_box() -> BoundingVolume {
    BoundingVolume::new(Vec3::splat(-0.5), Vec3::splat(0.5))
}

// ============================================================================
// Nodes
// ============================================================================

#[test]
fn test_new_has_only_root() {
    let scene = MockSceneGraph::new();
    assert_eq!(scene.node_count(), 1);
    assert_eq!(scene.name(scene.root()), Some("render"));
    assert_eq!(scene.parent(scene.root()), None);
}

#[test]
fn test_create_and_remove_subtree() {
    let mut scene = MockSceneGraph::new();
    let root = scene.root();
    let cell = scene.create_node(root, "cell").unwrap();
    let child = scene.create_node(cell, "crate").unwrap();

    assert_eq!(scene.children(root), vec![cell]);
    assert_eq!(scene.parent(child), Some(cell));
    assert_eq!(scene.node_count(), 3);

    assert!(scene.remove_node(cell));
    assert!(!scene.contains(cell));
    assert!(!scene.contains(child));
    assert!(scene.children(root).is_empty());

    // Already gone
    assert!(!scene.remove_node(cell));
    assert!(!scene.remove_node(root));
}

#[test]
fn test_unknown_node_is_an_error() {
    let mut scene = MockSceneGraph::new();
    let root = scene.root();
    let gone = scene.create_node(root, "tmp").unwrap();
    scene.remove_node(gone);

    assert!(matches!(scene.position(gone), Err(Error::SceneGraph(_))));
    assert!(matches!(scene.hide(gone), Err(Error::SceneGraph(_))));
    assert!(matches!(scene.create_node(gone, "x"), Err(Error::SceneGraph(_))));
}

#[test]
fn test_nodes_named() {
    let mut scene = MockSceneGraph::new();
    let root = scene.root();
    scene.create_node(root, "cell").unwrap();
    scene.create_node(root, "cell").unwrap();
    scene.create_node(root, "lamp").unwrap();
    assert_eq!(scene.nodes_named("cell").len(), 2);
    assert_eq!(scene.nodes_named("door").len(), 0);
}

// ============================================================================
// Transforms
// ============================================================================

#[test]
fn test_world_position_accumulates() {
    let mut scene = MockSceneGraph::new();
    let root = scene.root();
    let a = scene.create_node(root, "a").unwrap();
    let b = scene.create_node(a, "b").unwrap();
    scene.set_position(a, Vec3::new(1.0, 2.0, 3.0)).unwrap();
    scene.set_position(b, Vec3::new(0.5, 0.0, -1.0)).unwrap();

    assert_eq!(scene.position(b).unwrap(), Vec3::new(0.5, 0.0, -1.0));
    assert_eq!(scene.world_position(b).unwrap(), Vec3::new(1.5, 2.0, 2.0));
}

#[test]
fn test_reparent_keep_world() {
    let mut scene = MockSceneGraph::new();
    let root = scene.root();
    let cell = scene.create_node(root, "cell").unwrap();
    scene.set_position(cell, Vec3::new(10.0, 0.0, 0.0)).unwrap();
    let item = scene.create_node(root, "item").unwrap();
    scene.set_position(item, Vec3::new(12.0, 1.0, 0.0)).unwrap();

    scene.reparent(item, cell, ReparentMode::KeepWorld).unwrap();
    assert_eq!(scene.parent(item), Some(cell));
    assert_eq!(scene.position(item).unwrap(), Vec3::new(2.0, 1.0, 0.0));
    assert_eq!(scene.world_position(item).unwrap(), Vec3::new(12.0, 1.0, 0.0));
    assert!(scene.children(root).iter().all(|&c| c != item));
}

#[test]
fn test_reparent_keep_local() {
    let mut scene = MockSceneGraph::new();
    let root = scene.root();
    let cell = scene.create_node(root, "cell").unwrap();
    scene.set_position(cell, Vec3::new(10.0, 0.0, 0.0)).unwrap();
    let item = scene.create_node(root, "item").unwrap();
    scene.set_position(item, Vec3::new(12.0, 1.0, 0.0)).unwrap();

    scene.reparent(item, cell, ReparentMode::KeepLocal).unwrap();
    assert_eq!(scene.position(item).unwrap(), Vec3::new(12.0, 1.0, 0.0));
    assert_eq!(scene.world_position(item).unwrap(), Vec3::new(22.0, 1.0, 0.0));
}

#[test]
fn test_reparent_rejects_cycles() {
    let mut scene = MockSceneGraph::new();
    let root = scene.root();
    let a = scene.create_node(root, "a").unwrap();
    let b = scene.create_node(a, "b").unwrap();

    assert!(scene.reparent(a, b, ReparentMode::KeepWorld).is_err());
    assert!(scene.reparent(a, a, ReparentMode::KeepWorld).is_err());
    assert!(scene.reparent(root, a, ReparentMode::KeepWorld).is_err());
    assert_eq!(scene.parent(b), Some(a));
}

// ============================================================================
// Bounds, visibility, tags
// ============================================================================

#[test]
fn test_tight_bounds_of_subtree() {
    let mut scene = MockSceneGraph::new();
    let root = scene.root();
    let group = scene.create_node(root, "group").unwrap();
    scene.set_position(group, Vec3::new(0.0, 0.0, 5.0)).unwrap();
    scene.add_geometry(group, "a", Vec3::new(1.0, 0.0, 0.0), unit_box()).unwrap();
    scene.add_geometry(group, "b", Vec3::new(-1.0, 2.0, 0.0), unit_box()).unwrap();

    let bounds = scene.tight_bounds(group).unwrap().unwrap();
    assert_eq!(bounds.min, Vec3::new(-1.5, -0.5, 4.5));
    assert_eq!(bounds.max, Vec3::new(1.5, 2.5, 5.5));

    let empty = scene.create_node(root, "empty").unwrap();
    assert_eq!(scene.tight_bounds(empty).unwrap(), None);
}

#[test]
fn test_add_region_spans_world_bounds() {
    let mut scene = MockSceneGraph::new();
    let region = BoundingVolume::from_intervals((2.0, 4.0), (0.0, 2.0), (0.0, 6.0));
    let id = scene.add_region("CullAABB", region).unwrap();

    assert_eq!(scene.tight_bounds(id).unwrap(), Some(region));
    assert_eq!(scene.world_position(id).unwrap(), Vec3::new(3.0, 1.0, 3.0));
    assert_eq!(scene.tag(id, IS_A_TAG), Some("CullAABB"));
}

#[test]
fn test_visibility_follows_ancestors() {
    let mut scene = MockSceneGraph::new();
    let root = scene.root();
    let cell = scene.create_node(root, "cell").unwrap();
    let item = scene.create_node(cell, "item").unwrap();

    assert!(scene.is_visible(item));
    scene.hide(cell).unwrap();
    assert!(scene.is_hidden(cell).unwrap());
    assert!(!scene.is_hidden(item).unwrap());
    assert!(!scene.is_visible(item));

    scene.show(cell).unwrap();
    assert!(scene.is_visible(item));
}

#[test]
fn test_level_source_filters_by_kind() {
    let mut scene = MockSceneGraph::new();
    let a = scene.add_region("CullAABB", unit_box()).unwrap();
    let b = scene.add_region("Portal", unit_box()).unwrap();
    let root = scene.root();
    let untagged = scene.create_node(root, "CullAABB").unwrap();

    let found = scene.nodes_of_kind("CullAABB");
    assert_eq!(found, vec![a]);
    assert_eq!(scene.nodes_of_kind("Portal"), vec![b]);
    assert!(!found.contains(&untagged));
}

#[test]
fn test_level_source_keeps_creation_order_after_removal() {
    let mut scene = MockSceneGraph::new();
    let a = scene.add_region("CullAABB", unit_box()).unwrap();
    let b = scene.add_region("CullAABB", unit_box()).unwrap();
    let c = scene.add_region("CullAABB", unit_box()).unwrap();

    assert!(scene.remove_node(a));
    // Reuses the slot freed by `a`
    let d = scene.add_region("CullAABB", unit_box()).unwrap();

    assert_eq!(scene.nodes_of_kind("CullAABB"), vec![b, c, d]);
    assert_eq!(scene.nodes_named("CullAABB"), vec![b, c, d]);
}

#[test]
fn test_attach_portal_payload() {
    let mut scene = MockSceneGraph::new();
    let root = scene.root();
    let cell_a = scene.create_node(root, "cell").unwrap();
    let cell_b = scene.create_node(root, "cell").unwrap();
    let desc = PortalDesc {
        cell_in: cell_a,
        cell_out: cell_b,
        vertices: [Vec3::ZERO, Vec3::Y, Vec3::ONE, Vec3::X],
    };

    let portal = scene.attach_portal(cell_a, "portal1", desc).unwrap();
    assert_eq!(scene.portal(portal), Some(&desc));
    assert_eq!(scene.parent(portal), Some(cell_a));
    assert_eq!(scene.portal(cell_a), None);
}
