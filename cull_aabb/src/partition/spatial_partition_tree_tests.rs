use glam::Vec3;
use crate::config::PartitionSettings;
use crate::geometry::{Axis, BoundingVolume};
use super::*;

// ============================================================================
// Helpers
// ============================================================================

fn bv(x: (f32, f32), y: (f32, f32), z: (f32, f32)) -> BoundingVolume {
    BoundingVolume::from_intervals(x, y, z)
}

/// Two cubes sharing the x = 2 face
fn two_cubes() -> Vec<BoundingVolume> {
    vec![
        bv((0.0, 2.0), (0.0, 2.0), (0.0, 2.0)),
        bv((2.0, 4.0), (0.0, 2.0), (0.0, 2.0)),
    ]
}

/// 5 x 4 x 3 grid of disjoint boxes of varying size, 3 units apart
fn gapped_grid() -> Vec<BoundingVolume> {
    let mut boxes = Vec::new();
    for i in 0..5 {
        for j in 0..4 {
            for k in 0..3 {
                let size = 1.0 + ((i + j + k) % 3) as f32 * 0.4;
                let min = Vec3::new(i as f32 * 3.0, j as f32 * 3.0, k as f32 * 3.0);
                boxes.push(BoundingVolume::new(min, min + Vec3::splat(size)));
            }
        }
    }
    boxes
}

/// Every index stored in a leaf, sorted
fn leaf_indices(tree: &SpatialPartitionTree) -> Vec<usize> {
    let mut all = Vec::new();
    tree.root().for_each_leaf(&mut |leaf: &[usize]| all.extend_from_slice(leaf));
    all.sort_unstable();
    all
}

fn assert_complete(tree: &SpatialPartitionTree) {
    let expected: Vec<usize> = (0..tree.len()).collect();
    assert_eq!(leaf_indices(tree), expected, "every box must sit in exactly one leaf");
}

// ============================================================================
// Degenerate inputs
// ============================================================================

#[test]
fn test_empty_input_builds_empty_leaf() {
    let tree = SpatialPartitionTree::build(&[]);
    assert!(tree.is_empty());
    assert_eq!(tree.depth(), 1);
    assert_eq!(tree.leaf_count(), 1);
    assert_eq!(tree.query(Vec3::ZERO), None);
}

#[test]
fn test_single_box() {
    let tree = SpatialPartitionTree::build(&[bv((0.0, 1.0), (0.0, 1.0), (0.0, 1.0))]);
    assert_eq!(tree.len(), 1);
    assert_eq!(tree.depth(), 1);
    assert_eq!(tree.query(Vec3::splat(0.5)), Some(0));
    assert_eq!(tree.query(Vec3::splat(1.5)), None);
}

#[test]
fn test_zero_volume_boxes_do_not_break_build() {
    let flats: Vec<BoundingVolume> = (0..5)
        .map(|i| bv((i as f32, i as f32), (0.0, 1.0), (0.0, 1.0)))
        .collect();

    let tree = SpatialPartitionTree::build(&flats);
    assert_complete(&tree);
    assert_eq!(tree.query(Vec3::new(3.0, 0.5, 0.5)), Some(3));
    assert_eq!(tree.query(Vec3::new(3.5, 0.5, 0.5)), None);
}

// ============================================================================
// Structure
// ============================================================================

#[test]
fn test_two_cubes_split_on_x() {
    let tree = SpatialPartitionTree::build(&two_cubes());

    match tree.root() {
        PartitionNode::Interior { axis, split, mid, .. } => {
            assert_eq!(*axis, Axis::X);
            assert!((split - 1.999).abs() < 1e-5);
            assert!(mid.is_some());
        }
        PartitionNode::Leaf { .. } => panic!("two cubes should split"),
    }
    assert_eq!(tree.depth(), 2);
    assert_complete(&tree);
}

#[test]
fn test_volume_accessors() {
    let cubes = two_cubes();
    let tree = SpatialPartitionTree::build(&cubes);
    assert_eq!(tree.volumes(), cubes.as_slice());
    assert_eq!(tree.volume(1), Some(&cubes[1]));
    assert_eq!(tree.volume(2), None);
}

#[test]
fn test_partition_completeness_on_grid() {
    let boxes = gapped_grid();
    let tree = SpatialPartitionTree::build(&boxes);
    assert_eq!(tree.len(), 60);
    assert_complete(&tree);
    assert!(tree.leaf_count() > 1);
}

#[test]
fn test_line_of_identical_boxes_terminates() {
    // Touching unit cubes along x
    let line: Vec<BoundingVolume> = (0..64)
        .map(|i| bv((i as f32, i as f32 + 1.0), (0.0, 1.0), (0.0, 1.0)))
        .collect();

    let tree = SpatialPartitionTree::build(&line);
    assert_complete(&tree);
    assert!(tree.depth() < line.len());

    for (i, b) in line.iter().enumerate() {
        let hit = tree.query(b.centroid()).expect("centroid must be found");
        assert_eq!(hit, i);
    }
}

#[test]
fn test_line_of_separated_boxes_terminates() {
    let line: Vec<BoundingVolume> = (0..33)
        .map(|i| bv((i as f32 * 2.0, i as f32 * 2.0 + 1.0), (0.0, 1.0), (0.0, 1.0)))
        .collect();

    let tree = SpatialPartitionTree::build(&line);
    assert_complete(&tree);
    assert!(tree.leaf_count() > 2);
}

// ============================================================================
// Queries
// ============================================================================

#[test]
fn test_two_cube_queries() {
    let tree = SpatialPartitionTree::build(&two_cubes());
    assert_eq!(tree.query(Vec3::new(1.0, 1.0, 1.0)), Some(0));
    assert_eq!(tree.query(Vec3::new(3.0, 1.0, 1.0)), Some(1));
    assert_eq!(tree.query(Vec3::new(5.0, 5.0, 5.0)), None);
}

#[test]
fn test_query_grid_centroids_and_gaps() {
    let boxes = gapped_grid();
    let tree = SpatialPartitionTree::build(&boxes);

    for (i, b) in boxes.iter().enumerate() {
        assert_eq!(tree.query(b.centroid()), Some(i), "centroid of box {} ({})", i, b);
        // Every box ends at most 1.8 past its corner, so +2.5 is always in a gap
        assert_eq!(tree.query(b.min + Vec3::splat(2.5)), None);
    }
}

#[test]
fn test_query_finds_straddling_box() {
    // One long corridor under a row of small rooms
    let mut boxes = vec![bv((0.0, 12.0), (0.0, 1.0), (0.0, 1.0))];
    for i in 0..4 {
        let x = i as f32 * 3.0;
        boxes.push(bv((x, x + 1.0), (2.0, 3.0), (0.0, 1.0)));
    }

    let tree = SpatialPartitionTree::build(&boxes);
    assert_complete(&tree);

    for x in [0.5, 3.5, 6.0, 11.5] {
        assert_eq!(tree.query(Vec3::new(x, 0.5, 0.5)), Some(0));
    }
    for i in 0..4 {
        let x = i as f32 * 3.0 + 0.5;
        assert_eq!(tree.query(Vec3::new(x, 2.5, 0.5)), Some(i + 1));
    }
    assert_eq!(tree.query(Vec3::new(2.0, 2.5, 0.5)), None);
}

#[test]
fn test_query_on_shared_face_is_inclusive() {
    let tree = SpatialPartitionTree::build(&two_cubes());
    // The x = 2 plane belongs to both boxes; some box must answer
    assert!(tree.query(Vec3::new(2.0, 1.0, 1.0)).is_some());
}

#[test]
fn test_custom_settings_still_complete() {
    let settings = PartitionSettings { split_epsilon: 0.25, cut_cost: 10.0 };
    let boxes = gapped_grid();
    let tree = SpatialPartitionTree::build_with_settings(&boxes, &settings);
    assert_complete(&tree);
    for (i, b) in boxes.iter().enumerate() {
        assert_eq!(tree.query(b.centroid()), Some(i));
    }
}
