/// SpatialPartitionTree: k-d style tree over cull-region boxes.
///
/// Each interior node splits its boxes with one axis-aligned plane into
/// three buckets:
/// - `low`: boxes entirely below the plane
/// - `high`: boxes entirely above the plane
/// - `mid`: boxes straddling the plane (kept at this level, queried first)
///
/// The split axis and plane are chosen per node by a heuristic: on every
/// axis the boxes are sorted by centroid and the box at the half-volume
/// mark (the pivot) proposes three cuts (just below it, through its
/// centroid, just above it). The cheapest of the nine candidates wins,
/// where cutting through a box costs `cut_cost` times its volume and an
/// unbalanced split pays the running |low - high| volume difference.
///
/// Boxes are referenced by their index in the slice given to `build`.

use glam::Vec3;
use crate::config::PartitionSettings;
use crate::geometry::{Axis, BoundingVolume};

/// A node of the partition tree.
#[derive(Debug, Clone)]
pub enum PartitionNode {
    /// Boxes that were not worth splitting further, in low, mid, high order
    Leaf {
        volumes: Vec<usize>,
    },
    /// A split plane and its three buckets
    Interior {
        axis: Axis,
        split: f32,
        low: Box<PartitionNode>,
        /// Absent when no box straddles the plane
        mid: Option<Box<PartitionNode>>,
        high: Box<PartitionNode>,
    },
}

impl PartitionNode {
    /// Number of levels below and including this node.
    pub fn depth(&self) -> usize {
        match self {
            PartitionNode::Leaf { .. } => 1,
            PartitionNode::Interior { low, mid, high, .. } => {
                let mid_depth = mid.as_ref().map_or(0, |m| m.depth());
                1 + low.depth().max(high.depth()).max(mid_depth)
            }
        }
    }

    /// Visit every leaf in low, mid, high order.
    pub fn for_each_leaf<F: FnMut(&[usize])>(&self, f: &mut F) {
        match self {
            PartitionNode::Leaf { volumes } => f(volumes),
            PartitionNode::Interior { low, mid, high, .. } => {
                low.for_each_leaf(f);
                if let Some(mid) = mid {
                    mid.for_each_leaf(f);
                }
                high.for_each_leaf(f);
            }
        }
    }
}

/// Best split found for one node.
struct SplitCandidate {
    axis: Axis,
    split: f32,
    cost: f32,
    low: Vec<usize>,
    mid: Vec<usize>,
    high: Vec<usize>,
}

impl SplitCandidate {
    /// Number of non-empty buckets.
    fn occupied_buckets(&self) -> usize {
        [&self.low, &self.mid, &self.high]
            .iter()
            .filter(|bucket| !bucket.is_empty())
            .count()
    }
}

/// Immutable point-location structure over a set of boxes.
///
/// Owns a copy of the boxes it was built from; rebuilding means building
/// a new tree.
#[derive(Debug, Clone)]
pub struct SpatialPartitionTree {
    volumes: Vec<BoundingVolume>,
    root: PartitionNode,
}

impl SpatialPartitionTree {
    /// Build a tree with the default cost constants.
    pub fn build(volumes: &[BoundingVolume]) -> Self {
        Self::build_with_settings(volumes, &PartitionSettings::default())
    }

    /// Build a tree with explicit cost constants.
    ///
    /// An empty slice produces a single empty leaf; every query then misses.
    pub fn build_with_settings(volumes: &[BoundingVolume], settings: &PartitionSettings) -> Self {
        let indices: Vec<usize> = (0..volumes.len()).collect();
        let root = Self::build_recursive(volumes, indices, settings);

        Self {
            volumes: volumes.to_vec(),
            root,
        }
    }

    /// Recursively split `indices` until every bucket but one is empty.
    fn build_recursive(
        volumes: &[BoundingVolume],
        indices: Vec<usize>,
        settings: &PartitionSettings,
    ) -> PartitionNode {
        if indices.len() < 2 {
            return PartitionNode::Leaf { volumes: indices };
        }

        let best = Self::best_split(volumes, &indices, settings);

        // At most one populated bucket: splitting again would not shrink the set
        if best.occupied_buckets() <= 1 {
            let mut leaf = best.low;
            leaf.extend(best.mid);
            leaf.extend(best.high);
            return PartitionNode::Leaf { volumes: leaf };
        }

        let mid = if best.mid.is_empty() {
            None
        } else {
            Some(Box::new(Self::build_recursive(volumes, best.mid, settings)))
        };

        PartitionNode::Interior {
            axis: best.axis,
            split: best.split,
            low: Box::new(Self::build_recursive(volumes, best.low, settings)),
            mid,
            high: Box::new(Self::build_recursive(volumes, best.high, settings)),
        }
    }

    /// Evaluate the nine (axis, cut) candidates and keep the cheapest.
    ///
    /// Ties keep the earliest candidate (x before y before z, low cut
    /// before centroid before high cut).
    fn best_split(
        volumes: &[BoundingVolume],
        indices: &[usize],
        settings: &PartitionSettings,
    ) -> SplitCandidate {
        let total_volume: f32 = indices.iter().map(|&i| volumes[i].volume()).sum();
        let half_volume = total_volume * 0.5;

        let mut best = SplitCandidate {
            axis: Axis::X,
            split: 0.0,
            cost: f32::INFINITY,
            low: Vec::new(),
            mid: indices.to_vec(),
            high: Vec::new(),
        };

        for axis in Axis::ALL {
            let a = axis.index();

            let mut by_axis = indices.to_vec();
            by_axis.sort_by(|&l, &r| volumes[l].centroid()[a].total_cmp(&volumes[r].centroid()[a]));

            // Walk to the box sitting on the half-volume mark
            let mut pivot = 0;
            let mut accumulated = 0.0f32;
            while pivot + 1 < by_axis.len() && accumulated < half_volume {
                accumulated += volumes[by_axis[pivot]].volume();
                pivot += 1;
            }

            let pivot_box = &volumes[by_axis[pivot]];
            let (pivot_min, pivot_max) = pivot_box.interval(axis);
            let cuts = [
                pivot_min - settings.split_epsilon,
                pivot_box.centroid()[a],
                pivot_max + settings.split_epsilon,
            ];

            for cut in cuts {
                let candidate = Self::evaluate_cut(volumes, &by_axis, axis, cut, settings);
                if candidate.cost < best.cost {
                    best = candidate;
                }
            }
        }

        best
    }

    /// Bucket the (sorted) boxes against one cut plane and price the result.
    fn evaluate_cut(
        volumes: &[BoundingVolume],
        sorted: &[usize],
        axis: Axis,
        cut: f32,
        settings: &PartitionSettings,
    ) -> SplitCandidate {
        let mut cost = 0.0f32;
        let mut low_volume = 0.0f32;
        let mut high_volume = 0.0f32;
        let mut low = Vec::new();
        let mut mid = Vec::new();
        let mut high = Vec::new();

        for &index in sorted {
            let bv = &volumes[index];
            let (min, max) = bv.interval(axis);

            if max < cut {
                low_volume += bv.volume();
                low.push(index);
            } else if min > cut {
                high_volume += bv.volume();
                high.push(index);
            } else {
                cost += bv.volume() * settings.cut_cost;
                mid.push(index);
            }

            cost += (low_volume - high_volume).abs();
        }

        SplitCandidate { axis, split: cut, cost, low, mid, high }
    }

    /// Index of the first box containing `point`, or None.
    ///
    /// Straddling boxes are tested before descending, since a point on
    /// either side of the plane may be inside them.
    pub fn query(&self, point: Vec3) -> Option<usize> {
        Self::query_node(&self.root, &self.volumes, point)
    }

    fn query_node(node: &PartitionNode, volumes: &[BoundingVolume], point: Vec3) -> Option<usize> {
        match node {
            PartitionNode::Leaf { volumes: indices } => indices
                .iter()
                .copied()
                .find(|&i| volumes[i].contains_point(point)),

            PartitionNode::Interior { axis, split, low, mid, high } => {
                if let Some(mid) = mid {
                    if let Some(hit) = Self::query_node(mid, volumes, point) {
                        return Some(hit);
                    }
                }

                if point[axis.index()] < *split {
                    Self::query_node(low, volumes, point)
                } else {
                    Self::query_node(high, volumes, point)
                }
            }
        }
    }

    /// Root node of the tree.
    pub fn root(&self) -> &PartitionNode {
        &self.root
    }

    /// Boxes the tree was built from, in input order.
    pub fn volumes(&self) -> &[BoundingVolume] {
        &self.volumes
    }

    /// Box by input index.
    pub fn volume(&self, index: usize) -> Option<&BoundingVolume> {
        self.volumes.get(index)
    }

    /// Number of indexed boxes.
    pub fn len(&self) -> usize {
        self.volumes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.volumes.is_empty()
    }

    /// Number of levels in the tree (a lone leaf is depth 1).
    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    /// Number of leaves, empty ones included.
    pub fn leaf_count(&self) -> usize {
        let mut count = 0;
        self.root.for_each_leaf(&mut |_: &[usize]| count += 1);
        count
    }
}

#[cfg(test)]
#[path = "spatial_partition_tree_tests.rs"]
mod tests;
