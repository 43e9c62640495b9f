//! Partition module: point location over cull-region boxes.

mod spatial_partition_tree;

pub use spatial_partition_tree::{PartitionNode, SpatialPartitionTree};
