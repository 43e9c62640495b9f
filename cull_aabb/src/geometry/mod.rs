//! Geometry module: axis-aligned boxes, axes and faces.

mod bounding_volume;

pub use bounding_volume::{Axis, BoundingVolume, Side};
