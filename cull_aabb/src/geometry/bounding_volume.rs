/// BoundingVolume: the axis-aligned box behind every culling cell.
///
/// Each cull-region marker of a level becomes one BoundingVolume. The same
/// boxes key the spatial partition tree, bound the visibility cells, and
/// meet each other on the faces that become portals.

use std::fmt;
use glam::Vec3;

/// One of the three world axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// All axes in index order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Component index (0, 1, 2) of this axis in a `Vec3`.
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// Axis for a component index, wrapping modulo 3.
    pub fn from_index(index: usize) -> Axis {
        Axis::ALL[index % 3]
    }

    /// The two cross axes, in cyclic order `(axis + 1, axis + 2)`.
    ///
    /// The cyclic order matters: portal quads are laid out in this
    /// (u, v) frame before their winding is fixed.
    pub fn cross_axes(self) -> [Axis; 2] {
        let i = self.index();
        [Axis::from_index(i + 1), Axis::from_index(i + 2)]
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => write!(f, "x"),
            Axis::Y => write!(f, "y"),
            Axis::Z => write!(f, "z"),
        }
    }
}

/// Low or high face of a box along an axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Low,
    High,
}

impl Side {
    /// 0 for the low face, 1 for the high face.
    pub fn index(self) -> usize {
        match self {
            Side::Low => 0,
            Side::High => 1,
        }
    }

    pub fn opposite(self) -> Side {
        match self {
            Side::Low => Side::High,
            Side::High => Side::Low,
        }
    }
}

/// Axis-aligned bounding box in world space.
///
/// Invariant: `min <= max` on every axis. Boxes with zero extent are legal
/// and simply have zero volume.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingVolume {
    /// Minimum corner (x, y, z)
    pub min: Vec3,
    /// Maximum corner (x, y, z)
    pub max: Vec3,
}

impl BoundingVolume {
    /// Create a box from two opposite corners, in any order.
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Create a box from per-axis `(min, max)` intervals.
    pub fn from_intervals(x: (f32, f32), y: (f32, f32), z: (f32, f32)) -> Self {
        Self::new(Vec3::new(x.0, y.0, z.0), Vec3::new(x.1, y.1, z.1))
    }

    /// Midpoint of the box on every axis.
    pub fn centroid(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Full size of the box on every axis.
    pub fn extents(&self) -> Vec3 {
        self.max - self.min
    }

    /// Product of the three extents.
    pub fn volume(&self) -> f32 {
        let e = self.extents();
        e.x * e.y * e.z
    }

    /// `(min, max)` interval on one axis.
    pub fn interval(&self, axis: Axis) -> (f32, f32) {
        (self.min[axis.index()], self.max[axis.index()])
    }

    /// Coordinate of the given face plane.
    pub fn face(&self, axis: Axis, side: Side) -> f32 {
        match side {
            Side::Low => self.min[axis.index()],
            Side::High => self.max[axis.index()],
        }
    }

    /// Move one face plane, keeping `min <= max`.
    pub(crate) fn set_face(&mut self, axis: Axis, side: Side, value: f32) {
        let i = axis.index();
        match side {
            Side::Low => self.min[i] = value.min(self.max[i]),
            Side::High => self.max[i] = value.max(self.min[i]),
        }
    }

    /// Inclusive point containment test.
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.x >= self.min.x && point.x <= self.max.x
        && point.y >= self.min.y && point.y <= self.max.y
        && point.z >= self.min.z && point.z <= self.max.z
    }

    /// Test if two boxes overlap or touch.
    pub fn intersects(&self, other: &BoundingVolume) -> bool {
        self.min.x <= other.max.x && self.max.x >= other.min.x
        && self.min.y <= other.max.y && self.max.y >= other.min.y
        && self.min.z <= other.max.z && self.max.z >= other.min.z
    }
}

impl fmt::Display for BoundingVolume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{({}, {}), ({}, {}), ({}, {})}}",
            self.min.x, self.max.x, self.min.y, self.max.y, self.min.z, self.max.z
        )
    }
}

#[cfg(test)]
#[path = "bounding_volume_tests.rs"]
mod tests;
