/// Portal: a one-way visibility window between two cells.
///
/// A portal is the quad where two cull regions meet. Every adjacency
/// produces two of them, one leading out of each cell, with opposite
/// winding. Seen from inside `cell_in` the vertices run anticlockwise,
/// so the right-handed normal points back into `cell_in`.

use glam::Vec3;
use crate::geometry::{Axis, BoundingVolume, Side};

/// Unit square in the (u, v) frame of a face, anticlockwise around +w.
const SQUARE: [(usize, usize); 4] = [(0, 0), (0, 1), (1, 1), (1, 0)];

/// Vertex order that flips the winding of a quad while keeping vertex 0.
const REVERSED: [usize; 4] = [0, 3, 2, 1];

/// A planar quad joining two cells, indexed by volume.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Portal {
    /// Axis the shared face is perpendicular to
    pub axis: Axis,
    /// Cell the portal is seen from
    pub cell_in: usize,
    /// Cell visible through the portal
    pub cell_out: usize,
    /// World-space corners, anticlockwise seen from `cell_in`
    pub vertices: [Vec3; 4],
}

impl Portal {
    /// Build the portal covering one face of `volume`.
    ///
    /// The quad is laid out in the face's (u, v) frame and then reordered
    /// if needed so it winds anticlockwise around the box centre.
    pub fn from_face(
        volume: &BoundingVolume,
        axis: Axis,
        side: Side,
        cell_in: usize,
        cell_out: usize,
    ) -> Self {
        let [u, v] = axis.cross_axes();
        let plane = volume.face(axis, side);
        let (u_min, u_max) = volume.interval(u);
        let (v_min, v_max) = volume.interval(v);

        let mut quad = [Vec3::ZERO; 4];
        for (corner, &(su, sv)) in quad.iter_mut().zip(SQUARE.iter()) {
            corner[axis.index()] = plane;
            corner[u.index()] = if su == 0 { u_min } else { u_max };
            corner[v.index()] = if sv == 0 { v_min } else { v_max };
        }

        // Triple product sign of the offsets from the centre gives the winding
        let centre = volume.centroid();
        let off: [Vec3; 4] = quad.map(|corner| corner - centre);
        let ind = off[1].dot(off[0].cross(off[2]));
        if ind < 0.0 {
            quad = REVERSED.map(|i| quad[i]);
        }

        Self { axis, cell_in, cell_out, vertices: quad }
    }

    /// The same window seen from the other cell.
    pub fn mirrored(&self) -> Self {
        Self {
            axis: self.axis,
            cell_in: self.cell_out,
            cell_out: self.cell_in,
            vertices: REVERSED.map(|i| self.vertices[i]),
        }
    }

    /// Average of the four corners.
    pub fn centroid(&self) -> Vec3 {
        self.vertices.iter().copied().sum::<Vec3>() * 0.25
    }

    /// Unit normal from the winding; points into `cell_in`.
    ///
    /// Zero for a degenerate quad.
    pub fn normal(&self) -> Vec3 {
        let [a, b, c, _] = self.vertices;
        (b - a).cross(c - a).normalize_or_zero()
    }

    /// Corners relative to `origin`, for hosts that place the portal node there.
    pub fn local_vertices(&self, origin: Vec3) -> [Vec3; 4] {
        self.vertices.map(|vertex| vertex - origin)
    }

    /// Area of the quad.
    pub fn area(&self) -> f32 {
        let [a, b, c, _] = self.vertices;
        (b - a).length() * (c - b).length()
    }
}

#[cfg(test)]
#[path = "portal_tests.rs"]
mod tests;
