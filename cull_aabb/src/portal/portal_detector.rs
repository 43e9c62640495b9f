/// Portal detection: face-to-face adjacency between cull regions.
///
/// One sweep per axis. Every box contributes a push event at its min and a
/// pop event at its max; boxes between their push and pop are active. Each
/// event box is compared with the active boxes that it meets on the sweep
/// axis. A valid adjacency has one box face fully inside the other box
/// face; anything else where the two faces touch is a level authoring
/// error and aborts detection.
///
/// Linked boxes are nudged so they overlap by exactly `overlap` on the
/// sweep axis, which keeps the shared plane inside both cells. Every test
/// runs against the boxes as authored; the nudges only land in the adjusted
/// copy returned in the `PortalGraph`, so a nudge on one axis never changes
/// what matches on the next.

use rustc_hash::FxHashSet;
use crate::cull_error;
use crate::error::{GeometryError, Result};
use crate::geometry::{Axis, BoundingVolume, Side};
use super::portal::Portal;

const SOURCE: &str = "cullaabb::PortalDetector";

/// Portal indices per face of one volume, indexed `[axis][side]`.
pub type FaceLinks = [[Vec<usize>; 2]; 3];

/// Result of portal detection.
#[derive(Debug, Clone, Default)]
pub struct PortalGraph {
    /// Input boxes after the overlap adjustment, same order as the input
    volumes: Vec<BoundingVolume>,
    /// Two portals per adjacency, each twin directly after its original
    portals: Vec<Portal>,
    /// Outbound portals of every face of every volume
    face_links: Vec<FaceLinks>,
}

impl PortalGraph {
    /// Adjusted boxes, indexed like the input.
    pub fn volumes(&self) -> &[BoundingVolume] {
        &self.volumes
    }

    /// All portals, both directions.
    pub fn portals(&self) -> &[Portal] {
        &self.portals
    }

    pub fn portal(&self, index: usize) -> Option<&Portal> {
        self.portals.get(index)
    }

    /// Number of adjacencies (half the portal count).
    pub fn adjacency_count(&self) -> usize {
        self.portals.len() / 2
    }

    /// Portals leading out of `volume` through one of its faces.
    pub fn face_portals(&self, volume: usize, axis: Axis, side: Side) -> &[usize] {
        match self.face_links.get(volume) {
            Some(links) => &links[axis.index()][side.index()],
            None => &[],
        }
    }

    /// Portals leading out of `volume`.
    pub fn portals_from(&self, volume: usize) -> impl Iterator<Item = &Portal> + '_ {
        self.portals.iter().filter(move |portal| portal.cell_in == volume)
    }

    /// Split into adjusted volumes and portals.
    pub fn into_parts(self) -> (Vec<BoundingVolume>, Vec<Portal>) {
        (self.volumes, self.portals)
    }
}

/// Event kind. Pushes sort before pops at equal coordinates so that boxes
/// which exactly touch are active together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum EventKind {
    Push,
    Pop,
}

#[derive(Debug, Clone, Copy)]
struct SweepEvent {
    coordinate: f32,
    kind: EventKind,
    volume: usize,
}

/// Detect every adjacency between `volumes` and build its portal pair.
///
/// # Errors
///
/// `GeometryInconsistency` when two boxes meet with partially overlapping
/// faces, or when one face is fully inside the faces of two other boxes.
pub fn detect_portals(volumes: &[BoundingVolume], overlap: f32) -> Result<PortalGraph> {
    let mut graph = PortalGraph {
        volumes: volumes.to_vec(),
        portals: Vec::new(),
        face_links: vec![FaceLinks::default(); volumes.len()],
    };

    // Equal faces match from both sides; link each pair once per axis
    let mut linked: FxHashSet<(usize, usize, Axis)> = FxHashSet::default();

    for axis in Axis::ALL {
        sweep_axis(&mut graph, volumes, axis, overlap, &mut linked)?;
    }

    Ok(graph)
}

fn sweep_axis(
    graph: &mut PortalGraph,
    authored: &[BoundingVolume],
    axis: Axis,
    overlap: f32,
    linked: &mut FxHashSet<(usize, usize, Axis)>,
) -> Result<()> {
    let mut events = Vec::with_capacity(authored.len() * 2);
    for (index, bv) in authored.iter().enumerate() {
        let (min, max) = bv.interval(axis);
        events.push(SweepEvent { coordinate: min, kind: EventKind::Push, volume: index });
        events.push(SweepEvent { coordinate: max, kind: EventKind::Pop, volume: index });
    }
    events.sort_by(|a, b| {
        a.coordinate
            .total_cmp(&b.coordinate)
            .then(a.kind.cmp(&b.kind))
            .then(a.volume.cmp(&b.volume))
    });

    let mut active: Vec<usize> = Vec::new();

    for event in events {
        if event.kind == EventKind::Pop {
            active.retain(|&index| index != event.volume);
        }

        let mut matched = false;
        for &other in &active {
            link_faces(graph, authored, event.volume, other, axis, overlap, &mut matched, linked)?;
        }

        if event.kind == EventKind::Push {
            active.push(event.volume);
        }
    }

    Ok(())
}

/// Compare the event box with one active box and link them if one face
/// holds the other. `matched` records a full match for this event.
#[allow(clippy::too_many_arguments)]
fn link_faces(
    graph: &mut PortalGraph,
    authored: &[BoundingVolume],
    volume: usize,
    other: usize,
    axis: Axis,
    overlap: f32,
    matched: &mut bool,
    linked: &mut FxHashSet<(usize, usize, Axis)>,
) -> Result<()> {
    let bv = authored[volume];
    let ob = authored[other];
    if !bv.intersects(&ob) {
        return Ok(());
    }

    let (v_min, v_max) = bv.interval(axis);
    let (o_min, o_max) = ob.interval(axis);

    // Only staggered intervals can meet face to face; nested ones cannot
    let upper = v_min > o_min && v_max > o_max;
    let lower = v_min < o_min && v_max < o_max;
    if !upper && !lower {
        return Ok(());
    }

    // Touching along an edge or a thin strip is not an adjacency
    let edge = 2.0 * overlap.max(0.0);
    if axis.cross_axes().iter().any(|&c| overlap_length(&bv, &ob, c) <= edge) {
        return Ok(());
    }

    let within = face_within(&bv, &ob, axis);
    if total(&within) < 4 {
        // The other box's face sits inside ours: its own event links it
        if total(&face_within(&ob, &bv, axis)) == 4 {
            return Ok(());
        }
        let err = GeometryError::PartialInterception { axis, within, volume: bv, other: ob };
        cull_error!(SOURCE, "{}", err);
        return Err(err.into());
    }

    if *matched {
        let err = GeometryError::DoubleInterception { axis, volume: bv };
        cull_error!(SOURCE, "{}", err);
        return Err(err.into());
    }
    *matched = true;

    if !linked.insert((volume.min(other), volume.max(other), axis)) {
        return Ok(());
    }

    // Pull the event box's face onto the other box, overlapping by `overlap`
    let side = if upper { Side::Low } else { Side::High };
    let target = match side {
        Side::Low => o_max - overlap,
        Side::High => o_min + overlap,
    };
    graph.volumes[volume].set_face(axis, side, target);

    let portal = Portal::from_face(&graph.volumes[volume], axis, side, volume, other);
    let twin = portal.mirrored();

    let index = graph.portals.len();
    graph.portals.push(portal);
    graph.portals.push(twin);
    graph.face_links[volume][axis.index()][side.index()].push(index);
    graph.face_links[other][axis.index()][side.opposite().index()].push(index + 1);

    Ok(())
}

/// Per-axis count of `bv`'s bounds inside `other`'s interval, 0 on `axis`.
fn face_within(bv: &BoundingVolume, other: &BoundingVolume, axis: Axis) -> [u8; 3] {
    let mut within = [0u8; 3];
    for c in axis.cross_axes() {
        let (min, max) = bv.interval(c);
        let (o_min, o_max) = other.interval(c);
        within[c.index()] = [min, max]
            .iter()
            .filter(|&&bound| bound >= o_min && bound <= o_max)
            .count() as u8;
    }
    within
}

fn total(within: &[u8; 3]) -> u8 {
    within.iter().sum()
}

fn overlap_length(a: &BoundingVolume, b: &BoundingVolume, axis: Axis) -> f32 {
    let (a_min, a_max) = a.interval(axis);
    let (b_min, b_max) = b.interval(axis);
    a_max.min(b_max) - a_min.max(b_min)
}

#[cfg(test)]
#[path = "portal_detector_tests.rs"]
mod tests;
