//! Structural adjacency between partition extents.
//!
//! Two partitions are neighbors when their closed extents touch: partitions
//! of a structured dataset share their boundary nodes, so `[0,5]` and
//! `[5,10]` intersect in the node plane `i = 5`. The dimensionality of that
//! shared region classifies the contact as face, edge, or corner adjacency;
//! a wider intersection means the boxes genuinely overlap.
//!
//! Everything here is a pure function of the extents involved. Given the
//! same extent table on every process, every process derives the same
//! neighbor sets.

use crate::extent::Extent;

#[cfg(feature = "alloc")]
use alloc::vec::Vec;

/// Position of a neighbor relative to a reference partition along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AxisRelation {
    /// The neighbor ends where the reference begins (touches from below).
    Low,
    /// The neighbor begins where the reference ends (touches from above).
    High,
    /// The neighbor spans exactly the reference range.
    Equal,
    /// The neighbor range properly overlaps the reference range.
    Interior,
}

/// Per-axis relative placement of a neighbor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Orientation(pub [AxisRelation; 3]);

/// Contact classification by shared-region dimensionality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdjacencyKind {
    /// The extents share a full (d-1)-dimensional boundary slab.
    Face,
    /// The extents meet along a line of nodes.
    Edge,
    /// The extents meet at a single node.
    Corner,
    /// The extents share interior index space.
    Overlap,
}

/// One resolved neighbor relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Neighbor {
    /// Id of the adjacent partition.
    pub id: u32,
    /// The shared node region (closed intersection of the two extents).
    pub overlap: Extent,
    /// Where the neighbor sits relative to the reference partition.
    pub orientation: Orientation,
    /// Face, edge, corner, or genuine overlap.
    pub kind: AdjacencyKind,
}

/// Classify the contact between `reference` and `other`.
///
/// Returns `None` when the extents do not touch at all. Flat axes shared by
/// both extents (2D data) are ignored for the face/edge/corner count, so two
/// 2D partitions touching along a line still classify as `Face`.
pub fn classify(reference: &Extent, other: &Extent) -> Option<(Extent, Orientation, AdjacencyKind)> {
    let overlap = reference.intersection(other)?;

    let orientation = Orientation([
        axis_relation(reference.imin, reference.imax, other.imin, other.imax),
        axis_relation(reference.jmin, reference.jmax, other.jmin, other.jmax),
        axis_relation(reference.kmin, reference.kmax, other.kmin, other.kmax),
    ]);

    // An axis counts toward contact dimensionality when the shared region is
    // a single node plane there, unless the axis is flat in the union (2D
    // data has no extent to share along its missing dimension).
    let union = reference.union(other);
    let overlap_dims = overlap.node_dims();
    let union_dims = union.node_dims();
    let mut degenerate = 0;
    for axis in 0..3 {
        if union_dims[axis] > 1 && overlap_dims[axis] == 1 {
            degenerate += 1;
        }
    }

    let kind = match degenerate {
        0 => AdjacencyKind::Overlap,
        1 => AdjacencyKind::Face,
        2 => AdjacencyKind::Edge,
        _ => AdjacencyKind::Corner,
    };

    Some((overlap, orientation, kind))
}

/// True iff the two extents touch or overlap.
#[inline]
pub fn are_adjacent(a: &Extent, b: &Extent) -> bool {
    a.intersection(b).is_some()
}

/// The region of `donor` that `receiver` needs for a ghost layer of the
/// given width.
///
/// This is the intersection of the receiver's grown extent with the donor's
/// extent. It includes the shared boundary nodes the receiver already owns;
/// a receiver writes only the nodes outside its own extent. Returns `None`
/// for a non-positive width or when the grown extent misses the donor.
pub fn ghost_region(receiver: &Extent, donor: &Extent, width: i32) -> Option<Extent> {
    if width <= 0 {
        return None;
    }
    receiver.grown(width).intersection(donor)
}

/// Compute the neighbor set of partition `id` from a complete extent list.
///
/// `extents` holds `(id, extent)` pairs for every known partition; the entry
/// for `id` itself is skipped. Deterministic: the result order follows the
/// input order.
#[cfg(feature = "alloc")]
pub fn find_neighbors(id: u32, extents: &[(u32, Extent)]) -> Vec<Neighbor> {
    let reference = match extents.iter().find(|(other, _)| *other == id) {
        Some((_, e)) => *e,
        None => return Vec::new(),
    };

    let mut neighbors = Vec::new();
    for (other_id, other) in extents {
        if *other_id == id {
            continue;
        }
        if let Some((overlap, orientation, kind)) = classify(&reference, other) {
            neighbors.push(Neighbor {
                id: *other_id,
                overlap,
                orientation,
                kind,
            });
        }
    }
    neighbors
}

#[inline]
fn axis_relation(ref_min: i32, ref_max: i32, other_min: i32, other_max: i32) -> AxisRelation {
    if other_min == ref_min && other_max == ref_max {
        AxisRelation::Equal
    } else if other_max <= ref_min {
        AxisRelation::Low
    } else if other_min >= ref_max {
        AxisRelation::High
    } else {
        AxisRelation::Interior
    }
}
