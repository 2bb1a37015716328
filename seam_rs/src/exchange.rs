//! Point-to-point ghost data exchange.
//!
//! For every adjacent pair of partitions on different ranks, each side
//! donates the boundary slice the other side's ghost band needs. Both
//! sides derive the slice regions from the same resolved table, so the
//! pairing is symmetric by construction: every send has exactly one
//! matching receive under the mirrored `(sender grid, receiver grid)` tag.
//!
//! All outgoing slices are sent before any receive is posted. Sends are
//! buffered, so this cannot deadlock; the receive loop then drains peers in
//! deterministic local order while tag matching absorbs any arrival order.
//!
//! Pairs that live on the same rank skip the communicator entirely and go
//! through the same build/apply path as a direct copy.

use seam_core::{ghost, Extent, Neighbor};
use seam_comm::format::{
    decode_ghost_slice, encode_ghost_slice, GhostSlice, NamedArray,
};
use seam_comm::{Communicator, MessageTag};

use crate::error::{Result, SeamError};
use crate::ghosted::GhostedGrid;
use crate::registry::LocalGrid;
use crate::table::ExtentTable;

/// Sample the donor's payload over the given regions into a wire slice.
///
/// `node_region` must lie inside the donor's extent and `cell_region`
/// inside its cell space; the planner guarantees both.
pub(crate) fn build_slice(
    donor: &LocalGrid,
    receiver: u32,
    node_region: Extent,
    cell_region: Option<Extent>,
) -> GhostSlice {
    let payload = &donor.payload;

    let mut node_flags = Vec::with_capacity(node_region.num_nodes());
    for (i, j, k) in node_region.nodes() {
        node_flags.push(payload.node_flags[donor.extent.node_offset(i, j, k)]);
    }

    let positions = payload.positions.as_ref().map(|src| {
        node_region
            .nodes()
            .map(|(i, j, k)| src[donor.extent.node_offset(i, j, k)])
            .collect()
    });

    let point_arrays = payload
        .point_arrays
        .iter()
        .map(|array| NamedArray {
            name: array.name.clone(),
            data: node_region
                .nodes()
                .map(|(i, j, k)| array.data[donor.extent.node_offset(i, j, k)])
                .collect(),
        })
        .collect();

    let donor_cells = donor.extent.cell_space();
    let mut cell_flags = Vec::new();
    let mut cell_arrays = Vec::new();
    if let Some(region) = cell_region {
        cell_flags.reserve(region.num_nodes());
        for (i, j, k) in region.nodes() {
            cell_flags.push(payload.cell_flags[donor_cells.node_offset(i, j, k)]);
        }
        cell_arrays = payload
            .cell_arrays
            .iter()
            .map(|array| NamedArray {
                name: array.name.clone(),
                data: region
                    .nodes()
                    .map(|(i, j, k)| array.data[donor_cells.node_offset(i, j, k)])
                    .collect(),
            })
            .collect();
    }

    GhostSlice {
        sender: donor.id,
        receiver,
        node_region,
        cell_region,
        node_flags,
        cell_flags,
        positions,
        point_arrays,
        cell_arrays,
    }
}

/// Write a donor slice into the ghost band of a ghosted grid.
///
/// Only entries outside the receiver's owned extent are written; the owned
/// region stays authoritative. Entries the donor itself marked ghost are
/// skipped too, so second-hand ghost data never masquerades as owned data.
pub(crate) fn apply_slice(ghosted: &mut GhostedGrid, owned: &Extent, slice: &GhostSlice) {
    // Match arrays by name once, not per node.
    let point_targets: Vec<Option<usize>> = slice
        .point_arrays
        .iter()
        .map(|a| {
            let target = ghosted.point_arrays.iter().position(|g| g.name == a.name);
            if target.is_none() {
                log::warn!(
                    "ghost slice for grid {} carries unknown point array '{}'",
                    ghosted.id,
                    a.name
                );
            }
            target
        })
        .collect();
    let cell_targets: Vec<Option<usize>> = slice
        .cell_arrays
        .iter()
        .map(|a| {
            let target = ghosted.cell_arrays.iter().position(|g| g.name == a.name);
            if target.is_none() {
                log::warn!(
                    "ghost slice for grid {} carries unknown cell array '{}'",
                    ghosted.id,
                    a.name
                );
            }
            target
        })
        .collect();

    for (src, (i, j, k)) in slice.node_region.nodes().enumerate() {
        if owned.contains_node(i, j, k)
            || !ghosted.extent.contains_node(i, j, k)
            || ghost::is_ghost(slice.node_flags[src])
        {
            continue;
        }
        let dst = ghosted.extent.node_offset(i, j, k);

        if let (Some(dst_pos), Some(src_pos)) = (&mut ghosted.positions, &slice.positions) {
            dst_pos[dst] = src_pos[src];
        }
        for (array, target) in slice.point_arrays.iter().zip(&point_targets) {
            if let Some(t) = target {
                ghosted.point_arrays[*t].data[dst] = array.data[src];
            }
        }
    }

    if let Some(region) = slice.cell_region {
        let owned_cells = owned.cell_space();
        let ghosted_cells = ghosted.extent.cell_space();
        for (src, (i, j, k)) in region.nodes().enumerate() {
            if owned_cells.contains_node(i, j, k)
                || !ghosted_cells.contains_node(i, j, k)
                || ghost::is_ghost(slice.cell_flags[src])
            {
                continue;
            }
            let dst = ghosted_cells.node_offset(i, j, k);
            for (array, target) in slice.cell_arrays.iter().zip(&cell_targets) {
                if let Some(t) = target {
                    ghosted.cell_arrays[*t].data[dst] = array.data[src];
                }
            }
        }
    }
}

/// Run the full ghost exchange for this rank's partitions.
///
/// `ghosted` is parallel to `locals` and already holds the owned data over
/// the grown extents. Collective in the loose sense: every rank with remote
/// adjacencies must run it with the same `width`, or the matching sends and
/// receives never pair up.
pub(crate) fn exchange_ghost_data(
    locals: &[LocalGrid],
    ghosted: &mut [GhostedGrid],
    neighbors: &[Vec<Neighbor>],
    table: &ExtentTable,
    width: i32,
    comm: &mut dyn Communicator,
) -> Result<()> {
    let my_rank = comm.rank();
    let whole = match table.whole_extent() {
        Some(whole) => whole,
        None => return Ok(()),
    };

    // Send every outgoing slice first; sends are buffered.
    let mut sent = 0usize;
    for (index, grid) in locals.iter().enumerate() {
        for neighbor in &neighbors[index] {
            let owner = table
                .rank(neighbor.id)
                .ok_or(SeamError::UnresolvedNeighbor { id: neighbor.id })?;
            if owner == my_rank {
                continue;
            }
            let receiver_extent = table
                .extent(neighbor.id)
                .ok_or(SeamError::UnresolvedNeighbor { id: neighbor.id })?;
            let receiver_ghosted = receiver_extent.grown(width).clamped(&whole);

            let node_region = match receiver_ghosted.intersection(&grid.extent) {
                Some(region) => region,
                None => continue,
            };
            let cell_region = receiver_ghosted
                .cell_space()
                .intersection(&grid.extent.cell_space());

            let slice = build_slice(grid, neighbor.id, node_region, cell_region);
            let bytes = encode_ghost_slice(&slice)?;
            comm.send(owner, MessageTag::new(grid.id, neighbor.id), &bytes)?;
            sent += 1;
        }
    }

    // Receive the mirrored slices, in deterministic local order.
    let mut received = 0usize;
    for (index, grid) in locals.iter().enumerate() {
        let my_ghosted_extent = ghosted[index].extent;
        for neighbor in &neighbors[index] {
            let owner = table
                .rank(neighbor.id)
                .ok_or(SeamError::UnresolvedNeighbor { id: neighbor.id })?;
            if owner == my_rank {
                continue;
            }
            let donor_extent = table
                .extent(neighbor.id)
                .ok_or(SeamError::UnresolvedNeighbor { id: neighbor.id })?;
            let expected_region = match my_ghosted_extent.intersection(&donor_extent) {
                Some(region) => region,
                None => continue,
            };

            let bytes = comm.recv(owner, MessageTag::new(neighbor.id, grid.id))?;
            let slice = decode_ghost_slice(&bytes)?;
            if slice.node_region != expected_region {
                return Err(SeamError::RegionMismatch {
                    sender: neighbor.id,
                    receiver: grid.id,
                    expected: expected_region,
                    got: slice.node_region,
                });
            }
            apply_slice(&mut ghosted[index], &grid.extent, &slice);
            received += 1;
        }
    }

    // Pairs owned by this rank: same path, no wire in between.
    let mut local_fills = 0usize;
    for index in 0..locals.len() {
        for neighbor in &neighbors[index] {
            let owner = table
                .rank(neighbor.id)
                .ok_or(SeamError::UnresolvedNeighbor { id: neighbor.id })?;
            if owner != my_rank || neighbor.id == locals[index].id {
                continue;
            }
            let donor_index = locals
                .iter()
                .position(|g| g.id == neighbor.id)
                .ok_or(SeamError::UnresolvedNeighbor { id: neighbor.id })?;

            let node_region = match ghosted[index].extent.intersection(&locals[donor_index].extent)
            {
                Some(region) => region,
                None => continue,
            };
            let cell_region = ghosted[index]
                .extent
                .cell_space()
                .intersection(&locals[donor_index].extent.cell_space());

            let slice = build_slice(
                &locals[donor_index],
                locals[index].id,
                node_region,
                cell_region,
            );
            apply_slice(&mut ghosted[index], &locals[index].extent, &slice);
            local_fills += 1;
        }
    }

    log::info!(
        "ghost exchange on rank {}: {} slices sent, {} received, {} local fills",
        my_rank,
        sent,
        received,
        local_fills
    );

    Ok(())
}
