//! Ghosted output grids.
//!
//! `create_ghost_layers` never mutates the registered payloads: for each
//! local partition it allocates a [`GhostedGrid`] over the grown extent,
//! copies the owned data in, and lets the exchange fill the ghost band.
//! Nodes and cells outside the original extent start marked ghost and stay
//! marked ghost; only their values change as donor slices arrive.

use seam_core::{ghost, Extent};

use crate::registry::{FieldArray, LocalGrid};

/// One local partition extended by a ghost band.
#[derive(Debug, Clone, PartialEq)]
pub struct GhostedGrid {
    /// Partition id this ghosted grid extends.
    pub id: u32,
    /// The grown extent (original extent plus the clamped ghost band).
    pub extent: Extent,
    /// Node positions over the grown extent, when the source had geometry.
    /// Ghost node positions start at the origin until a donor supplies
    /// them.
    pub positions: Option<Vec<[f32; 3]>>,
    /// Point-associated arrays over the grown extent, same names and order
    /// as the source payload.
    pub point_arrays: Vec<FieldArray>,
    /// Cell-associated arrays over the grown extent's cells.
    pub cell_arrays: Vec<FieldArray>,
    /// Ghost marker per node of the grown extent.
    pub node_flags: Vec<u8>,
    /// Ghost marker per cell of the grown extent.
    pub cell_flags: Vec<u8>,
}

impl GhostedGrid {
    /// Allocate a ghosted grid over `ghosted_extent` and copy the owned
    /// data of `grid` into place.
    pub(crate) fn from_local(grid: &LocalGrid, ghosted_extent: Extent) -> Self {
        let nodes = ghosted_extent.num_nodes();
        let ghosted_cells = ghosted_extent.cell_space();
        let cells = ghosted_cells.num_nodes();

        let mut out = Self {
            id: grid.id,
            extent: ghosted_extent,
            positions: grid
                .payload
                .positions
                .as_ref()
                .map(|_| vec![[0.0f32; 3]; nodes]),
            point_arrays: grid
                .payload
                .point_arrays
                .iter()
                .map(|a| FieldArray::new(a.name.clone(), vec![0.0; nodes]))
                .collect(),
            cell_arrays: grid
                .payload
                .cell_arrays
                .iter()
                .map(|a| FieldArray::new(a.name.clone(), vec![0.0; cells]))
                .collect(),
            node_flags: vec![ghost::GHOST; nodes],
            cell_flags: vec![ghost::GHOST; cells],
        };

        // Owned nodes: copy values and carry over the caller's markers.
        for (src, (i, j, k)) in grid.extent.nodes().enumerate() {
            let dst = ghosted_extent.node_offset(i, j, k);
            out.node_flags[dst] = grid.payload.node_flags[src];
            if let (Some(dst_pos), Some(src_pos)) = (&mut out.positions, &grid.payload.positions) {
                dst_pos[dst] = src_pos[src];
            }
            for (dst_array, src_array) in out.point_arrays.iter_mut().zip(&grid.payload.point_arrays)
            {
                dst_array.data[dst] = src_array.data[src];
            }
        }

        // Owned cells, addressed through the cell spaces.
        let owned_cells = grid.extent.cell_space();
        for (src, (i, j, k)) in owned_cells.nodes().enumerate() {
            let dst = ghosted_cells.node_offset(i, j, k);
            out.cell_flags[dst] = grid.payload.cell_flags[src];
            for (dst_array, src_array) in out.cell_arrays.iter_mut().zip(&grid.payload.cell_arrays)
            {
                dst_array.data[dst] = src_array.data[src];
            }
        }

        out
    }

    /// Look up a point array by name.
    pub fn point_array(&self, name: &str) -> Option<&FieldArray> {
        self.point_arrays.iter().find(|a| a.name == name)
    }

    /// Look up a cell array by name.
    pub fn cell_array(&self, name: &str) -> Option<&FieldArray> {
        self.cell_arrays.iter().find(|a| a.name == name)
    }
}
