//! Locally registered partitions and their payloads.
//!
//! Registration is purely local: each process registers only the partitions
//! it owns, in any order, before the collective table exchange. The payload
//! arrays stay owned by this registry for the lifetime of the connectivity
//! instance; ghost construction reads them but never writes them, so the
//! registered data remains the authoritative copy.

use seam_core::{ghost, Extent};

use crate::error::{Result, SeamError};

/// A named flat array of f32 values attached to a partition.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldArray {
    /// Array name; ghost exchange matches donor and receiver arrays by it.
    pub name: String,
    /// One value per node (point arrays) or per cell (cell arrays).
    pub data: Vec<f32>,
}

impl FieldArray {
    /// Create a named array.
    pub fn new(name: impl Into<String>, data: Vec<f32>) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }
}

/// Caller-supplied data for one locally owned partition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridPayload {
    /// Node positions, when the grid carries geometry.
    pub positions: Option<Vec<[f32; 3]>>,
    /// Point-associated arrays, one value per node of the extent.
    pub point_arrays: Vec<FieldArray>,
    /// Cell-associated arrays, one value per cell of the extent.
    pub cell_arrays: Vec<FieldArray>,
    /// Ghost marker per node (zero = real).
    pub node_flags: Vec<u8>,
    /// Ghost marker per cell (zero = real).
    pub cell_flags: Vec<u8>,
}

impl GridPayload {
    /// Create a payload with all-real markers sized for `extent` and no
    /// field arrays.
    pub fn for_extent(extent: &Extent) -> Self {
        Self {
            positions: None,
            point_arrays: Vec::new(),
            cell_arrays: Vec::new(),
            node_flags: vec![ghost::REAL; extent.num_nodes()],
            cell_flags: vec![ghost::REAL; extent.num_cells()],
        }
    }

    /// Validate every array length against the extent geometry.
    pub fn validate(&self, grid: u32, extent: &Extent) -> Result<()> {
        let nodes = extent.num_nodes();
        let cells = extent.num_cells();

        check_len(grid, "node ghost markers", nodes, self.node_flags.len())?;
        check_len(grid, "cell ghost markers", cells, self.cell_flags.len())?;
        if let Some(positions) = &self.positions {
            check_len(grid, "positions", nodes, positions.len())?;
        }
        for array in &self.point_arrays {
            check_len(grid, &array.name, nodes, array.data.len())?;
        }
        for array in &self.cell_arrays {
            check_len(grid, &array.name, cells, array.data.len())?;
        }
        Ok(())
    }
}

fn check_len(grid: u32, array: &str, expected: usize, got: usize) -> Result<()> {
    if expected == got {
        Ok(())
    } else {
        Err(SeamError::PayloadShape {
            grid,
            array: array.into(),
            expected,
            got,
        })
    }
}

/// One locally owned partition.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalGrid {
    /// Partition id, unique across the distributed dataset.
    pub id: u32,
    /// The partition's index-space extent.
    pub extent: Extent,
    /// The caller's data for this partition.
    pub payload: GridPayload,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_extent_shapes() {
        let extent = Extent::new(0, 5, 0, 5, 0, 0);
        let payload = GridPayload::for_extent(&extent);
        assert_eq!(payload.node_flags.len(), 36);
        assert_eq!(payload.cell_flags.len(), 25);
        assert!(payload.validate(0, &extent).is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_array() {
        let extent = Extent::new(0, 5, 0, 5, 0, 0);
        let mut payload = GridPayload::for_extent(&extent);
        payload
            .point_arrays
            .push(FieldArray::new("pressure", vec![0.0; 35]));

        let err = payload.validate(7, &extent).unwrap_err();
        match err {
            SeamError::PayloadShape {
                grid,
                array,
                expected,
                got,
            } => {
                assert_eq!(grid, 7);
                assert_eq!(array, "pressure");
                assert_eq!(expected, 36);
                assert_eq!(got, 35);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
