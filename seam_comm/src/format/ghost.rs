//! Ghost slice message encoding.
//!
//! A ghost slice carries one donor partition's boundary data to one
//! receiving partition on another process. It covers two regions that both
//! sides derive from the same extent table: a node region (intersection of
//! the receiver's ghosted extent with the donor's extent) and a cell region
//! (intersection of the corresponding cell spaces — which is not the cell
//! space of the node intersection when the partitions share only a node
//! plane). Carrying both explicitly lets the decoder validate every array
//! length before anything is written.
//!
//! # Format Specification
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────────┐
//! │ HEADER (16 bytes, kind = GhostSlice, count = total array count)    │
//! ├────────────────────────────────────────────────────────────────────┤
//! │ sender grid id (u32 LE)                                            │
//! │ receiver grid id (u32 LE)                                          │
//! │ node region (6 x i32 LE)                                           │
//! │ cell region (6 x i32 LE; all zero when absent)                     │
//! │ flags (u8; bit 0 = positions, bit 1 = cell region present),        │
//! │   reserved (3 bytes)                                               │
//! │ point array count (u16 LE), cell array count (u16 LE)              │
//! ├────────────────────────────────────────────────────────────────────┤
//! │ node ghost markers (node region node count bytes)                  │
//! │ cell ghost markers (cell region cell count bytes)                  │
//! ├────────────────────────────────────────────────────────────────────┤
//! │ positions, if present (node count x 3 x f32 LE)                    │
//! ├────────────────────────────────────────────────────────────────────┤
//! │ For each point array, then each cell array:                        │
//! │   name length (u16 LE), name (UTF-8),                              │
//! │   values (node count or cell count x f32 LE)                       │
//! └────────────────────────────────────────────────────────────────────┘
//! ```

use seam_core::Extent;

use super::header::{PayloadKind, WireHeader, HEADER_SIZE};
use crate::error::{CommError, Result};

#[cfg(feature = "alloc")]
use alloc::{string::String, vec::Vec};

/// Positions-present bit in the ghost slice flags byte.
const FLAG_POSITIONS: u8 = 1;

/// Cell-region-present bit in the ghost slice flags byte.
const FLAG_CELL_REGION: u8 = 2;

/// A named flat array of f32 values.
#[cfg(feature = "alloc")]
#[derive(Debug, Clone, PartialEq)]
pub struct NamedArray {
    /// Array name, matched against the receiver's arrays by name.
    pub name: String,
    /// One value per node or per cell of the slice region.
    pub data: Vec<f32>,
}

/// One donor-to-receiver ghost slice.
#[cfg(feature = "alloc")]
#[derive(Debug, Clone, PartialEq)]
pub struct GhostSlice {
    /// Grid id of the donor partition.
    pub sender: u32,
    /// Grid id of the receiving partition.
    pub receiver: u32,
    /// Node region the slice covers, in global index space.
    pub node_region: Extent,
    /// Cell region the slice covers, as a box in cell space (each node of
    /// this box names one cell by its lowest corner). `None` when the pair
    /// shares no cells.
    pub cell_region: Option<Extent>,
    /// Donor-side ghost markers for the region's nodes.
    pub node_flags: Vec<u8>,
    /// Donor-side ghost markers for the region's cells.
    pub cell_flags: Vec<u8>,
    /// Node positions over the region, when the donor maintains geometry.
    pub positions: Option<Vec<[f32; 3]>>,
    /// Point-associated arrays, one value per region node.
    pub point_arrays: Vec<NamedArray>,
    /// Cell-associated arrays, one value per region cell.
    pub cell_arrays: Vec<NamedArray>,
}

#[cfg(feature = "alloc")]
impl GhostSlice {
    /// Number of cells covered by the cell region.
    pub fn num_region_cells(&self) -> usize {
        self.cell_region.map_or(0, |r| r.num_nodes())
    }

    /// Validate that every array length matches the region geometry.
    pub fn validate(&self) -> Result<()> {
        let nodes = self.node_region.num_nodes();
        let cells = self.num_region_cells();

        check_len("node markers", nodes, self.node_flags.len())?;
        check_len("cell markers", cells, self.cell_flags.len())?;
        if let Some(positions) = &self.positions {
            check_len("positions", nodes, positions.len())?;
        }
        for array in &self.point_arrays {
            check_len("point array", nodes, array.data.len())?;
        }
        for array in &self.cell_arrays {
            check_len("cell array", cells, array.data.len())?;
        }
        Ok(())
    }
}

#[cfg(feature = "alloc")]
fn check_len(field: &'static str, expected: usize, got: usize) -> Result<()> {
    if expected == got {
        Ok(())
    } else {
        Err(CommError::LengthMismatch {
            field,
            expected,
            got,
        })
    }
}

/// Encode a ghost slice into a framed wire payload.
///
/// # Errors
/// Returns `LengthMismatch` when an array disagrees with its region.
#[cfg(feature = "alloc")]
pub fn encode_ghost_slice(slice: &GhostSlice) -> Result<Vec<u8>> {
    slice.validate()?;

    let total_arrays = slice.point_arrays.len() + slice.cell_arrays.len();
    let header = WireHeader::new(PayloadKind::GhostSlice, total_arrays as u32);

    let mut bytes = Vec::new();
    bytes.extend_from_slice(&header.to_bytes());
    bytes.extend_from_slice(&slice.sender.to_le_bytes());
    bytes.extend_from_slice(&slice.receiver.to_le_bytes());
    for bound in slice.node_region.as_array() {
        bytes.extend_from_slice(&bound.to_le_bytes());
    }
    for bound in slice.cell_region.unwrap_or(Extent::new(0, 0, 0, 0, 0, 0)).as_array() {
        bytes.extend_from_slice(&bound.to_le_bytes());
    }

    let mut flags = 0u8;
    if slice.positions.is_some() {
        flags |= FLAG_POSITIONS;
    }
    if slice.cell_region.is_some() {
        flags |= FLAG_CELL_REGION;
    }
    bytes.extend_from_slice(&[flags, 0, 0, 0]);
    bytes.extend_from_slice(&(slice.point_arrays.len() as u16).to_le_bytes());
    bytes.extend_from_slice(&(slice.cell_arrays.len() as u16).to_le_bytes());

    bytes.extend_from_slice(&slice.node_flags);
    bytes.extend_from_slice(&slice.cell_flags);

    if let Some(positions) = &slice.positions {
        for p in positions {
            for component in p {
                bytes.extend_from_slice(&component.to_le_bytes());
            }
        }
    }

    for array in slice.point_arrays.iter().chain(slice.cell_arrays.iter()) {
        bytes.extend_from_slice(&(array.name.len() as u16).to_le_bytes());
        bytes.extend_from_slice(array.name.as_bytes());
        for &value in &array.data {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
    }

    Ok(bytes)
}

/// Decode a framed ghost slice.
#[cfg(feature = "alloc")]
pub fn decode_ghost_slice(payload: &[u8]) -> Result<GhostSlice> {
    let header = WireHeader::decode(payload, PayloadKind::GhostSlice)?;
    let mut cursor = Cursor::new(&payload[HEADER_SIZE..]);

    let sender = cursor.read_u32()?;
    let receiver = cursor.read_u32()?;

    let node_region = cursor.read_extent()?;
    if !node_region.is_valid() {
        return Err(CommError::InvalidExtent {
            extent: node_region.as_array(),
        });
    }
    let raw_cell_region = cursor.read_extent()?;

    let flags = cursor.read_bytes(4)?[0];
    let npoint = cursor.read_u16()? as usize;
    let ncell = cursor.read_u16()? as usize;
    if npoint + ncell != header.count as usize {
        return Err(CommError::LengthMismatch {
            field: "array count",
            expected: header.count as usize,
            got: npoint + ncell,
        });
    }

    let cell_region = if flags & FLAG_CELL_REGION != 0 {
        if !raw_cell_region.is_valid() {
            return Err(CommError::InvalidExtent {
                extent: raw_cell_region.as_array(),
            });
        }
        Some(raw_cell_region)
    } else {
        None
    };

    let nodes = node_region.num_nodes();
    let cells = cell_region.map_or(0, |r| r.num_nodes());

    let node_flags = cursor.read_bytes(nodes)?.to_vec();
    let cell_flags = cursor.read_bytes(cells)?.to_vec();

    let positions = if flags & FLAG_POSITIONS != 0 {
        let mut positions = Vec::with_capacity(nodes);
        for _ in 0..nodes {
            positions.push([cursor.read_f32()?, cursor.read_f32()?, cursor.read_f32()?]);
        }
        Some(positions)
    } else {
        None
    };

    let mut point_arrays = Vec::with_capacity(npoint);
    for _ in 0..npoint {
        point_arrays.push(cursor.read_named_array(nodes)?);
    }
    let mut cell_arrays = Vec::with_capacity(ncell);
    for _ in 0..ncell {
        cell_arrays.push(cursor.read_named_array(cells)?);
    }

    cursor.expect_empty()?;

    Ok(GhostSlice {
        sender,
        receiver,
        node_region,
        cell_region,
        node_flags,
        cell_flags,
        positions,
        point_arrays,
        cell_arrays,
    })
}

/// Byte cursor over a decode buffer.
struct Cursor<'a> {
    bytes: &'a [u8],
    consumed: usize,
}

impl<'a> Cursor<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, consumed: 0 }
    }

    fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.bytes.len() < n {
            return Err(CommError::Truncated {
                expected: self.consumed + n,
                got: self.consumed + self.bytes.len(),
            });
        }
        let (head, tail) = self.bytes.split_at(n);
        self.bytes = tail;
        self.consumed += n;
        Ok(head)
    }

    fn read_u16(&mut self) -> Result<u16> {
        let b = self.read_bytes(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    fn read_u32(&mut self) -> Result<u32> {
        let b = self.read_bytes(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn read_i32(&mut self) -> Result<i32> {
        let b = self.read_bytes(4)?;
        Ok(i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn read_f32(&mut self) -> Result<f32> {
        let b = self.read_bytes(4)?;
        Ok(f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn read_extent(&mut self) -> Result<Extent> {
        let mut bounds = [0i32; 6];
        for bound in &mut bounds {
            *bound = self.read_i32()?;
        }
        Ok(Extent::from_array(bounds))
    }

    #[cfg(feature = "alloc")]
    fn read_named_array(&mut self, len: usize) -> Result<NamedArray> {
        let name_len = self.read_u16()? as usize;
        let name = core::str::from_utf8(self.read_bytes(name_len)?)
            .map_err(|_| CommError::BadName)?
            .into();

        let mut data = Vec::with_capacity(len);
        for _ in 0..len {
            data.push(self.read_f32()?);
        }
        Ok(NamedArray { name, data })
    }

    fn expect_empty(&self) -> Result<()> {
        if self.bytes.is_empty() {
            Ok(())
        } else {
            Err(CommError::LengthMismatch {
                field: "trailing bytes",
                expected: self.consumed,
                got: self.consumed + self.bytes.len(),
            })
        }
    }
}
