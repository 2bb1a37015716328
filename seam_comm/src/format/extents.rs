//! Extent record batch encoding.
//!
//! Each process announces the partitions it owns as a batch of fixed-width
//! records. One record is seven little-endian i32 values:
//!
//! ```text
//! [id, imin, imax, jmin, jmax, kmin, kmax]
//! ```
//!
//! The record count travels in the wire header (and, during the collective
//! size-negotiation phase, out-of-band); there is no per-record framing.

use seam_core::Extent;

use super::header::{PayloadKind, WireHeader, HEADER_SIZE};
use crate::error::{CommError, Result};

#[cfg(feature = "alloc")]
use alloc::vec::Vec;

/// Integers per extent record.
pub const EXTENT_RECORD_INTS: usize = 7;

/// Bytes per extent record.
pub const EXTENT_RECORD_SIZE: usize = EXTENT_RECORD_INTS * 4;

/// One partition announcement: the grid id and its extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtentRecord {
    /// Partition id, unique across the whole distributed dataset.
    pub id: u32,
    /// The partition's index-space extent.
    pub extent: Extent,
}

/// Encode a batch of extent records into a framed wire payload.
#[cfg(feature = "alloc")]
pub fn encode_extents(records: &[ExtentRecord]) -> Vec<u8> {
    let header = WireHeader::new(PayloadKind::Extents, records.len() as u32);

    let mut bytes = Vec::with_capacity(HEADER_SIZE + records.len() * EXTENT_RECORD_SIZE);
    bytes.extend_from_slice(&header.to_bytes());

    for record in records {
        bytes.extend_from_slice(&(record.id as i32).to_le_bytes());
        for bound in record.extent.as_array() {
            bytes.extend_from_slice(&bound.to_le_bytes());
        }
    }

    bytes
}

/// Decode a framed batch of extent records.
///
/// Validates the header, the record count against the payload length, and
/// each record (non-negative id, well-formed extent).
#[cfg(feature = "alloc")]
pub fn decode_extents(payload: &[u8]) -> Result<Vec<ExtentRecord>> {
    let header = WireHeader::decode(payload, PayloadKind::Extents)?;

    let count = header.count as usize;
    let body = &payload[HEADER_SIZE..];
    if body.len() != count * EXTENT_RECORD_SIZE {
        return Err(CommError::LengthMismatch {
            field: "extent records",
            expected: count * EXTENT_RECORD_SIZE,
            got: body.len(),
        });
    }

    let mut records = Vec::with_capacity(count);
    for chunk in body.chunks_exact(EXTENT_RECORD_SIZE) {
        let mut ints = [0i32; EXTENT_RECORD_INTS];
        for (n, word) in chunk.chunks_exact(4).enumerate() {
            ints[n] = i32::from_le_bytes([word[0], word[1], word[2], word[3]]);
        }

        if ints[0] < 0 {
            return Err(CommError::NegativeGridId { id: ints[0] });
        }
        let extent = Extent::new(ints[1], ints[2], ints[3], ints[4], ints[5], ints[6]);
        if !extent.is_valid() {
            return Err(CommError::InvalidExtent {
                extent: extent.as_array(),
            });
        }

        records.push(ExtentRecord {
            id: ints[0] as u32,
            extent,
        });
    }

    Ok(records)
}
