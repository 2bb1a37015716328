//! Seam wire format header definition.

use crate::error::{CommError, Result};

/// Magic bytes for seam wire payloads.
pub const WIRE_MAGIC: [u8; 4] = *b"SEAM";

/// Codec version this build speaks.
pub const WIRE_VERSION: u16 = 1;

/// Header size in bytes.
pub const HEADER_SIZE: usize = 16;

/// Message kind carried behind a [`WireHeader`].
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    /// A batch of partition extent records.
    Extents = 1,
    /// A ghost slice between two adjacent partitions.
    GhostSlice = 2,
}

/// Seam wire header.
///
/// Layout (16 bytes total):
/// - Bytes 0-3: Magic "SEAM"
/// - Bytes 4-5: version (u16 LE)
/// - Bytes 6-7: kind (u16 LE)
/// - Bytes 8-11: count (u32 LE, kind-specific record count)
/// - Bytes 12-15: reserved (4 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireHeader {
    /// Magic bytes "SEAM".
    pub magic: [u8; 4],
    /// Codec version.
    pub version: u16,
    /// Message kind (see [`PayloadKind`]).
    pub kind: u16,
    /// Kind-specific record count.
    pub count: u32,
    /// Reserved bytes for future expansion.
    pub reserved: [u8; 4],
}

impl WireHeader {
    /// Create a new header for the given kind and record count.
    pub fn new(kind: PayloadKind, count: u32) -> Self {
        Self {
            magic: WIRE_MAGIC,
            version: WIRE_VERSION,
            kind: kind as u16,
            count,
            reserved: [0; 4],
        }
    }

    /// Serialize the header to a byte array.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];

        bytes[0..4].copy_from_slice(&self.magic);
        bytes[4..6].copy_from_slice(&self.version.to_le_bytes());
        bytes[6..8].copy_from_slice(&self.kind.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.count.to_le_bytes());
        bytes[12..16].copy_from_slice(&self.reserved);

        bytes
    }

    /// Deserialize a header from a byte array.
    pub fn from_bytes(bytes: &[u8; HEADER_SIZE]) -> Self {
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&bytes[0..4]);

        let version = u16::from_le_bytes([bytes[4], bytes[5]]);
        let kind = u16::from_le_bytes([bytes[6], bytes[7]]);
        let count = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);

        let mut reserved = [0u8; 4];
        reserved.copy_from_slice(&bytes[12..16]);

        Self {
            magic,
            version,
            kind,
            count,
            reserved,
        }
    }

    /// Decode and validate the header at the front of `payload`, checking
    /// magic, version, and kind.
    pub fn decode(payload: &[u8], kind: PayloadKind) -> Result<Self> {
        if payload.len() < HEADER_SIZE {
            return Err(CommError::Truncated {
                expected: HEADER_SIZE,
                got: payload.len(),
            });
        }
        let mut raw = [0u8; HEADER_SIZE];
        raw.copy_from_slice(&payload[..HEADER_SIZE]);
        let header = Self::from_bytes(&raw);

        if header.magic != WIRE_MAGIC {
            return Err(CommError::BadMagic {
                found: header.magic,
            });
        }
        if header.version != WIRE_VERSION {
            return Err(CommError::UnsupportedVersion {
                got: header.version,
                supported: WIRE_VERSION,
            });
        }
        if header.kind != kind as u16 {
            return Err(CommError::WrongKind {
                expected: kind as u16,
                got: header.kind,
            });
        }
        Ok(header)
    }
}
