//! Error types for seam_comm operations.
//!
//! Provides specific error variants for wire decoding and transport
//! failures.

use core::fmt;

/// Errors that can occur during seam_comm operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommError {
    /// Payload shorter than the structure being decoded.
    Truncated {
        /// Bytes required to continue decoding.
        expected: usize,
        /// Bytes actually available.
        got: usize,
    },

    /// The payload does not start with the seam wire magic.
    BadMagic {
        /// The four bytes found in place of the magic.
        found: [u8; 4],
    },

    /// The payload was produced by an incompatible codec version.
    UnsupportedVersion {
        /// Version found in the header.
        got: u16,
        /// Version this build understands.
        supported: u16,
    },

    /// The payload carries a different message kind than expected.
    WrongKind {
        /// Kind the decoder was asked for.
        expected: u16,
        /// Kind found in the header.
        got: u16,
    },

    /// A length field disagrees with the data that follows it.
    LengthMismatch {
        /// Which field was inconsistent.
        field: &'static str,
        /// Length implied by the header/region.
        expected: usize,
        /// Length actually present.
        got: usize,
    },

    /// An array name was not valid UTF-8.
    BadName,

    /// A decoded extent had inverted bounds.
    InvalidExtent {
        /// The offending `[imin, imax, jmin, jmax, kmin, kmax]` bounds.
        extent: [i32; 6],
    },

    /// A decoded grid id was negative.
    NegativeGridId {
        /// The raw id from the wire.
        id: i32,
    },

    /// A peer rank outside `[0, size)` was addressed.
    RankOutOfRange {
        /// The requested rank.
        rank: usize,
        /// The group size.
        size: usize,
    },

    /// The addressed peer does not exist in this group (serial groups have
    /// no peers at all).
    NoSuchPeer {
        /// The requested rank.
        peer: usize,
    },

    /// A peer endpoint hung up mid-collective.
    PeerDisconnected {
        /// The rank whose channel closed.
        peer: usize,
    },
}

impl fmt::Display for CommError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommError::Truncated { expected, got } => {
                write!(f, "payload truncated: need {} bytes, have {}", expected, got)
            }
            CommError::BadMagic { found } => {
                write!(
                    f,
                    "bad wire magic: {:02x} {:02x} {:02x} {:02x}",
                    found[0], found[1], found[2], found[3]
                )
            }
            CommError::UnsupportedVersion { got, supported } => {
                write!(
                    f,
                    "unsupported wire version {} (this build speaks {})",
                    got, supported
                )
            }
            CommError::WrongKind { expected, got } => {
                write!(f, "wrong message kind: expected {}, got {}", expected, got)
            }
            CommError::LengthMismatch {
                field,
                expected,
                got,
            } => {
                write!(
                    f,
                    "length mismatch in {}: expected {}, got {}",
                    field, expected, got
                )
            }
            CommError::BadName => write!(f, "array name is not valid UTF-8"),
            CommError::InvalidExtent { extent } => {
                write!(
                    f,
                    "decoded extent is invalid: [{}..{}, {}..{}, {}..{}]",
                    extent[0], extent[1], extent[2], extent[3], extent[4], extent[5]
                )
            }
            CommError::NegativeGridId { id } => {
                write!(f, "decoded grid id {} is negative", id)
            }
            CommError::RankOutOfRange { rank, size } => {
                write!(f, "rank {} out of range for group of {}", rank, size)
            }
            CommError::NoSuchPeer { peer } => {
                write!(f, "no such peer: rank {}", peer)
            }
            CommError::PeerDisconnected { peer } => {
                write!(f, "peer {} disconnected", peer)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for CommError {}

/// Result type alias for seam_comm operations.
pub type Result<T> = core::result::Result<T, CommError>;
