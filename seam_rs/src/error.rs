//! Error types for the seam runtime.

use seam_core::{CoreError, Extent};
use thiserror::Error;

/// Errors that can occur while building connectivity or exchanging ghosts.
#[derive(Error, Debug)]
pub enum SeamError {
    /// Extent math rejected an input.
    #[error("extent error: {0}")]
    Core(#[from] CoreError),

    /// Wire codec or transport failure.
    #[error("communication error: {0}")]
    Comm(#[from] seam_comm::CommError),

    /// A grid id at or above the declared global grid count.
    #[error("grid id {id} out of range for {num_grids} grids")]
    GridIdOutOfRange {
        /// The offending grid id.
        id: u32,
        /// The declared global grid count.
        num_grids: usize,
    },

    /// The same grid id was registered twice on this process.
    #[error("grid {id} is already registered on this process")]
    DuplicateLocalGrid {
        /// The grid id registered twice.
        id: u32,
    },

    /// Two processes both announced ownership of the same grid.
    #[error("grid {id} claimed by both rank {first} and rank {second}")]
    DuplicateOwner {
        /// The contested grid id.
        id: u32,
        /// Rank that claimed the grid first (lowest rank order).
        first: usize,
        /// Rank whose claim collided.
        second: usize,
    },

    /// A payload array disagrees with the grid's extent.
    #[error("array '{array}' of grid {grid} has {got} entries, extent implies {expected}")]
    PayloadShape {
        /// The grid being registered.
        grid: u32,
        /// Which array was inconsistent.
        array: String,
        /// Entry count implied by the extent.
        expected: usize,
        /// Entry count actually supplied.
        got: usize,
    },

    /// A rank delivered a different byte count than it negotiated.
    #[error("rank {rank} negotiated {negotiated} bytes but delivered {delivered}")]
    SizeNegotiationMismatch {
        /// The inconsistent rank.
        rank: usize,
        /// Byte count from the size-exchange phase.
        negotiated: u64,
        /// Byte count actually gathered.
        delivered: usize,
    },

    /// A neighbor relation references a grid with no resolved owner.
    #[error("neighbor grid {id} has no resolved owner")]
    UnresolvedNeighbor {
        /// The unresolved grid id.
        id: u32,
    },

    /// A received ghost slice covers a different region than the table
    /// implies for the pair.
    #[error(
        "ghost slice for pair ({sender} -> {receiver}) covers {got}, expected {expected}"
    )]
    RegionMismatch {
        /// Donor grid id from the message.
        sender: u32,
        /// Receiver grid id from the message.
        receiver: u32,
        /// Region implied by the extent table.
        expected: Extent,
        /// Region found in the message.
        got: Extent,
    },
}

/// Result type alias for seam runtime operations.
pub type Result<T> = core::result::Result<T, SeamError>;
