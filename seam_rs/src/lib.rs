//! # seam_rs
//!
//! Distributed connectivity and ghost-layer exchange for partitioned
//! structured grids.
//!
//! A structured dataset is split into partitions, each an integer extent
//! box owned by exactly one process. This crate resolves, for every
//! partition, where it lives and which partitions touch it, and then keeps
//! each process's boundary ("ghost") bands synchronized with its neighbors:
//!
//! - every process registers only the partitions it owns;
//! - one collective exchange gives every process an identical
//!   [`ExtentTable`];
//! - adjacency falls out of pure extent math ([`seam_core`]), identically
//!   everywhere;
//! - ghost bands are filled point-to-point between adjacent partitions on
//!   different ranks, and by direct copy between partitions on the same
//!   rank.
//!
//! ## Quick Start
//!
//! ```ignore
//! use seam_rs::{Extent, GridConnectivity, GridPayload};
//!
//! let mut conn = GridConnectivity::new(); // single process
//! conn.initialize();
//! conn.set_num_grids(2);
//!
//! let extent = Extent::new(0, 5, 0, 5, 0, 0);
//! conn.register_grid(0, extent, GridPayload::for_extent(&extent))?;
//! let extent = Extent::new(5, 10, 0, 5, 0, 0);
//! conn.register_grid(1, extent, GridPayload::for_extent(&extent))?;
//!
//! conn.compute_neighbors()?;          // collective
//! conn.create_ghost_layers(1)?;       // collective
//!
//! let ghosted = conn.ghosted_grid(0).unwrap();
//! assert_eq!(ghosted.extent, Extent::new(0, 6, 0, 5, 0, 0));
//! ```
//!
//! ## Collective Contract
//!
//! `initialize`, `compute_neighbors`, and `create_ghost_layers` must be
//! called by every process in the group, in the same relative order. A
//! process that skips one leaves its peers blocked forever — there is no
//! timeout, matching the blocking-collective model this mirrors. Purely
//! local calls (`register_grid` and the queries) need no coordination.
//!
//! ## Multi-Process Testing
//!
//! The communication layer is the four-primitive
//! [`Communicator`] trait; [`ChannelGroup`] provides an in-process group
//! of connected endpoints, so an n-rank scenario is just n threads.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod connectivity;
mod error;
mod exchange;
mod ghosted;
mod registry;
mod table;

pub use connectivity::{GridConnectivity, Topology};
pub use error::{Result, SeamError};
pub use ghosted::GhostedGrid;
pub use registry::{FieldArray, GridPayload, LocalGrid};
pub use table::{exchange_extents, ExtentTable, TableEntry};

// Re-export the core math types the public surface speaks in.
pub use seam_core::{
    ghost, AdjacencyKind, AxisRelation, CoreError, Extent, Neighbor, Orientation,
};

// Re-export the communication layer.
pub use seam_comm::{ChannelComm, ChannelGroup, CommError, Communicator, MessageTag, SerialComm};
