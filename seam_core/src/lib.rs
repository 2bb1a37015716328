//! # seam_core
//!
//! Pure index-space mathematics for partitioned structured grids.
//!
//! A structured dataset split across many owners is described entirely by
//! integer extent boxes: one per partition. This crate provides the math on
//! those boxes that the rest of the seam ecosystem builds on — no storage,
//! no communication, no I/O.
//!
//! ## Features
//!
//! - **no_std compatible**: extent and adjacency math works in embedded
//!   environments; only `find_neighbors` needs the `alloc` feature
//! - **Pure algorithms**: deterministic functions of their inputs, so every
//!   process derives identical neighbor topology from an identical table
//! - **2D-aware**: degenerate (flat) axes are first-class throughout
//!
//! ## Modules
//!
//! - [`extent`]: closed index-space boxes, intersection/union/grow/clamp,
//!   row-major node addressing
//! - [`adjacency`]: face/edge/corner classification, neighbor discovery,
//!   ghost-region computation
//! - [`ghost`]: ghost-marker byte values
//! - [`error`]: error types
//!
//! ## Feature Flags
//!
//! - `std` (default): standard library support
//! - `alloc`: heap allocation (Vec, etc.) without full std

#![no_std]
#![warn(missing_docs)]
#![warn(clippy::all)]

// Conditional std/alloc support
#[cfg(feature = "std")]
extern crate std;

#[cfg(feature = "alloc")]
extern crate alloc;

pub mod adjacency;
pub mod error;
pub mod extent;
pub mod ghost;

pub use adjacency::{
    are_adjacent, classify, ghost_region, AdjacencyKind, AxisRelation, Neighbor, Orientation,
};
#[cfg(feature = "alloc")]
pub use adjacency::find_neighbors;
pub use error::CoreError;
pub use extent::Extent;

/// Commonly used types and functions.
pub mod prelude {
    pub use crate::adjacency::{ghost_region, AdjacencyKind, AxisRelation, Neighbor, Orientation};
    #[cfg(feature = "alloc")]
    pub use crate::adjacency::find_neighbors;
    pub use crate::error::CoreError;
    pub use crate::extent::Extent;
}
