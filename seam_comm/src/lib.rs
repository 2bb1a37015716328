//! # seam_comm
//!
//! Wire codecs and process-group communication for the seam ecosystem.
//!
//! This crate is the data-movement layer between [`seam_core`]'s pure
//! extent math and the distributed connectivity runtime: it defines how
//! extent announcements and ghost slices look on the wire, and the four
//! communication primitives the collective protocols are written against.
//!
//! # Core Types
//!
//! - [`Communicator`]: the four-primitive endpoint abstraction
//!   (rank/size, count exchange, variable all-gather, tagged send/recv)
//! - [`ChannelGroup`]: an in-process group of connected endpoints, one per
//!   simulated rank, for deterministic multi-"process" tests
//! - [`SerialComm`]: the single-process default backend
//! - [`format`]: versioned codecs for extent record batches and ghost
//!   slices
//!
//! # Crate Features
//!
//! - `std` (default): standard library support, including the channel
//!   transport
//! - `alloc`: heap allocation without full std (codecs only)

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]

// Conditional std/alloc support
#[cfg(feature = "std")]
extern crate std;

#[cfg(feature = "alloc")]
extern crate alloc;

pub mod error;

#[cfg(feature = "alloc")]
pub mod format;

#[cfg(feature = "std")]
mod transport;

pub use error::{CommError, Result};

#[cfg(feature = "std")]
pub use transport::{ChannelComm, ChannelGroup, Communicator, MessageTag, SerialComm};

// Re-export the core extent type used throughout the wire structures.
pub use seam_core::Extent;
