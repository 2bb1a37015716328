//! Versioned wire codecs for seam payloads.
//!
//! Every payload is framed by a fixed [`WireHeader`] carrying magic bytes,
//! a codec version, and a message kind, so a future record layout can be
//! introduced without silently corrupting the current fixed-width decode.

mod extents;
mod ghost;
mod header;

pub use extents::{
    decode_extents, encode_extents, ExtentRecord, EXTENT_RECORD_INTS, EXTENT_RECORD_SIZE,
};
pub use ghost::{decode_ghost_slice, encode_ghost_slice, GhostSlice, NamedArray};
pub use header::{PayloadKind, WireHeader, HEADER_SIZE, WIRE_MAGIC, WIRE_VERSION};
