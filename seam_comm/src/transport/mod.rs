//! Process-group communication primitives.
//!
//! The distributed layers of seam depend on exactly four operations:
//! rank/size discovery, an all-to-all exchange of small counts, a
//! variable-length all-gather of byte buffers tagged by source rank, and
//! tagged point-to-point byte transfer. [`Communicator`] captures those four
//! so the same exchange logic runs over an in-process channel group in
//! tests, a single-process stand-in, or a real multi-process backend.
//!
//! All operations are blocking. The collective calls carry the usual
//! collective contract: every rank in the group must make the same call in
//! the same relative order, or the group deadlocks. There is no timeout and
//! no cancellation; a missing participant is a hang, not an error.

mod channel;
mod serial;

pub use channel::{ChannelComm, ChannelGroup};
pub use serial::SerialComm;

use crate::error::Result;

#[cfg(feature = "alloc")]
use alloc::vec::Vec;

/// Tag disambiguating point-to-point messages between two partitions.
///
/// A process can own several partitions adjacent to partitions on the same
/// peer process; the (sender partition, receiver partition) pair keeps each
/// pairing's messages matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageTag {
    /// Grid id of the sending partition.
    pub sender_grid: u32,
    /// Grid id of the receiving partition.
    pub receiver_grid: u32,
}

impl MessageTag {
    /// Create a tag for the given partition pairing.
    #[inline]
    pub const fn new(sender_grid: u32, receiver_grid: u32) -> Self {
        Self {
            sender_grid,
            receiver_grid,
        }
    }

    /// The tag the peer uses for the mirrored transfer of this pairing.
    #[inline]
    pub const fn mirrored(&self) -> Self {
        Self {
            sender_grid: self.receiver_grid,
            receiver_grid: self.sender_grid,
        }
    }
}

/// Blocking communication endpoint for one member of a process group.
pub trait Communicator: Send {
    /// This process's rank within the group.
    fn rank(&self) -> usize;

    /// Number of processes in the group.
    fn size(&self) -> usize;

    /// Collective: share one count with every rank.
    ///
    /// Returns the counts contributed by all ranks, indexed by rank. Used
    /// as the size-negotiation phase before a variable-length gather.
    fn exchange_counts(&mut self, count: u64) -> Result<Vec<u64>>;

    /// Collective: gather every rank's byte payload on every rank.
    ///
    /// Returns one buffer per rank, indexed by rank; entry `rank()` is this
    /// process's own payload. Payload lengths may differ per rank.
    fn all_gather(&mut self, payload: &[u8]) -> Result<Vec<Vec<u8>>>;

    /// Send a tagged payload to one peer. Buffered: does not wait for the
    /// matching receive.
    fn send(&mut self, peer: usize, tag: MessageTag, payload: &[u8]) -> Result<()>;

    /// Receive the payload sent by `peer` under `tag`, blocking until it
    /// arrives. Messages from other peers or under other tags are held back
    /// for their own receives, so arrival order never has to match call
    /// order.
    fn recv(&mut self, peer: usize, tag: MessageTag) -> Result<Vec<u8>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_mirrored() {
        let tag = MessageTag::new(3, 7);
        assert_eq!(tag.mirrored(), MessageTag::new(7, 3));
        assert_eq!(tag.mirrored().mirrored(), tag);
    }
}
