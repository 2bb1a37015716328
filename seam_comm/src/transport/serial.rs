//! Single-process communicator.
//!
//! The default backend when no group is configured: rank 0 in a group of
//! one. Collectives reflect the local contribution straight back; there is
//! nobody to exchange point-to-point messages with.

use std::vec::Vec;

use super::{Communicator, MessageTag};
use crate::error::{CommError, Result};

/// Communicator for a group of exactly one process.
#[derive(Debug, Default, Clone, Copy)]
pub struct SerialComm;

impl SerialComm {
    /// Create a serial communicator.
    pub const fn new() -> Self {
        Self
    }
}

impl Communicator for SerialComm {
    fn rank(&self) -> usize {
        0
    }

    fn size(&self) -> usize {
        1
    }

    fn exchange_counts(&mut self, count: u64) -> Result<Vec<u64>> {
        Ok(vec![count])
    }

    fn all_gather(&mut self, payload: &[u8]) -> Result<Vec<Vec<u8>>> {
        Ok(vec![payload.to_vec()])
    }

    fn send(&mut self, peer: usize, _tag: MessageTag, _payload: &[u8]) -> Result<()> {
        Err(CommError::NoSuchPeer { peer })
    }

    fn recv(&mut self, peer: usize, _tag: MessageTag) -> Result<Vec<u8>> {
        Err(CommError::NoSuchPeer { peer })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serial_collectives() {
        let mut comm = SerialComm::new();
        assert_eq!(comm.rank(), 0);
        assert_eq!(comm.size(), 1);
        assert_eq!(comm.exchange_counts(42).unwrap(), vec![42]);
        assert_eq!(comm.all_gather(b"abc").unwrap(), vec![b"abc".to_vec()]);
    }

    #[test]
    fn test_serial_has_no_peers() {
        let mut comm = SerialComm::new();
        assert_eq!(
            comm.send(0, MessageTag::new(0, 1), b"x"),
            Err(CommError::NoSuchPeer { peer: 0 })
        );
        assert_eq!(
            comm.recv(1, MessageTag::new(0, 1)),
            Err(CommError::NoSuchPeer { peer: 1 })
        );
    }
}
