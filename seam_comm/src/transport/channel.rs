//! In-process communicator group over std channels.
//!
//! [`ChannelGroup::create`] builds `n` connected endpoints; moving each one
//! into its own thread gives a deterministic stand-in for an n-process run.
//! The exchange logic upstairs cannot tell the difference, which is what
//! makes the collective protocols unit-testable without a launcher.
//!
//! Collective calls are sequenced by an epoch counter: each endpoint stamps
//! outgoing collective packets with its local collective count, and a
//! receiver holds back packets from ranks that have already raced ahead
//! into a later collective. Point-to-point packets are matched on
//! `(peer, tag)` with the same hold-back treatment, so arrival order never
//! leaks into delivery order.

use std::collections::VecDeque;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::vec::Vec;

use super::{Communicator, MessageTag};
use crate::error::{CommError, Result};

enum Packet {
    Collective {
        from: usize,
        epoch: u64,
        payload: Vec<u8>,
    },
    Point {
        from: usize,
        tag: MessageTag,
        payload: Vec<u8>,
    },
}

/// One endpoint of an in-process communicator group.
pub struct ChannelComm {
    rank: usize,
    size: usize,
    /// Senders to every endpoint, indexed by rank (self excluded from use).
    txs: Vec<Sender<Packet>>,
    rx: Receiver<Packet>,
    /// Number of collective calls completed locally.
    epoch: u64,
    /// Packets received ahead of their matching call.
    held: VecDeque<Packet>,
}

/// Factory for connected [`ChannelComm`] endpoints.
pub struct ChannelGroup;

impl ChannelGroup {
    /// Create a fully connected group of `size` endpoints.
    ///
    /// The endpoint at index `r` has rank `r`. Dropping an endpoint while
    /// peers still communicate surfaces as `PeerDisconnected` on their next
    /// exchange with it.
    pub fn create(size: usize) -> Vec<ChannelComm> {
        assert!(size > 0, "communicator group cannot be empty");

        let mut txs = Vec::with_capacity(size);
        let mut rxs = Vec::with_capacity(size);
        for _ in 0..size {
            let (tx, rx) = channel();
            txs.push(tx);
            rxs.push(rx);
        }

        rxs.into_iter()
            .enumerate()
            .map(|(rank, rx)| ChannelComm {
                rank,
                size,
                txs: txs.clone(),
                rx,
                epoch: 0,
                held: VecDeque::new(),
            })
            .collect()
    }
}

impl ChannelComm {
    fn check_peer(&self, peer: usize) -> Result<()> {
        if peer >= self.size {
            return Err(CommError::RankOutOfRange {
                rank: peer,
                size: self.size,
            });
        }
        if peer == self.rank {
            return Err(CommError::NoSuchPeer { peer });
        }
        Ok(())
    }

    /// Run one collective round: send `payload` to every peer, return every
    /// rank's contribution indexed by rank.
    fn collective(&mut self, payload: &[u8]) -> Result<Vec<Vec<u8>>> {
        self.epoch += 1;
        let epoch = self.epoch;

        for peer in 0..self.size {
            if peer == self.rank {
                continue;
            }
            self.txs[peer]
                .send(Packet::Collective {
                    from: self.rank,
                    epoch,
                    payload: payload.to_vec(),
                })
                .map_err(|_| CommError::PeerDisconnected { peer })?;
        }

        let mut slots: Vec<Option<Vec<u8>>> = vec![None; self.size];
        slots[self.rank] = Some(payload.to_vec());
        let mut missing = self.size - 1;

        // Drain anything already held back from earlier receives.
        let mut kept = VecDeque::new();
        while let Some(packet) = self.held.pop_front() {
            match packet {
                Packet::Collective {
                    from,
                    epoch: e,
                    payload,
                } if e == epoch && slots[from].is_none() => {
                    slots[from] = Some(payload);
                    missing -= 1;
                }
                other => kept.push_back(other),
            }
        }
        self.held = kept;

        while missing > 0 {
            match self.rx.recv() {
                Ok(Packet::Collective {
                    from,
                    epoch: e,
                    payload,
                }) if e == epoch && slots[from].is_none() => {
                    slots[from] = Some(payload);
                    missing -= 1;
                }
                Ok(other) => self.held.push_back(other),
                Err(_) => {
                    // Some sender dropped; report the first unfilled slot.
                    let peer = slots.iter().position(|s| s.is_none()).unwrap_or(0);
                    return Err(CommError::PeerDisconnected { peer });
                }
            }
        }

        Ok(slots.into_iter().map(|s| s.unwrap_or_default()).collect())
    }
}

impl Communicator for ChannelComm {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn exchange_counts(&mut self, count: u64) -> Result<Vec<u64>> {
        let gathered = self.collective(&count.to_le_bytes())?;
        let mut counts = Vec::with_capacity(self.size);
        for bytes in &gathered {
            if bytes.len() != 8 {
                return Err(CommError::LengthMismatch {
                    field: "count exchange",
                    expected: 8,
                    got: bytes.len(),
                });
            }
            let mut raw = [0u8; 8];
            raw.copy_from_slice(bytes);
            counts.push(u64::from_le_bytes(raw));
        }
        Ok(counts)
    }

    fn all_gather(&mut self, payload: &[u8]) -> Result<Vec<Vec<u8>>> {
        self.collective(payload)
    }

    fn send(&mut self, peer: usize, tag: MessageTag, payload: &[u8]) -> Result<()> {
        self.check_peer(peer)?;
        self.txs[peer]
            .send(Packet::Point {
                from: self.rank,
                tag,
                payload: payload.to_vec(),
            })
            .map_err(|_| CommError::PeerDisconnected { peer })
    }

    fn recv(&mut self, peer: usize, tag: MessageTag) -> Result<Vec<u8>> {
        self.check_peer(peer)?;

        // A matching message may already be held back.
        if let Some(pos) = self.held.iter().position(|packet| {
            matches!(packet, Packet::Point { from, tag: t, .. } if *from == peer && *t == tag)
        }) {
            if let Some(Packet::Point { payload, .. }) = self.held.remove(pos) {
                return Ok(payload);
            }
        }

        loop {
            match self.rx.recv() {
                Ok(Packet::Point {
                    from,
                    tag: t,
                    payload,
                }) if from == peer && t == tag => return Ok(payload),
                Ok(other) => self.held.push_back(other),
                Err(_) => return Err(CommError::PeerDisconnected { peer }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_rank_and_size() {
        let group = ChannelGroup::create(3);
        for (n, comm) in group.iter().enumerate() {
            assert_eq!(comm.rank(), n);
            assert_eq!(comm.size(), 3);
        }
    }

    #[test]
    fn test_exchange_counts() {
        let group = ChannelGroup::create(3);
        let handles: Vec<_> = group
            .into_iter()
            .map(|mut comm| {
                thread::spawn(move || {
                    let count = (comm.rank() as u64 + 1) * 10;
                    comm.exchange_counts(count).unwrap()
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), vec![10, 20, 30]);
        }
    }

    #[test]
    fn test_all_gather_variable_lengths() {
        let group = ChannelGroup::create(4);
        let handles: Vec<_> = group
            .into_iter()
            .map(|mut comm| {
                thread::spawn(move || {
                    let payload = vec![comm.rank() as u8; comm.rank()];
                    comm.all_gather(&payload).unwrap()
                })
            })
            .collect();

        for handle in handles {
            let gathered = handle.join().unwrap();
            assert_eq!(gathered.len(), 4);
            for (rank, chunk) in gathered.iter().enumerate() {
                assert_eq!(chunk, &vec![rank as u8; rank]);
            }
        }
    }

    #[test]
    fn test_back_to_back_collectives_stay_ordered() {
        // A fast rank can start round two while a slow rank still drains
        // round one; epochs keep the rounds from blending.
        let group = ChannelGroup::create(2);
        let handles: Vec<_> = group
            .into_iter()
            .map(|mut comm| {
                thread::spawn(move || {
                    let first = comm.all_gather(&[comm.rank() as u8, 1]).unwrap();
                    let second = comm.all_gather(&[comm.rank() as u8, 2]).unwrap();
                    (first, second)
                })
            })
            .collect();

        for handle in handles {
            let (first, second) = handle.join().unwrap();
            assert_eq!(first, vec![vec![0, 1], vec![1, 1]]);
            assert_eq!(second, vec![vec![0, 2], vec![1, 2]]);
        }
    }

    #[test]
    fn test_point_to_point_tag_matching() {
        let mut group = ChannelGroup::create(2);
        let mut b = group.pop().unwrap();
        let mut a = group.pop().unwrap();

        let tag_x = MessageTag::new(0, 1);
        let tag_y = MessageTag::new(2, 1);

        // Send two tagged messages, receive them in the opposite order.
        a.send(1, tag_x, b"first").unwrap();
        a.send(1, tag_y, b"second").unwrap();

        assert_eq!(b.recv(0, tag_y).unwrap(), b"second");
        assert_eq!(b.recv(0, tag_x).unwrap(), b"first");
    }

    #[test]
    fn test_send_to_self_rejected() {
        let mut group = ChannelGroup::create(2);
        let mut a = group.remove(0);
        assert_eq!(
            a.send(0, MessageTag::new(0, 0), b"loop"),
            Err(CommError::NoSuchPeer { peer: 0 })
        );
        assert!(matches!(
            a.send(5, MessageTag::new(0, 0), b"far"),
            Err(CommError::RankOutOfRange { .. })
        ));
    }

    #[test]
    fn test_disconnect_detected() {
        let mut group = ChannelGroup::create(2);
        let b = group.pop().unwrap();
        let mut a = group.pop().unwrap();
        drop(b);

        assert_eq!(
            a.send(1, MessageTag::new(0, 1), b"gone"),
            Err(CommError::PeerDisconnected { peer: 1 })
        );
    }
}
