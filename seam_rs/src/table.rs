//! The resolved extent table and the collective exchange that builds it.
//!
//! An [`ExtentTable`] is only ever produced by [`exchange_extents`], so
//! holding one is proof that the collective completed: rank and locality
//! queries live here instead of behind a "did you remember to exchange"
//! runtime flag. The table is immutable once built; re-running the exchange
//! over unchanged registrations reproduces it bit for bit.

use seam_core::Extent;
use seam_comm::format::{decode_extents, encode_extents, ExtentRecord};
use seam_comm::Communicator;

use crate::error::{Result, SeamError};

/// One resolved table entry: where a partition lives and what it spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableEntry {
    /// The partition's index-space extent.
    pub extent: Extent,
    /// The rank that registered the partition.
    pub rank: usize,
}

/// A complete, identical-on-every-rank map of all partitions.
///
/// Entries are indexed by grid id. An id that no rank ever registered stays
/// unresolved (`None`); that is a caller error the exchange does not try to
/// repair, and queries report it honestly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtentTable {
    entries: Vec<Option<TableEntry>>,
}

impl ExtentTable {
    fn with_num_grids(num_grids: usize) -> Self {
        Self {
            entries: vec![None; num_grids],
        }
    }

    /// The declared global grid count (resolved or not).
    #[inline]
    pub fn num_grids(&self) -> usize {
        self.entries.len()
    }

    /// The entry for `id`, or `None` while unresolved.
    #[inline]
    pub fn entry(&self, id: u32) -> Option<&TableEntry> {
        self.entries.get(id as usize).and_then(|e| e.as_ref())
    }

    /// The owning rank of `id`, or `None` while unresolved.
    ///
    /// The id itself must be in range; an out-of-range id is a programmer
    /// error, checked in debug builds.
    #[inline]
    pub fn rank(&self, id: u32) -> Option<usize> {
        debug_assert!(
            (id as usize) < self.entries.len(),
            "grid id {} out of range for table of {}",
            id,
            self.entries.len()
        );
        self.entry(id).map(|e| e.rank)
    }

    /// The extent of `id`, or `None` while unresolved.
    #[inline]
    pub fn extent(&self, id: u32) -> Option<Extent> {
        self.entry(id).map(|e| e.extent)
    }

    /// True iff `id` is resolved and owned by `rank`.
    #[inline]
    pub fn is_local(&self, id: u32, rank: usize) -> bool {
        self.rank(id) == Some(rank)
    }

    /// True iff every declared grid has an owner.
    pub fn is_fully_resolved(&self) -> bool {
        self.entries.iter().all(|e| e.is_some())
    }

    /// The union of all resolved extents, or `None` for an empty table.
    pub fn whole_extent(&self) -> Option<Extent> {
        let mut whole: Option<Extent> = None;
        for entry in self.entries.iter().flatten() {
            whole = Some(match whole {
                Some(w) => w.union(&entry.extent),
                None => entry.extent,
            });
        }
        whole
    }

    /// Iterate resolved entries as `(id, entry)` pairs in id order.
    pub fn resolved(&self) -> impl Iterator<Item = (u32, &TableEntry)> {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(id, entry)| entry.as_ref().map(|e| (id as u32, e)))
    }
}

/// Collective: build the complete extent table from per-rank registrations.
///
/// Every rank contributes the `(id, extent)` pairs it registered locally;
/// every rank returns the same table. Two phases over the communicator, as
/// the contribution sizes vary per rank:
///
/// 1. size negotiation: each rank announces its encoded byte count;
/// 2. data exchange: the encoded batches are all-gathered, then decoded
///    chunk by chunk with the contributing rank recorded as owner.
///
/// Chunks are visited in rank order, so the resulting table is identical on
/// every rank. A grid id claimed by two ranks is a hard error rather than a
/// silent overwrite.
pub fn exchange_extents(
    local: &[(u32, Extent)],
    num_grids: usize,
    comm: &mut dyn Communicator,
) -> Result<ExtentTable> {
    let records: Vec<ExtentRecord> = local
        .iter()
        .map(|&(id, extent)| ExtentRecord { id, extent })
        .collect();
    let payload = encode_extents(&records);

    let counts = comm.exchange_counts(payload.len() as u64)?;
    let chunks = comm.all_gather(&payload)?;

    log::debug!(
        "extent exchange on rank {}: sent {} records, gathering from {} ranks",
        comm.rank(),
        records.len(),
        chunks.len()
    );

    let mut table = ExtentTable::with_num_grids(num_grids);
    for (rank, chunk) in chunks.iter().enumerate() {
        if counts.get(rank).copied() != Some(chunk.len() as u64) {
            return Err(SeamError::SizeNegotiationMismatch {
                rank,
                negotiated: counts.get(rank).copied().unwrap_or(0),
                delivered: chunk.len(),
            });
        }

        for record in decode_extents(chunk)? {
            if record.id as usize >= num_grids {
                return Err(SeamError::GridIdOutOfRange {
                    id: record.id,
                    num_grids,
                });
            }
            let entry = &mut table.entries[record.id as usize];
            if let Some(existing) = entry {
                return Err(SeamError::DuplicateOwner {
                    id: record.id,
                    first: existing.rank,
                    second: rank,
                });
            }
            *entry = Some(TableEntry {
                extent: record.extent,
                rank,
            });
        }
    }

    if !table.is_fully_resolved() {
        let holes = table.entries.iter().filter(|e| e.is_none()).count();
        log::warn!(
            "extent table has {} unregistered grid id(s) of {}",
            holes,
            num_grids
        );
    }

    Ok(table)
}
