//! The connectivity orchestrator.
//!
//! Drives the lifecycle of one process's view of a partitioned structured
//! dataset:
//!
//! 1. [`GridConnectivity::initialize`] — bind a communicator, learn this
//!    process's rank;
//! 2. [`GridConnectivity::set_num_grids`] + repeated
//!    [`GridConnectivity::register_grid`] — declare the global partition
//!    count and register the locally owned partitions (local only, any
//!    order);
//! 3. [`GridConnectivity::compute_neighbors`] — collective; every process
//!    ends with an identical resolved table and its local adjacency sets;
//! 4. [`GridConnectivity::create_ghost_layers`] — collective; fill ghost
//!    bands from remote and local neighbors.
//!
//! `initialize`, `compute_neighbors`, and `create_ghost_layers` are
//! collective: every process in the group must call them in the same
//! relative order, or the group deadlocks waiting for a peer that never
//! issues the matching call. There is no timeout machinery; that mirrors
//! blocking collectives everywhere.
//!
//! Sequencing preconditions (querying before `compute_neighbors`,
//! registering before `set_num_grids`) are programmer errors and assert.
//! Data problems (malformed extents, duplicate owners, wire damage) come
//! back as [`SeamError`] values.

use seam_core::{find_neighbors, Extent, Neighbor};
use seam_comm::{Communicator, SerialComm};

use crate::error::{Result, SeamError};
use crate::exchange::exchange_ghost_data;
use crate::ghosted::GhostedGrid;
use crate::registry::{GridPayload, LocalGrid};
use crate::table::{exchange_extents, ExtentTable};

/// The resolved neighbor topology: the complete extent table plus the
/// adjacency sets of this process's partitions.
///
/// Only [`GridConnectivity::compute_neighbors`] produces one, so holding a
/// `Topology` is proof the collective exchange completed.
#[derive(Debug, Clone, PartialEq)]
pub struct Topology {
    /// The complete table, identical on every rank.
    pub table: ExtentTable,
    /// Neighbor sets, parallel to the local registration order.
    pub(crate) local_neighbors: Vec<Vec<Neighbor>>,
}

impl Topology {
    /// The neighbor set of the local partition at `index` (registration
    /// order).
    pub fn local_neighbors(&self, index: usize) -> &[Neighbor] {
        &self.local_neighbors[index]
    }
}

/// Distributed connectivity for one process's partitions.
pub struct GridConnectivity {
    comm: Box<dyn Communicator>,
    rank: Option<usize>,
    num_grids: Option<usize>,
    locals: Vec<LocalGrid>,
    topology: Option<Topology>,
    ghosted: Vec<GhostedGrid>,
}

impl GridConnectivity {
    /// Create a connectivity instance over the default single-process
    /// communicator.
    pub fn new() -> Self {
        Self::with_communicator(Box::new(SerialComm::new()))
    }

    /// Create a connectivity instance over the given communicator.
    pub fn with_communicator(comm: Box<dyn Communicator>) -> Self {
        Self {
            comm,
            rank: None,
            num_grids: None,
            locals: Vec::new(),
            topology: None,
            ghosted: Vec::new(),
        }
    }

    /// Record this process's rank from the communicator. Idempotent; must
    /// run before any collective operation.
    pub fn initialize(&mut self) {
        if self.rank.is_none() {
            self.rank = Some(self.comm.rank());
            log::info!(
                "connectivity initialized on rank {} of {}",
                self.comm.rank(),
                self.comm.size()
            );
        }
    }

    /// Declare the global partition count.
    ///
    /// Every process must declare the same count before its collective
    /// calls; a mismatch across processes is not detectable here and
    /// surfaces downstream as a corrupted table or an exchange error.
    pub fn set_num_grids(&mut self, num_grids: usize) {
        assert!(num_grids > 0, "a dataset has at least one partition");
        self.num_grids = Some(num_grids);
    }

    /// Register a partition owned by this process. Local only: no
    /// coordination with other processes, any registration order.
    ///
    /// The grid id must be in `[0, num_grids)` — that is a programmer
    /// contract and asserts. Shape problems in the payload are data errors
    /// and come back as `Err`.
    pub fn register_grid(&mut self, id: u32, extent: Extent, payload: GridPayload) -> Result<()> {
        let num_grids = self
            .num_grids
            .expect("set_num_grids must be called before register_grid");
        assert!(
            (id as usize) < num_grids,
            "grid id {} out of range [0, {})",
            id,
            num_grids
        );

        extent.validate()?;
        payload.validate(id, &extent)?;
        if self.locals.iter().any(|g| g.id == id) {
            return Err(SeamError::DuplicateLocalGrid { id });
        }

        log::debug!("rank {:?}: registered grid {} with extent {}", self.rank, id, extent);
        self.locals.push(LocalGrid {
            id,
            extent,
            payload,
        });
        Ok(())
    }

    /// Collective: exchange extents with every process and resolve the
    /// neighbor topology.
    ///
    /// Afterwards every process holds an identical [`ExtentTable`].
    /// Idempotent: re-running with unchanged registrations reproduces the
    /// same table.
    pub fn compute_neighbors(&mut self) -> Result<()> {
        assert!(
            self.rank.is_some(),
            "initialize must be called before compute_neighbors"
        );
        let num_grids = self
            .num_grids
            .expect("set_num_grids must be called before compute_neighbors");

        let local_list: Vec<(u32, Extent)> =
            self.locals.iter().map(|g| (g.id, g.extent)).collect();
        let table = exchange_extents(&local_list, num_grids, &mut *self.comm)?;

        let all_extents: Vec<(u32, Extent)> = table
            .resolved()
            .map(|(id, entry)| (id, entry.extent))
            .collect();
        let local_neighbors: Vec<Vec<Neighbor>> = self
            .locals
            .iter()
            .map(|g| find_neighbors(g.id, &all_extents))
            .collect();

        log::info!(
            "rank {}: resolved {} of {} grids, {} local adjacencies",
            self.comm.rank(),
            all_extents.len(),
            num_grids,
            local_neighbors.iter().map(|n| n.len()).sum::<usize>()
        );

        self.topology = Some(Topology {
            table,
            local_neighbors,
        });
        Ok(())
    }

    /// Collective: build ghost layers of the given width on every local
    /// partition, filling them from remote and local neighbors.
    ///
    /// A non-positive width is a no-op. Requires a completed
    /// [`GridConnectivity::compute_neighbors`].
    pub fn create_ghost_layers(&mut self, width: i32) -> Result<()> {
        let topology = self
            .topology
            .as_ref()
            .expect("compute_neighbors must be called before create_ghost_layers");
        if width <= 0 {
            log::debug!("ghost width {} requested; nothing to do", width);
            return Ok(());
        }

        let whole = match topology.table.whole_extent() {
            Some(whole) => whole,
            None => return Ok(()),
        };
        self.ghosted = self
            .locals
            .iter()
            .map(|g| GhostedGrid::from_local(g, g.extent.grown(width).clamped(&whole)))
            .collect();

        exchange_ghost_data(
            &self.locals,
            &mut self.ghosted,
            &topology.local_neighbors,
            &topology.table,
            width,
            &mut *self.comm,
        )
    }

    /// Number of partitions registered by this process.
    pub fn num_local_grids(&self) -> usize {
        self.locals.len()
    }

    /// The owning rank of `id`, or `None` if no process registered it.
    ///
    /// Requires a completed `compute_neighbors` and an in-range id; both
    /// are programmer contracts and assert.
    pub fn grid_rank(&self, id: u32) -> Option<usize> {
        let topology = self
            .topology
            .as_ref()
            .expect("compute_neighbors must be called before grid_rank");
        assert!(
            (id as usize) < topology.table.num_grids(),
            "grid id {} out of range [0, {})",
            id,
            topology.table.num_grids()
        );
        topology.table.rank(id)
    }

    /// True iff `id` resolved to this process. Same preconditions as
    /// [`GridConnectivity::grid_rank`].
    pub fn is_grid_local(&self, id: u32) -> bool {
        let rank = self
            .rank
            .expect("initialize must be called before is_grid_local");
        self.grid_rank(id) == Some(rank)
    }

    /// This process's rank, once initialized.
    pub fn rank(&self) -> Option<usize> {
        self.rank
    }

    /// The resolved topology, once `compute_neighbors` has run.
    pub fn topology(&self) -> Option<&Topology> {
        self.topology.as_ref()
    }

    /// The neighbor set of a locally registered partition.
    pub fn neighbors(&self, id: u32) -> Option<&[Neighbor]> {
        let topology = self.topology.as_ref()?;
        let index = self.locals.iter().position(|g| g.id == id)?;
        Some(topology.local_neighbors(index))
    }

    /// A locally registered partition by id.
    pub fn local_grid(&self, id: u32) -> Option<&LocalGrid> {
        self.locals.iter().find(|g| g.id == id)
    }

    /// The ghosted output for a local partition, once
    /// `create_ghost_layers` has run with a positive width.
    pub fn ghosted_grid(&self, id: u32) -> Option<&GhostedGrid> {
        self.ghosted.iter().find(|g| g.id == id)
    }

    /// Hand the ghosted outputs back to the caller, leaving none behind.
    pub fn take_ghosted_grids(&mut self) -> Vec<GhostedGrid> {
        std::mem::take(&mut self.ghosted)
    }
}

impl Default for GridConnectivity {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for GridConnectivity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridConnectivity")
            .field("rank", &self.rank)
            .field("group_size", &self.comm.size())
            .field("num_grids", &self.num_grids)
            .field("num_local_grids", &self.locals.len())
            .field("resolved", &self.topology.is_some())
            .field("num_ghosted", &self.ghosted.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serial_lifecycle() {
        let mut conn = GridConnectivity::new();
        conn.initialize();
        conn.initialize(); // idempotent
        assert_eq!(conn.rank(), Some(0));

        conn.set_num_grids(2);
        conn.register_grid(
            0,
            Extent::new(0, 5, 0, 5, 0, 0),
            GridPayload::for_extent(&Extent::new(0, 5, 0, 5, 0, 0)),
        )
        .unwrap();
        conn.register_grid(
            1,
            Extent::new(5, 10, 0, 5, 0, 0),
            GridPayload::for_extent(&Extent::new(5, 10, 0, 5, 0, 0)),
        )
        .unwrap();
        assert_eq!(conn.num_local_grids(), 2);

        conn.compute_neighbors().unwrap();
        assert_eq!(conn.grid_rank(0), Some(0));
        assert_eq!(conn.grid_rank(1), Some(0));
        assert!(conn.is_grid_local(0));
        assert_eq!(conn.neighbors(0).unwrap().len(), 1);
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut conn = GridConnectivity::new();
        conn.initialize();
        conn.set_num_grids(2);
        let extent = Extent::new(0, 5, 0, 5, 0, 0);
        conn.register_grid(0, extent, GridPayload::for_extent(&extent))
            .unwrap();
        assert!(matches!(
            conn.register_grid(0, extent, GridPayload::for_extent(&extent)),
            Err(SeamError::DuplicateLocalGrid { id: 0 })
        ));
    }

    #[test]
    fn test_invalid_extent_rejected() {
        let mut conn = GridConnectivity::new();
        conn.initialize();
        conn.set_num_grids(1);
        let inverted = Extent::new(5, 0, 0, 5, 0, 0);
        assert!(matches!(
            conn.register_grid(0, inverted, GridPayload::default()),
            Err(SeamError::Core(_))
        ));
    }

    #[test]
    #[should_panic(expected = "set_num_grids")]
    fn test_register_before_num_grids_panics() {
        let mut conn = GridConnectivity::new();
        conn.initialize();
        let extent = Extent::new(0, 1, 0, 1, 0, 0);
        let _ = conn.register_grid(0, extent, GridPayload::for_extent(&extent));
    }

    #[test]
    #[should_panic(expected = "compute_neighbors")]
    fn test_grid_rank_before_compute_panics() {
        let mut conn = GridConnectivity::new();
        conn.initialize();
        conn.set_num_grids(1);
        let _ = conn.grid_rank(0);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_grid_rank_out_of_range_panics() {
        let mut conn = GridConnectivity::new();
        conn.initialize();
        conn.set_num_grids(1);
        conn.compute_neighbors().unwrap();
        let _ = conn.grid_rank(5);
    }
}
