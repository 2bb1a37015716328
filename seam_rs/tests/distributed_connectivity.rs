//! Distributed connectivity tests.
//!
//! Multi-rank scenarios run one thread per rank over an in-process channel
//! group; the connectivity code cannot tell it apart from a real
//! multi-process run. Fields are set up as functions of global index space,
//! so a correctly filled ghost node must reproduce the value its owner
//! holds — any pairing or offset mistake shows up as a wrong number, not
//! just a wrong flag.

use std::sync::Arc;
use std::thread;

use seam_rs::{
    ghost, ChannelComm, ChannelGroup, Extent, FieldArray, GridConnectivity, GridPayload,
    SeamError,
};

// =============================================================================
// Harness and fixtures
// =============================================================================

/// Run `f` once per rank, each on its own thread over a connected group.
fn run_ranks<T, F>(size: usize, f: F) -> Vec<T>
where
    T: Send + 'static,
    F: Fn(usize, ChannelComm) -> T + Send + Sync + 'static,
{
    let f = Arc::new(f);
    let handles: Vec<_> = ChannelGroup::create(size)
        .into_iter()
        .enumerate()
        .map(|(rank, comm)| {
            let f = Arc::clone(&f);
            thread::spawn(move || f(rank, comm))
        })
        .collect();

    handles
        .into_iter()
        .map(|h| h.join().expect("rank thread panicked"))
        .collect()
}

/// Global node field: every owner agrees on the value at a given index.
fn height_at(i: i32, j: i32) -> f32 {
    (i * 100 + j) as f32
}

/// Global cell field, indexed by the cell's lowest corner.
fn mass_at(i: i32, j: i32) -> f32 {
    (i * 1000 + j) as f32
}

/// Payload with geometry, one point array, and one cell array, all
/// evaluated from the global fields.
fn make_payload(extent: &Extent) -> GridPayload {
    let mut payload = GridPayload::for_extent(extent);
    payload.positions = Some(
        extent
            .nodes()
            .map(|(i, j, k)| [i as f32, j as f32, k as f32])
            .collect(),
    );
    payload.point_arrays.push(FieldArray::new(
        "height",
        extent.nodes().map(|(i, j, _)| height_at(i, j)).collect(),
    ));
    payload.cell_arrays.push(FieldArray::new(
        "mass",
        extent
            .cell_space()
            .nodes()
            .map(|(i, j, _)| mass_at(i, j))
            .collect(),
    ));
    payload
}

// =============================================================================
// Table resolution
// =============================================================================

#[test]
fn test_tables_identical_regardless_of_registration_order() {
    // Four quadrant grids over [0,10]^2; each rank owns two and registers
    // them in a rank-dependent order.
    let quadrants = [
        Extent::new(0, 5, 0, 5, 0, 0),
        Extent::new(5, 10, 0, 5, 0, 0),
        Extent::new(0, 5, 5, 10, 0, 0),
        Extent::new(5, 10, 5, 10, 0, 0),
    ];

    let tables = run_ranks(2, move |rank, comm| {
        let mut conn = GridConnectivity::with_communicator(Box::new(comm));
        conn.initialize();
        conn.set_num_grids(4);

        // Rank 0 owns grids 0 and 2 (registered 2 first); rank 1 owns
        // grids 1 and 3 (registered in order).
        let owned: &[u32] = if rank == 0 { &[2, 0] } else { &[1, 3] };
        for &id in owned {
            let extent = quadrants[id as usize];
            conn.register_grid(id, extent, make_payload(&extent)).unwrap();
        }
        assert_eq!(conn.num_local_grids(), 2);

        conn.compute_neighbors().unwrap();

        for id in 0..4u32 {
            let expected_rank = if id % 2 == 0 { 0 } else { 1 };
            assert_eq!(conn.grid_rank(id), Some(expected_rank));
            assert_eq!(conn.is_grid_local(id), expected_rank == rank);
        }
        // Every quadrant touches the other three.
        for &id in owned {
            assert_eq!(conn.neighbors(id).unwrap().len(), 3);
        }

        conn.topology().unwrap().table.clone()
    });

    assert!(tables[0].is_fully_resolved());
    assert_eq!(tables[0], tables[1]);
}

#[test]
fn test_compute_neighbors_is_idempotent() {
    let tables = run_ranks(2, |rank, comm| {
        let mut conn = GridConnectivity::with_communicator(Box::new(comm));
        conn.initialize();
        conn.set_num_grids(2);
        let extent = if rank == 0 {
            Extent::new(0, 5, 0, 5, 0, 0)
        } else {
            Extent::new(5, 10, 0, 5, 0, 0)
        };
        conn.register_grid(rank as u32, extent, make_payload(&extent))
            .unwrap();

        conn.compute_neighbors().unwrap();
        let first = conn.topology().unwrap().table.clone();
        conn.compute_neighbors().unwrap();
        let second = conn.topology().unwrap().table.clone();
        (first, second)
    });

    for (first, second) in &tables {
        assert_eq!(first, second);
    }
    assert_eq!(tables[0].0, tables[1].0);
}

#[test]
fn test_unregistered_grid_leaves_hole() {
    let resolved = run_ranks(2, |rank, comm| {
        let mut conn = GridConnectivity::with_communicator(Box::new(comm));
        conn.initialize();
        conn.set_num_grids(3); // grid 2 never registered anywhere
        let extent = if rank == 0 {
            Extent::new(0, 5, 0, 5, 0, 0)
        } else {
            Extent::new(5, 10, 0, 5, 0, 0)
        };
        conn.register_grid(rank as u32, extent, make_payload(&extent))
            .unwrap();
        conn.compute_neighbors().unwrap();

        assert_eq!(conn.grid_rank(2), None);
        assert!(!conn.is_grid_local(2));
        conn.topology().unwrap().table.is_fully_resolved()
    });
    assert_eq!(resolved, vec![false, false]);
}

#[test]
fn test_duplicate_owner_is_an_error_everywhere() {
    let results = run_ranks(2, |_rank, comm| {
        let mut conn = GridConnectivity::with_communicator(Box::new(comm));
        conn.initialize();
        conn.set_num_grids(1);
        // Both ranks claim grid 0.
        let extent = Extent::new(0, 5, 0, 5, 0, 0);
        conn.register_grid(0, extent, make_payload(&extent)).unwrap();
        conn.compute_neighbors()
    });

    for result in results {
        match result {
            Err(SeamError::DuplicateOwner { id: 0, first, second }) => {
                assert_eq!((first, second), (0, 1));
            }
            other => panic!("expected DuplicateOwner, got {other:?}"),
        }
    }
}

// =============================================================================
// Ghost exchange
// =============================================================================

#[test]
fn test_two_rank_ghost_exchange() {
    // The canonical split: [0,5] and [5,10] along i, sharing the plane
    // i=5. After one ghost layer, rank 0 sees rank 1's owned values at
    // i=6 and rank 1 sees rank 0's at i=4.
    run_ranks(2, |rank, comm| {
        let mut conn = GridConnectivity::with_communicator(Box::new(comm));
        conn.initialize();
        conn.set_num_grids(2);
        let extent = if rank == 0 {
            Extent::new(0, 5, 0, 5, 0, 0)
        } else {
            Extent::new(5, 10, 0, 5, 0, 0)
        };
        let id = rank as u32;
        conn.register_grid(id, extent, make_payload(&extent)).unwrap();

        conn.compute_neighbors().unwrap();
        conn.create_ghost_layers(1).unwrap();

        let ghosted = conn.ghosted_grid(id).unwrap();
        let expected_extent = if rank == 0 {
            Extent::new(0, 6, 0, 5, 0, 0)
        } else {
            Extent::new(4, 10, 0, 5, 0, 0)
        };
        assert_eq!(ghosted.extent, expected_extent);

        let ghost_i = if rank == 0 { 6 } else { 4 };
        let height = ghosted.point_array("height").unwrap();
        let positions = ghosted.positions.as_ref().unwrap();
        for j in 0..=5 {
            let off = ghosted.extent.node_offset(ghost_i, j, 0);
            // The ghost value is exactly the peer's owned value.
            assert_eq!(height.data[off], height_at(ghost_i, j));
            assert_eq!(positions[off], [ghost_i as f32, j as f32, 0.0]);
            assert!(ghost::is_ghost(ghosted.node_flags[off]));
        }

        // Owned data is untouched, including the shared plane i=5.
        for (i, j, _) in conn.local_grid(id).unwrap().extent.nodes() {
            let off = ghosted.extent.node_offset(i, j, 0);
            assert_eq!(height.data[off], height_at(i, j));
            assert!(!ghost::is_ghost(ghosted.node_flags[off]));
        }

        // One ghost cell column appeared and carries the peer's values.
        let ghost_ci = if rank == 0 { 5 } else { 4 };
        let mass = ghosted.cell_array("mass").unwrap();
        let ghosted_cells = ghosted.extent.cell_space();
        for cj in 0..=4 {
            let off = ghosted_cells.node_offset(ghost_ci, cj, 0);
            assert_eq!(mass.data[off], mass_at(ghost_ci, cj));
            assert!(ghost::is_ghost(ghosted.cell_flags[off]));
        }
    });
}

#[test]
fn test_two_rank_ghost_exchange_width_two() {
    run_ranks(2, |rank, comm| {
        let mut conn = GridConnectivity::with_communicator(Box::new(comm));
        conn.initialize();
        conn.set_num_grids(2);
        let extent = if rank == 0 {
            Extent::new(0, 5, 0, 5, 0, 0)
        } else {
            Extent::new(5, 10, 0, 5, 0, 0)
        };
        let id = rank as u32;
        conn.register_grid(id, extent, make_payload(&extent)).unwrap();
        conn.compute_neighbors().unwrap();
        conn.create_ghost_layers(2).unwrap();

        let ghosted = conn.ghosted_grid(id).unwrap();
        let ghost_is: [i32; 2] = if rank == 0 { [6, 7] } else { [3, 4] };
        let height = ghosted.point_array("height").unwrap();
        for i in ghost_is {
            for j in 0..=5 {
                let off = ghosted.extent.node_offset(i, j, 0);
                assert_eq!(height.data[off], height_at(i, j));
            }
        }
    });
}

#[test]
fn test_single_process_run_uses_no_network() {
    // Three grids in a row on one process. The serial communicator fails
    // any point-to-point traffic, so completing at all proves the fills
    // were local copies.
    let mut conn = GridConnectivity::new();
    conn.initialize();
    conn.set_num_grids(3);

    let extents = [
        Extent::new(0, 2, 0, 2, 0, 0),
        Extent::new(2, 4, 0, 2, 0, 0),
        Extent::new(4, 6, 0, 2, 0, 0),
    ];
    for (id, extent) in extents.iter().enumerate() {
        conn.register_grid(id as u32, *extent, make_payload(extent))
            .unwrap();
    }

    conn.compute_neighbors().unwrap();
    conn.create_ghost_layers(1).unwrap();

    // The middle grid gains ghosts on both sides, one from each neighbor.
    let ghosted = conn.ghosted_grid(1).unwrap();
    assert_eq!(ghosted.extent, Extent::new(1, 5, 0, 2, 0, 0));
    let height = ghosted.point_array("height").unwrap();
    for j in 0..=2 {
        assert_eq!(
            height.data[ghosted.extent.node_offset(1, j, 0)],
            height_at(1, j)
        );
        assert_eq!(
            height.data[ghosted.extent.node_offset(5, j, 0)],
            height_at(5, j)
        );
    }

    // Edge grids only grow inward.
    assert_eq!(
        conn.ghosted_grid(0).unwrap().extent,
        Extent::new(0, 3, 0, 2, 0, 0)
    );
    assert_eq!(
        conn.ghosted_grid(2).unwrap().extent,
        Extent::new(3, 6, 0, 2, 0, 0)
    );
}

#[test]
fn test_zero_width_is_a_noop() {
    let mut conn = GridConnectivity::new();
    conn.initialize();
    conn.set_num_grids(1);
    let extent = Extent::new(0, 5, 0, 5, 0, 0);
    conn.register_grid(0, extent, make_payload(&extent)).unwrap();
    conn.compute_neighbors().unwrap();

    conn.create_ghost_layers(0).unwrap();
    assert!(conn.ghosted_grid(0).is_none());
    conn.create_ghost_layers(-3).unwrap();
    assert!(conn.ghosted_grid(0).is_none());
}

#[test]
fn test_four_rank_quadrants_with_corners() {
    // 2x2 rank layout; every rank's ghosted grid needs face slices from
    // two neighbors and the single center node from the diagonal one.
    run_ranks(4, |rank, comm| {
        let quadrants = [
            Extent::new(0, 5, 0, 5, 0, 0),
            Extent::new(5, 10, 0, 5, 0, 0),
            Extent::new(0, 5, 5, 10, 0, 0),
            Extent::new(5, 10, 5, 10, 0, 0),
        ];
        let mut conn = GridConnectivity::with_communicator(Box::new(comm));
        conn.initialize();
        conn.set_num_grids(4);
        let id = rank as u32;
        let extent = quadrants[rank];
        conn.register_grid(id, extent, make_payload(&extent)).unwrap();

        conn.compute_neighbors().unwrap();
        conn.create_ghost_layers(1).unwrap();

        let ghosted = conn.ghosted_grid(id).unwrap();
        let height = ghosted.point_array("height").unwrap();

        // Every node of the ghosted extent now carries the global field,
        // wherever it came from.
        for (i, j, _) in ghosted.extent.nodes() {
            let off = ghosted.extent.node_offset(i, j, 0);
            assert_eq!(
                height.data[off],
                height_at(i, j),
                "rank {rank} node ({i}, {j})"
            );
        }
    });
}
