use relax::convergence::*;
use relax::distributed::relax_in_process;
use relax::grid::*;
use relax::init;
use relax::shared;

use float_cmp::assert_approx_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn random_grid(dimension: usize, seed: u64) -> Grid {
    init::random(
        dimension,
        init::DEFAULT_MAX_VALUE,
        &mut StdRng::seed_from_u64(seed),
    )
}

fn shared_result(initial: &Grid, workers: usize, precision: f64) -> (Grid, SweepReport) {
    let mut grid = initial.clone();
    let report = shared::relax(&mut grid, workers, precision).unwrap();
    (grid, report)
}

fn distributed_result(initial: &Grid, ranks: usize, precision: f64) -> (Grid, SweepReport) {
    let mut grid = initial.clone();
    let report = relax_in_process(&mut grid, ranks, precision).unwrap();
    (grid, report)
}

#[test]
fn single_worker_engines_agree() {
    let initial = random_grid(17, 11);
    let precision = 1e-4;

    let (threads, thread_report) = shared_result(&initial, 1, precision);
    let (ranks, rank_report) = distributed_result(&initial, 1, precision);
    assert_eq!(threads, ranks);
    assert_eq!(thread_report, rank_report);

    let mut sequential = initial.clone();
    let sweeps = relax_sequential(&mut sequential, precision).unwrap();
    assert_eq!(threads, sequential);
    assert_eq!(thread_report.sweeps, sweeps);
}

#[test]
fn worker_count_invariance() {
    let initial = random_grid(33, 42);
    let precision = 1e-3;
    let (expected, expected_report) = shared_result(&initial, 1, precision);
    assert!(expected_report.sweeps > 1);

    for workers in [4, 16] {
        let (grid, report) = shared_result(&initial, workers, precision);
        assert_eq!(report, expected_report, "workers: {}", workers);
        assert_eq!(grid, expected, "workers: {}", workers);
    }
    for ranks in [1, 4] {
        let (grid, report) = distributed_result(&initial, ranks, precision);
        assert_eq!(report, expected_report, "ranks: {}", ranks);
        assert_eq!(grid, expected, "ranks: {}", ranks);
    }
}

#[test]
fn boundary_is_never_written() {
    let mut initial = random_grid(15, 5);
    // Make the boundary distinguishable from anything an average produces
    for i in 0..15 {
        initial.set(0, i, 100.0 + i as f64);
        initial.set(14, i, -100.0 - i as f64);
        initial.set(i, 0, 50.0);
        initial.set(i, 14, -50.0);
    }

    let (threads, _) = shared_result(&initial, 3, 1e-3);
    let (ranks, _) = distributed_result(&initial, 3, 1e-3);
    for (row, col, value) in initial.boundary_cells() {
        assert_eq!(threads.get(row, col), value, "({}, {})", row, col);
        assert_eq!(ranks.get(row, col), value, "({}, {})", row, col);
    }
}

#[test]
fn one_more_sweep_stays_within_precision() {
    let initial = random_grid(21, 8);
    let precision = 1e-3;

    for grid in [
        shared_result(&initial, 4, precision).0,
        distributed_result(&initial, 3, precision).0,
    ] {
        let mut next = grid.clone();
        relax_rows(&mut next, &grid, grid.interior_rows(), precision);
        assert!(next.max_abs_diff(&grid) <= precision + 1e-12);
    }
}

#[test]
fn small_plate_cools_towards_boundary() {
    let initial = init::boundary_and_interior(5, 0.0, 10.0);

    let mut oracle = initial.clone();
    relax_sequential(&mut oracle, 1e-9).unwrap();

    let results = [
        shared_result(&initial, 1, 0.01).0,
        shared_result(&initial, 2, 0.01).0,
        distributed_result(&initial, 1, 0.01).0,
        distributed_result(&initial, 2, 0.01).0,
    ];
    for grid in results.iter() {
        for row in 1..4 {
            for col in 1..4 {
                assert_approx_eq!(
                    f64,
                    grid.get(row, col),
                    oracle.get(row, col),
                    epsilon = 0.1
                );
            }
        }

        let centre = grid.get(2, 2);
        let edge = grid.get(1, 2);
        let corner = grid.get(1, 1);
        assert!(centre >= edge);
        assert!(edge >= corner);
        assert!(corner > 0.0);

        for (a, b) in [((1, 2), (2, 1)), ((1, 2), (3, 2)), ((2, 1), (2, 3))] {
            assert_approx_eq!(f64, grid.get(a.0, a.1), grid.get(b.0, b.1), epsilon = 1e-12);
        }
        for (row, col) in [(1, 3), (3, 1), (3, 3)] {
            assert_approx_eq!(f64, grid.get(row, col), corner, epsilon = 1e-12);
        }
    }
    assert_eq!(results[0], results[1]);
    assert_eq!(results[0], results[2]);
    assert_eq!(results[0], results[3]);
}

#[test]
fn converged_grid_is_a_fixed_point() {
    let initial = init::boundary_and_interior(9, 1.0, 1.0);
    let (grid, report) = shared_result(&initial, 2, 0.0);
    assert_eq!(report.sweeps, 1);
    assert_eq!(grid, initial);

    let (grid, report) = distributed_result(&initial, 2, 0.0);
    assert_eq!(report.sweeps, 1);
    assert_eq!(grid, initial);
}
