use relax::partition::*;
use relax::shared;
use relax::grid::*;

/// How often each row of a `dimension` grid is claimed.
fn claims<I: IntoIterator<Item = usize>>(dimension: usize, rows: I) -> Vec<usize> {
    let mut count = vec![0; dimension];
    for row in rows {
        count[row] += 1;
    }
    count
}

fn assert_interior_once(dimension: usize, count: &[usize]) {
    assert_eq!(count[0], 0);
    assert_eq!(count[dimension - 1], 0);
    for (row, c) in count.iter().enumerate().take(dimension - 1).skip(1) {
        assert_eq!(*c, 1, "row {} claimed {} times", row, c);
    }
}

#[test]
fn cyclic_partition_is_complete() {
    let dimension = 11;
    for workers in [1, 2, 3, 5] {
        let count = claims(
            dimension,
            (0..workers).flat_map(|w| cyclic_rows(dimension, workers, w)),
        );
        assert_interior_once(dimension, &count);
    }
}

#[test]
fn band_partition_is_complete() {
    let dimension = 11;
    for ranks in 1..=5 {
        let bands = bands(dimension, ranks).unwrap();
        assert_eq!(bands.len(), ranks);
        assert_eq!(bands[0].start, 1);
        assert_eq!(bands[ranks - 1].end, dimension - 1);
        for pair in bands.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
        assert!(bands.iter().all(|b| !b.is_empty()));

        let count = claims(dimension, bands.iter().flat_map(|b| b.rows()));
        assert_interior_once(dimension, &count);
    }
}

#[test]
fn more_workers_than_rows() {
    // Idle workers still take part in every barrier
    let mut grid = Grid::new(4);
    grid.set(1, 1, 4.0);
    let mut expected = grid.clone();
    relax::convergence::relax_sequential(&mut expected, 1e-6).unwrap();

    let report = shared::relax(&mut grid, 5, 1e-6).unwrap();
    assert!(report.sweeps > 0);
    assert_eq!(grid, expected);
}
