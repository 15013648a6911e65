//! Initial grids for drivers and tests.

use crate::grid::*;
use rand::prelude::*;
use rayon::prelude::*;

/// Largest random value the benchmark drivers use, values land in `[0, 5)`.
pub const DEFAULT_MAX_VALUE: f64 = 5.0;

/// Uniform values in `[0, max_value)` from a caller supplied generator,
/// reproducible when the generator is seeded.
pub fn random<R: Rng>(dimension: usize, max_value: f64, rng: &mut R) -> Grid {
    let mut grid = Grid::new(dimension);
    for v in grid.as_mut_slice() {
        *v = rng.gen::<f64>() * max_value;
    }
    grid
}

/// Uniform values in `[0, max_value)`, filled in parallel from
/// thread local generators.
/// `chunk_size` values are filled per task.
pub fn par_random(dimension: usize, max_value: f64, chunk_size: usize) -> Grid {
    let mut grid = Grid::new(dimension);
    grid.as_mut_slice()
        .par_chunks_mut(chunk_size.max(1))
        .for_each(|chunk: &mut [f64]| {
            let mut rng = rand::thread_rng();
            for v in chunk {
                *v = rng.gen::<f64>() * max_value;
            }
        });
    grid
}

/// Constant boundary around a constant interior.
pub fn boundary_and_interior(
    dimension: usize,
    boundary: f64,
    interior: f64,
) -> Grid {
    let mut grid = Grid::filled(dimension, boundary);
    let cols = grid.interior_cols();
    for i in grid.interior_rows() {
        for v in &mut grid.row_mut(i)[cols.clone()] {
            *v = interior;
        }
    }
    grid
}
