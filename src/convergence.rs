//! The averaging stencil and the convergence bookkeeping both engines share.

use crate::error::*;
use crate::grid::*;
use std::ops::Range;
use std::sync::atomic::{AtomicBool, Ordering};

/// What an engine reports once the grid has converged.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Full sweeps performed, including the final one that met the precision.
    pub sweeps: usize,
}

/// Mean of the four cardinal neighbours.
/// Operand order is fixed so every engine produces identical bits.
#[inline]
pub fn average4(up: f64, down: f64, left: f64, right: f64) -> f64 {
    (up + down + left + right) / 4.0
}

/// A cell has not converged while it moves by more than `precision`.
#[inline]
pub fn exceeds(old: f64, new: f64, precision: f64) -> bool {
    (old - new).abs() > precision
}

pub fn validate_precision(precision: f64) -> RelaxResult<()> {
    if precision.is_nan() || precision < 0.0 {
        return Err(RelaxError::InvalidParameter(format!(
            "precision must be a non-negative number, got {}",
            precision
        )));
    }
    Ok(())
}

/// Recompute the interior cells of one row.
/// `above`, `current` and `below` are the previous sweep's rows,
/// `output` receives the new values, boundary columns are not written.
/// Returns true when any cell moved by more than `precision`.
#[inline]
pub fn relax_row(
    above: &[f64],
    current: &[f64],
    below: &[f64],
    output: &mut [f64],
    precision: f64,
) -> bool {
    let d = current.len();
    debug_assert_eq!(above.len(), d);
    debug_assert_eq!(below.len(), d);
    debug_assert_eq!(output.len(), d);

    let mut raised = false;
    for j in 1..d.saturating_sub(1) {
        let value = average4(above[j], below[j], current[j - 1], current[j + 1]);
        output[j] = value;
        if !raised && exceeds(current[j], value, precision) {
            raised = true;
        }
    }
    raised
}

/// One Jacobi pass over `rows`, reading `previous` and writing `grid`.
/// Returns true when any cell moved by more than `precision`.
pub fn relax_rows(
    grid: &mut Grid,
    previous: &Grid,
    rows: Range<usize>,
    precision: f64,
) -> bool {
    debug_assert_eq!(grid.dimension(), previous.dimension());
    let mut raised = false;
    for i in rows {
        let changed = relax_row(
            previous.row(i - 1),
            previous.row(i),
            previous.row(i + 1),
            grid.row_mut(i),
            precision,
        );
        raised |= changed;
    }
    raised
}

/// Plain sequential relaxation, the reference both engines must agree with.
/// Returns the number of sweeps taken.
pub fn relax_sequential(grid: &mut Grid, precision: f64) -> RelaxResult<usize> {
    validate_precision(precision)?;
    let mut previous = grid.clone();
    let rows = grid.interior_rows();
    let mut sweeps = 0;
    if rows.is_empty() {
        return Ok(sweeps);
    }
    loop {
        previous.copy_interior_rows_from(grid, rows.clone());
        sweeps += 1;
        if !relax_rows(grid, &previous, rows.clone(), precision) {
            return Ok(sweeps);
        }
    }
}

/// Shared convergence flags for the thread pool.
/// Sweep `s` raises `flags[s % 2]`; after the sweep-end barrier every worker
/// reads it and lowers the other one for the following sweep.
/// Nobody raises the next flag before the next sweep-start barrier,
/// so a late lowering store can never hide a raise.
#[derive(Debug, Default)]
pub struct SweepFlags {
    flags: [AtomicBool; 2],
}

impl SweepFlags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Relaxed is enough, the barriers order raises against reads.
    #[inline]
    pub fn raise(&self, sweep: usize) {
        self.flags[sweep % 2].store(true, Ordering::Relaxed);
    }

    #[inline]
    pub fn is_raised(&self, sweep: usize) -> bool {
        self.flags[sweep % 2].load(Ordering::Relaxed)
    }

    #[inline]
    pub fn lower_next(&self, sweep: usize) {
        self.flags[(sweep + 1) % 2].store(false, Ordering::Relaxed);
    }
}

/// One flag per rank, exchanged by broadcast every sweep.
/// Flags travel as `f64` because that is what the communicators carry.
#[derive(Clone, Debug)]
pub struct RankFlags {
    flags: Vec<f64>,
}

impl RankFlags {
    pub fn new(ranks: usize) -> Self {
        RankFlags {
            flags: vec![0.0; ranks],
        }
    }

    pub fn set(&mut self, rank: usize, raised: bool) {
        self.flags[rank] = if raised { 1.0 } else { 0.0 };
    }

    pub fn is_raised(&self, rank: usize) -> bool {
        self.flags[rank] != 0.0
    }

    /// Wire form of one rank's flag.
    pub fn slot_mut(&mut self, rank: usize) -> &mut [f64] {
        std::slice::from_mut(&mut self.flags[rank])
    }

    /// Global convergence: nobody raised a flag.
    pub fn all_lowered(&self) -> bool {
        self.flags.iter().all(|f| *f == 0.0)
    }
}
