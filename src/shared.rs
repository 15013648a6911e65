//! Shared-memory engine.
//!
//! A dedicated pool of `W` threads relaxes one grid in place.
//! Worker `k` owns the interior rows `1 + k, 1 + k + W, ...`.
//! Every sweep is: copy owned rows into the shared working buffer,
//! sweep-start barrier, recompute owned rows from the working buffer,
//! sweep-end barrier, read the convergence flag.

use crate::convergence::*;
use crate::error::*;
use crate::grid::*;
use crate::partition::*;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Barrier;
use sync_ptr::SyncMutPtr;

/// Row access to a grid buffer that every worker holds at once.
/// Workers only write rows they own, and the two barriers per sweep keep
/// reads of a row from overlapping the owner's writes to it.
struct SharedRows<'a> {
    ptr: SyncMutPtr<f64>,
    dimension: usize,
    _buffer: PhantomData<&'a mut [f64]>,
}

impl<'a> SharedRows<'a> {
    fn new(buffer: &'a mut [f64], dimension: usize) -> Self {
        debug_assert_eq!(buffer.len(), dimension * dimension);
        let ptr = unsafe { SyncMutPtr::new(buffer.as_mut_ptr()) };
        SharedRows {
            ptr,
            dimension,
            _buffer: PhantomData,
        }
    }

    /// Safety: nobody may write `row` while the slice is alive.
    #[inline]
    unsafe fn row(&self, row: usize) -> &[f64] {
        debug_assert!(row < self.dimension);
        std::slice::from_raw_parts(
            self.ptr.inner().add(row * self.dimension),
            self.dimension,
        )
    }

    /// Safety: the caller owns `row` for the current phase of the sweep.
    #[inline]
    #[allow(clippy::mut_from_ref)]
    unsafe fn row_mut(&self, row: usize) -> &mut [f64] {
        debug_assert!(row < self.dimension);
        std::slice::from_raw_parts_mut(
            self.ptr.inner().add(row * self.dimension),
            self.dimension,
        )
    }
}

struct Worker<'a> {
    grid: &'a SharedRows<'a>,
    tmp: &'a SharedRows<'a>,
    barrier: &'a Barrier,
    flags: &'a SweepFlags,
    dimension: usize,
    workers: usize,
    id: usize,
    precision: f64,
}

impl Worker<'_> {
    /// Returns the number of sweeps once the grid has converged.
    fn run(&self) -> usize {
        let cols = 1..self.dimension - 1;
        let mut sweep = 0;
        loop {
            // Snapshot owned rows. Every read of `tmp` from the previous
            // sweep finished before the last sweep-end barrier.
            for i in cyclic_rows(self.dimension, self.workers, self.id) {
                unsafe {
                    self.tmp.row_mut(i)[cols.clone()]
                        .copy_from_slice(&self.grid.row(i)[cols.clone()]);
                }
            }

            // Sweep start, all snapshots are in place.
            self.barrier.wait();

            let mut raised = false;
            for i in cyclic_rows(self.dimension, self.workers, self.id) {
                let changed = unsafe {
                    relax_row(
                        self.tmp.row(i - 1),
                        self.tmp.row(i),
                        self.tmp.row(i + 1),
                        self.grid.row_mut(i),
                        self.precision,
                    )
                };
                raised |= changed;
            }
            if raised {
                self.flags.raise(sweep);
            }

            // Sweep end, every raise for this sweep is visible.
            if self.barrier.wait().is_leader() {
                tracing::trace!(sweep, "shared sweep complete");
            }

            let converged = !self.flags.is_raised(sweep);
            self.flags.lower_next(sweep);
            sweep += 1;
            if converged {
                return sweep;
            }
        }
    }
}

/// Relax `grid` in place with `workers` threads until no interior cell
/// moves by more than `precision` in one sweep.
/// Blocks until convergence, there is no iteration cap.
pub fn relax(
    grid: &mut Grid,
    workers: usize,
    precision: f64,
) -> RelaxResult<SweepReport> {
    profiling::scope!("shared_relax");
    validate_precision(precision)?;
    if workers == 0 {
        return Err(RelaxError::InvalidParameter(
            "at least one worker is required".to_string(),
        ));
    }

    let dimension = grid.dimension();
    if grid.interior_rows().is_empty() {
        return Ok(SweepReport::default());
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("relax-worker-{}", i))
        .build()
        .map_err(|e| RelaxError::WorkerSpawn(e.to_string()))?;

    tracing::debug!(dimension, workers, precision, "shared relax start");

    // Boundaries are copied once here and never touched again.
    let mut tmp = grid.clone();
    let barrier = Barrier::new(workers);
    let flags = SweepFlags::new();
    let sweeps = AtomicUsize::new(0);

    {
        let grid_rows = SharedRows::new(grid.as_mut_slice(), dimension);
        let tmp_rows = SharedRows::new(tmp.as_mut_slice(), dimension);
        let grid_rows = &grid_rows;
        let tmp_rows = &tmp_rows;
        let barrier = &barrier;
        let flags = &flags;
        let sweeps = &sweeps;

        // The pool has exactly one thread per task, so every worker
        // reaches the barrier.
        pool.scope(|s| {
            for id in 0..workers {
                s.spawn(move |_| {
                    profiling::scope!("shared_relax: Worker Callback");
                    let worker = Worker {
                        grid: grid_rows,
                        tmp: tmp_rows,
                        barrier,
                        flags,
                        dimension,
                        workers,
                        id,
                        precision,
                    };
                    let worker_sweeps = worker.run();
                    if id == 0 {
                        sweeps.store(worker_sweeps, Ordering::Relaxed);
                    }
                });
            }
        });
    }

    let report = SweepReport {
        sweeps: sweeps.load(Ordering::Relaxed),
    };
    tracing::debug!(sweeps = report.sweeps, "shared relax converged");
    Ok(report)
}
