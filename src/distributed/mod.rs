//! Distributed-memory engine.
//!
//! Every rank holds a full copy of the grid but only relaxes its own
//! contiguous band of rows. After each sweep neighbouring ranks swap
//! their edge rows, every rank broadcasts its convergence flag, and
//! the band (plus its two halo rows) is snapshotted for the next sweep.
//! Once all flags stay low the bands are broadcast so every rank ends
//! with the complete converged grid.

pub mod comm;

use crate::convergence::*;
use crate::error::*;
use crate::grid::*;
use crate::partition::*;
use comm::*;

/// Collective relaxation, every rank of `comm` must call this with a grid of
/// the same dimension and the same contents.
/// `tmp` is the working buffer; whatever it holds on entry is overwritten.
/// Returns once every rank's band has converged and `grid` holds the full
/// converged result on every rank.
pub fn relax<C: Communicator>(
    grid: &mut Grid,
    tmp: &mut Grid,
    precision: f64,
    comm: &C,
) -> RelaxResult<SweepReport> {
    profiling::scope!("distributed_relax");
    validate_precision(precision)?;

    let dimension = grid.dimension();
    if tmp.dimension() != dimension {
        return Err(RelaxError::DimensionMismatch {
            expected: dimension * dimension,
            found: tmp.as_slice().len(),
        });
    }
    if grid.interior_rows().is_empty() {
        return Ok(SweepReport::default());
    }

    let rank = comm.rank();
    let ranks = comm.size();
    let band = band(dimension, ranks, rank)?;
    tracing::debug!(
        rank,
        ranks,
        dimension,
        start = band.start,
        end = band.end,
        "distributed relax start"
    );

    tmp.as_mut_slice().copy_from_slice(grid.as_slice());
    let mut flags = RankFlags::new(ranks);
    let mut sweeps = 0;
    loop {
        let raised = {
            profiling::scope!("distributed_relax: sweep");
            relax_rows(grid, tmp, band.rows(), precision)
        };
        flags.set(rank, raised);

        exchange_halo(grid, band, comm)?;
        aggregate_flags(&mut flags, comm)?;

        tmp.copy_interior_rows_from(grid, band.with_halo());
        sweeps += 1;
        if rank == 0 {
            tracing::trace!(sweep = sweeps, "distributed sweep complete");
        }
        if flags.all_lowered() {
            break;
        }
    }

    redistribute(grid, ranks, comm)?;
    tracing::debug!(rank, sweeps, "distributed relax converged");
    Ok(SweepReport { sweeps })
}

/// Swap edge rows with both neighbours.
/// Phase 0 has even ranks sending while odd ranks receive, phase 1 the
/// reverse, so a blocking send always has a receiver waiting for it.
fn exchange_halo<C: Communicator>(
    grid: &mut Grid,
    band: RowBand,
    comm: &C,
) -> RelaxResult<()> {
    profiling::scope!("distributed_relax: halo exchange");
    let rank = comm.rank();
    let first = rank == 0;
    let last = rank + 1 == comm.size();

    for phase in 0..2 {
        if rank % 2 == phase {
            if !last {
                comm.send(rank + 1, HALO_DOWN, grid.row(band.last()))?;
            }
            if !first {
                comm.send(rank - 1, HALO_UP, grid.row(band.first()))?;
            }
        } else {
            if !first {
                comm.receive(
                    rank - 1,
                    HALO_DOWN,
                    grid.row_mut(band.halo_above()),
                )?;
            }
            if !last {
                comm.receive(rank + 1, HALO_UP, grid.row_mut(band.halo_below()))?;
            }
        }
    }
    Ok(())
}

/// One broadcast per rank, rooted at that rank, carrying its flag.
fn aggregate_flags<C: Communicator>(
    flags: &mut RankFlags,
    comm: &C,
) -> RelaxResult<()> {
    profiling::scope!("distributed_relax: flag aggregation");
    for root in 0..comm.size() {
        comm.broadcast(root, flags.slot_mut(root))?;
    }
    Ok(())
}

/// Every band's rows, broadcast from their owner, one row at a time.
fn redistribute<C: Communicator>(
    grid: &mut Grid,
    ranks: usize,
    comm: &C,
) -> RelaxResult<()> {
    profiling::scope!("distributed_relax: redistribute");
    let bands = bands(grid.dimension(), ranks)?;
    for (root, band) in bands.iter().enumerate() {
        for row in band.rows() {
            comm.broadcast(root, grid.row_mut(row))?;
        }
    }
    Ok(())
}

/// Run the distributed engine on `ranks` in-process ranks.
/// Every rank starts from a copy of `grid`; rank 0's converged grid is
/// written back.
pub fn relax_in_process(
    grid: &mut Grid,
    ranks: usize,
    precision: f64,
) -> RelaxResult<SweepReport> {
    if ranks == 0 {
        return Err(RelaxError::InvalidParameter(
            "at least one rank is required".to_string(),
        ));
    }
    let initial: &Grid = grid;
    let results = ChannelUniverse::new(ranks).run(|comm| {
        let mut local = initial.clone();
        let mut tmp = initial.clone();
        relax(&mut local, &mut tmp, precision, comm).map(|r| (local, r))
    })?;

    let mut converged = None;
    for result in results {
        let (local, report) = result?;
        if converged.is_none() {
            converged = Some((local, report));
        }
    }
    match converged {
        Some((local, report)) => {
            *grid = local;
            Ok(report)
        }
        None => Err(RelaxError::PeerCommunication(
            "no rank reported a result".to_string(),
        )),
    }
}
