use relax::distributed::comm::*;
use relax::distributed;
use relax::driver::*;
use relax::error::*;
use relax::grid::Grid;
use relax::timing::*;

fn main() {
    let args = exit_on_error(Args::cli_setup("relax_mpi"));
    let Some(universe) = mpi::initialize() else {
        exit_on_error::<()>(Err(RelaxError::PeerCommunication(
            "MPI was already initialized".to_string(),
        )));
        return;
    };
    let comm = MpiComm::new(universe.world());
    exit_on_error(run(&args, &comm));
    args.finish();
}

fn run(args: &Args, comm: &MpiComm) -> RelaxResult<()> {
    let params = args.parameters().force_odd();
    params.validate()?;
    let rank = comm.rank();

    // Rank 0 loads (or draws) the grid, everyone else starts from its copy
    let mut grid = if rank == 0 {
        args.load_grid(params.dimension)?
    } else {
        Grid::new(params.dimension)
    };
    comm.broadcast(0, grid.as_mut_slice())?;
    let mut tmp = Grid::new(params.dimension);

    comm.barrier()?;
    let watch = Stopwatch::start();
    let report = distributed::relax(&mut grid, &mut tmp, params.precision, comm)?;
    let elapsed = watch.elapsed();

    if rank == 0 {
        tracing::info!(
            ranks = comm.size(),
            sweeps = report.sweeps,
            elapsed = %format_elapsed(elapsed),
            "mpi relax"
        );
        println!("{} {}", comm.size(), format_elapsed(elapsed));
        args.write_outputs(&grid, "relax_mpi")?;
    }
    Ok(())
}
