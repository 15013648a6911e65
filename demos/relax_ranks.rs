use relax::distributed::relax_in_process;
use relax::driver::*;
use relax::partition::validate_bands;
use relax::timing::*;

fn main() {
    let args = exit_on_error(Args::cli_setup("relax_ranks"));
    let params = args.parameters().force_odd();
    exit_on_error(params.validate());

    let initial = exit_on_error(args.load_grid(params.dimension));
    let mut converged = None;

    for ranks in 1..=params.workers {
        if let Err(e) = validate_bands(params.dimension, ranks) {
            tracing::warn!(ranks, error = %e, "skipping rank count");
            continue;
        }
        let mut grid = initial.clone();
        let (result, elapsed) = Stopwatch::time(|| {
            relax_in_process(&mut grid, ranks, params.precision)
        });
        let report = exit_on_error(result);
        tracing::info!(
            ranks,
            sweeps = report.sweeps,
            elapsed = %format_elapsed(elapsed),
            "distributed relax"
        );
        println!("{} {}", ranks, format_elapsed(elapsed));
        converged = Some(grid);
    }

    if let Some(grid) = converged {
        exit_on_error(args.write_outputs(&grid, "relax_ranks"));
    }
    args.finish();
}
