use relax::driver::*;
use relax::shared;
use relax::timing::*;

fn main() {
    let args = exit_on_error(Args::cli_setup("relax_threads"));
    let params = args.parameters();
    exit_on_error(params.validate());

    let initial = exit_on_error(args.load_grid(params.dimension));
    let mut converged = None;

    // Same grid for every worker count, so timings are comparable
    for workers in 1..=params.workers {
        let mut samples = Vec::with_capacity(args.repeats);
        for repeat in 0..args.repeats {
            let mut grid = initial.clone();
            let (result, elapsed) = Stopwatch::time(|| {
                shared::relax(&mut grid, workers, params.precision)
            });
            let report = exit_on_error(result);
            tracing::info!(
                workers,
                repeat,
                sweeps = report.sweeps,
                elapsed = %format_elapsed(elapsed),
                "shared relax"
            );
            samples.push(elapsed);
            converged = Some(grid);
        }
        if let Some(m) = median(&samples) {
            println!("{} {}", workers, format_elapsed(m));
        }
    }

    if let Some(grid) = converged {
        exit_on_error(args.write_outputs(&grid, "relax_threads"));
    }
    args.finish();
}
