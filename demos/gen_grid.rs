use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use relax::driver::{exit_on_error, init_logging};
use relax::init;
use relax::io::write_raw;
use std::path::PathBuf;

/// Write a random raw grid for the relax drivers
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Output file.
    #[arg(short, long)]
    output: PathBuf,

    /// Grid side length.
    #[arg(short, long, default_value = "5000")]
    dimension: usize,

    /// Values are drawn from `[0, max_value)`.
    #[arg(long, default_value = "5.0")]
    max_value: f64,

    /// Seed, without one the grid is filled in parallel from
    /// thread local generators.
    #[arg(short, long)]
    seed: Option<u64>,

    /// Chunk size for the parallel fill.
    #[arg(short, long, default_value = "1000")]
    chunk_size: usize,
}

fn main() {
    let args = Args::parse();
    init_logging();

    let grid = match args.seed {
        Some(seed) => init::random(
            args.dimension,
            args.max_value,
            &mut StdRng::seed_from_u64(seed),
        ),
        None => init::par_random(args.dimension, args.max_value, args.chunk_size),
    };
    exit_on_error(write_raw(&args.output, &grid));
}
