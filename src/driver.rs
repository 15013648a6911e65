//! Command line plumbing shared by the demo drivers.

use crate::build_info;
use crate::error::*;
use crate::grid::*;
use crate::image::write_heatmap;
use crate::init;
use crate::io;
use crate::parameters::RelaxParameters;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[cfg(feature = "profile-with-puffin")]
use std::sync::Mutex;

#[cfg(feature = "profile-with-puffin")]
static PUFFIN_SERVER: Mutex<Option<puffin_http::Server>> = Mutex::new(None);

/// Jacobi relaxation driver
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Grid side length, boundary included.
    #[arg(short, long, default_value = "50")]
    pub dimension: usize,

    /// Largest worker (thread or rank) count to run.
    #[arg(short, long, visible_alias = "ranks", default_value = "16")]
    pub workers: usize,

    /// Convergence precision.
    #[arg(short, long, default_value = "0.000001")]
    pub precision: f64,

    /// Runs per worker count.
    #[arg(short, long, default_value = "5")]
    pub repeats: usize,

    /// Raw grid file to relax instead of a random grid.
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Side length of the data set in `input`, when only its top left
    /// `dimension` window should be used.
    #[arg(long, requires("input"))]
    pub data_size: Option<usize>,

    /// Seed for the random grid, fresh entropy when missing.
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Random grid values are drawn from `[0, max_value)`.
    #[arg(long, default_value = "5.0")]
    pub max_value: f64,

    /// Directory for the converged grid (raw and png), will be created.
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Print build information and quit
    #[arg(long)]
    pub build_info: bool,
}

/// Install the `fmt` subscriber, `RUST_LOG` overrides the `info` default.
/// Repeated calls are ignored.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_thread_names(true)
        .try_init();
}

/// Log the error and exit non-zero.
pub fn exit_on_error<T>(result: RelaxResult<T>) -> T {
    match result {
        Ok(v) => v,
        Err(e) => {
            tracing::error!(error = %e, "relax failed");
            std::process::exit(1);
        }
    }
}

impl Args {
    pub fn cli_setup(name: &str) -> RelaxResult<Self> {
        let args = Args::parse();

        if args.build_info {
            build_info::print_report(name);
            std::process::exit(0);
        }

        init_logging();
        tracing::info!(name, ?args, "starting");

        if let Some(output_dir) = &args.output_dir {
            std::fs::create_dir_all(output_dir)?;
        }

        #[cfg(feature = "profile-with-puffin")]
        start_profiler();

        Ok(args)
    }

    pub fn parameters(&self) -> RelaxParameters {
        RelaxParameters {
            dimension: self.dimension,
            workers: self.workers,
            precision: self.precision,
        }
    }

    /// The starting grid: `input` when given, random otherwise.
    pub fn load_grid(&self, dimension: usize) -> RelaxResult<Grid> {
        profiling::scope!("load_grid");
        let grid = match (&self.input, self.data_size) {
            (Some(input), Some(data_size)) => {
                io::read_raw_window(input, data_size, dimension)?
            }
            (Some(input), None) => io::read_raw(input, dimension)?,
            (None, _) => {
                let mut rng = match self.seed {
                    Some(seed) => StdRng::seed_from_u64(seed),
                    None => StdRng::from_entropy(),
                };
                init::random(dimension, self.max_value, &mut rng)
            }
        };
        if !io::verify_no_sentinel(&grid) {
            tracing::warn!("grid still holds sentinel values after loading");
        }
        Ok(grid)
    }

    pub fn output_path(&self, label: &str, extension: &str) -> Option<PathBuf> {
        self.output_dir.as_ref().map(|dir| {
            let mut path = dir.clone();
            path.push(format!("{}.{}", label, extension));
            path
        })
    }

    /// Write `grid` as raw and png into `output_dir`, if one was given.
    pub fn write_outputs(&self, grid: &Grid, label: &str) -> RelaxResult<()> {
        if let Some(path) = self.output_path(label, "raw") {
            io::write_raw(&path, grid)?;
        }
        if let Some(path) = self.output_path(label, "png") {
            write_heatmap(grid, &path)?;
        }
        Ok(())
    }

    pub fn finish(&self) {
        #[cfg(feature = "profile-with-puffin")]
        {
            tracing::info!("flushing profiler");
            if let Ok(mut server) = PUFFIN_SERVER.lock() {
                server.take();
            }
        }
    }
}

#[cfg(feature = "profile-with-puffin")]
fn start_profiler() {
    let server_addr = format!("127.0.0.1:{}", puffin_http::DEFAULT_PORT);
    match puffin_http::Server::new(&server_addr) {
        Ok(server) => {
            tracing::info!(
                "Run this to view profiling data:  puffin_viewer {server_addr}"
            );
            profiling::puffin::set_scopes_on(true);
            if let Ok(mut slot) = PUFFIN_SERVER.lock() {
                *slot = Some(server);
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "profiling server did not start");
        }
    }
}
