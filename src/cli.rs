//! Command line handling shared by the solver binaries.

use crate::build_info;
use crate::config::*;
use crate::domain::GridBuffer;
use crate::error::*;
use crate::grid_file;
use clap::Parser;
use std::path::PathBuf;

#[cfg(feature = "profile-with-puffin")]
use std::sync::Mutex;

#[cfg(feature = "profile-with-puffin")]
lazy_static::lazy_static! {
    static ref PUFFIN_SERVER: Mutex<Option<puffin_http::Server>> = {
        let server_addr = format!("127.0.0.1:{}", puffin_http::DEFAULT_PORT);
        log::info!("Run this to view profiling data:  puffin_viewer {server_addr}");
        let server = puffin_http::Server::new(&server_addr)
            .map_err(|e| log::warn!("could not start profiling server: {e}"))
            .ok();
        Mutex::new(server)
    };
}

/// Per binary defaults for the positional arguments and the output file.
#[derive(Debug, Clone, Copy)]
pub struct RunDefaults {
    pub name: &'static str,
    pub n_inner: usize,
    pub iterations: usize,
    pub output: &'static str,
}

pub const SERIAL_DEFAULTS: RunDefaults = RunDefaults {
    name: "heat_2d_serial",
    n_inner: 100,
    iterations: 10000,
    output: "output_serial.txt",
};

pub const DISTRIBUTED_DEFAULTS: RunDefaults = RunDefaults {
    name: "heat_2d_distributed",
    n_inner: 1000,
    iterations: 1000,
    output: "output_mpi.txt",
};

/// Ranks used by the in-process backend when `--ranks` is not given.
pub const DEFAULT_LOCAL_RANKS: usize = 4;

/// Grids up to this many points per side get a debug preview.
const PREVIEW_LIMIT: usize = 10;

/// 2D heat diffusion on the unit square with fixed edge temperatures
#[derive(Parser, Debug)]
#[command(version, about, long_about = None, allow_negative_numbers = true)]
pub struct Args {
    /// Interior points per side; the grid is (n + 2) x (n + 2)
    pub n_inner: Option<usize>,

    /// Number of time steps
    pub iterations: Option<usize>,

    /// Temperature of the top edge
    pub top: Option<f64>,

    /// Temperature of the bottom edge
    pub bottom: Option<f64>,

    /// Temperature of the left edge
    pub left: Option<f64>,

    /// Temperature of the right edge
    pub right: Option<f64>,

    /// Diffusion coefficient c.
    #[arg(long, default_value_t = DEFAULT_DIFFUSION)]
    pub diffusion: f64,

    /// Result file, defaults per binary.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Skip writing the result file.
    #[arg(long, conflicts_with = "output")]
    pub no_output: bool,

    /// Also write the result as a PNG heat map.
    /// WARNING: one pixel per grid point, we do not check image size.
    #[arg(long)]
    pub image: Option<PathBuf>,

    /// The number of threads to use per process, rayon picks if unset.
    #[arg(short, long)]
    pub threads: Option<usize>,

    /// Ranks to run as threads of this process (without MPI).
    #[arg(short, long)]
    pub ranks: Option<usize>,

    /// Rows per parallel task in the stencil kernel.
    #[arg(short, long, default_value = "16")]
    pub chunk_size: usize,

    /// Print build information and quit
    #[arg(long)]
    pub build_info: bool,
}

impl Args {
    pub fn cli_setup(defaults: &RunDefaults) -> Self {
        let args = Args::parse();

        let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
            .try_init();

        if args.build_info {
            build_info::print_report(defaults.name);
            std::process::exit(0);
        }

        #[cfg(feature = "profile-with-puffin")]
        {
            if let Ok(server_lock) = PUFFIN_SERVER.lock() {
                if let Some(server) = server_lock.as_ref() {
                    std::thread::sleep(std::time::Duration::from_secs(2));
                    profiling::puffin::set_scopes_on(true);
                    profiling::finish_frame!();
                    log::info!("profiling clients: {}", server.num_clients());
                }
            }
        }

        if let Some(threads) = args.threads {
            if let Err(e) = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .thread_name(|i| format!("rayon_thread_{}", i))
                .build_global()
            {
                log::warn!("could not configure {threads} worker threads: {e}");
            }
        }

        args
    }

    pub fn boundaries(&self) -> Boundaries {
        let defaults = Boundaries::default();
        Boundaries {
            top: self.top.unwrap_or(defaults.top),
            bottom: self.bottom.unwrap_or(defaults.bottom),
            left: self.left.unwrap_or(defaults.left),
            right: self.right.unwrap_or(defaults.right),
        }
    }

    pub fn config(&self, defaults: &RunDefaults) -> Result<SimulationConfig> {
        SimulationConfig::new(
            self.n_inner.unwrap_or(defaults.n_inner),
            self.iterations.unwrap_or(defaults.iterations),
            self.diffusion,
            self.boundaries(),
        )
    }

    pub fn local_ranks(&self) -> usize {
        self.ranks.unwrap_or(DEFAULT_LOCAL_RANKS)
    }

    pub fn output_path(&self, defaults: &RunDefaults) -> Option<PathBuf> {
        if self.no_output {
            None
        } else {
            Some(
                self.output
                    .clone()
                    .unwrap_or_else(|| PathBuf::from(defaults.output)),
            )
        }
    }

    /// Persist the result. Failures are logged, never fatal: the
    /// simulation itself already succeeded. Returns whether every
    /// requested file was written.
    pub fn write_outputs(&self, grid: &GridBuffer, defaults: &RunDefaults) -> bool {
        if grid.rows() <= PREVIEW_LIMIT && log::log_enabled!(log::Level::Debug) {
            log::debug!(
                "final grid:\n{}",
                grid_file::format_grid_section(grid, PREVIEW_LIMIT)
            );
        }

        let mut persisted = true;
        if let Some(path) = self.output_path(defaults) {
            if let Err(e) = grid_file::write_grid_file(grid, &path) {
                log::error!("{e}");
                persisted = false;
            }
        }
        if let Some(path) = &self.image {
            if let Err(e) = crate::image::write_heat_map(grid, path) {
                log::error!("could not write {}: {e}", path.display());
                persisted = false;
            }
        }
        persisted
    }

    pub fn finish(&self) {
        #[cfg(feature = "profile-with-puffin")]
        profiling::finish_frame!();
    }
}
