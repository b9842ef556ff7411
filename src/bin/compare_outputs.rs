use clap::Parser;
use dhls::compare::*;
use dhls::grid_file::read_grid_file;
use std::path::PathBuf;

/// Compare two result grids cell by cell
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Reference grid
    #[arg(default_value = "output_serial.txt")]
    reference: PathBuf,

    /// Grid to check against the reference
    #[arg(default_value = "output_mpi.txt")]
    candidate: PathBuf,

    /// Absolute difference above which a cell counts as differing.
    #[arg(short, long, default_value_t = DEFAULT_TOLERANCE)]
    tolerance: f64,

    /// Print build information and quit
    #[arg(long)]
    build_info: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
    if args.build_info {
        dhls::build_info::print_report("compare_outputs");
        return Ok(());
    }

    let reference = read_grid_file(&args.reference)?;
    let candidate = read_grid_file(&args.candidate)?;
    log::info!(
        "comparing {} against {}",
        args.candidate.display(),
        args.reference.display()
    );

    let comparison = compare_grids(&reference, &candidate, args.tolerance)?;
    println!("{comparison}");
    Ok(())
}
