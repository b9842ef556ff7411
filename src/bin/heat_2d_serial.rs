use dhls::cli::*;
use dhls::serial;

fn main() -> anyhow::Result<()> {
    let args = Args::cli_setup(&SERIAL_DEFAULTS);
    let config = args.config(&SERIAL_DEFAULTS)?;
    if args.ranks.is_some() {
        log::warn!("--ranks has no effect on the serial solver");
    }
    log::info!(
        "{}x{} grid ({} inner), {} iterations, c = {}, dt = {:e}",
        config.total_points(),
        config.total_points(),
        config.n_inner(),
        config.iterations(),
        config.diffusion(),
        config.dt()
    );

    let start = std::time::Instant::now();
    let grid = serial::solve(&config)?;
    let elapsed = start.elapsed().as_secs_f64();

    println!(
        "Finished {} iterations for {}x{} grid ({} inner) in {:.6} seconds.",
        config.iterations(),
        config.total_points(),
        config.total_points(),
        config.n_inner(),
        elapsed
    );
    println!("{elapsed:.6}");

    if !args.write_outputs(&grid, &SERIAL_DEFAULTS) {
        log::warn!("result was not persisted");
    }
    args.finish();
    Ok(())
}
