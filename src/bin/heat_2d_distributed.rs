use dhls::cli::*;
use dhls::config::SimulationConfig;
use dhls::solver::*;

fn report(args: &Args, config: &SimulationConfig, outcome: &RankOutcome) {
    let Some(grid) = &outcome.grid else {
        return;
    };
    println!(
        "Finished {} iterations for {}x{} grid ({} inner) in {:.6} seconds using {} processes.",
        config.iterations(),
        config.total_points(),
        config.total_points(),
        config.n_inner(),
        outcome.elapsed_seconds,
        outcome.ranks
    );
    let b = config.boundaries();
    println!(
        "Parameters: c = {}, dt = {:e}, ds = {:e}, boundaries (top, bottom, left, right) = ({}, {}, {}, {})",
        config.diffusion(),
        config.dt(),
        config.ds(),
        b.top,
        b.bottom,
        b.left,
        b.right
    );
    println!("{:.6}", outcome.elapsed_seconds);

    if !args.write_outputs(grid, &DISTRIBUTED_DEFAULTS) {
        log::warn!("result was not persisted");
    }
}

#[cfg(feature = "mpi")]
fn main() -> anyhow::Result<()> {
    use dhls::comm::{Communicator, MpiComm};

    let args = Args::cli_setup(&DISTRIBUTED_DEFAULTS);
    let mut comm = MpiComm::initialize()?;
    if args.ranks.is_some() && comm.rank() == 0 {
        log::warn!("--ranks is ignored, the MPI launcher decides the rank count");
    }
    let config = match args.config(&DISTRIBUTED_DEFAULTS) {
        Ok(config) => config,
        Err(e) => {
            // Every rank parses the same arguments, so every rank fails here.
            log::error!("rank {}: {e}", comm.rank());
            return Err(e.into());
        }
    };

    let outcome = run_rank(&mut comm, &config, args.chunk_size)?;
    report(&args, &config, &outcome);
    args.finish();
    Ok(())
}

#[cfg(not(feature = "mpi"))]
fn main() -> anyhow::Result<()> {
    use dhls::comm::LocalWorld;
    use dhls::error::HeatError;

    let args = Args::cli_setup(&DISTRIBUTED_DEFAULTS);
    let config = args.config(&DISTRIBUTED_DEFAULTS)?;
    let ranks = args.local_ranks();
    anyhow::ensure!(ranks > 0, "--ranks must be at least 1");
    log::info!("running {ranks} ranks as threads of this process");

    let results = LocalWorld::run(ranks, |comm| run_rank(comm, &config, args.chunk_size));
    let mut coordinator = None;
    let mut errors = Vec::new();
    for result in results {
        match result {
            Ok(outcome) if outcome.grid.is_some() => coordinator = Some(outcome),
            Ok(_) => {}
            Err(e) => errors.push(e),
        }
    }
    // Report the rank that failed first, not the peers it took down.
    let root_cause = errors
        .iter()
        .position(|e| !matches!(e, HeatError::PeerAborted { .. }))
        .map(|i| errors.swap_remove(i))
        .or_else(|| errors.pop());
    if let Some(e) = root_cause {
        return Err(e.into());
    }
    let outcome = coordinator.ok_or_else(|| anyhow::anyhow!("coordinator returned no grid"))?;
    report(&args, &config, &outcome);
    args.finish();
    Ok(())
}
