//! Per-rank simulation driver.
//!
//! Every rank runs the same sequence: seed the local subgrid, then for each
//! iteration compute `next` from `current`, exchange halo rows of `next`
//! with the row neighbours, and commit. After the loop the owned rows are
//! gathered at the coordinator.

use crate::comm::Communicator;
use crate::config::SimulationConfig;
use crate::decomposition::*;
use crate::domain::*;
use crate::error::*;
use crate::stencil;

/// What a rank hands back after a full run.
#[derive(Debug)]
pub struct RankOutcome {
    pub rank: usize,
    pub ranks: usize,
    /// Time between the barriers around the iteration loop.
    pub elapsed_seconds: f64,
    /// Assembled result, only present at the coordinator.
    pub grid: Option<GlobalGrid>,
}

/// State of one rank for the duration of a run.
pub struct RankSimulation<'a> {
    config: &'a SimulationConfig,
    partition: RowPartition,
    layout: LocalLayout,
    subgrid: LocalSubgrid,
    factor: f64,
    chunk_size: usize,
}

impl<'a> RankSimulation<'a> {
    /// Allocate and seed this rank's subgrid.
    pub fn new(
        config: &'a SimulationConfig,
        rank: usize,
        ranks: usize,
        chunk_size: usize,
    ) -> Result<Self> {
        let cols = config.total_points();
        let partition = RowPartition::new(cols, ranks);
        let layout = LocalLayout::new(&partition, rank);
        log::debug!(
            "rank {rank}: rows {}..{} ({} owned), compute range {:?}, above {:?}, below {:?}",
            layout.rows.start,
            layout.rows.end(),
            layout.rows.count,
            layout.compute.bounds(),
            layout.topology.above(),
            layout.topology.below(),
        );

        let mut subgrid = LocalSubgrid::try_new(&layout, cols)?;
        subgrid.initialize(&DirichletCheck::from_config(config), cols);

        Ok(RankSimulation {
            config,
            partition,
            factor: config.stencil_factor(),
            layout,
            subgrid,
            chunk_size,
        })
    }

    pub fn layout(&self) -> &LocalLayout {
        &self.layout
    }

    pub fn partition(&self) -> &RowPartition {
        &self.partition
    }

    pub fn subgrid(&self) -> &LocalSubgrid {
        &self.subgrid
    }

    /// One iteration: compute, exchange, commit.
    /// Returns only after every halo row for the next step has arrived.
    pub fn step<C: Communicator>(&mut self, comm: &mut C) -> Result<()> {
        profiling::scope!("solver::step");
        let (current, next) = self.subgrid.split_mut();
        stencil::apply_step(current, next, self.layout.compute, self.factor, self.chunk_size);
        let slots = self.subgrid.halo_slots(&self.layout.topology);
        comm.exchange(slots)?;
        self.subgrid.commit();
        Ok(())
    }

    pub fn run_iterations<C: Communicator>(&mut self, comm: &mut C) -> Result<()> {
        for _ in 0..self.config.iterations() {
            self.step(comm)?;
        }
        Ok(())
    }

    /// Collective gather of the committed state. Calling it again without
    /// stepping in between yields an identical grid.
    pub fn gather<C: Communicator>(&self, comm: &mut C) -> Result<Option<GlobalGrid>> {
        comm.gather_rows(
            self.subgrid.owned_rows(),
            &self.partition,
            self.config.total_points(),
        )
    }
}

fn drive<C: Communicator>(
    comm: &mut C,
    config: &SimulationConfig,
    chunk_size: usize,
) -> Result<RankOutcome> {
    let rank = comm.rank();
    let ranks = comm.size();
    let mut simulation = RankSimulation::new(config, rank, ranks, chunk_size)?;

    comm.barrier()?;
    let start = comm.wall_time();
    simulation.run_iterations(comm)?;
    comm.barrier()?;
    let elapsed_seconds = comm.wall_time() - start;

    let grid = simulation.gather(comm)?;
    if let Some(grid) = &grid {
        log::info!(
            "rank {rank}: gathered {}x{} grid from {ranks} ranks",
            grid.rows(),
            grid.cols()
        );
    }
    Ok(RankOutcome {
        rank,
        ranks,
        elapsed_seconds,
        grid,
    })
}

/// Full run of one rank. Any failure here leaves peers unable to finish,
/// so it aborts the whole run before being returned.
pub fn run_rank<C: Communicator>(
    comm: &mut C,
    config: &SimulationConfig,
    chunk_size: usize,
) -> Result<RankOutcome> {
    drive(comm, config, chunk_size).inspect_err(|e| match e {
        // Whoever failed first already aborted and reported it.
        HeatError::PeerAborted { .. } => log::debug!("rank {}: {e}", comm.rank()),
        e => {
            log::error!("rank {}: {e}", comm.rank());
            if e.is_fatal() {
                comm.abort(1);
            }
        }
    })
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use crate::comm::LocalWorld;
    use crate::config::Boundaries;
    use crate::serial;
    use float_cmp::assert_approx_eq;

    fn coordinator_grid(results: Vec<Result<RankOutcome>>) -> GlobalGrid {
        let mut grid = None;
        for outcome in results {
            let outcome = outcome.unwrap();
            if outcome.rank == COORDINATOR {
                grid = outcome.grid;
            } else {
                assert!(outcome.grid.is_none());
            }
        }
        grid.unwrap()
    }

    #[test]
    fn golden_single_cell() {
        let config = SimulationConfig::new(1, 1, 0.1, Boundaries::default()).unwrap();
        for ranks in 1..=4 {
            let results = LocalWorld::run(ranks, |comm| run_rank(comm, &config, 1));
            let grid = coordinator_grid(results);
            // 0 + 0.25 * (10 + 40 + 20 + 30)
            assert_approx_eq!(f64, grid.get(1, 1), 25.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn golden_three_inner_points() {
        let config = SimulationConfig::new(3, 1, 0.1, Boundaries::default()).unwrap();
        let results = LocalWorld::run(2, |comm| run_rank(comm, &config, 1));
        let grid = coordinator_grid(results);
        // ds = 0.25, dt = 0.15625, c dt / ds^2 = 0.25
        assert_approx_eq!(f64, grid.get(1, 1), 0.25 * (10.0 + 20.0), epsilon = 1e-12);
        assert_approx_eq!(f64, grid.get(1, 2), 0.25 * 10.0, epsilon = 1e-12);
        assert_approx_eq!(f64, grid.get(1, 3), 0.25 * (10.0 + 30.0), epsilon = 1e-12);
        assert_approx_eq!(f64, grid.get(2, 1), 0.25 * 20.0, epsilon = 1e-12);
        assert_approx_eq!(f64, grid.get(2, 2), 0.0);
        assert_approx_eq!(f64, grid.get(3, 3), 0.25 * (40.0 + 30.0), epsilon = 1e-12);
    }

    #[test]
    fn matches_serial_for_every_rank_count() {
        let config = SimulationConfig::new(9, 25, 0.1, Boundaries::default()).unwrap();
        let expected = serial::solve(&config).unwrap();
        for ranks in 1..=13 {
            let results = LocalWorld::run(ranks, |comm| run_rank(comm, &config, 3));
            let grid = coordinator_grid(results);
            for (a, b) in grid.buffer().iter().zip(expected.buffer()) {
                assert_approx_eq!(f64, *a, *b, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn zero_iterations_returns_initial_state() {
        let config = SimulationConfig::new(4, 0, 0.1, Boundaries::default()).unwrap();
        let results = LocalWorld::run(3, |comm| run_rank(comm, &config, 1));
        let grid = coordinator_grid(results);
        let bc = DirichletCheck::from_config(&config);
        for r in 0..6 {
            for c in 0..6 {
                let expected = bc.check(r, c).unwrap_or(0.0);
                assert_eq!(grid.get(r, c), expected);
            }
        }
    }

    #[test]
    fn regather_is_identical() {
        let config = SimulationConfig::new(6, 10, 0.1, Boundaries::default()).unwrap();
        let results = LocalWorld::run(3, |comm| {
            let mut simulation = RankSimulation::new(&config, comm.rank(), comm.size(), 2)?;
            simulation.run_iterations(comm)?;
            let first = simulation.gather(comm)?;
            let second = simulation.gather(comm)?;
            Ok((first, second))
        });
        for result in results {
            let (first, second) = result.unwrap();
            match (first, second) {
                (Some(a), Some(b)) => {
                    let a_bits: Vec<u64> = a.buffer().iter().map(|v| v.to_bits()).collect();
                    let b_bits: Vec<u64> = b.buffer().iter().map(|v| v.to_bits()).collect();
                    assert_eq!(a_bits, b_bits);
                }
                (None, None) => {}
                _ => panic!("gather results differ in shape"),
            }
        }
    }
}
