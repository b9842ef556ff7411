use dhls::comm::*;
use dhls::compare::*;
use dhls::config::*;
use dhls::decomposition::COORDINATOR;
use dhls::domain::*;
use dhls::serial;
use dhls::solver::*;
use float_cmp::assert_approx_eq;
use rand::prelude::*;

pub const TEST_CHUNK_SIZE: usize = 4;

fn distributed_grid(config: &SimulationConfig, ranks: usize) -> GlobalGrid {
    let results = LocalWorld::run(ranks, |comm| run_rank(comm, config, TEST_CHUNK_SIZE));
    assert_eq!(results.len(), ranks);
    let mut grid = None;
    for (rank, result) in results.into_iter().enumerate() {
        let outcome = result.unwrap();
        assert_eq!(outcome.rank, rank);
        assert_eq!(outcome.ranks, ranks);
        assert!(outcome.elapsed_seconds >= 0.0);
        if rank == COORDINATOR {
            grid = outcome.grid;
        } else {
            assert!(outcome.grid.is_none());
        }
    }
    grid.unwrap()
}

#[test]
fn heat_2d_rank_counts_agree() {
    let config = SimulationConfig::new(30, 120, 0.1, Boundaries::default()).unwrap();
    let reference = distributed_grid(&config, 1);
    for ranks in [2, 3, 4, 7] {
        let grid = distributed_grid(&config, ranks);
        let comparison = compare_grids(&reference, &grid, DEFAULT_TOLERANCE).unwrap();
        assert!(comparison.is_close(), "{ranks} ranks:\n{comparison}");
        assert_approx_eq!(f64, comparison.max_abs_diff, 0.0, epsilon = 1e-12);
    }
}

#[test]
fn heat_2d_matches_serial() {
    let config = SimulationConfig::new(24, 200, 0.1, Boundaries::default()).unwrap();
    let expected = serial::solve(&config).unwrap();
    let grid = distributed_grid(&config, 5);
    let comparison = compare_grids(&expected, &grid, DEFAULT_TOLERANCE).unwrap();
    assert!(comparison.is_close(), "{comparison}");
}

#[test]
fn more_ranks_than_rows() {
    // 4 x 4 grid over 6 ranks: ranks 4 and 5 own nothing.
    let config = SimulationConfig::new(2, 15, 0.1, Boundaries::default()).unwrap();
    let expected = serial::solve(&config).unwrap();
    let grid = distributed_grid(&config, 6);
    assert_eq!(grid.rows(), 4);
    assert_eq!(grid.cols(), 4);
    for (a, b) in grid.buffer().iter().zip(expected.buffer()) {
        assert_approx_eq!(f64, *a, *b, epsilon = 1e-12);
    }
}

#[test]
fn boundaries_are_held() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..5 {
        let boundaries = Boundaries {
            top: rng.gen_range(-50.0..50.0),
            bottom: rng.gen_range(-50.0..50.0),
            left: rng.gen_range(-50.0..50.0),
            right: rng.gen_range(-50.0..50.0),
        };
        let n_inner = rng.gen_range(1..20);
        let ranks = rng.gen_range(1..6);
        let config = SimulationConfig::new(n_inner, 30, 0.1, boundaries).unwrap();
        let grid = distributed_grid(&config, ranks);
        let bc = DirichletCheck::from_config(&config);
        let n = config.total_points();
        for i in 0..n {
            for j in 0..n {
                if let Some(expected) = bc.check(i, j) {
                    assert_eq!(grid.get(i, j), expected, "({i}, {j}) with {ranks} ranks");
                }
            }
        }
    }
}

#[test]
fn golden_first_step() {
    // c dt / ds^2 = 0.25 for any n.
    let single = SimulationConfig::new(1, 1, 0.1, Boundaries::default()).unwrap();
    let grid = distributed_grid(&single, 2);
    assert_approx_eq!(f64, grid.get(1, 1), 0.25 * (10.0 + 40.0 + 20.0 + 30.0), epsilon = 1e-12);

    let three = SimulationConfig::new(3, 1, 0.1, Boundaries::default()).unwrap();
    let grid = distributed_grid(&three, 2);
    assert_approx_eq!(f64, grid.get(1, 1), 0.25 * (10.0 + 20.0), epsilon = 1e-12);
}

#[test]
fn stays_within_boundary_range() {
    // Maximum principle: the explicit scheme at the stability bound never
    // leaves the range spanned by the initial values.
    let config = SimulationConfig::new(16, 300, 0.1, Boundaries::default()).unwrap();
    let grid = distributed_grid(&config, 3);
    let (lo, hi) = grid.min_max().unwrap();
    assert!(lo >= -1e-9);
    assert!(hi <= 40.0 + 1e-9);
}
