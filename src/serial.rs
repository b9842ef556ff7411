//! Single process reference solver over the whole grid.
//!
//! No decomposition, no halos: a plain double loop over the interior with
//! the same point update as the distributed kernel, so results agree with
//! any rank count bit for bit.

use crate::config::SimulationConfig;
use crate::domain::*;
use crate::error::*;
use crate::stencil::heat_2d_point;

/// Seeded `N x N` grid before the first iteration.
pub fn initial_grid(config: &SimulationConfig) -> Result<GlobalGrid> {
    let n = config.total_points();
    let bc = DirichletCheck::from_config(config);
    let mut grid = GridBuffer::try_new(n, n)?;
    for (i, row) in grid.buffer_mut().chunks_exact_mut(n).enumerate() {
        for (j, value) in row.iter_mut().enumerate() {
            *value = bc.check(i, j).unwrap_or(crate::config::INTERIOR_INITIAL_VALUE);
        }
    }
    Ok(grid)
}

pub fn solve(config: &SimulationConfig) -> Result<GlobalGrid> {
    profiling::scope!("serial::solve");
    let n = config.total_points();
    let factor = config.stencil_factor();
    let mut current = initial_grid(config)?;
    let mut next = current.clone();

    for _ in 0..config.iterations() {
        for i in 1..n - 1 {
            for j in 1..n - 1 {
                let value = heat_2d_point(
                    factor,
                    current.get(i, j),
                    current.get(i - 1, j),
                    current.get(i + 1, j),
                    current.get(i, j - 1),
                    current.get(i, j + 1),
                );
                next.set(i, j, value);
            }
        }
        std::mem::swap(&mut current, &mut next);
    }
    Ok(current)
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use crate::config::Boundaries;
    use float_cmp::assert_approx_eq;

    #[test]
    fn initial_grid_matches_boundaries() {
        let config = SimulationConfig::new(2, 1, 0.1, Boundaries::default()).unwrap();
        let grid = initial_grid(&config).unwrap();
        assert_eq!(grid.row(0), &[10.0; 4]);
        assert_eq!(grid.row(1), &[20.0, 0.0, 0.0, 30.0]);
        assert_eq!(grid.row(2), &[20.0, 0.0, 0.0, 30.0]);
        assert_eq!(grid.row(3), &[40.0; 4]);
    }

    #[test]
    fn one_step_single_cell() {
        let config = SimulationConfig::new(1, 1, 0.1, Boundaries::default()).unwrap();
        let grid = solve(&config).unwrap();
        assert_approx_eq!(f64, grid.get(1, 1), 25.0, epsilon = 1e-12);
    }

    #[test]
    fn uniform_boundaries_converge_to_boundary_value() {
        let boundaries = Boundaries {
            top: 5.0,
            bottom: 5.0,
            left: 5.0,
            right: 5.0,
        };
        let config = SimulationConfig::new(4, 2000, 0.1, boundaries).unwrap();
        let grid = solve(&config).unwrap();
        for v in grid.buffer() {
            assert_approx_eq!(f64, *v, 5.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn boundaries_never_change() {
        let config = SimulationConfig::new(5, 40, 0.1, Boundaries::default()).unwrap();
        let initial = initial_grid(&config).unwrap();
        let grid = solve(&config).unwrap();
        let n = config.total_points();
        for k in 0..n {
            assert_eq!(grid.get(0, k), initial.get(0, k));
            assert_eq!(grid.get(n - 1, k), initial.get(n - 1, k));
            assert_eq!(grid.get(k, 0), initial.get(k, 0));
            assert_eq!(grid.get(k, n - 1), initial.get(k, n - 1));
        }
    }
}
