use crate::error::*;

/// Fixed temperatures held on the four edges of the grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Boundaries {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
}

impl Default for Boundaries {
    fn default() -> Self {
        Boundaries {
            top: 10.0,
            bottom: 40.0,
            left: 20.0,
            right: 30.0,
        }
    }
}

pub const DEFAULT_DIFFUSION: f64 = 0.1;

/// Value every interior cell starts from.
pub const INTERIOR_INITIAL_VALUE: f64 = 0.0;

/// Immutable parameters of one simulation.
///
/// `ds` and `dt` are always derived here, never supplied by a caller,
/// so `dt` can not exceed the explicit scheme's stability bound
/// `ds^2 / (4c)`.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    n_inner: usize,
    iterations: usize,
    diffusion: f64,
    ds: f64,
    dt: f64,
    boundaries: Boundaries,
}

impl SimulationConfig {
    pub fn new(
        n_inner: usize,
        iterations: usize,
        diffusion: f64,
        boundaries: Boundaries,
    ) -> Result<Self> {
        if n_inner == 0 {
            return Err(HeatError::InvalidConfig(
                "need at least one inner grid point".to_string(),
            ));
        }
        if !(diffusion.is_finite() && diffusion > 0.0) {
            return Err(HeatError::InvalidConfig(format!(
                "diffusion constant must be positive, got {diffusion}"
            )));
        }
        let b = boundaries;
        if ![b.top, b.bottom, b.left, b.right].iter().all(|v| v.is_finite()) {
            return Err(HeatError::InvalidConfig(format!(
                "boundary temperatures must be finite, got {b:?}"
            )));
        }

        let ds = 1.0 / (n_inner as f64 + 1.0);
        let dt = (ds * ds) / (4.0 * diffusion);
        Ok(SimulationConfig {
            n_inner,
            iterations,
            diffusion,
            ds,
            dt,
            boundaries,
        })
    }

    pub fn n_inner(&self) -> usize {
        self.n_inner
    }

    /// Grid points per side including the two boundary points, `n + 2`.
    pub fn total_points(&self) -> usize {
        self.n_inner + 2
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn diffusion(&self) -> f64 {
        self.diffusion
    }

    pub fn ds(&self) -> f64 {
        self.ds
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn boundaries(&self) -> &Boundaries {
        &self.boundaries
    }

    /// `c * dt / ds^2`, the weight on the Laplacian in one explicit step.
    pub fn stencil_factor(&self) -> f64 {
        self.diffusion * self.dt / (self.ds * self.ds)
    }
}
