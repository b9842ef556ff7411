mod dirichlet;

pub use dirichlet::*;

/// Fixed value for grid points on the global edge, `None` for interior
/// points.
pub trait BoundaryCheck: Sync {
    fn check(&self, global_row: usize, col: usize) -> Option<f64>;
}
