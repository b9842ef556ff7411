//! Cell by cell comparison of two result grids.

use crate::domain::GridBuffer;
use crate::error::*;
use std::fmt;

/// Absolute difference above which a cell counts as differing.
pub const DEFAULT_TOLERANCE: f64 = 1e-5;

#[derive(Debug, Clone, PartialEq)]
pub struct GridComparison {
    pub rows: usize,
    pub cols: usize,
    pub max_abs_diff: f64,
    pub mse: f64,
    pub rmse: f64,
    pub cells_over_tolerance: usize,
    pub tolerance: f64,
}

impl GridComparison {
    pub fn is_close(&self) -> bool {
        self.cells_over_tolerance == 0
    }

    pub fn total_cells(&self) -> usize {
        self.rows * self.cols
    }
}

impl fmt::Display for GridComparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Grid size: {}x{}", self.rows, self.cols)?;
        writeln!(f, "Maximum absolute difference: {:e}", self.max_abs_diff)?;
        writeln!(f, "Mean squared error: {:e}", self.mse)?;
        writeln!(f, "Root mean squared error: {:e}", self.rmse)?;
        writeln!(
            f,
            "Cells differing by more than {:e}: {} of {}",
            self.tolerance,
            self.cells_over_tolerance,
            self.total_cells()
        )?;
        if self.is_close() {
            write!(f, "Outputs are considered close enough.")
        } else {
            write!(f, "Outputs have significant differences.")
        }
    }
}

pub fn compare_grids(
    left: &GridBuffer,
    right: &GridBuffer,
    tolerance: f64,
) -> Result<GridComparison> {
    if left.rows() != right.rows() || left.cols() != right.cols() {
        return Err(HeatError::DimensionMismatch {
            left_rows: left.rows(),
            left_cols: left.cols(),
            right_rows: right.rows(),
            right_cols: right.cols(),
        });
    }

    let mut max_abs_diff = 0.0_f64;
    let mut sum_squared = 0.0;
    let mut cells_over_tolerance = 0;
    for (a, b) in left.buffer().iter().zip(right.buffer()) {
        let diff = (a - b).abs();
        max_abs_diff = max_abs_diff.max(diff);
        sum_squared += diff * diff;
        if diff > tolerance {
            cells_over_tolerance += 1;
        }
    }

    let cells = left.buffer().len();
    let mse = if cells == 0 {
        0.0
    } else {
        sum_squared / cells as f64
    };
    Ok(GridComparison {
        rows: left.rows(),
        cols: left.cols(),
        max_abs_diff,
        mse,
        rmse: mse.sqrt(),
        cells_over_tolerance,
        tolerance,
    })
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn identical_grids() {
        let grid = GridBuffer::from_vec(2, 2, vec![1.0, 2.0, 3.0, 4.0]);
        let result = compare_grids(&grid, &grid, DEFAULT_TOLERANCE).unwrap();
        assert_eq!(result.max_abs_diff, 0.0);
        assert_eq!(result.mse, 0.0);
        assert!(result.is_close());
        assert!(result.to_string().ends_with("Outputs are considered close enough."));
    }

    #[test]
    fn statistics() {
        let a = GridBuffer::from_vec(1, 4, vec![0.0, 0.0, 0.0, 0.0]);
        let b = GridBuffer::from_vec(1, 4, vec![1.0, -1.0, 1e-6, 0.0]);
        let result = compare_grids(&a, &b, DEFAULT_TOLERANCE).unwrap();
        assert_approx_eq!(f64, result.max_abs_diff, 1.0);
        assert_approx_eq!(f64, result.mse, (2.0 + 1e-12) / 4.0, epsilon = 1e-15);
        assert_approx_eq!(f64, result.rmse, result.mse.sqrt());
        assert_eq!(result.cells_over_tolerance, 2);
        assert!(!result.is_close());
        assert!(result.to_string().ends_with("Outputs have significant differences."));
    }

    #[test]
    fn mismatched_dimensions() {
        let a = GridBuffer::try_new(3, 3).unwrap();
        let b = GridBuffer::try_new(3, 4).unwrap();
        assert!(matches!(
            compare_grids(&a, &b, DEFAULT_TOLERANCE),
            Err(HeatError::DimensionMismatch {
                left_cols: 3,
                right_cols: 4,
                ..
            })
        ));
    }
}
