use crate::config::*;
use crate::decomposition::RowRange;
use crate::domain::bc::BoundaryCheck;
use crate::domain::GridBuffer;

/// Constant temperature on each of the four edges of an `n x n` grid.
/// Top and bottom rows take precedence over the left and right columns,
/// so the corners carry the top or bottom value.
pub struct DirichletCheck {
    boundaries: Boundaries,
    n: usize,
}

impl DirichletCheck {
    pub fn new(boundaries: Boundaries, n: usize) -> Self {
        DirichletCheck { boundaries, n }
    }

    pub fn from_config(config: &SimulationConfig) -> Self {
        DirichletCheck::new(*config.boundaries(), config.total_points())
    }
}

impl BoundaryCheck for DirichletCheck {
    fn check(&self, global_row: usize, col: usize) -> Option<f64> {
        let last = self.n - 1;
        if global_row == 0 {
            Some(self.boundaries.top)
        } else if global_row == last {
            Some(self.boundaries.bottom)
        } else if col == 0 {
            Some(self.boundaries.left)
        } else if col == last {
            Some(self.boundaries.right)
        } else {
            None
        }
    }
}

/// Seed a local subgrid buffer: the owned rows `1..=rows.count`, and the
/// halo rows with the initial value of the neighbouring global row when
/// that row exists. Seeded halos make the first step read exactly what a
/// single grid would. Idle ranks own nothing and are left untouched.
pub fn initialize_local_rows<BC: BoundaryCheck>(
    bc: &BC,
    rows: &RowRange,
    total_rows: usize,
    buffer: &mut GridBuffer,
) {
    debug_assert!(buffer.rows() >= rows.count + 2);
    if rows.is_empty() {
        return;
    }
    for local_row in 0..rows.count + 2 {
        let Some(global_row) = (rows.start + local_row).checked_sub(1) else {
            continue;
        };
        if global_row >= total_rows {
            continue;
        }
        for (col, value) in buffer.row_mut(local_row).iter_mut().enumerate() {
            *value = bc
                .check(global_row, col)
                .unwrap_or(INTERIOR_INITIAL_VALUE);
        }
    }
}
