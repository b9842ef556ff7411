use crate::error::*;

/// Contiguous row-major buffer of `rows x cols` values.
///
/// Used both for a rank's local subgrid (owned rows plus halos) and for the
/// assembled global grid at the coordinator.
#[derive(Debug, Clone, PartialEq)]
pub struct GridBuffer {
    rows: usize,
    cols: usize,
    buffer: Vec<f64>,
}

/// The assembled `N x N` result, only ever held by the coordinator.
pub type GlobalGrid = GridBuffer;

impl GridBuffer {
    /// Zero filled buffer. Reports allocation failure instead of aborting
    /// the process so the caller can take every rank down with it.
    pub fn try_new(rows: usize, cols: usize) -> Result<Self> {
        let len = rows
            .checked_mul(cols)
            .ok_or(HeatError::Allocation { rows, cols })?;
        let mut buffer = Vec::new();
        buffer
            .try_reserve_exact(len)
            .map_err(|_| HeatError::Allocation { rows, cols })?;
        buffer.resize(len, 0.0);
        Ok(GridBuffer { rows, cols, buffer })
    }

    pub fn from_vec(rows: usize, cols: usize, buffer: Vec<f64>) -> Self {
        assert_eq!(buffer.len(), rows * cols);
        GridBuffer { rows, cols, buffer }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn buffer(&self) -> &[f64] {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut [f64] {
        &mut self.buffer
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.buffer
    }

    #[track_caller]
    pub fn linear_index(&self, row: usize, col: usize) -> usize {
        debug_assert!(
            row < self.rows && col < self.cols,
            "({row}, {col}) outside {}x{}",
            self.rows,
            self.cols
        );
        row * self.cols + col
    }

    #[track_caller]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.buffer[self.linear_index(row, col)]
    }

    #[track_caller]
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        let index = self.linear_index(row, col);
        self.buffer[index] = value;
    }

    pub fn row(&self, row: usize) -> &[f64] {
        let start = row * self.cols;
        &self.buffer[start..start + self.cols]
    }

    pub fn row_mut(&mut self, row: usize) -> &mut [f64] {
        let start = row * self.cols;
        &mut self.buffer[start..start + self.cols]
    }

    /// Rows `[start, end)` as one contiguous slice.
    pub fn rows_slice(&self, start: usize, end: usize) -> &[f64] {
        debug_assert!(start <= end && end <= self.rows);
        &self.buffer[start * self.cols..end * self.cols]
    }

    pub fn rows_slice_mut(&mut self, start: usize, end: usize) -> &mut [f64] {
        debug_assert!(start <= end && end <= self.rows);
        &mut self.buffer[start * self.cols..end * self.cols]
    }

    pub fn row_iter(&self) -> impl Iterator<Item = &[f64]> + '_ {
        // `chunks_exact` of zero is a panic, zero width grids have no rows.
        self.buffer.chunks_exact(self.cols.max(1)).take(self.rows)
    }

    pub fn min_max(&self) -> Option<(f64, f64)> {
        self.buffer.iter().fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }
}
