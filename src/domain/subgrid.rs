use crate::decomposition::*;
use crate::domain::bc::*;
use crate::domain::GridBuffer;
use crate::error::*;
use crate::halo::{halo_slots, HaloSlot};

/// One rank's double buffered piece of the grid.
///
/// Each buffer is `count + 2` rows by `N` columns. The stencil reads from
/// `current` and writes to `next`; halo rows arrive in `next`, and
/// `commit` swaps the two.
pub struct LocalSubgrid {
    rows: RowRange,
    current: GridBuffer,
    next: GridBuffer,
}

impl LocalSubgrid {
    pub fn try_new(layout: &LocalLayout, cols: usize) -> Result<Self> {
        let current = GridBuffer::try_new(layout.local_rows(), cols)?;
        let next = GridBuffer::try_new(layout.local_rows(), cols)?;
        Ok(LocalSubgrid {
            rows: layout.rows,
            current,
            next,
        })
    }

    /// Seed both buffers with identical initial values. `total_rows` is
    /// the global grid height `N`.
    pub fn initialize<BC: BoundaryCheck>(&mut self, bc: &BC, total_rows: usize) {
        initialize_local_rows(bc, &self.rows, total_rows, &mut self.current);
        self.next.buffer_mut().copy_from_slice(self.current.buffer());
    }

    pub fn rows(&self) -> &RowRange {
        &self.rows
    }

    pub fn current(&self) -> &GridBuffer {
        &self.current
    }

    pub fn next(&self) -> &GridBuffer {
        &self.next
    }

    /// Both buffers at once, read side and write side of one step.
    pub fn split_mut(&mut self) -> (&GridBuffer, &mut GridBuffer) {
        (&self.current, &mut self.next)
    }

    /// Owned rows of the committed state, halos excluded.
    pub fn owned_rows(&self) -> &[f64] {
        self.current.rows_slice(1, self.rows.count + 1)
    }

    /// Sends and receives for exchanging the halo rows of `next`.
    pub fn halo_slots(&mut self, topology: &ProcessTopology) -> Vec<HaloSlot<'_>> {
        halo_slots(&mut self.next, self.rows.count, topology)
    }

    /// `next` becomes the state read by the following step.
    pub fn commit(&mut self) {
        std::mem::swap(&mut self.current, &mut self.next);
    }
}
