//! Variable length gather of every rank's owned rows at the coordinator.

use crate::decomposition::*;
use crate::domain::{GlobalGrid, GridBuffer};
use crate::error::*;

pub trait RowGather {
    /// Collective: every rank calls this exactly once per gather.
    ///
    /// `local_rows` holds the caller's owned rows only, `count * cols`
    /// values. The coordinator derives every rank's count and displacement
    /// from `partition` itself and returns the assembled grid; every other
    /// rank only sends and gets `None`.
    fn gather_rows(
        &mut self,
        local_rows: &[f64],
        partition: &RowPartition,
        cols: usize,
    ) -> Result<Option<GlobalGrid>>;
}

/// Coordinator side of a gather over point-to-point messages.
///
/// `receive(rank, len)` must return the contribution of `rank`, which is
/// checked against the length the partition predicts.
pub fn assemble_rows<F>(
    partition: &RowPartition,
    cols: usize,
    own_rows: &[f64],
    mut receive: F,
) -> Result<GlobalGrid>
where
    F: FnMut(usize, usize) -> Result<Vec<f64>>,
{
    profiling::scope!("gather::assemble_rows");
    let layout = partition.gather_layout(cols);
    let mut grid = GridBuffer::try_new(partition.total_rows(), cols)?;
    debug_assert_eq!(layout.total(), grid.buffer().len());

    for rank in 0..partition.ranks() {
        let count = layout.counts[rank];
        let offset = layout.displacements[rank];
        let target = &mut grid.buffer_mut()[offset..offset + count];
        if rank == COORDINATOR {
            if own_rows.len() != count {
                return Err(HeatError::UnexpectedMessage {
                    rank: COORDINATOR,
                    source_rank: rank,
                    tag: crate::halo::GATHER_TAG,
                    message: format!(
                        "own contribution has {} values, expected {count}",
                        own_rows.len()
                    ),
                });
            }
            target.copy_from_slice(own_rows);
        } else {
            let rows = receive(rank, count)?;
            if rows.len() != count {
                return Err(HeatError::UnexpectedMessage {
                    rank: COORDINATOR,
                    source_rank: rank,
                    tag: crate::halo::GATHER_TAG,
                    message: format!("received {} values, expected {count}", rows.len()),
                });
            }
            target.copy_from_slice(&rows);
        }
    }
    Ok(grid)
}
