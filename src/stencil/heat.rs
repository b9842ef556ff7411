use crate::decomposition::ComputeRange;
use crate::domain::GridBuffer;
use rayon::prelude::*;

/// Forward Euler update of one point from its four neighbours.
#[inline]
pub fn heat_2d_point(
    factor: f64,
    middle: f64,
    up: f64,
    down: f64,
    left: f64,
    right: f64,
) -> f64 {
    middle + factor * (down + up + right + left - 4.0 * middle)
}

/// Advance every row in `range` by one explicit step.
///
/// Reads only `input` and writes only `output`. Columns `0` and `cols - 1`
/// and every row outside `range` are left alone, so boundaries stay fixed.
/// An empty range is a no-op.
/// `chunk_size` is the number of rows handed to each rayon task.
pub fn apply_step(
    input: &GridBuffer,
    output: &mut GridBuffer,
    range: ComputeRange,
    factor: f64,
    chunk_size: usize,
) {
    profiling::scope!("stencil::apply_step");
    debug_assert_eq!(input.rows(), output.rows());
    debug_assert_eq!(input.cols(), output.cols());

    let Some((first, last)) = range.bounds() else {
        return;
    };
    debug_assert!(first >= 1 && last + 1 < input.rows());

    let cols = input.cols();
    if cols < 3 {
        return;
    }
    let chunk_size = chunk_size.clamp(1, last - first + 1);

    output
        .rows_slice_mut(first, last + 1)
        .par_chunks_mut(chunk_size * cols)
        .enumerate()
        .for_each(|(chunk_index, rows_chunk): (usize, &mut [f64])| {
            let chunk_first = first + chunk_index * chunk_size;
            for (offset, out_row) in rows_chunk.chunks_exact_mut(cols).enumerate() {
                let i = chunk_first + offset;
                let up = input.row(i - 1);
                let middle = input.row(i);
                let down = input.row(i + 1);
                for j in 1..cols - 1 {
                    out_row[j] = heat_2d_point(
                        factor,
                        middle[j],
                        up[j],
                        down[j],
                        middle[j - 1],
                        middle[j + 1],
                    );
                }
            }
        });
}
