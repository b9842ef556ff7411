use crate::domain::GridBuffer;
use crate::error::*;

/// Map a value to `[0, 1]` given the grid's range. A flat grid maps to 0.
fn normalize(v: f64, lo: f64, hi: f64) -> f64 {
    let span = hi - lo;
    if span > 0.0 {
        ((v - lo) / span).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Render the grid as a TURBO heat map, one pixel per cell, grid row `i`
/// on image row `i`.
pub fn heat_map(grid: &GridBuffer) -> image::RgbImage {
    let (lo, hi) = grid.min_max().unwrap_or((0.0, 0.0));
    let gradient = colorous::TURBO;
    let mut img = image::RgbImage::new(grid.cols() as u32, grid.rows() as u32);
    for (y, row) in grid.row_iter().enumerate() {
        for (x, &v) in row.iter().enumerate() {
            let c = gradient.eval_continuous(normalize(v, lo, hi));
            img.put_pixel(x as u32, y as u32, image::Rgb(c.as_array()));
        }
    }
    img
}

pub fn write_heat_map<F: AsRef<std::path::Path>>(grid: &GridBuffer, path: &F) -> Result<()> {
    profiling::scope!("image::write_heat_map");
    heat_map(grid).save(path)?;
    log::info!("wrote heat map to {}", path.as_ref().display());
    Ok(())
}
