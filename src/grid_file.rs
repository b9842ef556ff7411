//! Plain text grid files.
//!
//! First line `"<rows> <cols>"`, then one line per row with `cols`
//! space separated values. Values are written with `Display`, which
//! round-trips `f64` exactly.

use crate::domain::*;
use crate::error::*;
use std::fmt::Write as _;
use std::io::{BufWriter, Write};
use std::path::Path;

pub fn write_grid<W: Write>(grid: &GridBuffer, out: &mut W) -> std::io::Result<()> {
    writeln!(out, "{} {}", grid.rows(), grid.cols())?;
    for row in grid.row_iter() {
        let mut values = row.iter();
        if let Some(first) = values.next() {
            write!(out, "{first}")?;
        }
        for v in values {
            write!(out, " {v}")?;
        }
        writeln!(out)?;
    }
    Ok(())
}

pub fn write_grid_file<P: AsRef<Path>>(grid: &GridBuffer, path: P) -> Result<()> {
    profiling::scope!("grid_file::write");
    let path = path.as_ref();
    let write = || -> std::io::Result<()> {
        let mut out = BufWriter::new(std::fs::File::create(path)?);
        write_grid(grid, &mut out)?;
        out.flush()
    };
    write().map_err(|e| HeatError::io(path, e))?;
    log::info!(
        "wrote {}x{} grid to {}",
        grid.rows(),
        grid.cols(),
        path.display()
    );
    Ok(())
}

/// Parse the text form. `path` only labels errors.
pub fn parse_grid(text: &str, path: &Path) -> Result<GridBuffer> {
    let parse_error = |message: String| HeatError::Parse {
        path: path.to_path_buf(),
        message,
    };

    let mut tokens = text.split_whitespace();
    let mut dimension = |name: &str| -> Result<usize> {
        let token = tokens
            .next()
            .ok_or_else(|| parse_error(format!("missing {name}")))?;
        match token.parse::<usize>() {
            Ok(v) if v > 0 => Ok(v),
            _ => Err(parse_error(format!("invalid {name} '{token}'"))),
        }
    };
    let rows = dimension("row count")?;
    let cols = dimension("column count")?;

    let len = rows
        .checked_mul(cols)
        .ok_or_else(|| parse_error(format!("dimensions {rows}x{cols} overflow")))?;
    let mut grid = GridBuffer::try_new(rows, cols)?;
    let mut filled = 0;
    for (slot, token) in grid.buffer_mut().iter_mut().zip(tokens.by_ref()) {
        *slot = token
            .parse::<f64>()
            .map_err(|_| parse_error(format!("invalid value '{token}' at index {filled}")))?;
        filled += 1;
    }
    if filled != len {
        return Err(parse_error(format!(
            "expected {len} values, found {filled}"
        )));
    }
    if tokens.next().is_some() {
        log::warn!("{}: ignoring trailing data after {len} values", path.display());
    }
    Ok(grid)
}

pub fn read_grid_file<P: AsRef<Path>>(path: P) -> Result<GridBuffer> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| HeatError::io(path, e))?;
    parse_grid(&text, path)
}

/// Top left corner of the grid, at most `limit x limit`, for log previews.
pub fn format_grid_section(grid: &GridBuffer, limit: usize) -> String {
    let rows = grid.rows().min(limit);
    let cols = grid.cols().min(limit);
    let mut out = String::new();
    for row in grid.row_iter().take(rows) {
        for v in &row[..cols] {
            let _ = write!(out, "{v:8.2} ");
        }
        out.push('\n');
    }
    out
}
