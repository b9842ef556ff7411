//! Grid storage.
//!
//! A `GridBuffer` is one flat row-major allocation with stride based
//! access. A rank's `LocalSubgrid` holds two of them, each with a halo row
//! above and below the rows it owns, and the coordinator assembles the
//! gathered result into a `GlobalGrid`.

pub mod bc;
mod grid;
mod subgrid;

pub use bc::*;
pub use grid::*;
pub use subgrid::*;
