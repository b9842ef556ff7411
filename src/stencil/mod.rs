//! Explicit five point heat stencil.

mod heat;

pub use heat::*;
