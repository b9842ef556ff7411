//! Error type shared by every part of the solver.
//!
//! Allocation failures and communication failures are fatal for a
//! distributed run: the driver aborts every rank when it sees one.
//! I/O failures on result files are reported by the caller and do not
//! stop the numerical run.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, HeatError>;

#[derive(Error, Debug)]
pub enum HeatError {
    #[error("failed to allocate {rows}x{cols} grid buffer")]
    Allocation { rows: usize, cols: usize },

    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path:?}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("grid dimensions do not match: {left_rows}x{left_cols} vs {right_rows}x{right_cols}")]
    DimensionMismatch {
        left_rows: usize,
        left_cols: usize,
        right_rows: usize,
        right_cols: usize,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("rank {rank}: a peer aborted the run")]
    PeerAborted { rank: usize },

    #[error("rank {rank}: unexpected message from rank {source_rank} (tag {tag}): {message}")]
    UnexpectedMessage {
        rank: usize,
        source_rank: usize,
        tag: i32,
        message: String,
    },

    #[error("failed to start rank {rank}: {source}")]
    Spawn {
        rank: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("rank {rank} panicked")]
    RankPanicked { rank: usize },

    #[error("failed to write image: {0}")]
    Image(#[from] image::ImageError),

    #[error("MPI error: {0}")]
    Mpi(String),
}

impl HeatError {
    pub fn io<P: Into<PathBuf>>(path: P, source: std::io::Error) -> Self {
        HeatError::Io {
            path: path.into(),
            source,
        }
    }

    /// Errors that leave the rank unable to continue.
    /// Anything else is local to the caller and must not stop peers.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            HeatError::Allocation { .. }
                | HeatError::PeerAborted { .. }
                | HeatError::UnexpectedMessage { .. }
                | HeatError::Spawn { .. }
                | HeatError::RankPanicked { .. }
                | HeatError::Mpi(_)
        )
    }
}
