//! Communication backends.
//!
//! A distributed run only needs four things from its environment: who am
//! I, a full rendezvous, the halo exchange with row neighbours, and the
//! final gather. `LocalComm` runs every rank as a thread of this process;
//! `MpiComm` (feature `mpi`) runs one rank per MPI process.

mod local;
#[cfg(feature = "mpi")]
mod mpi_comm;

pub use local::*;
#[cfg(feature = "mpi")]
pub use mpi_comm::*;

use crate::gather::RowGather;
use crate::halo::HaloChannel;

pub trait Communicator: HaloChannel + RowGather {
    fn rank(&self) -> usize;

    fn size(&self) -> usize;

    /// Blocks until every rank has arrived.
    fn barrier(&self) -> crate::error::Result<()>;

    /// Seconds since an arbitrary fixed point, comparable across calls
    /// on the same rank.
    fn wall_time(&self) -> f64;

    /// Take every rank down after an unrecoverable local failure.
    /// Peers blocked on this rank must not wait forever.
    fn abort(&self, code: i32);
}
