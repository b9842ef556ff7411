use crate::comm::Communicator;
use crate::decomposition::*;
use crate::domain::{GlobalGrid, GridBuffer};
use crate::error::*;
use crate::gather::RowGather;
use crate::halo::*;
use mpi::datatype::PartitionMut;
use mpi::environment::Universe;
use mpi::request::WaitGuard;
use mpi::topology::SimpleCommunicator;
use mpi::traits::*;
use mpi::{Count, Rank};

/// One rank per MPI process, over `MPI_COMM_WORLD`.
pub struct MpiComm {
    world: SimpleCommunicator,
    rank: usize,
    size: usize,
    // Finalizes MPI when dropped; fields drop in order, so this stays last.
    _universe: Universe,
}

impl MpiComm {
    pub fn initialize() -> Result<Self> {
        let universe = mpi::initialize()
            .ok_or_else(|| HeatError::Mpi("MPI was already initialized".to_string()))?;
        let world = universe.world();
        let rank = world.rank() as usize;
        let size = world.size() as usize;
        Ok(MpiComm {
            world,
            rank,
            size,
            _universe: universe,
        })
    }
}

fn to_count(value: usize) -> Result<Count> {
    Count::try_from(value)
        .map_err(|_| HeatError::Mpi(format!("{value} elements exceed the MPI count range")))
}

impl HaloChannel for MpiComm {
    fn exchange(&mut self, slots: Vec<HaloSlot<'_>>) -> Result<()> {
        profiling::scope!("halo::exchange");
        let world = &self.world;
        // Every request is issued before any is waited on; the guards are
        // dropped together at the end of the scope, which is the wait-all.
        mpi::request::scope(|scope| {
            let mut in_flight = Vec::with_capacity(2 * slots.len());
            for slot in slots {
                let process = world.process_at_rank(slot.neighbor as Rank);
                in_flight.push(WaitGuard::from(process.immediate_send_with_tag(
                    scope,
                    slot.send,
                    slot.direction.send_tag(),
                )));
                in_flight.push(WaitGuard::from(
                    process.immediate_receive_into_with_tag(
                        scope,
                        slot.recv,
                        slot.direction.recv_tag(),
                    ),
                ));
            }
        });
        Ok(())
    }
}

impl RowGather for MpiComm {
    fn gather_rows(
        &mut self,
        local_rows: &[f64],
        partition: &RowPartition,
        cols: usize,
    ) -> Result<Option<GlobalGrid>> {
        profiling::scope!("gather::gather_rows");
        let root = self.world.process_at_rank(COORDINATOR as Rank);
        if self.rank != COORDINATOR {
            root.gather_varcount_into(local_rows);
            return Ok(None);
        }

        let layout = partition.gather_layout(cols);
        let counts = layout
            .counts
            .iter()
            .map(|&c| to_count(c))
            .collect::<Result<Vec<Count>>>()?;
        let displacements = layout
            .displacements
            .iter()
            .map(|&d| to_count(d))
            .collect::<Result<Vec<Count>>>()?;

        let mut grid = GridBuffer::try_new(partition.total_rows(), cols)?;
        {
            let mut receive =
                PartitionMut::new(grid.buffer_mut(), counts, displacements);
            root.gather_varcount_into_root(local_rows, &mut receive);
        }
        Ok(Some(grid))
    }
}

impl Communicator for MpiComm {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn barrier(&self) -> Result<()> {
        self.world.barrier();
        Ok(())
    }

    fn wall_time(&self) -> f64 {
        mpi::time()
    }

    fn abort(&self, code: i32) {
        log::error!("rank {}: aborting run (code {code})", self.rank);
        self.world.abort(code)
    }
}
