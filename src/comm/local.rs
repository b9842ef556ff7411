use crate::comm::Communicator;
use crate::decomposition::*;
use crate::domain::GlobalGrid;
use crate::error::*;
use crate::gather::*;
use crate::halo::*;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// How often a blocked rank checks whether the run was aborted.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

struct BarrierState {
    arrived: usize,
    generation: u64,
}

/// State every rank of one local world can see.
struct Shared {
    size: usize,
    aborted: AtomicBool,
    barrier: Mutex<BarrierState>,
    barrier_cv: Condvar,
    epoch: Instant,
}

impl Shared {
    fn new(size: usize) -> Self {
        Shared {
            size,
            aborted: AtomicBool::new(false),
            barrier: Mutex::new(BarrierState {
                arrived: 0,
                generation: 0,
            }),
            barrier_cv: Condvar::new(),
            epoch: Instant::now(),
        }
    }

    fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::Acquire)
    }

    /// Returns `true` only for the call that actually aborted the world.
    fn abort(&self) -> bool {
        let first = !self.aborted.swap(true, Ordering::AcqRel);
        let _state = self.barrier.lock().unwrap_or_else(PoisonError::into_inner);
        self.barrier_cv.notify_all();
        first
    }

    fn barrier_wait(&self, rank: usize) -> Result<()> {
        let mut state = self.barrier.lock().unwrap_or_else(PoisonError::into_inner);
        if self.is_aborted() {
            return Err(HeatError::PeerAborted { rank });
        }
        let generation = state.generation;
        state.arrived += 1;
        if state.arrived == self.size {
            state.arrived = 0;
            state.generation += 1;
            self.barrier_cv.notify_all();
            return Ok(());
        }
        loop {
            let (guard, _) = self
                .barrier_cv
                .wait_timeout(state, POLL_INTERVAL)
                .unwrap_or_else(PoisonError::into_inner);
            state = guard;
            if state.generation != generation {
                return Ok(());
            }
            if self.is_aborted() {
                return Err(HeatError::PeerAborted { rank });
            }
        }
    }
}

/// One rank of an in-process world.
///
/// Every route is an unbounded channel keyed by peer and tag, so sends
/// never block and a receive only ever matches the tag it asked for.
/// A rank that is dropped without finishing cleanly aborts the world.
pub struct LocalComm {
    rank: usize,
    shared: Arc<Shared>,
    outboxes: HashMap<(usize, Tag), Sender<Vec<f64>>>,
    inboxes: HashMap<(usize, Tag), Receiver<Vec<f64>>>,
    retired: bool,
}

impl LocalComm {
    fn send(&self, destination: usize, tag: Tag, payload: Vec<f64>) -> Result<()> {
        let outbox = self
            .outboxes
            .get(&(destination, tag))
            .ok_or_else(|| self.no_route(destination, tag))?;
        outbox
            .send(payload)
            .map_err(|_| HeatError::PeerAborted { rank: self.rank })
    }

    fn receive(&self, source: usize, tag: Tag) -> Result<Vec<f64>> {
        let inbox = self
            .inboxes
            .get(&(source, tag))
            .ok_or_else(|| self.no_route(source, tag))?;
        loop {
            match inbox.recv_timeout(POLL_INTERVAL) {
                Ok(payload) => return Ok(payload),
                Err(RecvTimeoutError::Timeout) => {
                    if self.shared.is_aborted() {
                        return Err(HeatError::PeerAborted { rank: self.rank });
                    }
                }
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(HeatError::PeerAborted { rank: self.rank });
                }
            }
        }
    }

    fn no_route(&self, peer: usize, tag: Tag) -> HeatError {
        HeatError::UnexpectedMessage {
            rank: self.rank,
            source_rank: peer,
            tag,
            message: "no route between these ranks".to_string(),
        }
    }

    /// Mark this rank as finished so dropping it does not abort peers.
    fn retire(&mut self) {
        self.retired = true;
    }
}

impl Drop for LocalComm {
    fn drop(&mut self) {
        if !self.retired {
            self.shared.abort();
        }
    }
}

impl HaloChannel for LocalComm {
    fn exchange(&mut self, slots: Vec<HaloSlot<'_>>) -> Result<()> {
        profiling::scope!("halo::exchange");
        for slot in &slots {
            self.send(slot.neighbor, slot.direction.send_tag(), slot.send.to_vec())?;
        }
        for slot in slots {
            let tag = slot.direction.recv_tag();
            let row = self.receive(slot.neighbor, tag)?;
            if row.len() != slot.recv.len() {
                return Err(HeatError::UnexpectedMessage {
                    rank: self.rank,
                    source_rank: slot.neighbor,
                    tag,
                    message: format!(
                        "halo row has {} values, expected {}",
                        row.len(),
                        slot.recv.len()
                    ),
                });
            }
            slot.recv.copy_from_slice(&row);
        }
        Ok(())
    }
}

impl RowGather for LocalComm {
    fn gather_rows(
        &mut self,
        local_rows: &[f64],
        partition: &RowPartition,
        cols: usize,
    ) -> Result<Option<GlobalGrid>> {
        profiling::scope!("gather::gather_rows");
        if self.rank == COORDINATOR {
            let grid = assemble_rows(partition, cols, local_rows, |rank, _| {
                self.receive(rank, GATHER_TAG)
            })?;
            Ok(Some(grid))
        } else {
            self.send(COORDINATOR, GATHER_TAG, local_rows.to_vec())?;
            Ok(None)
        }
    }
}

impl Communicator for LocalComm {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.shared.size
    }

    fn barrier(&self) -> Result<()> {
        self.shared.barrier_wait(self.rank)
    }

    fn wall_time(&self) -> f64 {
        self.shared.epoch.elapsed().as_secs_f64()
    }

    fn abort(&self, code: i32) {
        if self.shared.abort() {
            log::error!("rank {}: aborting run (code {code})", self.rank);
        }
    }
}

/// A set of ranks running as threads of this process.
pub struct LocalWorld;

impl LocalWorld {
    /// Wire up `size` ranks as a chain, plus a route from every rank to the
    /// coordinator for the gather.
    pub fn connect(size: usize) -> Vec<LocalComm> {
        assert!(size > 0, "a world needs at least one rank");
        let shared = Arc::new(Shared::new(size));
        let mut comms: Vec<LocalComm> = (0..size)
            .map(|rank| LocalComm {
                rank,
                shared: shared.clone(),
                outboxes: HashMap::new(),
                inboxes: HashMap::new(),
                retired: false,
            })
            .collect();

        let mut route = |from: usize, to: usize, tag: Tag| {
            let (tx, rx) = mpsc::channel();
            comms[from].outboxes.insert((to, tag), tx);
            comms[to].inboxes.insert((from, tag), rx);
        };
        for rank in 0..size.saturating_sub(1) {
            route(rank, rank + 1, DOWNWARD_TAG);
            route(rank + 1, rank, UPWARD_TAG);
        }
        for rank in 1..size {
            route(rank, COORDINATOR, GATHER_TAG);
        }
        comms
    }

    /// Run `f` once per rank, each on its own thread, and collect the
    /// results in rank order. A rank returning an error or panicking
    /// aborts the others.
    pub fn run<T, F>(size: usize, f: F) -> Vec<Result<T>>
    where
        T: Send,
        F: Fn(&mut LocalComm) -> Result<T> + Sync,
    {
        let comms = Self::connect(size);
        std::thread::scope(|scope| {
            let handles: Vec<_> = comms
                .into_iter()
                .map(|mut comm| {
                    let rank = comm.rank;
                    let f = &f;
                    let handle = std::thread::Builder::new()
                        .name(format!("rank_{rank}"))
                        .spawn_scoped(scope, move || {
                            let result = f(&mut comm);
                            match &result {
                                Ok(_) => comm.retire(),
                                Err(HeatError::PeerAborted { .. }) => comm.retire(),
                                Err(e) => {
                                    log::debug!("rank {rank}: {e}");
                                    comm.abort(1);
                                }
                            }
                            result
                        });
                    (rank, handle)
                })
                .collect();

            handles
                .into_iter()
                .map(|(rank, handle)| match handle {
                    Ok(handle) => handle
                        .join()
                        .unwrap_or(Err(HeatError::RankPanicked { rank })),
                    Err(source) => Err(HeatError::Spawn { rank, source }),
                })
                .collect()
        })
    }
}
