//! Dispatch loop
//!
//! The dispatcher owns the worker pool and drives the whole run: pull the
//! next unit from the chunker, hand it to the next worker in round-robin
//! order, block until that worker's result comes back, merge the result into
//! the accumulator, repeat. There is no pipelining — each worker holds at
//! most one outstanding unit, and the dispatcher serializes every exchange —
//! so the chunker and accumulator are only ever touched from this thread.
//!
//! # Lifecycle
//!
//! ```text
//! Idle --run()--> Dispatching --chunker exhausted--> Draining --joined--> Done
//! ```
//!
//! On exhaustion the dispatcher broadcasts exactly one stop signal per worker
//! and joins the pool; a worker is never told to stop while it still holds a
//! unit. Results merge in completion order, which round-robin assignment does
//! not guarantee to match chunk order — correctness rests on the
//! accumulator's commutative/associative merge contract.

use crate::accumulator::Accumulator;
use crate::chunker::Chunker;
use crate::kernel::Kernel;
use crate::worker::WorkerPool;
use crate::Result;

/// Dispatcher lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    /// Constructed, not yet running.
    Idle,
    /// Units are being assigned to workers.
    Dispatching,
    /// Chunker exhausted; stop signals are going out and workers are joining.
    Draining,
    /// All workers stopped. Terminal.
    Done,
}

/// What a completed run dispatched, per worker.
#[derive(Debug, Clone)]
pub struct DispatchSummary {
    pub units_dispatched: u64,
    /// Units handled by each worker, indexed by worker id. Round-robin
    /// assignment keeps these within one unit of each other.
    pub per_worker_units: Vec<u64>,
}

/// Coordinator for one run: owns the pool, assigns round-robin, merges
/// results, terminates the pool.
pub struct Dispatcher<K: Kernel> {
    pool: Option<WorkerPool<K>>,
    pool_size: usize,
    state: DispatchState,
    next_worker: usize,
}

impl<K: Kernel> Dispatcher<K> {
    pub fn new(pool: WorkerPool<K>) -> Self {
        let pool_size = pool.len();
        Self {
            pool: Some(pool),
            pool_size,
            state: DispatchState::Idle,
            next_worker: 0,
        }
    }

    pub fn state(&self) -> DispatchState {
        self.state
    }

    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    /// Cyclic worker selection, wrapping after the pool size.
    fn next_worker_index(&mut self) -> usize {
        let index = self.next_worker;
        self.next_worker = (self.next_worker + 1) % self.pool_size;
        index
    }

    /// Drive the chunker to exhaustion, then stop the pool.
    ///
    /// A dispatcher runs exactly once; the pool is consumed by the
    /// termination broadcast.
    pub fn run<C, A>(&mut self, chunker: &mut C, accumulator: &mut A) -> Result<DispatchSummary>
    where
        C: Chunker<Unit = K::Unit>,
        A: Accumulator<Partial = K::Partial>,
    {
        anyhow::ensure!(
            self.state == DispatchState::Idle,
            "dispatcher can only run once"
        );
        self.state = DispatchState::Dispatching;

        let mut per_worker_units = vec![0u64; self.pool_size];
        let mut units_dispatched = 0u64;

        while let Some(unit) = chunker.next_unit()? {
            let worker = self.next_worker_index();
            let handle = self
                .pool
                .as_ref()
                .expect("pool present while dispatching")
                .handle(worker);

            handle.send_unit(unit)?;
            let partial = handle.recv_partial()?;

            per_worker_units[worker] += 1;
            units_dispatched += 1;
            log::debug!("unit {units_dispatched} completed by worker {worker}");

            accumulator.merge(partial)?;
        }

        self.state = DispatchState::Draining;
        log::debug!("chunker exhausted after {units_dispatched} units, stopping pool");
        let pool = self.pool.take().expect("pool present while draining");
        pool.shutdown()?;
        self.state = DispatchState::Done;

        Ok(DispatchSummary {
            units_dispatched,
            per_worker_units,
        })
    }
}
