//! Worker pool implementation
//!
//! A fixed pool of OS threads, each running the same stateless loop: receive
//! a [`WorkerMessage`], process the unit through the bound kernel, send the
//! partial result back, repeat until told to stop. Nothing persists between
//! invocations, so a worker could equally run as a separate process or a
//! remote task behind the same protocol.
//!
//! # Thread Safety
//!
//! Workers do not share mutable state. Each worker owns a private
//! request/response channel pair; the channels are bounded to a single slot,
//! which is what enforces "at most one outstanding unit per worker" at the
//! transport level rather than by convention.

use crate::kernel::Kernel;
use crate::protocol::{ProtocolError, WorkerMessage};
use crate::Result;
use anyhow::Context;
use crossbeam::channel::{bounded, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Dispatcher-side handle to one worker thread.
pub struct WorkerHandle<U, P> {
    id: usize,
    request_tx: Sender<WorkerMessage<U>>,
    response_rx: Receiver<P>,
    join: Option<JoinHandle<()>>,
}

impl<U, P> WorkerHandle<U, P> {
    pub fn id(&self) -> usize {
        self.id
    }

    /// Hand one unit to the worker. Fails only if the worker is gone, which
    /// is a protocol violation, not a recoverable condition.
    pub fn send_unit(&self, unit: U) -> std::result::Result<(), ProtocolError> {
        self.request_tx
            .send(WorkerMessage::Unit(unit))
            .map_err(|_| ProtocolError::WorkerDisconnected(self.id))
    }

    /// Block until this worker's result arrives.
    pub fn recv_partial(&self) -> std::result::Result<P, ProtocolError> {
        self.response_rx
            .recv()
            .map_err(|_| ProtocolError::WorkerDisconnected(self.id))
    }

    /// Tell the worker no more work is coming. Must only be sent when the
    /// worker holds no outstanding unit.
    pub fn send_stop(&self) -> std::result::Result<(), ProtocolError> {
        self.request_tx
            .send(WorkerMessage::Stop)
            .map_err(|_| ProtocolError::WorkerDisconnected(self.id))
    }

    fn join(&mut self) -> Result<()> {
        if let Some(handle) = self.join.take() {
            handle
                .join()
                .map_err(|_| anyhow::anyhow!("worker {} panicked", self.id))?;
        }
        Ok(())
    }
}

/// Fixed pool of workers bound to one kernel.
pub struct WorkerPool<K: Kernel> {
    handles: Vec<WorkerHandle<K::Unit, K::Partial>>,
}

impl<K: Kernel> WorkerPool<K> {
    /// Spawn `count` worker threads sharing `kernel`.
    pub fn spawn(count: usize, kernel: Arc<K>) -> Result<Self> {
        anyhow::ensure!(count >= 1, "worker pool needs at least one worker");

        let mut handles = Vec::with_capacity(count);
        for id in 0..count {
            let (request_tx, request_rx) = bounded(1);
            let (response_tx, response_rx) = bounded(1);
            let kernel = Arc::clone(&kernel);
            let join = thread::Builder::new()
                .name(format!("worker-{id}"))
                .spawn(move || worker_loop(id, kernel, request_rx, response_tx))
                .with_context(|| format!("spawning worker {id}"))?;
            handles.push(WorkerHandle {
                id,
                request_tx,
                response_rx,
                join: Some(join),
            });
        }
        log::info!("started worker pool with {count} workers");
        Ok(Self { handles })
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn handle(&self, index: usize) -> &WorkerHandle<K::Unit, K::Partial> {
        &self.handles[index]
    }

    /// Broadcast exactly one stop signal per worker, then join the threads.
    pub fn shutdown(mut self) -> Result<()> {
        for handle in &self.handles {
            handle.send_stop()?;
        }
        for handle in &mut self.handles {
            handle.join()?;
        }
        log::info!("worker pool stopped");
        Ok(())
    }
}

fn worker_loop<K: Kernel>(
    id: usize,
    kernel: Arc<K>,
    requests: Receiver<WorkerMessage<K::Unit>>,
    responses: Sender<K::Partial>,
) {
    log::debug!("worker {id} ready");
    while let Ok(message) = requests.recv() {
        match message {
            WorkerMessage::Unit(unit) => {
                let partial = kernel.process(&unit);
                if responses.send(partial).is_err() {
                    // Dispatcher went away; nothing left to report to.
                    break;
                }
            }
            WorkerMessage::Stop => break,
        }
    }
    log::debug!("worker {id} stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    struct DoublingKernel;

    impl Kernel for DoublingKernel {
        type Unit = u64;
        type Partial = u64;

        fn process(&self, unit: &u64) -> u64 {
            unit * 2
        }
    }

    #[test]
    fn test_request_response_cycle() {
        let pool = WorkerPool::spawn(2, Arc::new(DoublingKernel)).unwrap();
        assert_eq!(pool.len(), 2);

        pool.handle(0).send_unit(21).unwrap();
        assert_eq!(pool.handle(0).recv_partial().unwrap(), 42);

        pool.handle(1).send_unit(5).unwrap();
        assert_eq!(pool.handle(1).recv_partial().unwrap(), 10);

        pool.shutdown().unwrap();
    }

    #[test]
    fn test_worker_processes_many_units_in_order() {
        let pool = WorkerPool::spawn(1, Arc::new(DoublingKernel)).unwrap();
        for n in 0..100u64 {
            pool.handle(0).send_unit(n).unwrap();
            assert_eq!(pool.handle(0).recv_partial().unwrap(), n * 2);
        }
        pool.shutdown().unwrap();
    }

    #[test]
    fn test_shutdown_joins_all_workers() {
        let pool = WorkerPool::spawn(4, Arc::new(DoublingKernel)).unwrap();
        pool.shutdown().unwrap();
    }

    #[test]
    fn test_zero_workers_rejected() {
        assert!(WorkerPool::spawn(0, Arc::new(DoublingKernel)).is_err());
    }
}
