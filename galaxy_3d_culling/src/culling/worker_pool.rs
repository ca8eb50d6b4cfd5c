/// WorkerPool: fixed set of threads executing leaf and shadow work.
///
/// Threads are spawned once and live until the pool drops. Items go into a
/// shared queue; idle workers block on a condition variable and are woken
/// on submit. Each worker executes into a private scratch set and merges
/// it into the shared result (one lock per category) before reporting the
/// item done.
///
/// `join` is the quiescence point: the calling thread drains the queue
/// itself, then waits until the remaining-work counter reaches zero.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread::{self, JoinHandle};
use parking_lot::{Condvar, Mutex};
use crate::engine_err;
use crate::error::Galaxy3dResult;
use crate::{engine_debug, engine_info, engine_warn};
use super::visible_set::{SharedVisibleSet, VisibleSet};
use super::work_item::WorkItem;

const SOURCE: &str = "galaxy3d::WorkerPool";

struct PoolShared {
    queue: Mutex<VecDeque<WorkItem>>,
    /// Signaled on submit and on shutdown
    work_available: Condvar,
    /// Submitted items not yet finished (queued or executing)
    remaining: AtomicUsize,
    idle_lock: Mutex<()>,
    /// Signaled whenever an item finishes
    idle: Condvar,
    shutdown: AtomicBool,
    results: SharedVisibleSet,
}

impl PoolShared {
    fn pop(&self) -> Option<WorkItem> {
        self.queue.lock().pop_front()
    }

    fn finish_one(&self) {
        self.remaining.fetch_sub(1, Ordering::AcqRel);
        let _guard = self.idle_lock.lock();
        self.idle.notify_all();
    }
}

pub(crate) struct WorkerPool {
    shared: Arc<PoolShared>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn up to `count` workers.
    ///
    /// A worker that fails to spawn is logged; the pool runs with the
    /// workers it has (possibly none, in which case `join` does all the work).
    pub(crate) fn new(count: usize) -> Self {
        let shared = Arc::new(PoolShared {
            queue: Mutex::new(VecDeque::new()),
            work_available: Condvar::new(),
            remaining: AtomicUsize::new(0),
            idle_lock: Mutex::new(()),
            idle: Condvar::new(),
            shutdown: AtomicBool::new(false),
            results: SharedVisibleSet::default(),
        });

        let mut workers = Vec::with_capacity(count);
        for index in 0..count {
            match spawn_worker(index, Arc::clone(&shared)) {
                Ok(handle) => workers.push(handle),
                Err(_) => break,
            }
        }

        if workers.len() < count {
            engine_warn!(SOURCE, "Running with {} of {} culling workers", workers.len(), count);
        } else {
            engine_info!(SOURCE, "Started {} culling workers", count);
        }

        Self { shared, workers }
    }

    pub(crate) fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Queue an item and wake one idle worker.
    pub(crate) fn submit(&self, item: WorkItem) {
        self.shared.remaining.fetch_add(1, Ordering::AcqRel);
        self.shared.queue.lock().push_back(item);
        self.shared.work_available.notify_one();
    }

    /// Wait for every submitted item and move the results into `out`.
    ///
    /// Items still queued are executed on the calling thread, straight into `out`.
    pub(crate) fn join(&self, out: &mut VisibleSet) {
        while let Some(item) = self.shared.pop() {
            item.execute(out);
            self.shared.finish_one();
        }

        {
            let mut guard = self.shared.idle_lock.lock();
            while self.shared.remaining.load(Ordering::Acquire) != 0 {
                self.shared.idle.wait(&mut guard);
            }
        }

        self.shared.results.take_into(out);
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        // Signal shutdown
        self.shared.shutdown.store(true, Ordering::SeqCst);

        // Wake up every worker
        {
            let queue = self.shared.queue.lock();
            self.shared.work_available.notify_all();
            drop(queue);
        }

        // Wait for workers to finish
        let count = self.workers.len();
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
        engine_debug!(SOURCE, "Stopped {} culling workers", count);
    }
}

fn spawn_worker(index: usize, shared: Arc<PoolShared>) -> Galaxy3dResult<JoinHandle<()>> {
    thread::Builder::new()
        .name(format!("galaxy3d-cull-{}", index))
        .spawn(move || worker_loop(shared))
        .map_err(|e| engine_err!(SOURCE, WorkerSpawnFailed, "Worker {}: {}", index, e))
}

fn worker_loop(shared: Arc<PoolShared>) {
    let mut scratch = VisibleSet::new();
    loop {
        let item = {
            let mut queue = shared.queue.lock();
            loop {
                if let Some(item) = queue.pop_front() {
                    break Some(item);
                }
                if shared.shutdown.load(Ordering::SeqCst) {
                    break None;
                }
                shared.work_available.wait(&mut queue);
            }
        };
        let Some(item) = item else {
            break;
        };

        item.execute(&mut scratch);
        shared.results.merge(&mut scratch);
        shared.finish_one();
    }
}

#[cfg(test)]
#[path = "worker_pool_tests.rs"]
mod tests;
