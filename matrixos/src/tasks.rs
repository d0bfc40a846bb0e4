//! Background task scheduling.
//!
//! Apps hand long-running work (network fetches, file I/O) to a
//! [`TaskManager`], which executes it on a small pool of worker threads
//! and delivers the result back through a completion queue. Callbacks
//! only ever run inside [`TaskManager::process_completed`], which the
//! frame pump calls once per tick on the main thread. That is the one
//! synchronization contract protecting app state; task bodies must not
//! touch app objects directly.
//!
//! Both queues are unbounded: a caller that never drains accumulates
//! completed-but-undelivered results without bound. There is no per-task
//! timeout either: a hung task body occupies its worker permanently,
//! and queued work behind it simply waits.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, unbounded};
use log::{debug, error, warn};
use thiserror::Error;

use crate::error::extract_panic_message;

/// Default worker pool size.
pub const DEFAULT_WORKERS: usize = 2;

/// How long a blocked worker waits before re-checking the running flag.
const WORKER_POLL: Duration = Duration::from_millis(500);

/// How long `stop` waits for workers before detaching them.
const STOP_TIMEOUT: Duration = Duration::from_secs(2);

/// Process-wide id source. Ids stay unique and strictly increasing in
/// assignment order even across concurrent schedulers.
static NEXT_TASK_ID: AtomicU64 = AtomicU64::new(1);

/// Identifier of a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

impl TaskId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Failure captured from a task body (returned error or panic).
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct TaskError(pub String);

impl TaskError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Dynamically typed task payload; callbacks downcast to the concrete
/// type they scheduled.
pub type TaskValue = Box<dyn Any + Send>;

/// Immutable completion snapshot handed to a task's callback.
pub struct TaskResult {
    task_id: TaskId,
    outcome: Result<TaskValue, TaskError>,
}

impl TaskResult {
    pub fn task_id(&self) -> TaskId {
        self.task_id
    }

    pub fn success(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn error(&self) -> Option<&TaskError> {
        self.outcome.as_ref().err()
    }

    /// Take the value, downcast to `T`. `None` on failure or type
    /// mismatch.
    pub fn into_value<T: 'static>(self) -> Option<T> {
        self.outcome.ok().and_then(|v| v.downcast::<T>().ok()).map(|b| *b)
    }

    pub fn value_ref<T: 'static>(&self) -> Option<&T> {
        self.outcome.as_ref().ok().and_then(|v| v.downcast_ref::<T>())
    }
}

type TaskFn = Box<dyn FnOnce() -> Result<TaskValue, TaskError> + Send>;
type TaskCallback = Box<dyn FnOnce(TaskResult) + Send>;

/// A unit of work queued for a worker.
struct BackgroundTask {
    id: TaskId,
    owner: String,
    func: TaskFn,
    completed: Arc<AtomicBool>,
}

impl BackgroundTask {
    /// Run the body, capturing panics into the outcome. A misbehaving
    /// task must never kill its worker.
    fn execute(self) -> CompletedTask {
        let Self {
            id,
            owner,
            func,
            completed,
        } = self;
        let outcome = match panic::catch_unwind(AssertUnwindSafe(func)) {
            Ok(result) => result,
            Err(payload) => Err(TaskError::new(extract_panic_message(&payload))),
        };
        completed.store(true, Ordering::Release);
        CompletedTask { id, owner, outcome }
    }
}

struct CompletedTask {
    id: TaskId,
    owner: String,
    outcome: Result<TaskValue, TaskError>,
}

enum Job {
    Run(BackgroundTask),
    /// Sentinel telling one worker of the given pool generation to
    /// exit. A worker that quits via the running flag instead leaves its
    /// sentinel queued; tagging lets a restarted pool discard it.
    Shutdown(u64),
}

struct Pending {
    callback: Option<TaskCallback>,
    completed: Arc<AtomicBool>,
}

/// Counts reported by [`TaskManager::stats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskStats {
    pub queued: usize,
    pub pending: usize,
    pub workers: usize,
    pub running: bool,
}

/// Fixed-pool background task scheduler.
///
/// One instance is shared per shell and passed to apps through their
/// context; tests build their own so no global state leaks between them.
pub struct TaskManager {
    num_workers: usize,
    job_tx: Sender<Job>,
    job_rx: Receiver<Job>,
    done_tx: Sender<CompletedTask>,
    done_rx: Receiver<CompletedTask>,
    pending: Mutex<HashMap<TaskId, Pending>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    running: Arc<AtomicBool>,
    /// Bumped on every start; workers only honor sentinels of their own
    /// generation.
    generation: AtomicU64,
}

impl TaskManager {
    pub fn new(num_workers: usize) -> Self {
        let (job_tx, job_rx) = unbounded();
        let (done_tx, done_rx) = unbounded();
        Self {
            num_workers: num_workers.max(1),
            job_tx,
            job_rx,
            done_tx,
            done_rx,
            pending: Mutex::new(HashMap::new()),
            workers: Mutex::new(Vec::new()),
            running: Arc::new(AtomicBool::new(false)),
            generation: AtomicU64::new(0),
        }
    }

    /// Start the worker pool. No-op if already running.
    pub fn start(&self) {
        if self.running.swap(true, Ordering::AcqRel) {
            return;
        }
        let Ok(mut workers) = self.workers.lock() else {
            return;
        };
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        for i in 0..self.num_workers {
            let rx = self.job_rx.clone();
            let tx = self.done_tx.clone();
            let running = Arc::clone(&self.running);
            let builder = thread::Builder::new().name(format!("matrixos-worker-{}", i + 1));
            match builder.spawn(move || worker_loop(rx, tx, running, generation)) {
                Ok(handle) => workers.push(handle),
                Err(e) => error!("failed to spawn worker {}: {e}", i + 1),
            }
        }
        debug!("task manager started with {} workers", workers.len());
    }

    /// Stop the pool: one shutdown sentinel per worker, then join with a
    /// bounded timeout. Workers stuck in a hung task body are detached.
    pub fn stop(&self) {
        if !self.running.swap(false, Ordering::AcqRel) {
            return;
        }
        let generation = self.generation.load(Ordering::Acquire);
        for _ in 0..self.num_workers {
            let _ = self.job_tx.send(Job::Shutdown(generation));
        }
        let Ok(mut workers) = self.workers.lock() else {
            return;
        };
        let deadline = Instant::now() + STOP_TIMEOUT;
        for handle in workers.drain(..) {
            while !handle.is_finished() && Instant::now() < deadline {
                thread::sleep(Duration::from_millis(10));
            }
            if handle.is_finished() {
                let _ = handle.join();
            } else {
                warn!("worker did not stop within {STOP_TIMEOUT:?}, detaching");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Schedule `func` on the pool with a completion callback.
    ///
    /// Returns immediately. The body runs on exactly one worker,
    /// concurrently with the caller, and must be self-contained and
    /// report back only through its return value. The callback fires on
    /// the draining thread during a later `process_completed` call.
    ///
    /// No ordering is guaranteed between tasks: with more than one
    /// worker, completions may arrive out of scheduling order.
    pub fn schedule<T, F, C>(&self, func: F, callback: C, owner: impl Into<String>) -> TaskId
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T, TaskError> + Send + 'static,
        C: FnOnce(TaskResult) + Send + 'static,
    {
        self.schedule_inner(erase(func), Some(Box::new(callback)), owner.into())
    }

    /// Schedule `func` with no callback; the outcome is discarded.
    pub fn schedule_detached<T, F>(&self, func: F, owner: impl Into<String>) -> TaskId
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T, TaskError> + Send + 'static,
    {
        self.schedule_inner(erase(func), None, owner.into())
    }

    fn schedule_inner(&self, func: TaskFn, callback: Option<TaskCallback>, owner: String) -> TaskId {
        self.start();
        let id = TaskId(NEXT_TASK_ID.fetch_add(1, Ordering::SeqCst));
        let completed = Arc::new(AtomicBool::new(false));
        if let Ok(mut pending) = self.pending.lock() {
            pending.insert(
                id,
                Pending {
                    callback,
                    completed: Arc::clone(&completed),
                },
            );
        }
        let task = BackgroundTask {
            id,
            owner,
            func,
            completed,
        };
        if self.job_tx.send(Job::Run(task)).is_err() {
            // Both channel halves live in self, so this cannot happen
            // while the manager is alive.
            error!("task {id} lost: work queue disconnected");
        }
        id
    }

    /// Drain the completion queue, invoking each task's callback.
    ///
    /// Must be called from the main thread, once per frame tick,
    /// regardless of which app is active. Callbacks run in FIFO dequeue
    /// order; a panicking callback is logged and does not stop the rest
    /// of the drain. Returns the number of completions processed.
    pub fn process_completed(&self) -> usize {
        let mut processed = 0;
        while let Ok(done) = self.done_rx.try_recv() {
            let callback = self
                .pending
                .lock()
                .ok()
                .and_then(|mut p| p.get_mut(&done.id).and_then(|e| e.callback.take()));

            if let Some(cb) = callback {
                let result = TaskResult {
                    task_id: done.id,
                    outcome: done.outcome,
                };
                let invoked = panic::catch_unwind(AssertUnwindSafe(move || cb(result)));
                if let Err(payload) = invoked {
                    error!(
                        "callback for task {} ({}) panicked: {}",
                        done.id,
                        done.owner,
                        extract_panic_message(&payload)
                    );
                }
            }

            // The entry leaves the pending map only once its callback
            // has fired (or was cancelled).
            if let Ok(mut pending) = self.pending.lock() {
                pending.remove(&done.id);
            }
            processed += 1;
        }
        processed
    }

    /// Best-effort cancellation: suppresses the callback of a task that
    /// has not completed yet. The worker still runs the body to the end;
    /// there is no thread interruption. Returns false for unknown or
    /// already-completed ids.
    pub fn cancel(&self, id: TaskId) -> bool {
        let Ok(mut pending) = self.pending.lock() else {
            return false;
        };
        match pending.get(&id) {
            Some(entry) if !entry.completed.load(Ordering::Acquire) => {
                pending.remove(&id);
                debug!("task {id} cancelled");
                true
            }
            _ => false,
        }
    }

    pub fn stats(&self) -> TaskStats {
        TaskStats {
            queued: self.job_tx.len(),
            pending: self.pending.lock().map(|p| p.len()).unwrap_or(0),
            workers: self.workers.lock().map(|w| w.len()).unwrap_or(0),
            running: self.is_running(),
        }
    }
}

impl Default for TaskManager {
    fn default() -> Self {
        Self::new(DEFAULT_WORKERS)
    }
}

impl Drop for TaskManager {
    fn drop(&mut self) {
        self.stop();
    }
}

fn erase<T, F>(func: F) -> TaskFn
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, TaskError> + Send + 'static,
{
    Box::new(move || func().map(|v| Box::new(v) as TaskValue))
}

fn worker_loop(
    rx: Receiver<Job>,
    tx: Sender<CompletedTask>,
    running: Arc<AtomicBool>,
    generation: u64,
) {
    while running.load(Ordering::Acquire) {
        match rx.recv_timeout(WORKER_POLL) {
            Ok(Job::Run(task)) => {
                let id = task.id;
                let done = task.execute();
                if let Err(err) = &done.outcome {
                    debug!("task {id} ({}) failed: {err}", done.owner);
                }
                if tx.send(done).is_err() {
                    break;
                }
            }
            Ok(Job::Shutdown(g)) if g >= generation => break,
            // Sentinel left over from a stopped earlier pool.
            Ok(Job::Shutdown(_)) => continue,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_strictly_increasing() {
        let manager = TaskManager::new(1);
        let a = manager.schedule_detached(|| Ok(()), "test");
        let b = manager.schedule_detached(|| Ok(()), "test");
        assert!(b > a);
    }

    #[test]
    fn test_schedule_autostarts() {
        let manager = TaskManager::new(2);
        assert!(!manager.is_running());
        manager.schedule_detached(|| Ok(()), "test");
        assert!(manager.is_running());
        assert_eq!(manager.stats().workers, 2);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let manager = TaskManager::new(1);
        manager.start();
        manager.stop();
        manager.stop();
        assert!(!manager.is_running());
        assert_eq!(manager.stats().workers, 0);
    }

    #[test]
    fn test_result_downcast() {
        let result = TaskResult {
            task_id: TaskId(1),
            outcome: Ok(Box::new(42u32)),
        };
        assert!(result.success());
        assert_eq!(result.value_ref::<u32>(), Some(&42));
        assert_eq!(result.into_value::<u32>(), Some(42));
    }
}
