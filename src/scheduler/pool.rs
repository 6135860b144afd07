//! Worker-pool scheduler.
//!
//! Immediate work goes on a lock-free [`SegQueue`]; delayed work sits in a
//! due-time heap that idle workers promote into the queue when it falls due.
//! Workers park on a condition variable between checks, bounded by
//! [`PoolConfig::idle_timeout`] and by the earliest pending due time.
//!
//! No ordering holds between actions submitted concurrently by different
//! callers. A panic inside an action is not caught: it unwinds the worker
//! thread that ran it, is logged, and shows up in
//! [`PoolScheduler::panicked_workers`].

use super::config::PoolConfig;
use super::immediate::wall_now;
use super::{Action, Scheduler};
use crate::disposable::Subscription;
use crate::error::{Error, ErrorKind, Result};
use crate::tracing_compat::{debug, error, trace, warn};
use crate::types::Time;
use crossbeam_queue::SegQueue;
use parking_lot::{Condvar, Mutex};
use std::cmp::Ordering as CmpOrdering;
use std::collections::BinaryHeap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

struct Task {
    action: Action,
    cancel: Subscription,
}

struct Timed {
    due: Time,
    seq: u64,
    task: Task,
}

impl PartialEq for Timed {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl Eq for Timed {}

impl PartialOrd for Timed {
    fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
        Some(self.cmp(other))
    }
}

impl Ord for Timed {
    fn cmp(&self, other: &Self) -> CmpOrdering {
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

struct PoolInner {
    queue: SegQueue<Task>,
    /// Delayed work; its mutex is also the condvar mutex.
    timers: Mutex<BinaryHeap<Timed>>,
    wake: Condvar,
    shutdown: AtomicBool,
    next_seq: AtomicU64,
    active_workers: AtomicUsize,
    panicked_workers: AtomicUsize,
    idle_timeout: Duration,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl PoolInner {
    fn notify_one(&self) {
        let _guard = self.timers.lock();
        self.wake.notify_one();
    }

    fn notify_all(&self) {
        let _guard = self.timers.lock();
        self.wake.notify_all();
    }
}

/// Runs actions on a fixed set of worker threads.
///
/// Dropping the pool shuts it down; queued immediate work still runs,
/// delayed work that has not fallen due is discarded.
pub struct PoolScheduler {
    inner: Arc<PoolInner>,
}

impl PoolScheduler {
    /// Starts a pool with the given configuration.
    pub fn new(config: PoolConfig) -> Result<Self> {
        config.validate()?;
        let inner = Arc::new(PoolInner {
            queue: SegQueue::new(),
            timers: Mutex::new(BinaryHeap::new()),
            wake: Condvar::new(),
            shutdown: AtomicBool::new(false),
            next_seq: AtomicU64::new(0),
            active_workers: AtomicUsize::new(0),
            panicked_workers: AtomicUsize::new(0),
            idle_timeout: config.idle_timeout,
            handles: Mutex::new(Vec::with_capacity(config.worker_threads)),
        });
        let pool = Self { inner };
        for index in 0..config.worker_threads {
            pool.spawn_worker(&config.thread_name_prefix, index)?;
        }
        debug!(
            workers = config.worker_threads,
            prefix = %config.thread_name_prefix,
            "pool scheduler started"
        );
        Ok(pool)
    }

    /// Starts a pool from defaults plus `PUSHFLOW_POOL_*` overrides.
    pub fn from_env() -> Result<Self> {
        Self::new(PoolConfig::default().apply_env_overrides()?)
    }

    fn spawn_worker(&self, prefix: &str, index: usize) -> Result<()> {
        let inner = Arc::clone(&self.inner);
        self.inner.active_workers.fetch_add(1, Ordering::Relaxed);
        let handle = thread::Builder::new()
            .name(format!("{prefix}-worker-{index}"))
            .spawn(move || {
                let _exit = WorkerExit { inner: &inner };
                debug!(worker = index, "pool worker started");
                worker_loop(&inner);
                debug!(worker = index, "pool worker stopped");
            })
            .map_err(|e| {
                self.inner.active_workers.fetch_sub(1, Ordering::Relaxed);
                Error::new(ErrorKind::InvalidConfig)
                    .with_message("failed to spawn pool worker")
                    .with_source(e)
            })?;
        self.inner.handles.lock().push(handle);
        Ok(())
    }

    /// Returns the number of live worker threads.
    #[must_use]
    pub fn active_workers(&self) -> usize {
        self.inner.active_workers.load(Ordering::Acquire)
    }

    /// Returns the number of workers that exited by panicking.
    #[must_use]
    pub fn panicked_workers(&self) -> usize {
        self.inner.panicked_workers.load(Ordering::Acquire)
    }

    /// Returns true once shutdown has begun.
    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        self.inner.shutdown.load(Ordering::Acquire)
    }

    /// Stops accepting work. Queued immediate work still runs.
    pub fn shutdown(&self) {
        self.inner.shutdown.store(true, Ordering::Release);
        self.inner.notify_all();
    }

    /// Shuts down and waits up to `timeout` for every worker to exit.
    ///
    /// Returns `false` if the timeout elapsed first.
    pub fn shutdown_and_wait(&self, timeout: Duration) -> bool {
        self.shutdown();
        let deadline = Instant::now() + timeout;
        while self.inner.active_workers.load(Ordering::Acquire) > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return false;
            }
            self.inner.notify_all();
            thread::sleep(Duration::from_millis(5).min(remaining));
        }
        for handle in self.inner.handles.lock().drain(..) {
            // A panicked worker was already counted and logged.
            let _ = handle.join();
        }
        true
    }

    /// Returns this pool as a shared scheduler handle.
    #[must_use]
    pub fn into_ref(self) -> super::SchedulerRef {
        Arc::new(self)
    }
}

impl Scheduler for PoolScheduler {
    fn now(&self) -> Time {
        wall_now()
    }

    fn schedule_after(&self, delay: Duration, action: Action) -> Subscription {
        let cancel = Subscription::flag();
        if self.is_shutdown() {
            warn!("work scheduled on a pool scheduler after shutdown was dropped");
            cancel.dispose();
            return cancel;
        }
        let task = Task {
            action,
            cancel: cancel.clone(),
        };
        if delay.is_zero() {
            self.inner.queue.push(task);
            self.inner.notify_one();
        } else {
            let seq = self.inner.next_seq.fetch_add(1, Ordering::Relaxed);
            let due = wall_now() + delay;
            let mut timers = self.inner.timers.lock();
            timers.push(Timed { due, seq, task });
            self.inner.wake.notify_one();
        }
        cancel
    }
}

impl Drop for PoolScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl fmt::Debug for PoolScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolScheduler")
            .field("active_workers", &self.active_workers())
            .field("shutdown", &self.is_shutdown())
            .finish_non_exhaustive()
    }
}

struct WorkerExit<'a> {
    inner: &'a PoolInner,
}

impl Drop for WorkerExit<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            self.inner.panicked_workers.fetch_add(1, Ordering::AcqRel);
            error!("pool worker unwound from a panicking action");
        }
        self.inner.active_workers.fetch_sub(1, Ordering::AcqRel);
    }
}

fn worker_loop(inner: &PoolInner) {
    loop {
        if let Some(task) = inner.queue.pop() {
            if !task.cancel.is_disposed() {
                trace!("pool dispatch");
                (task.action)();
            }
            continue;
        }

        let mut timers = inner.timers.lock();
        let now = wall_now();
        let mut promoted = false;
        while timers.peek().is_some_and(|top| top.due <= now) {
            if let Some(timed) = timers.pop() {
                inner.queue.push(timed.task);
                promoted = true;
            }
        }
        if promoted || !inner.queue.is_empty() {
            continue;
        }
        if inner.shutdown.load(Ordering::Acquire) {
            break;
        }
        let wait = timers.peek().map_or(inner.idle_timeout, |top| {
            inner
                .idle_timeout
                .min(Duration::from_nanos(top.due.ticks_since(now)))
        });
        inner.wake.wait_for(&mut timers, wait);
    }
}
