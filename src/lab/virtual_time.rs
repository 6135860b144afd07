//! Virtual-time scheduler.
//!
//! Scheduled items live in a min-heap ordered by (due time, insertion
//! sequence), so items due at the same tick run in the order they were
//! scheduled. The clock only moves when a test drives it:
//!
//! ```text
//! advance_to(target):            Idle → Running
//!   while earliest pending item has due ≤ target:
//!     pop it; clock ← max(clock, item.due); run it
//!   clock ← max(clock, target)   Running → Idle
//! ```
//!
//! Items scheduled while the loop runs go into the same heap and are picked
//! up by the same loop if they are due. Cancellation is lazy: a cancelled
//! item stays in the heap and is skipped when popped.
//!
//! The scheduler lock is never held while an item runs, so actions may
//! schedule, cancel and read `now()` freely. Driving the clock from inside
//! an action is refused with [`ErrorKind::SchedulerBusy`].
//!
//! [`ErrorKind::SchedulerBusy`]: crate::error::ErrorKind::SchedulerBusy

use super::config::LabConfig;
use crate::disposable::Subscription;
use crate::error::{Error, Result};
use crate::scheduler::{Action, Scheduler, SchedulerRef};
use crate::tracing_compat::{debug, trace};
use crate::types::Time;
use parking_lot::Mutex;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};
use std::fmt;
use std::sync::{Arc, Weak};
use std::time::Duration;

struct Item {
    due: Time,
    seq: u64,
    action: Action,
}

impl Eq for Item {}

impl PartialEq for Item {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl Ord for Item {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap ordering: earliest due first, then lowest seq
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Item {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Whether a drive loop is currently running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockState {
    /// Nobody is driving the clock.
    Idle,
    /// A drive loop is executing items.
    Running,
}

struct State {
    clock: Time,
    heap: BinaryHeap<Item>,
    /// Sequence numbers of items still in the heap and not cancelled.
    live: HashSet<u64>,
    next_seq: u64,
    clock_state: ClockState,
}

struct Inner {
    state: Mutex<State>,
    config: LabConfig,
}

/// A deterministic scheduler driven by an integer virtual clock.
///
/// Cloning yields another handle to the same clock and queue.
#[derive(Clone)]
pub struct VirtualTimeScheduler {
    inner: Arc<Inner>,
}

/// Returns the clock to `Idle` when a drive loop exits, including by unwind.
struct RunGuard<'a> {
    inner: &'a Inner,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.inner.state.lock().clock_state = ClockState::Idle;
    }
}

impl Default for VirtualTimeScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl VirtualTimeScheduler {
    /// Creates a scheduler at time 0 with the default [`LabConfig`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(LabConfig::default())
    }

    /// Creates a scheduler whose clock starts at `tick`.
    #[must_use]
    pub fn starting_at(tick: u64) -> Self {
        let vts = Self::new();
        vts.inner.state.lock().clock = Time::from_ticks(tick);
        vts
    }

    /// Creates a scheduler with a custom configuration.
    #[must_use]
    pub fn with_config(config: LabConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State {
                    clock: Time::ZERO,
                    heap: BinaryHeap::new(),
                    live: HashSet::new(),
                    next_seq: 0,
                    clock_state: ClockState::Idle,
                }),
                config,
            }),
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &LabConfig {
        &self.inner.config
    }

    /// Returns this scheduler as a shared handle for operators.
    #[must_use]
    pub fn scheduler(&self) -> SchedulerRef {
        Arc::new(self.clone())
    }

    /// Returns the current virtual time.
    #[must_use]
    pub fn now(&self) -> Time {
        self.inner.state.lock().clock
    }

    /// Returns the number of scheduled, uncancelled items.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.inner.state.lock().live.len()
    }

    /// Returns true while a drive loop is executing.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.clock_state() == ClockState::Running
    }

    /// Returns the drive-loop state.
    #[must_use]
    pub fn clock_state(&self) -> ClockState {
        self.inner.state.lock().clock_state
    }

    /// Schedules `action` at an absolute virtual time.
    ///
    /// A time earlier than `now` runs at the next drive without moving the
    /// clock backwards.
    pub fn schedule_at(&self, due: u64, action: Action) -> Subscription {
        self.schedule_at_time(Time::from_ticks(due), action)
    }

    pub(crate) fn schedule_at_time(&self, due: Time, action: Action) -> Subscription {
        let seq = {
            let mut state = self.inner.state.lock();
            let seq = state.next_seq;
            state.next_seq += 1;
            state.heap.push(Item { due, seq, action });
            state.live.insert(seq);
            seq
        };
        let inner: Weak<Inner> = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = inner.upgrade() {
                inner.state.lock().live.remove(&seq);
            }
        })
    }

    /// Runs every item due at or before `target`, then sets the clock to
    /// `target`. Returns the number of items executed.
    ///
    /// A target earlier than `now` is a no-op.
    pub fn advance_to(&self, target: u64) -> Result<u64> {
        self.drive(Some(Time::from_ticks(target)))
    }

    /// Advances the clock by `delay` (one tick per nanosecond).
    pub fn advance_by(&self, delay: Duration) -> Result<u64> {
        let target = self.now() + delay;
        self.drive(Some(target))
    }

    /// Runs items until none are left.
    ///
    /// Fails with `StepLimitExceeded` if the configured step limit is hit,
    /// which is how a runaway periodic schedule shows up.
    pub fn run_to_end(&self) -> Result<u64> {
        self.drive(None)
    }

    /// Runs the single earliest pending item, if any.
    pub fn step(&self) -> Result<bool> {
        let _guard = self.enter()?;
        match self.pop_due(None) {
            Some(item) => {
                self.run_item(item);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn enter(&self) -> Result<RunGuard<'_>> {
        let mut state = self.inner.state.lock();
        if state.clock_state == ClockState::Running {
            return Err(Error::scheduler_busy());
        }
        state.clock_state = ClockState::Running;
        Ok(RunGuard { inner: &self.inner })
    }

    fn pop_due(&self, limit: Option<Time>) -> Option<Item> {
        let mut state = self.inner.state.lock();
        loop {
            let due = state.heap.peek()?.due;
            if limit.is_some_and(|limit| due > limit) {
                return None;
            }
            let item = state.heap.pop()?;
            if !state.live.remove(&item.seq) {
                continue;
            }
            if item.due > state.clock {
                state.clock = item.due;
            }
            return Some(item);
        }
    }

    fn run_item(&self, item: Item) {
        trace!(due = %item.due, seq = item.seq, "dispatching virtual-time item");
        (item.action)();
    }

    fn drive(&self, target: Option<Time>) -> Result<u64> {
        let _guard = self.enter()?;
        let start = self.now();
        if target.is_some_and(|target| target < start) {
            return Ok(0);
        }
        let mut executed = 0_u64;
        loop {
            if let Some(limit) = self.inner.config.max_steps {
                if executed >= limit && self.has_due(target) {
                    return Err(Error::step_limit_exceeded(limit));
                }
            }
            let Some(item) = self.pop_due(target) else {
                break;
            };
            self.run_item(item);
            executed += 1;
        }
        let end = {
            let mut state = self.inner.state.lock();
            if let Some(target) = target {
                if target > state.clock {
                    state.clock = target;
                }
            }
            state.clock
        };
        debug!(from = %start, to = %end, executed, "virtual clock advanced");
        Ok(executed)
    }

    fn has_due(&self, limit: Option<Time>) -> bool {
        let state = self.inner.state.lock();
        state
            .heap
            .iter()
            .any(|item| state.live.contains(&item.seq) && limit.map_or(true, |l| item.due <= l))
    }
}

impl Scheduler for VirtualTimeScheduler {
    fn now(&self) -> Time {
        Self::now(self)
    }

    fn schedule_after(&self, delay: Duration, action: Action) -> Subscription {
        let due = Self::now(self) + delay;
        self.schedule_at_time(due, action)
    }
}

impl fmt::Debug for VirtualTimeScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("VirtualTimeScheduler")
            .field("now", &state.clock)
            .field("pending", &state.live.len())
            .field("clock_state", &state.clock_state)
            .finish()
    }
}
