//! Schedulers: where and when work runs.
//!
//! A [`Scheduler`] runs a unit of work now or after a delay and returns a
//! [`Subscription`] that cancels the work if it has not started. Cancelling
//! concurrently with execution may race, but never re-runs an action.
//!
//! | Scheduler | Context | Re-entrant `schedule` |
//! |---|---|---|
//! | [`ImmediateScheduler`] | caller's thread, synchronously | runs nested |
//! | [`TrampolineScheduler`] | caller's thread | queued, drained by the outermost call |
//! | [`PoolScheduler`] | worker threads | unordered across callers |
//! | [`VirtualTimeScheduler`](crate::lab::VirtualTimeScheduler) | whoever drives the clock | queued by due time |
//!
//! There is no process-wide default. Operators that need time take a
//! [`SchedulerRef`] from the caller.

pub mod config;
pub mod immediate;
pub mod pool;
pub mod trampoline;

pub use config::PoolConfig;
pub use immediate::ImmediateScheduler;
pub use pool::PoolScheduler;
pub use trampoline::TrampolineScheduler;

use crate::disposable::{SerialDisposable, Subscription};
use crate::types::Time;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// A unit of scheduled work.
pub type Action = Box<dyn FnOnce() + Send + 'static>;

/// An execution context with a clock.
pub trait Scheduler: Send + Sync {
    /// Returns the scheduler's current time.
    fn now(&self) -> Time;

    /// Runs `action` as soon as possible.
    fn schedule(&self, action: Action) -> Subscription {
        self.schedule_after(Duration::ZERO, action)
    }

    /// Runs `action` once `delay` has elapsed on this scheduler's clock.
    fn schedule_after(&self, delay: Duration, action: Action) -> Subscription;
}

/// A shared scheduler handle.
pub type SchedulerRef = Arc<dyn Scheduler>;

/// Lets a recursively scheduled action request another run.
#[derive(Debug, Default)]
pub struct Recurse {
    next: Option<Duration>,
}

impl Recurse {
    /// Runs the action again as soon as possible.
    pub fn again(&mut self) {
        self.next = Some(Duration::ZERO);
    }

    /// Runs the action again after `delay`.
    pub fn again_after(&mut self, delay: Duration) {
        self.next = Some(delay);
    }
}

struct RecursiveState<F> {
    action: Mutex<F>,
    // Bumped each time a run starts; a handle returned by `schedule_after`
    // is stored only if its run has not started yet.
    generation: Mutex<u64>,
    slot: SerialDisposable,
}

/// Schedules `action` after `delay`, and again each time it calls
/// [`Recurse::again`] / [`Recurse::again_after`].
///
/// Disposing the returned handle cancels whichever run is pending.
pub fn schedule_recursive<F>(scheduler: &SchedulerRef, delay: Duration, action: F) -> Subscription
where
    F: FnMut(&mut Recurse) + Send + 'static,
{
    let state = Arc::new(RecursiveState {
        action: Mutex::new(action),
        generation: Mutex::new(0),
        slot: SerialDisposable::new(),
    });
    schedule_step(scheduler, &state, delay);
    let handle = Arc::clone(&state);
    Subscription::new(move || handle.slot.dispose())
}

fn schedule_step<F>(scheduler: &SchedulerRef, state: &Arc<RecursiveState<F>>, delay: Duration)
where
    F: FnMut(&mut Recurse) + Send + 'static,
{
    let generation = *state.generation.lock();
    let run_state = Arc::clone(state);
    let run_scheduler = Arc::clone(scheduler);
    let pending = scheduler.schedule_after(
        delay,
        Box::new(move || {
            *run_state.generation.lock() += 1;
            if run_state.slot.is_disposed() {
                return;
            }
            let mut recurse = Recurse::default();
            (run_state.action.lock())(&mut recurse);
            if let Some(next) = recurse.next {
                schedule_step(&run_scheduler, &run_state, next);
            }
        }),
    );
    let current = state.generation.lock();
    if *current == generation {
        state.slot.set(pending);
    }
}
