//! Synchronous scheduler.

use super::{Action, Scheduler};
use crate::disposable::Subscription;
use crate::types::Time;
use std::sync::OnceLock;
use std::time::{Duration, Instant};

static EPOCH: OnceLock<Instant> = OnceLock::new();

/// Wall-clock time since the first scheduler clock read in this process.
pub(crate) fn wall_now() -> Time {
    let epoch = *EPOCH.get_or_init(Instant::now);
    Time::from_ticks(Time::ticks_of(epoch.elapsed()))
}

/// Runs every action on the calling thread before `schedule` returns.
///
/// Delayed actions block the caller for the delay. Actions that schedule
/// more work nest on the stack; use [`TrampolineScheduler`] for chains of
/// rescheduling.
///
/// [`TrampolineScheduler`]: super::TrampolineScheduler
#[derive(Debug, Clone, Copy, Default)]
pub struct ImmediateScheduler;

impl ImmediateScheduler {
    /// Creates the scheduler.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Scheduler for ImmediateScheduler {
    fn now(&self) -> Time {
        wall_now()
    }

    fn schedule_after(&self, delay: Duration, action: Action) -> Subscription {
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
        action();
        Subscription::empty()
    }
}
