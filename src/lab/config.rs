//! Configuration for virtual-time test runs.
//!
//! The lab configuration controls the standard test timeline:
//! - When the source under test is created
//! - When the test observer subscribes
//! - When the subscription is disposed
//! - How many scheduled items a single drive call may run

use crate::types::Time;

/// Configuration for a [`VirtualTimeScheduler`](super::VirtualTimeScheduler).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabConfig {
    /// Virtual time at which `start` builds the source.
    pub created: Time,
    /// Virtual time at which `start` subscribes the test observer.
    pub subscribed: Time,
    /// Virtual time at which `start` disposes the subscription.
    pub disposed: Time,
    /// Maximum number of items one drive call may execute.
    ///
    /// `None` disables the limit.
    pub max_steps: Option<u64>,
}

impl LabConfig {
    /// Creates the standard timeline: 100 / 200 / 1000, 100k step limit.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            created: Time::from_ticks(100),
            subscribed: Time::from_ticks(200),
            disposed: Time::from_ticks(1000),
            max_steps: Some(100_000),
        }
    }

    /// Sets the creation time.
    #[must_use]
    pub const fn created(mut self, at: u64) -> Self {
        self.created = Time::from_ticks(at);
        self
    }

    /// Sets the subscription time.
    #[must_use]
    pub const fn subscribed(mut self, at: u64) -> Self {
        self.subscribed = Time::from_ticks(at);
        self
    }

    /// Sets the disposal time.
    #[must_use]
    pub const fn disposed(mut self, at: u64) -> Self {
        self.disposed = Time::from_ticks(at);
        self
    }

    /// Sets the maximum number of steps.
    #[must_use]
    pub const fn max_steps(mut self, steps: u64) -> Self {
        self.max_steps = Some(steps);
        self
    }

    /// Disables the step limit.
    #[must_use]
    pub const fn no_step_limit(mut self) -> Self {
        self.max_steps = None;
        self
    }
}

impl Default for LabConfig {
    fn default() -> Self {
        Self::new()
    }
}
