//! Timestamped records and subscription windows.

use crate::error::Fault;
use crate::types::{Notification, Time};
use core::fmt;
use parking_lot::Mutex;

/// A value observed at a virtual time.
#[derive(Clone, PartialEq)]
pub struct Recorded<T> {
    /// When it was observed.
    pub time: Time,
    /// What was observed.
    pub value: T,
}

impl<T> Recorded<T> {
    /// Creates a record.
    #[must_use]
    pub fn new(time: impl Into<Time>, value: T) -> Self {
        Self {
            time: time.into(),
            value,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Recorded<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{}", self.value, self.time)
    }
}

/// The interval during which a test source was subscribed.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionWindow {
    /// When `subscribe` reached the source.
    pub subscribe: Time,
    /// When the subscription was disposed, if it has been.
    pub unsubscribe: Option<Time>,
}

impl fmt::Debug for SubscriptionWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.unsubscribe {
            Some(end) => write!(f, "({}, {})", self.subscribe, end),
            None => write!(f, "({}, open)", self.subscribe),
        }
    }
}

/// `Next(value)` at `time`.
#[must_use]
pub fn on_next<T>(time: u64, value: T) -> Recorded<Notification<T>> {
    Recorded::new(time, Notification::Next(value))
}

/// `Error(fault)` at `time`.
#[must_use]
pub fn on_error<T>(time: u64, fault: Fault) -> Recorded<Notification<T>> {
    Recorded::new(time, Notification::Error(fault))
}

/// `Completed` at `time`.
#[must_use]
pub fn on_completed<T>(time: u64) -> Recorded<Notification<T>> {
    Recorded::new(time, Notification::Completed)
}

/// A window from `subscribe` to `unsubscribe`.
#[must_use]
pub const fn subscribed(subscribe: u64, unsubscribe: u64) -> SubscriptionWindow {
    SubscriptionWindow {
        subscribe: Time::from_ticks(subscribe),
        unsubscribe: Some(Time::from_ticks(unsubscribe)),
    }
}

/// A window that was never disposed.
#[must_use]
pub const fn subscribed_open(subscribe: u64) -> SubscriptionWindow {
    SubscriptionWindow {
        subscribe: Time::from_ticks(subscribe),
        unsubscribe: None,
    }
}

/// Subscription windows recorded by a test source.
#[derive(Debug, Default)]
pub(crate) struct WindowLog {
    windows: Mutex<Vec<SubscriptionWindow>>,
}

impl WindowLog {
    /// Opens a window at `now`, returning its index.
    pub(crate) fn open(&self, now: Time) -> usize {
        let mut windows = self.windows.lock();
        windows.push(SubscriptionWindow {
            subscribe: now,
            unsubscribe: None,
        });
        windows.len() - 1
    }

    /// Closes the window at `index`.
    pub(crate) fn close(&self, index: usize, now: Time) {
        if let Some(window) = self.windows.lock().get_mut(index) {
            window.unsubscribe.get_or_insert(now);
        }
    }

    pub(crate) fn snapshot(&self) -> Vec<SubscriptionWindow> {
        self.windows.lock().clone()
    }
}
