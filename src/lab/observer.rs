//! Recording observer.

use super::recorded::Recorded;
use super::VirtualTimeScheduler;
use crate::error::Fault;
use crate::observer::Observer;
use crate::types::Notification;
use parking_lot::Mutex;
use std::sync::Arc;

/// Records every notification with the virtual time it arrived at.
///
/// Clones share one log, so a clone can be subscribed while the original is
/// kept for assertions.
pub struct TestObserver<T> {
    vts: VirtualTimeScheduler,
    log: Arc<Mutex<Vec<Recorded<Notification<T>>>>>,
}

impl<T> Clone for TestObserver<T> {
    fn clone(&self) -> Self {
        Self {
            vts: self.vts.clone(),
            log: Arc::clone(&self.log),
        }
    }
}

impl<T> TestObserver<T> {
    pub(crate) fn new(vts: &VirtualTimeScheduler) -> Self {
        Self {
            vts: vts.clone(),
            log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn record(&self, notification: Notification<T>) {
        let time = self.vts.now();
        self.log.lock().push(Recorded {
            time,
            value: notification,
        });
    }
}

impl<T: Clone> TestObserver<T> {
    /// Returns the recorded notifications in arrival order.
    #[must_use]
    pub fn messages(&self) -> Vec<Recorded<Notification<T>>> {
        self.log.lock().clone()
    }

    /// Returns only the recorded values.
    #[must_use]
    pub fn values(&self) -> Vec<T> {
        self.log
            .lock()
            .iter()
            .filter_map(|r| r.value.value().cloned())
            .collect()
    }
}

impl<T: Send + 'static> Observer<T> for TestObserver<T> {
    fn on_next(&mut self, value: T) {
        self.record(Notification::Next(value));
    }

    fn on_error(&mut self, fault: Fault) {
        self.record(Notification::Error(fault));
    }

    fn on_completed(&mut self) {
        self.record(Notification::Completed);
    }
}
