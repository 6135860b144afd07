//! Hot test source.

use super::recorded::{Recorded, SubscriptionWindow, WindowLog};
use super::VirtualTimeScheduler;
use crate::disposable::Subscription;
use crate::observable::{Observable, Seq};
use crate::observer::Sink;
use crate::types::Notification;
use parking_lot::Mutex;
use std::sync::Arc;

struct HotInner<T> {
    vts: VirtualTimeScheduler,
    observers: Mutex<Vec<(u64, Arc<Sink<T>>)>>,
    next_id: Mutex<u64>,
    windows: WindowLog,
}

impl<T: Clone + Send + 'static> HotInner<T> {
    fn broadcast(&self, notification: &Notification<T>) {
        let targets: Vec<Arc<Sink<T>>> = self
            .observers
            .lock()
            .iter()
            .map(|(_, sink)| Arc::clone(sink))
            .collect();
        for sink in targets {
            sink.emit(notification.clone());
        }
    }
}

/// A shared source whose notifications fire at absolute virtual times,
/// whether or not anyone is subscribed.
///
/// Each subscription is recorded as a [`SubscriptionWindow`].
pub struct HotObservable<T> {
    inner: Arc<HotInner<T>>,
}

impl<T> Clone for HotObservable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> HotObservable<T> {
    pub(crate) fn new(vts: &VirtualTimeScheduler, messages: Vec<Recorded<Notification<T>>>) -> Self {
        let inner = Arc::new(HotInner {
            vts: vts.clone(),
            observers: Mutex::new(Vec::new()),
            next_id: Mutex::new(0),
            windows: WindowLog::default(),
        });
        for message in messages {
            let target = Arc::clone(&inner);
            let notification = message.value;
            vts.schedule_at_time(
                message.time,
                Box::new(move || target.broadcast(&notification)),
            );
        }
        Self { inner }
    }

    /// Returns every subscription window recorded so far.
    #[must_use]
    pub fn subscriptions(&self) -> Vec<SubscriptionWindow> {
        self.inner.windows.snapshot()
    }

    /// Returns this source as a sequence.
    #[must_use]
    pub fn seq(&self) -> Seq<T> {
        Seq::new(self.clone())
    }
}

impl<T: Clone + Send + Sync + 'static> Observable<T> for HotObservable<T> {
    fn subscribe_core(&self, sink: Arc<Sink<T>>) -> Subscription {
        let window = self.inner.windows.open(self.inner.vts.now());
        let id = {
            let mut next = self.inner.next_id.lock();
            *next += 1;
            *next
        };
        self.inner.observers.lock().push((id, sink));
        let inner = Arc::clone(&self.inner);
        Subscription::new(move || {
            inner.observers.lock().retain(|(other, _)| *other != id);
            inner.windows.close(window, inner.vts.now());
        })
    }
}
