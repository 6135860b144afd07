//! Cold test source.

use super::recorded::{Recorded, SubscriptionWindow, WindowLog};
use super::VirtualTimeScheduler;
use crate::disposable::{CompositeDisposable, Subscription};
use crate::observable::{Observable, Seq};
use crate::observer::Sink;
use crate::scheduler::Scheduler;
use crate::types::Notification;
use std::sync::Arc;
use std::time::Duration;

struct ColdInner<T> {
    vts: VirtualTimeScheduler,
    messages: Vec<Recorded<Notification<T>>>,
    windows: WindowLog,
}

/// A source that replays its notifications for each subscriber, at times
/// relative to that subscription.
///
/// Each subscription is recorded as a [`SubscriptionWindow`].
pub struct ColdObservable<T> {
    inner: Arc<ColdInner<T>>,
}

impl<T> Clone for ColdObservable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> ColdObservable<T> {
    pub(crate) fn new(vts: &VirtualTimeScheduler, messages: Vec<Recorded<Notification<T>>>) -> Self {
        Self {
            inner: Arc::new(ColdInner {
                vts: vts.clone(),
                messages,
                windows: WindowLog::default(),
            }),
        }
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

impl<T: Clone + Send + Sync + 'static> Observable<T> for ColdObservable<T> {
    fn subscribe_core(&self, sink: Arc<Sink<T>>) -> Subscription {
        let window = self.inner.windows.open(self.inner.vts.now());
        let scheduled = Arc::new(CompositeDisposable::new());
        for message in &self.inner.messages {
            let target = Arc::clone(&sink);
            let notification = message.value.clone();
            let delay = Duration::from_nanos(message.time.ticks());
            scheduled.add(self.inner.vts.schedule_after(
                delay,
                Box::new(move || target.emit(notification)),
            ));
        }
        let inner = Arc::clone(&self.inner);
        Subscription::new(move || {
            scheduled.dispose();
            inner.windows.close(window, inner.vts.now());
        })
    }
}
