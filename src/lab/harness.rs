//! Standard virtual-time test timeline.
//!
//! ```text
//! created (100)     build the source under test
//! subscribed (200)  subscribe a TestObserver
//! disposed (1000)   dispose that subscription
//! then run the clock to the end
//! ```

use super::cold::ColdObservable;
use super::hot::HotObservable;
use super::observer::TestObserver;
use super::recorded::Recorded;
use super::VirtualTimeScheduler;
use crate::disposable::Subscription;
use crate::error::Result;
use crate::observable::Seq;
use crate::types::{Notification, Time};
use parking_lot::Mutex;
use std::sync::Arc;

impl VirtualTimeScheduler {
    /// Creates a hot source firing `messages` at their absolute times.
    #[must_use]
    pub fn create_hot_observable<T>(&self, messages: Vec<Recorded<Notification<T>>>) -> HotObservable<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        HotObservable::new(self, messages)
    }

    /// Creates a cold source replaying `messages` relative to each subscription.
    #[must_use]
    pub fn create_cold_observable<T>(&self, messages: Vec<Recorded<Notification<T>>>) -> ColdObservable<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        ColdObservable::new(self, messages)
    }

    /// Creates a recording observer on this clock.
    #[must_use]
    pub fn create_observer<T>(&self) -> TestObserver<T> {
        TestObserver::new(self)
    }

    /// Runs the configured timeline (default 100 / 200 / 1000) against the
    /// source returned by `create`, and returns what the observer recorded.
    pub fn start<T, F>(&self, create: F) -> Result<TestObserver<T>>
    where
        T: Send + 'static,
        F: FnOnce() -> Seq<T> + Send + 'static,
    {
        let config = *self.config();
        self.start_with(
            config.created.ticks(),
            config.subscribed.ticks(),
            config.disposed.ticks(),
            create,
        )
    }

    /// Runs a custom timeline.
    pub fn start_with<T, F>(
        &self,
        created: u64,
        subscribed: u64,
        disposed: u64,
        create: F,
    ) -> Result<TestObserver<T>>
    where
        T: Send + 'static,
        F: FnOnce() -> Seq<T> + Send + 'static,
    {
        let observer = self.create_observer::<T>();
        let source: Arc<Mutex<Option<Seq<T>>>> = Arc::new(Mutex::new(None));
        let subscription: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));

        let created_slot = Arc::clone(&source);
        self.schedule_at_time(
            Time::from_ticks(created),
            Box::new(move || {
                let seq = create();
                *created_slot.lock() = Some(seq);
            }),
        );

        let subscribe_slot = Arc::clone(&subscription);
        let recorder = observer.clone();
        self.schedule_at_time(
            Time::from_ticks(subscribed),
            Box::new(move || {
                let seq = source.lock().take();
                if let Some(seq) = seq {
                    let sub = seq.subscribe(recorder);
                    *subscribe_slot.lock() = Some(sub);
                }
            }),
        );

        self.schedule_at_time(
            Time::from_ticks(disposed),
            Box::new(move || {
                let sub = subscription.lock().take();
                if let Some(sub) = sub {
                    sub.dispose();
                }
            }),
        );

        self.run_to_end()?;
        Ok(observer)
    }
}
