//! Moving delivery and subscription onto a scheduler.
//!
//! ```text
//! observe_on(s):   upstream notification ─► queue.push; if no drain pending: schedule drain
//!                  drain (on s)          ─► pop and deliver until the queue is empty
//! subscribe_on(s): subscribe             ─► schedule(upstream subscribe)
//!                  dispose               ─► cancel pending subscribe; schedule(upstream dispose)
//! ```
//!
//! `observe_on` keeps at most one drain action pending, so notifications are
//! delivered in upstream order even on an unordered pool.

use crate::disposable::{SerialDisposable, SingleAssignmentDisposable, Subscription};
use crate::error::Fault;
use crate::observable::{Observable, Seq};
use crate::observer::{Observer, Sink};
use crate::scheduler::SchedulerRef;
use crate::types::Notification;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

struct Mailbox<T> {
    queue: VecDeque<Notification<T>>,
    draining: bool,
    epoch: u64,
}

struct ObserveOnShared<T> {
    sink: Arc<Sink<T>>,
    scheduler: SchedulerRef,
    mailbox: Mutex<Mailbox<T>>,
    pending: SerialDisposable,
}

impl<T: Send + 'static> ObserveOnShared<T> {
    fn push(self: &Arc<Self>, notification: Notification<T>) {
        let epoch = {
            let mut mailbox = self.mailbox.lock();
            mailbox.queue.push_back(notification);
            if mailbox.draining {
                return;
            }
            mailbox.draining = true;
            mailbox.epoch += 1;
            mailbox.epoch
        };
        let this = Arc::clone(self);
        let handle = self.scheduler.schedule(Box::new(move || this.drain()));
        // store the handle only while that drain is still the pending one
        let mailbox = self.mailbox.lock();
        if mailbox.draining && mailbox.epoch == epoch {
            self.pending.set(handle);
        }
    }

    fn drain(&self) {
        loop {
            let next = {
                let mut mailbox = self.mailbox.lock();
                let next = mailbox.queue.pop_front();
                if next.is_none() || self.sink.is_stopped() {
                    mailbox.queue.clear();
                    mailbox.draining = false;
                    return;
                }
                next
            };
            if let Some(notification) = next {
                self.sink.emit(notification);
            }
        }
    }

    fn dispose(&self) {
        self.pending.dispose();
        self.mailbox.lock().queue.clear();
    }
}

struct ObserveOn<T> {
    source: Seq<T>,
    scheduler: SchedulerRef,
}

impl<T: Send + 'static> Observable<T> for ObserveOn<T> {
    fn subscribe_core(&self, sink: Arc<Sink<T>>) -> Subscription {
        let shared = Arc::new(ObserveOnShared {
            sink,
            scheduler: Arc::clone(&self.scheduler),
            mailbox: Mutex::new(Mailbox {
                queue: VecDeque::new(),
                draining: false,
                epoch: 0,
            }),
            pending: SerialDisposable::new(),
        });
        let upstream = self.source.subscribe(ObserveOnObserver {
            shared: Arc::clone(&shared),
        });
        Subscription::new(move || {
            upstream.dispose();
            shared.dispose();
        })
    }
}

struct ObserveOnObserver<T> {
    shared: Arc<ObserveOnShared<T>>,
}

impl<T: Send + 'static> Observer<T> for ObserveOnObserver<T> {
    fn on_next(&mut self, value: T) {
        self.shared.push(Notification::Next(value));
    }

    fn on_error(&mut self, fault: Fault) {
        self.shared.push(Notification::Error(fault));
    }

    fn on_completed(&mut self) {
        self.shared.push(Notification::Completed);
    }
}

struct SubscribeOn<T> {
    source: Seq<T>,
    scheduler: SchedulerRef,
}

impl<T: Send + 'static> Observable<T> for SubscribeOn<T> {
    fn subscribe_core(&self, sink: Arc<Sink<T>>) -> Subscription {
        let upstream = Arc::new(SingleAssignmentDisposable::new());
        let source = self.source.clone();
        let slot = Arc::clone(&upstream);
        let pending = self.scheduler.schedule(Box::new(move || {
            if sink.is_stopped() {
                return;
            }
            let _ = slot.set(source.producer().subscribe_core(sink));
        }));
        let scheduler = Arc::clone(&self.scheduler);
        Subscription::new(move || {
            pending.dispose();
            scheduler.schedule(Box::new(move || upstream.dispose()));
        })
    }
}

impl<T: Send + 'static> Seq<T> {
    /// Re-delivers every notification as work on `scheduler`, in upstream
    /// order. Disposal drops notifications that have not been delivered yet.
    #[must_use]
    pub fn observe_on(&self, scheduler: &SchedulerRef) -> Self {
        Self::new(ObserveOn {
            source: self.clone(),
            scheduler: Arc::clone(scheduler),
        })
    }

    /// Performs the upstream subscribe, and later its disposal, as work on
    /// `scheduler`.
    #[must_use]
    pub fn subscribe_on(&self, scheduler: &SchedulerRef) -> Self {
        Self::new(SubscribeOn {
            source: self.clone(),
            scheduler: Arc::clone(scheduler),
        })
    }
}
