//! Conversion between a live sequence and a sequence of notifications.

use crate::disposable::Subscription;
use crate::error::Fault;
use crate::observable::{Observable, Seq};
use crate::observer::{Observer, Sink};
use crate::types::Notification;
use std::sync::Arc;

struct Materialize<T> {
    source: Seq<T>,
}

impl<T: Send + 'static> Observable<Notification<T>> for Materialize<T> {
    fn subscribe_core(&self, sink: Arc<Sink<Notification<T>>>) -> Subscription {
        self.source.subscribe(MaterializeObserver { sink })
    }
}

struct MaterializeObserver<T> {
    sink: Arc<Sink<Notification<T>>>,
}

impl<T: Send + 'static> Observer<T> for MaterializeObserver<T> {
    fn on_next(&mut self, value: T) {
        self.sink.next(Notification::Next(value));
    }

    fn on_error(&mut self, fault: Fault) {
        self.sink.next(Notification::Error(fault));
        self.sink.completed();
    }

    fn on_completed(&mut self) {
        self.sink.next(Notification::Completed);
        self.sink.completed();
    }
}

struct Dematerialize<T> {
    source: Seq<Notification<T>>,
}

impl<T: Send + 'static> Observable<T> for Dematerialize<T> {
    fn subscribe_core(&self, sink: Arc<Sink<T>>) -> Subscription {
        self.source.subscribe(DematerializeObserver { sink })
    }
}

struct DematerializeObserver<T> {
    sink: Arc<Sink<T>>,
}

impl<T: Send + 'static> Observer<Notification<T>> for DematerializeObserver<T> {
    fn on_next(&mut self, notification: Notification<T>) {
        self.sink.emit(notification);
    }

    fn on_error(&mut self, fault: Fault) {
        self.sink.error(fault);
    }

    fn on_completed(&mut self) {
        self.sink.completed();
    }
}

impl<T: Send + 'static> Seq<T> {
    /// Turns every notification, terminals included, into a value. The
    /// result completes right after the source's terminal notification.
    #[must_use]
    pub fn materialize(&self) -> Seq<Notification<T>> {
        Seq::new(Materialize {
            source: self.clone(),
        })
    }
}

impl<T: Send + 'static> Seq<Notification<T>> {
    /// Replays notification values as live notifications. A terminal
    /// notification value ends the sequence.
    #[must_use]
    pub fn dematerialize(&self) -> Seq<T> {
        Seq::new(Dematerialize {
            source: self.clone(),
        })
    }
}
