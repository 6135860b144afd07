//! Single-source value transforms.
//!
//! A fallible selector or predicate that returns `Err` ends the output with
//! that fault; the upstream subscription is released by the downstream sink
//! as part of delivering the terminal.

use crate::disposable::Subscription;
use crate::error::Fault;
use crate::observable::{Observable, Seq};
use crate::observer::{Observer, Sink};
use std::sync::Arc;

struct TryMap<T, F> {
    source: Seq<T>,
    selector: Arc<F>,
}

impl<T, U, F> Observable<U> for TryMap<T, F>
where
    T: Send + 'static,
    U: Send + 'static,
    F: Fn(T) -> Result<U, Fault> + Send + Sync + 'static,
{
    fn subscribe_core(&self, sink: Arc<Sink<U>>) -> Subscription {
        self.source.subscribe(MapObserver {
            sink,
            selector: Arc::clone(&self.selector),
        })
    }
}

struct MapObserver<U, F> {
    sink: Arc<Sink<U>>,
    selector: Arc<F>,
}

impl<T, U, F> Observer<T> for MapObserver<U, F>
where
    U: Send + 'static,
    F: Fn(T) -> Result<U, Fault> + Send + Sync + 'static,
{
    fn on_next(&mut self, value: T) {
        if self.sink.is_stopped() {
            return;
        }
        match (self.selector)(value) {
            Ok(mapped) => self.sink.next(mapped),
            Err(fault) => self.sink.error(fault),
        }
    }

    fn on_error(&mut self, fault: Fault) {
        self.sink.error(fault);
    }

    fn on_completed(&mut self) {
        self.sink.completed();
    }
}

struct TryFilter<T, P> {
    source: Seq<T>,
    predicate: Arc<P>,
}

impl<T, P> Observable<T> for TryFilter<T, P>
where
    T: Send + 'static,
    P: Fn(&T) -> Result<bool, Fault> + Send + Sync + 'static,
{
    fn subscribe_core(&self, sink: Arc<Sink<T>>) -> Subscription {
        self.source.subscribe(FilterObserver {
            sink,
            predicate: Arc::clone(&self.predicate),
        })
    }
}

struct FilterObserver<T, P> {
    sink: Arc<Sink<T>>,
    predicate: Arc<P>,
}

impl<T, P> Observer<T> for FilterObserver<T, P>
where
    T: Send + 'static,
    P: Fn(&T) -> Result<bool, Fault> + Send + Sync + 'static,
{
    fn on_next(&mut self, value: T) {
        if self.sink.is_stopped() {
            return;
        }
        match (self.predicate)(&value) {
            Ok(true) => self.sink.next(value),
            Ok(false) => {}
            Err(fault) => self.sink.error(fault),
        }
    }

    fn on_error(&mut self, fault: Fault) {
        self.sink.error(fault);
    }

    fn on_completed(&mut self) {
        self.sink.completed();
    }
}

impl<T: Send + 'static> Seq<T> {
    /// Transforms every value.
    #[must_use]
    pub fn map<U, F>(&self, selector: F) -> Seq<U>
    where
        U: Send + 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        self.try_map(move |value| Ok(selector(value)))
    }

    /// Transforms every value; an `Err` ends the sequence with that fault.
    #[must_use]
    pub fn try_map<U, F>(&self, selector: F) -> Seq<U>
    where
        U: Send + 'static,
        F: Fn(T) -> Result<U, Fault> + Send + Sync + 'static,
    {
        Seq::new(TryMap {
            source: self.clone(),
            selector: Arc::new(selector),
        })
    }

    /// Keeps the values matching `predicate`.
    #[must_use]
    pub fn filter<P>(&self, predicate: P) -> Self
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.try_filter(move |value: &T| Ok(predicate(value)))
    }

    /// Keeps the values matching `predicate`; an `Err` ends the sequence with
    /// that fault.
    #[must_use]
    pub fn try_filter<P>(&self, predicate: P) -> Self
    where
        P: Fn(&T) -> Result<bool, Fault> + Send + Sync + 'static,
    {
        Self::new(TryFilter {
            source: self.clone(),
            predicate: Arc::new(predicate),
        })
    }

    /// Maps every value to a sequence and merges them.
    #[must_use]
    pub fn flat_map<U, F>(&self, selector: F) -> Seq<U>
    where
        U: Send + 'static,
        F: Fn(T) -> Seq<U> + Send + Sync + 'static,
    {
        self.map(selector).merge_all()
    }

    /// Maps every value to a sequence and follows only the latest one.
    #[must_use]
    pub fn switch_map<U, F>(&self, selector: F) -> Seq<U>
    where
        U: Send + 'static,
        F: Fn(T) -> Seq<U> + Send + Sync + 'static,
    {
        self.map(selector).switch_latest()
    }
}
