//! Non-combinatorial producers.
//!
//! These hold no per-subscription state machine: each subscription replays
//! the same values synchronously, or ticks on a scheduler. Synchronous
//! producers check [`Sink::is_stopped`] before every value so that disposing
//! from inside an observer callback ends the loop.

use super::{Observable, Seq};
use crate::disposable::Subscription;
use crate::error::Fault;
use crate::observer::Sink;
use crate::scheduler::{schedule_recursive, SchedulerRef};
use std::sync::Arc;
use std::time::Duration;

struct Empty;

impl<T: Send + 'static> Observable<T> for Empty {
    fn subscribe_core(&self, sink: Arc<Sink<T>>) -> Subscription {
        sink.completed();
        Subscription::empty()
    }
}

struct Never;

impl<T: Send + 'static> Observable<T> for Never {
    fn subscribe_core(&self, _sink: Arc<Sink<T>>) -> Subscription {
        Subscription::empty()
    }
}

struct Throw(Fault);

impl<T: Send + 'static> Observable<T> for Throw {
    fn subscribe_core(&self, sink: Arc<Sink<T>>) -> Subscription {
        sink.error(self.0.clone());
        Subscription::empty()
    }
}

struct FromIter<I>(I);

impl<I> Observable<I::Item> for FromIter<I>
where
    I: IntoIterator + Clone + Send + Sync + 'static,
    I::Item: Send + 'static,
{
    fn subscribe_core(&self, sink: Arc<Sink<I::Item>>) -> Subscription {
        for value in self.0.clone() {
            if sink.is_stopped() {
                return Subscription::empty();
            }
            sink.next(value);
        }
        sink.completed();
        Subscription::empty()
    }
}

struct Generate<S, C, I, F> {
    initial: S,
    condition: C,
    iterate: I,
    select: F,
}

impl<T, S, C, I, F> Observable<T> for Generate<S, C, I, F>
where
    T: Send + 'static,
    S: Clone + Send + Sync + 'static,
    C: Fn(&S) -> bool + Send + Sync + 'static,
    I: Fn(&S) -> S + Send + Sync + 'static,
    F: Fn(&S) -> T + Send + Sync + 'static,
{
    fn subscribe_core(&self, sink: Arc<Sink<T>>) -> Subscription {
        let mut state = self.initial.clone();
        while (self.condition)(&state) {
            if sink.is_stopped() {
                return Subscription::empty();
            }
            sink.next((self.select)(&state));
            state = (self.iterate)(&state);
        }
        sink.completed();
        Subscription::empty()
    }
}

struct Ticks {
    due: Duration,
    period: Option<Duration>,
    scheduler: SchedulerRef,
}

impl Observable<u64> for Ticks {
    fn subscribe_core(&self, sink: Arc<Sink<u64>>) -> Subscription {
        let period = self.period;
        let mut tick = 0_u64;
        schedule_recursive(&self.scheduler, self.due, move |recurse| {
            if sink.is_stopped() {
                return;
            }
            sink.next(tick);
            tick += 1;
            match period {
                Some(period) => recurse.again_after(period),
                None => sink.completed(),
            }
        })
    }
}

impl<T: Send + 'static> Seq<T> {
    /// A sequence that completes immediately.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(Empty)
    }

    /// A sequence that never emits anything.
    #[must_use]
    pub fn never() -> Self {
        Self::new(Never)
    }

    /// A sequence that fails immediately with `fault`.
    #[must_use]
    pub fn throw(fault: Fault) -> Self {
        Self::new(Throw(fault))
    }

    /// A sequence replaying `values` for each subscriber, then completing.
    #[must_use]
    pub fn from_iter<I>(values: I) -> Self
    where
        I: IntoIterator<Item = T> + Clone + Send + Sync + 'static,
    {
        Self::new(FromIter(values))
    }

    /// Classic state-machine generator: emits `select(s)` while
    /// `condition(s)` holds, advancing with `iterate`.
    #[must_use]
    pub fn generate<S, C, I, F>(initial: S, condition: C, iterate: I, select: F) -> Self
    where
        S: Clone + Send + Sync + 'static,
        C: Fn(&S) -> bool + Send + Sync + 'static,
        I: Fn(&S) -> S + Send + Sync + 'static,
        F: Fn(&S) -> T + Send + Sync + 'static,
    {
        Self::new(Generate {
            initial,
            condition,
            iterate,
            select,
        })
    }
}

impl<T: Clone + Send + Sync + 'static> Seq<T> {
    /// A sequence of one value.
    #[must_use]
    pub fn just(value: T) -> Self {
        Self::from_iter([value])
    }
}

impl Seq<i64> {
    /// `count` consecutive integers starting at `start`.
    #[must_use]
    pub fn range(start: i64, count: usize) -> Self {
        Self::generate(
            (start, 0_usize),
            move |&(_, emitted)| emitted < count,
            |&(value, emitted)| (value.wrapping_add(1), emitted + 1),
            |&(value, _)| value,
        )
    }
}

impl Seq<u64> {
    /// Emits `0` after `due` on `scheduler`, then completes.
    #[must_use]
    pub fn timer(due: Duration, scheduler: &SchedulerRef) -> Self {
        Self::new(Ticks {
            due,
            period: None,
            scheduler: Arc::clone(scheduler),
        })
    }

    /// Emits `0, 1, 2, ...` every `period` on `scheduler`. Never completes.
    #[must_use]
    pub fn interval(period: Duration, scheduler: &SchedulerRef) -> Self {
        Self::new(Ticks {
            due: period,
            period: Some(period),
            scheduler: Arc::clone(scheduler),
        })
    }
}
