//! Zip: combine the n-th value of every source.
//!
//! ```text
//! zip(s0..sk):
//!   next(i, v)   ─► queue[i].push(v)
//!                   if every queue is non-empty: emit [queue[0].pop(), .., queue[k].pop()]
//!   completed(i) ─► done[i] ← true
//!   complete as soon as some done[i] has an empty queue[i]
//!   error        ─► dispose all, then error
//! ```
//!
//! Completion is checked when a source completes and again after every
//! emitted tuple, so the result completes at the earliest time no further
//! tuple can form.

use super::{Gate, Pair};
use crate::disposable::{SingleAssignmentDisposable, Subscription};
use crate::error::{Error, Fault};
use crate::observable::{Observable, Seq};
use crate::observer::{Observer, Sink};
use crate::tracing_compat::trace;
use std::collections::VecDeque;
use std::sync::Arc;

struct ZipState<T> {
    queues: Vec<VecDeque<T>>,
    completed: Vec<bool>,
    done: bool,
}

impl<T> ZipState<T> {
    fn exhausted(&self) -> bool {
        self.queues
            .iter()
            .zip(&self.completed)
            .any(|(queue, completed)| *completed && queue.is_empty())
    }
}

struct Shared<T> {
    sink: Arc<Sink<Vec<T>>>,
    gate: Gate<ZipState<T>>,
    slots: Vec<SingleAssignmentDisposable>,
}

impl<T: Send + 'static> Shared<T> {
    fn dispose_all(&self) {
        for slot in &self.slots {
            slot.dispose();
        }
    }

    fn on_next(&self, index: usize, value: T) {
        let held = self.gate.enter();
        let (tuple, finished) = {
            let mut state = held.borrow_mut();
            if state.done {
                return;
            }
            state.queues[index].push_back(value);
            if state.queues.iter().any(VecDeque::is_empty) {
                return;
            }
            let tuple: Vec<T> = state
                .queues
                .iter_mut()
                .filter_map(VecDeque::pop_front)
                .collect();
            state.done = state.exhausted();
            (tuple, state.done)
        };
        if finished {
            self.dispose_all();
        }
        self.sink.next(tuple);
        if finished {
            trace!(operator = "zip", "zip exhausted after tuple");
            self.sink.completed();
        }
    }

    fn on_error(&self, fault: Fault) {
        let held = self.gate.enter();
        {
            let mut state = held.borrow_mut();
            if state.done {
                return;
            }
            state.done = true;
        }
        self.dispose_all();
        self.sink.error(fault);
    }

    fn on_completed(&self, index: usize) {
        let held = self.gate.enter();
        {
            let mut state = held.borrow_mut();
            if state.done {
                return;
            }
            state.completed[index] = true;
            if !state.exhausted() {
                return;
            }
            state.done = true;
        }
        self.dispose_all();
        trace!(operator = "zip", source = index, "zip exhausted");
        self.sink.completed();
    }
}

struct Zip<T> {
    sources: Arc<[Seq<T>]>,
}

impl<T: Send + 'static> Observable<Vec<T>> for Zip<T> {
    fn subscribe_core(&self, sink: Arc<Sink<Vec<T>>>) -> Subscription {
        let count = self.sources.len();
        if count == 0 {
            sink.completed();
            return Subscription::empty();
        }
        let shared = Arc::new(Shared {
            sink,
            gate: Gate::new(ZipState {
                queues: (0..count).map(|_| VecDeque::new()).collect(),
                completed: vec![false; count],
                done: false,
            }),
            slots: (0..count)
                .map(|_| SingleAssignmentDisposable::new())
                .collect(),
        });
        for (index, source) in self.sources.iter().enumerate() {
            let sub = source.subscribe(ZipObserver {
                shared: Arc::clone(&shared),
                index,
            });
            let _ = shared.slots[index].set(sub);
        }
        Subscription::new(move || shared.dispose_all())
    }
}

struct ZipObserver<T> {
    shared: Arc<Shared<T>>,
    index: usize,
}

impl<T: Send + 'static> Observer<T> for ZipObserver<T> {
    fn on_next(&mut self, value: T) {
        self.shared.on_next(self.index, value);
    }

    fn on_error(&mut self, fault: Fault) {
        self.shared.on_error(fault);
    }

    fn on_completed(&mut self) {
        self.shared.on_completed(self.index);
    }
}

impl<T: Send + 'static> Seq<T> {
    /// Zips any number of sources into vectors, one element per source in
    /// source order.
    ///
    /// An empty list completes immediately.
    #[must_use]
    pub fn zip_all<I>(sources: I) -> Seq<Vec<T>>
    where
        I: IntoIterator<Item = Self>,
    {
        Seq::new(Zip {
            sources: sources.into_iter().collect(),
        })
    }

    /// Pairs this sequence with `other` through `combine`.
    #[must_use]
    pub fn zip_with<U, R, F>(&self, other: &Seq<U>, combine: F) -> Seq<R>
    where
        U: Send + 'static,
        R: Send + 'static,
        F: Fn(T, U) -> R + Send + Sync + 'static,
    {
        self.try_zip_with(other, move |a, b| Ok(combine(a, b)))
    }

    /// Pairs this sequence with `other` through a fallible `combine`; an
    /// `Err` releases both sources and ends the sequence with that fault.
    #[must_use]
    pub fn try_zip_with<U, R, F>(&self, other: &Seq<U>, combine: F) -> Seq<R>
    where
        U: Send + 'static,
        R: Send + 'static,
        F: Fn(T, U) -> Result<R, Fault> + Send + Sync + 'static,
    {
        let left = self.map(Pair::A);
        let right = other.map(Pair::B);
        Seq::zip_all([left, right]).try_map(move |lanes| {
            let mut lanes = lanes.into_iter();
            match (lanes.next(), lanes.next()) {
                (Some(Pair::A(a)), Some(Pair::B(b))) => combine(a, b),
                _ => Err(Fault::from(Error::invalid_state("zip lanes out of order"))),
            }
        })
    }
}
