//! Combine-latest: on every value, combine the latest value of every source.
//!
//! ```text
//! combine_latest(s0..sk):
//!   next(i, v)   ─► latest[i] ← v; if every slot is filled: emit clone(latest)
//!   completed(i) ─► once every source has completed: complete
//!   error        ─► dispose all, then error
//! ```

use super::{Gate, Pair};
use crate::disposable::{SingleAssignmentDisposable, Subscription};
use crate::error::{Error, Fault};
use crate::observable::{Observable, Seq};
use crate::observer::{Observer, Sink};
use crate::tracing_compat::trace;
use std::sync::Arc;

struct LatestState<T> {
    latest: Vec<Option<T>>,
    completed: usize,
    done: bool,
}

struct Shared<T> {
    sink: Arc<Sink<Vec<T>>>,
    gate: Gate<LatestState<T>>,
    slots: Vec<SingleAssignmentDisposable>,
}

impl<T: Clone + Send + 'static> Shared<T> {
    fn dispose_all(&self) {
        for slot in &self.slots {
            slot.dispose();
        }
    }

    fn on_next(&self, index: usize, value: T) {
        let held = self.gate.enter();
        let combined = {
            let mut state = held.borrow_mut();
            if state.done {
                return;
            }
            state.latest[index] = Some(value);
            state.latest.iter().cloned().collect::<Option<Vec<T>>>()
        };
        if let Some(values) = combined {
            self.sink.next(values);
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
            state.completed += 1;
            if state.completed < state.latest.len() {
                return;
            }
            state.done = true;
            trace!(
                operator = "combine_latest",
                source = index,
                "combine_latest completing"
            );
        }
        self.dispose_all();
        self.sink.completed();
    }
}

struct CombineLatest<T> {
    sources: Arc<[Seq<T>]>,
}

impl<T: Clone + Send + 'static> Observable<Vec<T>> for CombineLatest<T> {
    fn subscribe_core(&self, sink: Arc<Sink<Vec<T>>>) -> Subscription {
        let count = self.sources.len();
        if count == 0 {
            sink.completed();
            return Subscription::empty();
        }
        let shared = Arc::new(Shared {
            sink,
            gate: Gate::new(LatestState {
                latest: vec![None; count],
                completed: 0,
                done: false,
            }),
            slots: (0..count)
                .map(|_| SingleAssignmentDisposable::new())
                .collect(),
        });
        for (index, source) in self.sources.iter().enumerate() {
            let sub = source.subscribe(LatestObserver {
                shared: Arc::clone(&shared),
                index,
            });
            let _ = shared.slots[index].set(sub);
        }
        Subscription::new(move || shared.dispose_all())
    }
}

struct LatestObserver<T> {
    shared: Arc<Shared<T>>,
    index: usize,
}

impl<T: Clone + Send + 'static> Observer<T> for LatestObserver<T> {
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

impl<T: Clone + Send + 'static> Seq<T> {
    /// Combines the latest values of any number of sources into vectors, one
    /// element per source in source order.
    ///
    /// Nothing is emitted until every source has produced a value. An empty
    /// list completes immediately.
    #[must_use]
    pub fn combine_latest_all<I>(sources: I) -> Seq<Vec<T>>
    where
        I: IntoIterator<Item = Self>,
    {
        Seq::new(CombineLatest {
            sources: sources.into_iter().collect(),
        })
    }

    /// Combines the latest values of this sequence and `other` through
    /// `combine`.
    #[must_use]
    pub fn combine_latest_with<U, R, F>(&self, other: &Seq<U>, combine: F) -> Seq<R>
    where
        U: Clone + Send + 'static,
        R: Send + 'static,
        F: Fn(T, U) -> R + Send + Sync + 'static,
    {
        self.try_combine_latest_with(other, move |a, b| Ok(combine(a, b)))
    }

    /// Like [`combine_latest_with`](Self::combine_latest_with), but an `Err`
    /// from `combine` releases both sources and ends the sequence.
    #[must_use]
    pub fn try_combine_latest_with<U, R, F>(&self, other: &Seq<U>, combine: F) -> Seq<R>
    where
        U: Clone + Send + 'static,
        R: Send + 'static,
        F: Fn(T, U) -> Result<R, Fault> + Send + Sync + 'static,
    {
        let left = self.map(Pair::A);
        let right = other.map(Pair::B);
        Seq::combine_latest_all([left, right]).try_map(move |lanes| {
            let mut lanes = lanes.into_iter();
            match (lanes.next(), lanes.next()) {
                (Some(Pair::A(a)), Some(Pair::B(b))) => combine(a, b),
                _ => Err(Fault::from(Error::invalid_state(
                    "combine_latest lanes out of order",
                ))),
            }
        })
    }
}
