//! Merge: subscribe to every inner sequence as it arrives and forward values
//! by arrival.
//!
//! ```text
//! merge_all(outer):
//!   outer next(s)  ─► active += 1; subscribe s
//!   inner next(v)  ─► forward v
//!   inner done     ─► active -= 1; complete if outer done and active == 0
//!   outer done     ─► complete if active == 0
//!   any error      ─► dispose every subscription, then error
//! ```
//!
//! The static form merges a fixed list by treating it as an outer sequence
//! that emits every source and completes.
//!
//! # Algebraic Laws
//!
//! - Identity: `merge(a, never)` emits what `a` emits (and never completes)
//! - Commutativity: `merge(a, b)` and `merge(b, a)` emit the same multiset

use super::Gate;
use crate::disposable::{CompositeDisposable, MemberKey, SingleAssignmentDisposable, Subscription};
use crate::error::Fault;
use crate::observable::{Observable, Seq};
use crate::observer::{Observer, Sink};
use crate::tracing_compat::trace;
use std::sync::Arc;

struct MergeState {
    active: usize,
    outer_done: bool,
    done: bool,
}

struct Shared<T> {
    sink: Arc<Sink<T>>,
    gate: Gate<MergeState>,
    group: CompositeDisposable,
}

impl<T: Send + 'static> Shared<T> {
    fn fail(&self, fault: Fault) {
        let held = self.gate.enter();
        {
            let mut state = held.borrow_mut();
            if state.done {
                return;
            }
            state.done = true;
        }
        self.group.dispose();
        trace!(operator = "merge", "merge failed");
        self.sink.error(fault);
    }

    fn finish_branch(&self, outer: bool) {
        let held = self.gate.enter();
        let complete = {
            let mut state = held.borrow_mut();
            if state.done {
                return;
            }
            if outer {
                state.outer_done = true;
            } else {
                state.active -= 1;
            }
            state.done = state.outer_done && state.active == 0;
            state.done
        };
        if complete {
            self.group.dispose();
            self.sink.completed();
        }
    }
}

struct Merge<T> {
    sources: Seq<Seq<T>>,
}

impl<T: Send + 'static> Observable<T> for Merge<T> {
    fn subscribe_core(&self, sink: Arc<Sink<T>>) -> Subscription {
        let shared = Arc::new(Shared {
            sink,
            gate: Gate::new(MergeState {
                active: 0,
                outer_done: false,
                done: false,
            }),
            group: CompositeDisposable::new(),
        });
        let outer = Arc::new(SingleAssignmentDisposable::new());
        shared
            .group
            .add(Subscription::from_disposable(Arc::clone(&outer)));
        let _ = outer.set(self.sources.subscribe(OuterObserver {
            shared: Arc::clone(&shared),
        }));
        Subscription::new(move || shared.group.dispose())
    }
}

struct OuterObserver<T> {
    shared: Arc<Shared<T>>,
}

impl<T: Send + 'static> Observer<Seq<T>> for OuterObserver<T> {
    fn on_next(&mut self, inner: Seq<T>) {
        let slot = Arc::new(SingleAssignmentDisposable::new());
        let key = {
            let held = self.shared.gate.enter();
            let mut state = held.borrow_mut();
            if state.done {
                return;
            }
            state.active += 1;
            drop(state);
            self.shared
                .group
                .add(Subscription::from_disposable(Arc::clone(&slot)))
        };
        let _ = slot.set(inner.subscribe(InnerObserver {
            shared: Arc::clone(&self.shared),
            key,
        }));
    }

    fn on_error(&mut self, fault: Fault) {
        self.shared.fail(fault);
    }

    fn on_completed(&mut self) {
        self.shared.finish_branch(true);
    }
}

struct InnerObserver<T> {
    shared: Arc<Shared<T>>,
    key: MemberKey,
}

impl<T: Send + 'static> Observer<T> for InnerObserver<T> {
    fn on_next(&mut self, value: T) {
        let held = self.shared.gate.enter();
        if held.borrow().done {
            return;
        }
        self.shared.sink.next(value);
    }

    fn on_error(&mut self, fault: Fault) {
        self.shared.fail(fault);
    }

    fn on_completed(&mut self) {
        self.shared.group.remove(self.key);
        self.shared.finish_branch(false);
    }
}

impl<T: Send + 'static> Seq<Seq<T>> {
    /// Flattens by subscribing to every inner sequence as it arrives.
    ///
    /// Completes once the outer sequence and every inner sequence have
    /// completed. The first error from any of them disposes all the others.
    #[must_use]
    pub fn merge_all(&self) -> Seq<T> {
        Seq::new(Merge {
            sources: self.clone(),
        })
    }
}

impl<T: Send + 'static> Seq<T> {
    /// Merges a fixed list of sources.
    ///
    /// An empty list completes immediately.
    #[must_use]
    pub fn merge<I>(sources: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        let sources: Vec<Self> = sources.into_iter().collect();
        Seq::from_iter(sources).merge_all()
    }

    /// Merges this sequence with `other`.
    #[must_use]
    pub fn merge_with(&self, other: &Self) -> Self {
        Self::merge([self.clone(), other.clone()])
    }
}
