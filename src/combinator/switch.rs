//! Switch: follow only the most recent inner sequence.
//!
//! ```text
//! switch_latest(outer):
//!   outer next(s)  ─► latest += 1; dispose previous inner; subscribe s as `latest`
//!   inner next(v)  ─► forward v if the inner is still `latest`
//!   inner done     ─► complete if outer done (stale inners are ignored)
//!   outer done     ─► complete if no inner is active
//!   error          ─► dispose everything, then error
//! ```

use super::Gate;
use crate::disposable::{SerialDisposable, SingleAssignmentDisposable, Subscription};
use crate::error::Fault;
use crate::observable::{Observable, Seq};
use crate::observer::{Observer, Sink};
use crate::tracing_compat::trace;
use std::sync::Arc;

struct SwitchState {
    latest: u64,
    has_inner: bool,
    outer_done: bool,
    done: bool,
}

struct Shared<T> {
    sink: Arc<Sink<T>>,
    gate: Gate<SwitchState>,
    outer: SingleAssignmentDisposable,
    inner: SerialDisposable,
}

impl<T: Send + 'static> Shared<T> {
    fn dispose_all(&self) {
        self.outer.dispose();
        self.inner.dispose();
    }

    fn fail(&self, fault: Fault) {
        let held = self.gate.enter();
        {
            let mut state = held.borrow_mut();
            if state.done {
                return;
            }
            state.done = true;
        }
        self.dispose_all();
        trace!(operator = "switch", "switch failed");
        self.sink.error(fault);
    }
}

struct Switch<T> {
    sources: Seq<Seq<T>>,
}

impl<T: Send + 'static> Observable<T> for Switch<T> {
    fn subscribe_core(&self, sink: Arc<Sink<T>>) -> Subscription {
        let shared = Arc::new(Shared {
            sink,
            gate: Gate::new(SwitchState {
                latest: 0,
                has_inner: false,
                outer_done: false,
                done: false,
            }),
            outer: SingleAssignmentDisposable::new(),
            inner: SerialDisposable::new(),
        });
        let _ = shared.outer.set(self.sources.subscribe(OuterObserver {
            shared: Arc::clone(&shared),
        }));
        Subscription::new(move || shared.dispose_all())
    }
}

struct OuterObserver<T> {
    shared: Arc<Shared<T>>,
}

impl<T: Send + 'static> Observer<Seq<T>> for OuterObserver<T> {
    fn on_next(&mut self, next: Seq<T>) {
        let slot = Arc::new(SingleAssignmentDisposable::new());
        let id = {
            let held = self.shared.gate.enter();
            let id = {
                let mut state = held.borrow_mut();
                if state.done {
                    return;
                }
                state.latest += 1;
                state.has_inner = true;
                state.latest
            };
            self.shared
                .inner
                .set(Subscription::from_disposable(Arc::clone(&slot)));
            id
        };
        let _ = slot.set(next.subscribe(InnerObserver {
            shared: Arc::clone(&self.shared),
            id,
        }));
    }

    fn on_error(&mut self, fault: Fault) {
        self.shared.fail(fault);
    }

    fn on_completed(&mut self) {
        let held = self.shared.gate.enter();
        let complete = {
            let mut state = held.borrow_mut();
            if state.done {
                return;
            }
            state.outer_done = true;
            state.done = !state.has_inner;
            state.done
        };
        if complete {
            self.shared.dispose_all();
            self.shared.sink.completed();
        }
    }
}

struct InnerObserver<T> {
    shared: Arc<Shared<T>>,
    id: u64,
}

impl<T: Send + 'static> InnerObserver<T> {
    fn is_current(&self, state: &SwitchState) -> bool {
        !state.done && state.latest == self.id
    }
}

impl<T: Send + 'static> Observer<T> for InnerObserver<T> {
    fn on_next(&mut self, value: T) {
        let held = self.shared.gate.enter();
        if !self.is_current(&held.borrow()) {
            return;
        }
        self.shared.sink.next(value);
    }

    fn on_error(&mut self, fault: Fault) {
        let held = self.shared.gate.enter();
        if !self.is_current(&held.borrow()) {
            return;
        }
        self.shared.fail(fault);
    }

    fn on_completed(&mut self) {
        let held = self.shared.gate.enter();
        let complete = {
            let mut state = held.borrow_mut();
            if !self.is_current(&state) {
                return;
            }
            state.has_inner = false;
            state.done = state.outer_done;
            state.done
        };
        if complete {
            self.shared.dispose_all();
            self.shared.sink.completed();
        }
    }
}

impl<T: Send + 'static> Seq<Seq<T>> {
    /// Flattens by following only the most recent inner sequence.
    ///
    /// Each new inner sequence disposes the previous one before it is
    /// subscribed. Completes once the outer sequence has completed and the
    /// current inner sequence (if any) has completed.
    #[must_use]
    pub fn switch_latest(&self) -> Seq<T> {
        Seq::new(Switch {
            sources: self.clone(),
        })
    }
}
