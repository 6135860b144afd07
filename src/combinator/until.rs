//! Take-until and skip-until against a signal sequence.
//!
//! ```text
//! take_until(source, signal):        skip_until(source, signal):
//!   signal next      ─► completed      signal next      ─► open gate; dispose signal
//!   signal error     ─► error          signal error     ─► error
//!   signal completed ─► keep going     signal completed ─► dispose signal; stay closed
//!   source next      ─► forward        source next      ─► forward if open
//!   source terminal  ─► forward        source terminal  ─► forward
//! ```
//!
//! Every terminal disposes both subscriptions before it is forwarded.
//! `take_until` subscribes the signal first so a signal that fires during
//! subscription stops the source before it starts; `skip_until` subscribes
//! the source first.

use super::Gate;
use crate::disposable::{SingleAssignmentDisposable, Subscription};
use crate::error::Fault;
use crate::observable::{Observable, Seq};
use crate::observer::{Observer, Sink};
use crate::tracing_compat::trace;
use crate::types::Notification;
use std::marker::PhantomData;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Take,
    Skip,
}

struct UntilState {
    open: bool,
    done: bool,
}

struct Shared<T> {
    mode: Mode,
    sink: Arc<Sink<T>>,
    gate: Gate<UntilState>,
    source: SingleAssignmentDisposable,
    signal: SingleAssignmentDisposable,
}

impl<T: Send + 'static> Shared<T> {
    fn dispose_all(&self) {
        self.signal.dispose();
        self.source.dispose();
    }

    fn finish(&self, terminal: Notification<T>, from_signal: bool) {
        let held = self.gate.enter();
        {
            let mut state = held.borrow_mut();
            if state.done {
                return;
            }
            state.done = true;
        }
        self.dispose_all();
        trace!(
            operator = match self.mode {
                Mode::Take => "take_until",
                Mode::Skip => "skip_until",
            },
            from_signal,
            "until operator finished"
        );
        self.sink.emit(terminal);
    }
}

struct Until<T, U> {
    mode: Mode,
    source: Seq<T>,
    signal: Seq<U>,
}

impl<T: Send + 'static, U: Send + 'static> Observable<T> for Until<T, U> {
    fn subscribe_core(&self, sink: Arc<Sink<T>>) -> Subscription {
        let shared = Arc::new(Shared {
            mode: self.mode,
            sink,
            gate: Gate::new(UntilState {
                open: self.mode == Mode::Take,
                done: false,
            }),
            source: SingleAssignmentDisposable::new(),
            signal: SingleAssignmentDisposable::new(),
        });
        let subscribe_source = || {
            if shared.gate.enter().borrow().done {
                return;
            }
            let _ = shared.source.set(self.source.subscribe(SourceObserver {
                shared: Arc::clone(&shared),
            }));
        };
        let subscribe_signal = || {
            let _ = shared.signal.set(self.signal.subscribe(SignalObserver {
                shared: Arc::clone(&shared),
                _signal: PhantomData,
            }));
        };
        match self.mode {
            Mode::Take => {
                subscribe_signal();
                subscribe_source();
            }
            Mode::Skip => {
                subscribe_source();
                subscribe_signal();
            }
        }
        Subscription::new(move || shared.dispose_all())
    }
}

struct SourceObserver<T> {
    shared: Arc<Shared<T>>,
}

impl<T: Send + 'static> Observer<T> for SourceObserver<T> {
    fn on_next(&mut self, value: T) {
        let held = self.shared.gate.enter();
        {
            let state = held.borrow();
            if state.done || !state.open {
                return;
            }
        }
        self.shared.sink.next(value);
    }

    fn on_error(&mut self, fault: Fault) {
        self.shared.finish(Notification::Error(fault), false);
    }

    fn on_completed(&mut self) {
        self.shared.finish(Notification::Completed, false);
    }
}

struct SignalObserver<T, U> {
    shared: Arc<Shared<T>>,
    _signal: PhantomData<fn(U)>,
}

impl<T: Send + 'static, U: Send + 'static> Observer<U> for SignalObserver<T, U> {
    fn on_next(&mut self, _value: U) {
        match self.shared.mode {
            Mode::Take => self.shared.finish(Notification::Completed, true),
            Mode::Skip => {
                let held = self.shared.gate.enter();
                held.borrow_mut().open = true;
                self.shared.signal.dispose();
            }
        }
    }

    fn on_error(&mut self, fault: Fault) {
        self.shared.finish(Notification::Error(fault), true);
    }

    fn on_completed(&mut self) {
        self.shared.signal.dispose();
    }
}

impl<T: Send + 'static> Seq<T> {
    /// Mirrors this sequence until `signal` emits, then completes.
    ///
    /// An error from `signal` is forwarded. If `signal` completes without
    /// emitting, this sequence continues unaffected.
    #[must_use]
    pub fn take_until<U: Send + 'static>(&self, signal: &Seq<U>) -> Self {
        Self::new(Until {
            mode: Mode::Take,
            source: self.clone(),
            signal: signal.clone(),
        })
    }

    /// Drops values until `signal` emits, then mirrors the rest of this
    /// sequence.
    ///
    /// The signal is disposed after its first value. If it completes without
    /// emitting, every value stays suppressed; terminals still pass through.
    #[must_use]
    pub fn skip_until<U: Send + 'static>(&self, signal: &Seq<U>) -> Self {
        Self::new(Until {
            mode: Mode::Skip,
            source: self.clone(),
            signal: signal.clone(),
        })
    }
}
