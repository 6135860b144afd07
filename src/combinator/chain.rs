//! Sequential driver shared by concat, catch, resume-next, repeat and retry.
//!
//! ```text
//! decide(None) ─► Subscribe(s0) ─► s0 terminal t0 ─► decide(Some(t0)) ─► Subscribe(s1) ...
//!                                                                      └► Finish(n) ─► sink
//! ```
//!
//! Values of the active source go straight downstream; only its terminal
//! reaches `decide`. Each subscribe runs as a trampoline action, so a long
//! run of sources that finish synchronously iterates instead of recursing.
//!
//! `current` holds either the pending subscribe action or the active source's
//! subscription. A handle is stored only while it is still the newest one:
//! a pending action that already started, or a subscription whose source
//! already finished and moved the chain on, is never written back over a
//! newer handle.

use crate::disposable::{SerialDisposable, Subscription};
use crate::error::Fault;
use crate::observable::Seq;
use crate::observer::{Observer, Sink};
use crate::scheduler::{Scheduler, TrampolineScheduler};
use crate::tracing_compat::trace;
use crate::types::Notification;
use parking_lot::Mutex;
use std::sync::Arc;

/// What a sequential operator does after the previous source ended.
pub(crate) enum Advance<T> {
    /// Subscribe to this source next.
    Subscribe(Seq<T>),
    /// Deliver this notification and stop.
    Finish(Notification<T>),
}

struct Progress {
    generation: u64,
    started: bool,
}

struct Chain<T, D> {
    operator: &'static str,
    sink: Arc<Sink<T>>,
    decide: Mutex<D>,
    progress: Mutex<Progress>,
    current: SerialDisposable,
}

/// Starts a sequential operator.
///
/// `decide` is called with `None` once at start, then with the terminal
/// notification of every source it chose.
pub(crate) fn run_chain<T, D>(operator: &'static str, sink: Arc<Sink<T>>, decide: D) -> Subscription
where
    T: Send + 'static,
    D: FnMut(Option<Notification<T>>) -> Advance<T> + Send + 'static,
{
    let chain = Arc::new(Chain {
        operator,
        sink,
        decide: Mutex::new(decide),
        progress: Mutex::new(Progress {
            generation: 0,
            started: false,
        }),
        current: SerialDisposable::new(),
    });
    chain.advance(None);
    Subscription::new(move || chain.current.dispose())
}

impl<T, D> Chain<T, D>
where
    T: Send + 'static,
    D: FnMut(Option<Notification<T>>) -> Advance<T> + Send + 'static,
{
    fn advance(self: &Arc<Self>, last: Option<Notification<T>>) {
        if self.current.is_disposed() {
            return;
        }
        let step = (self.decide.lock())(last);
        match step {
            Advance::Finish(notification) => {
                trace!(
                    operator = self.operator,
                    failed = notification.fault().is_some(),
                    "sequential operator finished"
                );
                self.sink.emit(notification);
            }
            Advance::Subscribe(next) => {
                let generation = {
                    let mut progress = self.progress.lock();
                    progress.generation += 1;
                    progress.started = false;
                    progress.generation
                };
                let this = Arc::clone(self);
                let pending = TrampolineScheduler::new()
                    .schedule(Box::new(move || this.subscribe_next(generation, &next)));
                let progress = self.progress.lock();
                if progress.generation == generation && !progress.started {
                    self.current.set(pending);
                }
            }
        }
    }

    fn subscribe_next(self: &Arc<Self>, generation: u64, next: &Seq<T>) {
        {
            let mut progress = self.progress.lock();
            if progress.generation != generation || self.current.is_disposed() {
                return;
            }
            progress.started = true;
        }
        let inner = next.subscribe(Link {
            chain: Arc::clone(self),
        });
        let progress = self.progress.lock();
        if progress.generation == generation {
            self.current.set(inner);
        }
    }
}

struct Link<T, D> {
    chain: Arc<Chain<T, D>>,
}

impl<T, D> Observer<T> for Link<T, D>
where
    T: Send + 'static,
    D: FnMut(Option<Notification<T>>) -> Advance<T> + Send + 'static,
{
    fn on_next(&mut self, value: T) {
        self.chain.sink.next(value);
    }

    fn on_error(&mut self, fault: Fault) {
        self.chain.advance(Some(Notification::Error(fault)));
    }

    fn on_completed(&mut self) {
        self.chain.advance(Some(Notification::Completed));
    }
}
