//! Contract-enforcing downstream handle.
//!
//! Every observer is wrapped in a [`Sink`] when it subscribes, and producers
//! (including every combinator) talk to the sink, never to the observer. The
//! sink guarantees:
//!
//! - **Serialized delivery**: observer calls never overlap. A notification
//!   that arrives while another is being delivered (from another thread, or
//!   re-entrantly from inside the observer's own callback) is queued and
//!   delivered by the thread already draining, in arrival order.
//! - **Single terminal**: at most one of `on_error` / `on_completed` is
//!   delivered, and nothing is accepted after one has been accepted.
//! - **Disposal stops emission**: once [`Sink::dispose`] returns, no further
//!   call reaches the observer; queued notifications are discarded.
//! - **Auto-detach**: after the terminal call has been delivered, the upstream
//!   subscription attached to the sink is disposed.
//!
//! A notification already being delivered when `dispose` runs on another
//! thread finishes; it is the only call that can still be in flight.

use super::{BoxObserver, Observer};
use crate::disposable::{SingleAssignmentDisposable, Subscription};
use crate::error::Fault;
use crate::types::Notification;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

struct SinkState<T> {
    observer: Option<BoxObserver<T>>,
    queue: VecDeque<Notification<T>>,
    draining: bool,
    terminal_accepted: bool,
}

/// The producer-facing side of one subscription.
pub struct Sink<T> {
    state: Mutex<SinkState<T>>,
    disposed: AtomicBool,
    upstream: SingleAssignmentDisposable,
}

/// Resets the draining flag if an observer callback unwinds, so a later
/// emission is not queued forever behind a dead drain loop.
struct DrainGuard<'a, T> {
    sink: &'a Sink<T>,
    armed: bool,
}

impl<T> Drop for DrainGuard<'_, T> {
    fn drop(&mut self) {
        if self.armed {
            let mut state = self.sink.state.lock();
            state.draining = false;
            state.queue.clear();
        }
    }
}

impl<T: Send + 'static> Sink<T> {
    /// Wraps an observer.
    #[must_use]
    pub fn new(observer: BoxObserver<T>) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(SinkState {
                observer: Some(observer),
                queue: VecDeque::new(),
                draining: false,
                terminal_accepted: false,
            }),
            disposed: AtomicBool::new(false),
            upstream: SingleAssignmentDisposable::new(),
        })
    }

    /// Wraps any observer value.
    #[must_use]
    pub fn from_observer<O: Observer<T> + 'static>(observer: O) -> Arc<Self> {
        Self::new(Box::new(observer))
    }

    /// Wraps an observer that needs a handle back to its own sink, e.g. to
    /// dispose it from inside a callback.
    pub(crate) fn new_cyclic<F>(make: F) -> Arc<Self>
    where
        F: FnOnce(Weak<Self>) -> BoxObserver<T>,
    {
        Arc::new_cyclic(|weak| Self {
            state: Mutex::new(SinkState {
                observer: Some(make(weak.clone())),
                queue: VecDeque::new(),
                draining: false,
                terminal_accepted: false,
            }),
            disposed: AtomicBool::new(false),
            upstream: SingleAssignmentDisposable::new(),
        })
    }

    /// Delivers a value.
    pub fn next(&self, value: T) {
        self.emit(Notification::Next(value));
    }

    /// Delivers a terminal failure.
    pub fn error(&self, fault: Fault) {
        self.emit(Notification::Error(fault));
    }

    /// Delivers terminal success.
    pub fn completed(&self) {
        self.emit(Notification::Completed);
    }

    /// Delivers a reified notification.
    pub fn emit(&self, notification: Notification<T>) {
        {
            let mut state = self.state.lock();
            if state.terminal_accepted || self.disposed.load(Ordering::Acquire) {
                return;
            }
            if notification.is_terminal() {
                state.terminal_accepted = true;
            }
            state.queue.push_back(notification);
            if state.draining {
                return;
            }
            state.draining = true;
        }
        self.drain();
    }

    fn drain(&self) {
        let mut guard = DrainGuard {
            sink: self,
            armed: true,
        };
        loop {
            let (notification, mut observer) = {
                let mut state = self.state.lock();
                let Some(notification) = state.queue.pop_front() else {
                    state.draining = false;
                    guard.armed = false;
                    return;
                };
                let Some(observer) = state.observer.take() else {
                    state.queue.clear();
                    state.draining = false;
                    guard.armed = false;
                    return;
                };
                (notification, observer)
            };

            let terminal = notification.is_terminal();
            notification.accept(&mut observer);

            if terminal {
                {
                    let mut state = self.state.lock();
                    state.queue.clear();
                    state.draining = false;
                    guard.armed = false;
                }
                drop(observer);
                self.upstream.dispose();
                return;
            }

            let mut state = self.state.lock();
            if self.disposed.load(Ordering::Acquire) {
                state.queue.clear();
                state.draining = false;
                guard.armed = false;
                drop(state);
                drop(observer);
                return;
            }
            state.observer = Some(observer);
        }
    }

    /// Returns true once the sink accepts no more notifications: it was
    /// disposed, or a terminal notification was accepted.
    ///
    /// Scheduled continuations check this before doing work on behalf of the
    /// observer.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.disposed.load(Ordering::Acquire) || self.state.lock().terminal_accepted
    }

    /// Returns true once the sink has been disposed.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    /// Attaches the upstream subscription released after a terminal call or
    /// on dispose. If the sink is already finished, `upstream` is disposed
    /// immediately.
    pub(crate) fn attach(&self, upstream: Subscription) {
        let finished = {
            let state = self.state.lock();
            self.disposed.load(Ordering::Acquire)
                || (state.terminal_accepted && !state.draining && state.queue.is_empty())
        };
        // attaching twice is a bug in this crate, not a user error
        if self.upstream.set(upstream.clone()).is_err() {
            debug_assert!(false, "sink upstream attached twice");
        }
        if finished {
            upstream.dispose();
        }
    }

    /// Stops delivery and releases the observer and the upstream subscription.
    pub fn dispose(&self) {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return;
        }
        let observer = {
            let mut state = self.state.lock();
            state.queue.clear();
            state.observer.take()
        };
        drop(observer);
        self.upstream.dispose();
    }
}

impl<T> fmt::Debug for Sink<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Sink")
            .field("disposed", &self.disposed.load(Ordering::Acquire))
            .field("terminal_accepted", &state.terminal_accepted)
            .field("queued", &state.queue.len())
            .finish()
    }
}

/// Forwards observer calls into a shared sink.
///
/// Used where a sink has to be handed to an API that takes an observer.
pub(crate) struct SinkObserver<T>(pub(crate) Arc<Sink<T>>);

impl<T: Send + 'static> Observer<T> for SinkObserver<T> {
    fn on_next(&mut self, value: T) {
        self.0.next(value);
    }

    fn on_error(&mut self, fault: Fault) {
        self.0.error(fault);
    }

    fn on_completed(&mut self) {
        self.0.completed();
    }
}
