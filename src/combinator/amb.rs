//! Amb: race sources; the first to notify wins.
//!
//! ```text
//! amb(s0, s1, ..):
//!   subscribe each s_i (stop early once a winner exists)
//!   first notification from s_w:
//!     winner ← w
//!     dispose every s_i, i ≠ w       // before forwarding anything
//!     forward
//!   later notifications: forward if from s_w, drop otherwise
//! ```
//!
//! Any notification counts, including `Error` and `Completed`.
//!
//! # Algebraic Laws
//!
//! - Identity: `amb(a, never) ≃ a`
//! - Commutativity: `amb(a, b) ≃ amb(b, a)` up to which one wins a tie

use super::Gate;
use crate::disposable::{SingleAssignmentDisposable, Subscription};
use crate::error::Fault;
use crate::observable::{Observable, Seq};
use crate::observer::{Observer, Sink};
use crate::tracing_compat::trace;
use crate::types::Notification;
use std::sync::Arc;

struct Shared<T> {
    sink: Arc<Sink<T>>,
    gate: Gate<Option<usize>>,
    slots: Vec<SingleAssignmentDisposable>,
}

impl<T: Send + 'static> Shared<T> {
    fn dispose_all(&self) {
        for slot in &self.slots {
            slot.dispose();
        }
    }

    fn deliver(&self, index: usize, notification: Notification<T>) {
        let held = self.gate.enter();
        let won = {
            let mut winner = held.borrow_mut();
            match *winner {
                Some(w) if w == index => false,
                Some(_) => return,
                None => {
                    *winner = Some(index);
                    true
                }
            }
        };
        if won {
            trace!(operator = "amb", winner = index, "amb decided");
            for (i, slot) in self.slots.iter().enumerate() {
                if i != index {
                    slot.dispose();
                }
            }
        }
        self.sink.emit(notification);
    }
}

struct Amb<T> {
    sources: Arc<[Seq<T>]>,
}

impl<T: Send + 'static> Observable<T> for Amb<T> {
    fn subscribe_core(&self, sink: Arc<Sink<T>>) -> Subscription {
        let shared = Arc::new(Shared {
            sink,
            gate: Gate::new(None),
            slots: self
                .sources
                .iter()
                .map(|_| SingleAssignmentDisposable::new())
                .collect(),
        });
        for (index, source) in self.sources.iter().enumerate() {
            if shared.gate.enter().borrow().is_some() {
                break;
            }
            let sub = source.subscribe(AmbObserver {
                shared: Arc::clone(&shared),
                index,
            });
            let _ = shared.slots[index].set(sub);
        }
        Subscription::new(move || shared.dispose_all())
    }
}

struct AmbObserver<T> {
    shared: Arc<Shared<T>>,
    index: usize,
}

impl<T: Send + 'static> Observer<T> for AmbObserver<T> {
    fn on_next(&mut self, value: T) {
        self.shared.deliver(self.index, Notification::Next(value));
    }

    fn on_error(&mut self, fault: Fault) {
        self.shared.deliver(self.index, Notification::Error(fault));
    }

    fn on_completed(&mut self) {
        self.shared.deliver(self.index, Notification::Completed);
    }
}

impl<T: Send + 'static> Seq<T> {
    /// Races the sources: mirrors whichever notifies first and disposes the
    /// rest.
    ///
    /// An empty list never notifies.
    #[must_use]
    pub fn amb<I>(sources: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        Self::new(Amb {
            sources: sources.into_iter().collect(),
        })
    }

    /// Races this sequence against `other`.
    #[must_use]
    pub fn amb_with(&self, other: &Self) -> Self {
        Self::amb([self.clone(), other.clone()])
    }
}
