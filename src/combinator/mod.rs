//! Multi-source combinators.
//!
//! Every operator here is a leaf [`Observable`](crate::Observable)
//! implementation that subscribes to one or more upstream sequences and
//! forwards to one downstream [`Sink`](crate::observer::Sink):
//!
//! - [`concat`]: one source at a time, in order
//! - [`merge`]: all sources at once, values by arrival
//! - [`switch`]: only the latest inner sequence
//! - [`amb`]: first source to notify wins, the rest are disposed
//! - [`zip`]: pairs the n-th values of every source
//! - [`combine_latest`]: combines the latest value of every source
//! - [`catch`]: continue with a fallback after an error
//! - [`resume_next`]: continue with the next source after any terminal
//! - [`repeat`]: resubscribe after completion or error
//! - [`until`]: take-until / skip-until a signal sequence
//! - [`materialize`]: convert between notifications and values
//! - [`transform`]: map / filter / flat-map / switch-map
//! - [`schedule_on`]: observe-on / subscribe-on
//!
//! # Shared state
//!
//! Operators with more than one upstream keep their per-subscription state in
//! one [`Gate`]: a re-entrant lock around a `RefCell`. A notification handler
//! enters the gate, updates the state in a short borrow, drops the borrow and
//! then calls downstream *with the gate still held*. That gives:
//!
//! ```text
//! branch A ─┐
//!           ├─ gate ─► decide (borrow) ─► release borrow ─► sink
//! branch B ─┘
//! ```
//!
//! - decisions and the downstream calls they produce happen in one order
//! - a terminal transition is visible to every other branch before the
//!   gate is released
//! - re-entry from inside the downstream call (an observer that feeds one
//!   of the sources) takes the gate again on the same thread instead of
//!   deadlocking; the downstream sink queues the resulting emission
//!
//! A branch that fails disposes every sibling *before* the downstream
//! `on_error` is delivered, so a losing branch can never emit after it lost.

pub mod amb;
pub mod catch;
mod chain;
pub mod combine_latest;
pub mod concat;
pub mod materialize;
pub mod merge;
pub mod repeat;
pub mod resume_next;
pub mod schedule_on;
pub mod switch;
pub mod transform;
pub mod until;
pub mod zip;

use parking_lot::{ReentrantMutex, ReentrantMutexGuard};
use std::cell::RefCell;

/// Per-operator mutual exclusion.
///
/// Borrows of the inner state must never be held across a downstream call
/// or a dispose call; both may re-enter the gate on the same thread.
pub(crate) struct Gate<S> {
    lock: ReentrantMutex<RefCell<S>>,
}

impl<S> Gate<S> {
    pub(crate) fn new(state: S) -> Self {
        Self {
            lock: ReentrantMutex::new(RefCell::new(state)),
        }
    }

    pub(crate) fn enter(&self) -> ReentrantMutexGuard<'_, RefCell<S>> {
        self.lock.lock()
    }
}

/// Tags the values of a two-source operator so both lanes can share the
/// homogeneous N-ary core.
#[derive(Clone)]
pub(crate) enum Pair<A, B> {
    A(A),
    B(B),
}
