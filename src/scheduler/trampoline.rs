//! Current-thread trampoline.
//!
//! The first `schedule` call on a thread becomes the drain loop: it runs its
//! action and then every action queued while it runs, in (due time, insertion)
//! order. Nested `schedule` calls only enqueue, so a chain of actions that
//! each schedule the next runs in constant stack depth.

use super::immediate::wall_now;
use super::{Action, Scheduler};
use crate::disposable::Subscription;
use crate::types::Time;
use std::cell::RefCell;
use std::cmp::Ordering as CmpOrdering;
use std::collections::BinaryHeap;
use std::time::Duration;

struct Queued {
    due: Time,
    seq: u64,
    action: Action,
    cancel: Subscription,
}

impl PartialEq for Queued {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl Eq for Queued {}

impl PartialOrd for Queued {
    fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
        Some(self.cmp(other))
    }
}

impl Ord for Queued {
    // Reversed for a min-heap on (due, seq).
    fn cmp(&self, other: &Self) -> CmpOrdering {
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

#[derive(Default)]
struct LocalQueue {
    heap: BinaryHeap<Queued>,
    next_seq: u64,
}

thread_local! {
    static QUEUE: RefCell<Option<LocalQueue>> = const { RefCell::new(None) };
}

/// Runs work on the calling thread without unbounded recursion.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrampolineScheduler;

impl TrampolineScheduler {
    /// Creates the scheduler.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Returns true if the calling thread is inside a drain loop.
    #[must_use]
    pub fn is_draining() -> bool {
        QUEUE.with(|q| q.borrow().is_some())
    }

    fn drain() {
        loop {
            let next = QUEUE.with(|q| {
                q.borrow_mut()
                    .as_mut()
                    .and_then(|queue| queue.heap.pop())
            });
            let Some(item) = next else {
                break;
            };
            if item.cancel.is_disposed() {
                continue;
            }
            let wait = item.due.ticks_since(wall_now());
            if wait > 0 {
                std::thread::sleep(Duration::from_nanos(wait));
            }
            if !item.cancel.is_disposed() {
                (item.action)();
            }
        }
    }
}

/// Leaves drain mode when the outermost call exits, even by unwinding.
struct DrainScope;

impl Drop for DrainScope {
    fn drop(&mut self) {
        QUEUE.with(|q| q.borrow_mut().take());
    }
}

impl Scheduler for TrampolineScheduler {
    fn now(&self) -> Time {
        wall_now()
    }

    fn schedule_after(&self, delay: Duration, action: Action) -> Subscription {
        let cancel = Subscription::flag();
        let due = wall_now() + delay;
        let queued = QUEUE.with(|q| {
            let mut slot = q.borrow_mut();
            match slot.as_mut() {
                Some(queue) => {
                    let seq = queue.next_seq;
                    queue.next_seq += 1;
                    queue.heap.push(Queued {
                        due,
                        seq,
                        action,
                        cancel: cancel.clone(),
                    });
                    None
                }
                None => {
                    let mut queue = LocalQueue::default();
                    queue.heap.push(Queued {
                        due,
                        seq: 0,
                        action,
                        cancel: cancel.clone(),
                    });
                    queue.next_seq = 1;
                    *slot = Some(queue);
                    Some(DrainScope)
                }
            }
        });
        if let Some(scope) = queued {
            Self::drain();
            drop(scope);
        }
        cancel
    }
}
