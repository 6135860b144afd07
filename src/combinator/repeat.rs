//! Repeat and retry: resubscribe to the same source.
//!
//! ```text
//! repeat(n):  completed ─► resubscribe while attempts < n, else completed
//!             error     ─► error
//! retry(n):   error     ─► resubscribe while attempts < n, else error
//!             completed ─► completed
//! ```
//!
//! `n` counts every subscription, the first one included:
//!
//! | n | behavior |
//! |---|---|
//! | 0 | completes without subscribing |
//! | 1 | subscribes once; its terminal passes through unchanged |
//! | k | at most k subscriptions |
//!
//! Resubscription runs as a trampoline action. Disposing during the gap
//! between one subscription ending and the next starting cancels the next
//! one.

use super::chain::{run_chain, Advance};
use crate::disposable::Subscription;
use crate::observable::{Observable, Seq};
use crate::observer::Sink;
use crate::types::Notification;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trigger {
    Completion,
    Error,
}

struct Repeat<T> {
    source: Seq<T>,
    trigger: Trigger,
    limit: Option<u64>,
}

impl<T: Send + 'static> Observable<T> for Repeat<T> {
    fn subscribe_core(&self, sink: Arc<Sink<T>>) -> Subscription {
        let source = self.source.clone();
        let trigger = self.trigger;
        let limit = self.limit;
        let mut attempts = 0_u64;
        let operator = match trigger {
            Trigger::Completion => "repeat",
            Trigger::Error => "retry",
        };
        run_chain(operator, sink, move |last| {
            let again = match &last {
                None => true,
                Some(Notification::Completed) => trigger == Trigger::Completion,
                Some(Notification::Error(_)) => trigger == Trigger::Error,
                Some(Notification::Next(_)) => false,
            };
            let exhausted = limit.is_some_and(|limit| attempts >= limit);
            match last {
                _ if again && !exhausted => {
                    attempts += 1;
                    Advance::Subscribe(source.clone())
                }
                Some(terminal) => Advance::Finish(terminal),
                None => Advance::Finish(Notification::Completed),
            }
        })
    }
}

impl<T: Send + 'static> Seq<T> {
    /// Subscribes up to `count` times in total, resubscribing after each
    /// completion. An error ends the sequence immediately.
    #[must_use]
    pub fn repeat(&self, count: u64) -> Self {
        self.repeat_on(Trigger::Completion, Some(count))
    }

    /// Resubscribes after every completion, indefinitely.
    #[must_use]
    pub fn repeat_forever(&self) -> Self {
        self.repeat_on(Trigger::Completion, None)
    }

    /// Subscribes up to `count` times in total, resubscribing after each
    /// error. The last error propagates once the attempts are used up.
    #[must_use]
    pub fn retry(&self, count: u64) -> Self {
        self.repeat_on(Trigger::Error, Some(count))
    }

    /// Resubscribes after every error, indefinitely.
    #[must_use]
    pub fn retry_forever(&self) -> Self {
        self.repeat_on(Trigger::Error, None)
    }

    fn repeat_on(&self, trigger: Trigger, limit: Option<u64>) -> Self {
        Self::new(Repeat {
            source: self.clone(),
            trigger,
            limit,
        })
    }
}
