//! Concatenation: subscribe to each source after the previous one completes.
//!
//! ```text
//! concat(s0, s1, s2):
//!   subscribe s0 ── completed ──► subscribe s1 ── completed ──► subscribe s2 ── completed ──► completed
//!                └─ error ──────► error (later sources never run)
//! ```
//!
//! Only the active source is subscribed at any time.
//!
//! # Algebraic Laws
//!
//! - Identity: `concat(empty, a) ≃ a ≃ concat(a, empty)`
//! - Associativity: `concat(concat(a, b), c) ≃ concat(a, concat(b, c))`

use super::chain::{run_chain, Advance};
use crate::disposable::Subscription;
use crate::observable::{Observable, Seq};
use crate::observer::Sink;
use crate::types::Notification;
use std::sync::Arc;

struct Concat<T> {
    sources: Arc<[Seq<T>]>,
}

impl<T: Send + 'static> Observable<T> for Concat<T> {
    fn subscribe_core(&self, sink: Arc<Sink<T>>) -> Subscription {
        let sources = Arc::clone(&self.sources);
        let mut index = 0;
        run_chain("concat", sink, move |last| match last {
            Some(Notification::Error(fault)) => Advance::Finish(Notification::Error(fault)),
            _ => match sources.get(index) {
                Some(next) => {
                    index += 1;
                    Advance::Subscribe(next.clone())
                }
                None => Advance::Finish(Notification::Completed),
            },
        })
    }
}

impl<T: Send + 'static> Seq<T> {
    /// Concatenates sources in order.
    ///
    /// An empty list completes immediately.
    #[must_use]
    pub fn concat<I>(sources: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        Self::new(Concat {
            sources: sources.into_iter().collect(),
        })
    }

    /// Continues with `other` once this sequence completes.
    #[must_use]
    pub fn concat_with(&self, other: &Self) -> Self {
        Self::concat([self.clone(), other.clone()])
    }
}
