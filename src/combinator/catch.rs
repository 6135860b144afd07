//! Catch: continue with a fallback after an error.
//!
//! ```text
//! catch(s, handler):       s error(f) ─► subscribe handler(f)
//! catch_typed::<E>(s, h):  s error(f) ─► f is E ? subscribe h(&e) : error(f)
//! catch_all(s0, s1, ..):   s_i error  ─► subscribe s_{i+1}; the last error propagates
//! ```
//!
//! Completion of the active source always passes straight through. Nested
//! catches evaluate innermost first: the first handler (from the source
//! outwards) whose type matches handles the fault, and a handler's own
//! fallback is not caught by that same handler again.

use super::chain::{run_chain, Advance};
use crate::disposable::Subscription;
use crate::error::Fault;
use crate::observable::{Observable, Seq};
use crate::observer::Sink;
use crate::types::Notification;
use std::sync::Arc;

struct Catch<T, F> {
    source: Seq<T>,
    handler: Arc<F>,
}

impl<T, F> Observable<T> for Catch<T, F>
where
    T: Send + 'static,
    F: Fn(Fault) -> Option<Seq<T>> + Send + Sync + 'static,
{
    fn subscribe_core(&self, sink: Arc<Sink<T>>) -> Subscription {
        let source = self.source.clone();
        let handler = Arc::clone(&self.handler);
        let mut caught = false;
        run_chain("catch", sink, move |last| match last {
            None => Advance::Subscribe(source.clone()),
            Some(Notification::Error(fault)) if !caught => {
                caught = true;
                match handler(fault.clone()) {
                    Some(fallback) => Advance::Subscribe(fallback),
                    None => Advance::Finish(Notification::Error(fault)),
                }
            }
            Some(terminal) => Advance::Finish(terminal),
        })
    }
}

struct CatchAll<T> {
    sources: Arc<[Seq<T>]>,
}

impl<T: Send + 'static> Observable<T> for CatchAll<T> {
    fn subscribe_core(&self, sink: Arc<Sink<T>>) -> Subscription {
        let sources = Arc::clone(&self.sources);
        let mut index = 0;
        run_chain("catch_all", sink, move |last| {
            let fault = match last {
                None => None,
                Some(Notification::Error(fault)) => Some(fault),
                Some(terminal) => return Advance::Finish(terminal),
            };
            match (sources.get(index), fault) {
                (Some(next), _) => {
                    index += 1;
                    Advance::Subscribe(next.clone())
                }
                (None, Some(fault)) => Advance::Finish(Notification::Error(fault)),
                (None, None) => Advance::Finish(Notification::Completed),
            }
        })
    }
}

impl<T: Send + 'static> Seq<T> {
    /// On error, continues with the sequence returned by `handler`.
    #[must_use]
    pub fn catch<F>(&self, handler: F) -> Self
    where
        F: Fn(Fault) -> Self + Send + Sync + 'static,
    {
        Self::new(Catch {
            source: self.clone(),
            handler: Arc::new(move |fault: Fault| Some(handler(fault))),
        })
    }

    /// On error, continues with `fallback`.
    #[must_use]
    pub fn catch_with(&self, fallback: &Self) -> Self {
        let fallback = fallback.clone();
        self.catch(move |_| fallback.clone())
    }

    /// On an error whose fault is an `E`, continues with the sequence
    /// returned by `handler`. Any other fault propagates unchanged and the
    /// handler is not called.
    ///
    /// ```
    /// use pushflow::{Error, ErrorKind, Fault, Seq};
    ///
    /// let source = Seq::<i32>::throw(Fault::from(Error::new(ErrorKind::User)));
    /// let recovered = source.catch_typed(|_: &Error| Seq::just(0));
    /// let unmatched = Seq::<i32>::throw(Fault::msg("other")).catch_typed(|_: &Error| Seq::just(0));
    /// # let _ = (recovered, unmatched);
    /// ```
    #[must_use]
    pub fn catch_typed<E, F>(&self, handler: F) -> Self
    where
        E: std::error::Error + 'static,
        F: Fn(&E) -> Self + Send + Sync + 'static,
    {
        Self::new(Catch {
            source: self.clone(),
            handler: Arc::new(move |fault: Fault| fault.downcast_ref::<E>().map(&handler)),
        })
    }

    /// Tries each source in turn, moving to the next one on error.
    ///
    /// If every source fails, the last fault propagates. An empty list
    /// completes immediately.
    #[must_use]
    pub fn catch_all<I>(sources: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        Self::new(CatchAll {
            sources: sources.into_iter().collect(),
        })
    }
}
