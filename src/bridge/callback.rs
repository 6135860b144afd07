//! One-shot sequences over callback-style asynchronous operations.

use crate::disposable::Subscription;
use crate::error::Fault;
use crate::observable::{Observable, Seq};
use crate::observer::Sink;
use std::fmt;
use std::sync::Arc;

/// Completion handle passed to the operation started by [`from_callback`].
///
/// Consuming it delivers the operation's outcome: one value followed by
/// completion, or one error. Dropping it without calling
/// [`Callback::complete`] leaves the sequence silent.
pub struct Callback<T> {
    sink: Arc<Sink<T>>,
}

impl<T: Send + 'static> Callback<T> {
    /// Delivers the outcome. Ignored if the subscriber has already disposed.
    pub fn complete(self, result: Result<T, Fault>) {
        match result {
            Ok(value) => {
                self.sink.next(value);
                self.sink.completed();
            }
            Err(fault) => self.sink.error(fault),
        }
    }

    /// Returns true if the subscriber no longer wants the outcome.
    ///
    /// Long-running operations may poll this to stop early.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.sink.is_stopped()
    }
}

impl<T> fmt::Debug for Callback<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback").finish_non_exhaustive()
    }
}

struct FromCallback<F> {
    start: F,
}

impl<T, F> Observable<T> for FromCallback<F>
where
    T: Send + 'static,
    F: Fn(Callback<T>) + Send + Sync + 'static,
{
    fn subscribe_core(&self, sink: Arc<Sink<T>>) -> Subscription {
        (self.start)(Callback { sink });
        Subscription::empty()
    }
}

/// Wraps an operation that reports its outcome through a callback.
///
/// `start` runs once per subscription and may complete the [`Callback`]
/// synchronously or hand it to another thread.
///
/// ```
/// use pushflow::bridge::{first, from_callback};
///
/// let answer = from_callback(|done| {
///     std::thread::spawn(move || done.complete(Ok(42)));
/// });
/// assert_eq!(first(&answer), Ok(42));
/// ```
#[must_use]
pub fn from_callback<T, F>(start: F) -> Seq<T>
where
    T: Send + 'static,
    F: Fn(Callback<T>) + Send + Sync + 'static,
{
    Seq::new(FromCallback { start })
}

impl<T: Send + 'static> Seq<T> {
    /// See [`from_callback`].
    #[must_use]
    pub fn from_callback<F>(start: F) -> Self
    where
        F: Fn(Callback<T>) + Send + Sync + 'static,
    {
        from_callback(start)
    }
}
