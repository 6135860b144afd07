//! Closure-backed observers.

use super::Observer;
use crate::error::Fault;
use crate::tracing_compat::warn;

type NextFn<T> = Box<dyn FnMut(T) + Send>;
type ErrorFn = Box<dyn FnMut(Fault) + Send>;
type CompletedFn = Box<dyn FnMut() + Send>;

/// An observer assembled from closures.
///
/// Any callback not supplied is a no-op. A fault reaching an observer without
/// an error callback is logged at `warn` level, since nothing else will see it.
///
/// ```
/// use pushflow::observer::FnObserver;
/// use pushflow::Seq;
///
/// let seen = std::sync::Arc::new(parking_lot::Mutex::new(Vec::new()));
/// let sink = std::sync::Arc::clone(&seen);
/// Seq::range(1, 3).subscribe(
///     FnObserver::new(move |v| sink.lock().push(v)).with_on_completed(|| {}),
/// );
/// assert_eq!(*seen.lock(), vec![1, 2, 3]);
/// ```
pub struct FnObserver<T> {
    next: NextFn<T>,
    error: Option<ErrorFn>,
    completed: Option<CompletedFn>,
}

impl<T> FnObserver<T> {
    /// Creates an observer with only a value callback.
    #[must_use]
    pub fn new<F>(on_next: F) -> Self
    where
        F: FnMut(T) + Send + 'static,
    {
        Self {
            next: Box::new(on_next),
            error: None,
            completed: None,
        }
    }

    /// Creates an observer that ignores everything.
    #[must_use]
    pub fn ignore() -> Self {
        Self::new(|_| {}).with_on_error(|_| {})
    }

    /// Sets the error callback.
    #[must_use]
    pub fn with_on_error<F>(mut self, on_error: F) -> Self
    where
        F: FnMut(Fault) + Send + 'static,
    {
        self.error = Some(Box::new(on_error));
        self
    }

    /// Sets the completion callback.
    #[must_use]
    pub fn with_on_completed<F>(mut self, on_completed: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        self.completed = Some(Box::new(on_completed));
        self
    }
}

impl<T> Observer<T> for FnObserver<T> {
    fn on_next(&mut self, value: T) {
        (self.next)(value);
    }

    fn on_error(&mut self, fault: Fault) {
        match self.error.as_mut() {
            Some(on_error) => on_error(fault),
            None => warn!(fault = %fault, "unhandled fault reached observer without error callback"),
        }
    }

    fn on_completed(&mut self) {
        if let Some(on_completed) = self.completed.as_mut() {
            on_completed();
        }
    }
}

impl<T> std::fmt::Debug for FnObserver<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnObserver")
            .field("has_error", &self.error.is_some())
            .field("has_completed", &self.completed.is_some())
            .finish()
    }
}
