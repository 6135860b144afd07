//! The basic disposal handle.

use super::Disposable;
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

type Cleanup = Box<dyn FnOnce() + Send>;

struct Inner {
    disposed: AtomicBool,
    cleanup: Mutex<Option<Cleanup>>,
}

/// A cloneable, idempotent disposal handle.
///
/// Clones share state: disposing any clone disposes all of them. Dropping a
/// `Subscription` does **not** dispose it; use [`Subscription::guard`] for
/// scope-bound disposal.
#[derive(Clone, Default)]
pub struct Subscription {
    inner: Option<Arc<Inner>>,
}

impl Subscription {
    /// Creates a handle that runs `cleanup` on first dispose.
    #[must_use]
    pub fn new<F>(cleanup: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            inner: Some(Arc::new(Inner {
                disposed: AtomicBool::new(false),
                cleanup: Mutex::new(Some(Box::new(cleanup))),
            })),
        }
    }

    /// Creates a handle with no cleanup that still tracks whether it was
    /// disposed.
    #[must_use]
    pub fn flag() -> Self {
        Self::new(|| {})
    }

    /// Creates a handle that does nothing and never reports disposed.
    #[must_use]
    pub const fn empty() -> Self {
        Self { inner: None }
    }

    /// Wraps any shared [`Disposable`].
    #[must_use]
    pub fn from_disposable<D: Disposable + 'static>(disposable: Arc<D>) -> Self {
        Self::new(move || disposable.dispose())
    }

    /// Runs the cleanup if no clone has run it yet.
    pub fn dispose(&self) {
        let Some(inner) = &self.inner else {
            return;
        };
        if inner
            .disposed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            // Take the cleanup out so it runs without the lock held; it may
            // dispose other handles that share this one.
            let cleanup = inner.cleanup.lock().take();
            if let Some(cleanup) = cleanup {
                cleanup();
            }
        }
    }

    /// Returns true once any clone has been disposed.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.inner
            .as_ref()
            .is_some_and(|inner| inner.disposed.load(Ordering::Acquire))
    }

    /// Converts into a guard that disposes when dropped.
    #[must_use]
    pub fn guard(self) -> SubscriptionGuard {
        SubscriptionGuard { inner: Some(self) }
    }
}

impl Disposable for Subscription {
    fn dispose(&self) {
        Self::dispose(self);
    }

    fn is_disposed(&self) -> bool {
        Self::is_disposed(self)
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("empty", &self.inner.is_none())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

/// Disposes the wrapped subscription when dropped.
#[derive(Debug)]
#[must_use = "dropping the guard disposes the subscription immediately"]
pub struct SubscriptionGuard {
    inner: Option<Subscription>,
}

impl SubscriptionGuard {
    /// Releases the subscription without disposing it.
    pub fn into_inner(mut self) -> Subscription {
        self.inner.take().unwrap_or_default()
    }
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        if let Some(sub) = self.inner.take() {
            sub.dispose();
        }
    }
}
