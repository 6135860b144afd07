//! The producer side of the contract.
//!
//! Every producer, from `Seq::just` to `switch_latest`, is a leaf type
//! implementing the one-method [`Observable`] trait. [`Seq`] is the
//! cloneable handle users hold; it carries the operator methods and performs
//! the part of `subscribe` that is the same for every producer: wrapping the
//! observer in a [`Sink`] and binding the producer's subscription to it.
//!
//! # Subscribe protocol
//!
//! ```text
//! seq.subscribe(observer):
//!   sink     ← Sink::new(observer)
//!   upstream ← producer.subscribe_core(sink)   // may emit synchronously
//!   sink.attach(upstream)                      // disposed at once if sink already finished
//!   return Subscription(dispose sink)
//! ```
//!
//! `subscribe` never blocks waiting for data. For a synchronous producer all
//! emissions may already have happened when it returns.

pub mod generators;

use crate::disposable::Subscription;
use crate::error::Fault;
use crate::observer::{FnObserver, Observer, Sink};
use core::fmt;
use std::sync::Arc;

/// A push-based producer.
///
/// `subscribe_core` performs the producer's setup and returns the handle
/// that releases whatever it started. It talks only to the sink; the sink
/// enforces ordering, single-terminal and disposal rules for it.
pub trait Observable<T>: Send + Sync + 'static {
    /// Starts producing into `sink`.
    fn subscribe_core(&self, sink: Arc<Sink<T>>) -> Subscription;
}

/// A cloneable handle to a producer.
///
/// Cloning shares the producer; each `subscribe` call creates independent
/// per-subscription state (cold semantics) unless the producer itself is hot.
pub struct Seq<T>(Arc<dyn Observable<T>>);

impl<T> Clone for Seq<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T> fmt::Debug for Seq<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Seq").finish()
    }
}

impl<T: Send + 'static> Seq<T> {
    /// Wraps a producer.
    #[must_use]
    pub fn new<O: Observable<T>>(producer: O) -> Self {
        Self(Arc::new(producer))
    }

    /// Wraps a shared producer.
    #[must_use]
    pub fn from_arc(producer: Arc<dyn Observable<T>>) -> Self {
        Self(producer)
    }

    /// Subscribes an observer.
    pub fn subscribe<O: Observer<T> + 'static>(&self, observer: O) -> Subscription {
        let sink = Sink::from_observer(observer);
        let upstream = self.0.subscribe_core(Arc::clone(&sink));
        sink.attach(upstream);
        Subscription::new(move || sink.dispose())
    }

    /// Subscribes with only a value callback.
    pub fn subscribe_fn<F>(&self, on_next: F) -> Subscription
    where
        F: FnMut(T) + Send + 'static,
    {
        self.subscribe(FnObserver::new(on_next))
    }

    /// Subscribes with all three callbacks.
    pub fn subscribe_all<N, E, C>(&self, on_next: N, on_error: E, on_completed: C) -> Subscription
    where
        N: FnMut(T) + Send + 'static,
        E: FnMut(Fault) + Send + 'static,
        C: FnMut() + Send + 'static,
    {
        self.subscribe(
            FnObserver::new(on_next)
                .with_on_error(on_error)
                .with_on_completed(on_completed),
        )
    }

    /// Creates a sequence from a subscribe function.
    ///
    /// The function receives the sink for one subscription and returns the
    /// handle that releases what it started.
    ///
    /// ```
    /// use pushflow::{Seq, Subscription};
    ///
    /// let seq = Seq::create(|sink| {
    ///     sink.next(1);
    ///     sink.next(2);
    ///     sink.completed();
    ///     Subscription::empty()
    /// });
    /// let seen = std::sync::Arc::new(parking_lot::Mutex::new(Vec::new()));
    /// let out = std::sync::Arc::clone(&seen);
    /// seq.subscribe_fn(move |v| out.lock().push(v));
    /// assert_eq!(*seen.lock(), vec![1, 2]);
    /// ```
    #[must_use]
    pub fn create<F>(subscribe: F) -> Self
    where
        F: Fn(Arc<Sink<T>>) -> Subscription + Send + Sync + 'static,
    {
        Self::new(Create { subscribe })
    }

    /// Creates a sequence whose producer is built per subscription.
    #[must_use]
    pub fn defer<F>(factory: F) -> Self
    where
        F: Fn() -> Self + Send + Sync + 'static,
    {
        Self::try_defer(move || Ok(factory()))
    }

    /// Like [`Seq::defer`], but a factory error is delivered as `on_error`.
    #[must_use]
    pub fn try_defer<F>(factory: F) -> Self
    where
        F: Fn() -> Result<Self, Fault> + Send + Sync + 'static,
    {
        Self::new(Defer { factory })
    }

    pub(crate) fn producer(&self) -> &Arc<dyn Observable<T>> {
        &self.0
    }
}

struct Create<F> {
    subscribe: F,
}

impl<T, F> Observable<T> for Create<F>
where
    T: Send + 'static,
    F: Fn(Arc<Sink<T>>) -> Subscription + Send + Sync + 'static,
{
    fn subscribe_core(&self, sink: Arc<Sink<T>>) -> Subscription {
        (self.subscribe)(sink)
    }
}

struct Defer<F> {
    factory: F,
}

impl<T, F> Observable<T> for Defer<F>
where
    T: Send + 'static,
    F: Fn() -> Result<Seq<T>, Fault> + Send + Sync + 'static,
{
    fn subscribe_core(&self, sink: Arc<Sink<T>>) -> Subscription {
        match (self.factory)() {
            Ok(seq) => seq.producer().subscribe_core(sink),
            Err(fault) => {
                sink.error(fault);
                Subscription::empty()
            }
        }
    }
}
