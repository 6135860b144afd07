//! Pushflow: push-based asynchronous sequences with deterministic virtual-time testing.
//!
//! # Overview
//!
//! A sequence ([`Seq`]) is a producer that pushes values to an [`Observer`]
//! until it ends with exactly one terminal notification: an error carrying a
//! [`Fault`], or completion. Subscribing returns a [`Subscription`]; disposing
//! it is the only cancellation signal and stops delivery no later than the
//! next would-be notification.
//!
//! # Core Guarantees
//!
//! - **Serialized delivery**: observer calls never overlap, even when the
//!   sources of one operator push from several threads at once
//! - **Single terminal**: at most one of `on_error` / `on_completed` reaches an
//!   observer, and nothing follows it
//! - **Disposal stops emission**: after `dispose` returns, the observer sees nothing more
//! - **Resource release**: a terminal notification releases every upstream
//!   subscription the operator holds, siblings included
//! - **Deterministic testing**: [`lab::VirtualTimeScheduler`] runs scheduled
//!   work on a simulated clock with stable tie-breaking, and records the
//!   subscribe/dispose window of every test source
//!
//! # Module Structure
//!
//! - [`types`]: `Time` and `Notification`
//! - [`error`]: library errors and the `Fault` payload of `on_error`
//! - [`disposable`]: subscription handles and their containers
//! - [`observer`]: the consumer contract and the contract-enforcing `Sink`
//! - [`observable`]: the producer contract, `Seq`, and plain generators
//! - [`scheduler`]: immediate, trampoline and thread-pool schedulers
//! - [`combinator`]: concat, merge, switch, amb, zip, combine-latest, catch, repeat/retry, and friends
//! - [`lab`]: virtual-time scheduler, hot/cold test sources, recording observer
//! - [`bridge`]: blocking iteration and callback-style async adapters
//!
//! # Example
//!
//! ```
//! use pushflow::lab::{on_completed, on_next, subscribed, VirtualTimeScheduler};
//!
//! let vts = VirtualTimeScheduler::new();
//! let xs = vts.create_hot_observable(vec![on_next(210, 1), on_next(240, 2), on_completed(300)]);
//! let ys = vts.create_hot_observable(vec![on_next(220, 10), on_completed(260)]);
//! let (a, b) = (xs.seq(), ys.seq());
//!
//! let observer = vts.start(move || a.merge_with(&b)).unwrap();
//!
//! assert_eq!(
//!     observer.messages(),
//!     vec![on_next(210, 1), on_next(220, 10), on_next(240, 2), on_completed(300)]
//! );
//! assert_eq!(ys.subscriptions(), vec![subscribed(200, 260)]);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::should_implement_trait)]

pub mod bridge;
pub mod combinator;
pub mod disposable;
pub mod error;
pub mod lab;
pub mod observable;
pub mod observer;
pub mod scheduler;
pub mod tracing_compat;
pub mod types;

#[cfg(test)]
pub(crate) mod test_utils;

// Re-exports for convenient access to core types
pub use disposable::{
    CompositeDisposable, Disposable, SerialDisposable, SingleAssignmentDisposable, Subscription,
    SubscriptionGuard,
};
pub use error::{Error, ErrorCategory, ErrorKind, Fault, Result};
pub use observable::{Observable, Seq};
pub use observer::{BoxObserver, FnObserver, Observer, Sink};
pub use scheduler::{
    ImmediateScheduler, PoolConfig, PoolScheduler, Scheduler, SchedulerRef, TrampolineScheduler,
};
pub use types::{Notification, Time};
