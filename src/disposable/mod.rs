//! Idempotent cancellation handles.
//!
//! Disposal is the only cancellation mechanism in pushflow: there is no
//! separate token. Every handle here obeys one rule: disposing it N times runs
//! its cleanup at most once, from whichever caller wins the race.
//!
//! - [`Subscription`]: the handle returned by `subscribe` and `schedule`
//! - [`SubscriptionGuard`]: disposes on drop
//! - [`CompositeDisposable`]: a disposable group
//! - [`SerialDisposable`]: a swappable slot; replacing disposes the previous
//! - [`SingleAssignmentDisposable`]: a write-once slot that may be disposed
//!   before it is filled

pub mod composite;
pub mod serial;
pub mod single_assignment;
pub mod subscription;

pub use composite::{CompositeDisposable, MemberKey};
pub use serial::SerialDisposable;
pub use single_assignment::SingleAssignmentDisposable;
pub use subscription::{Subscription, SubscriptionGuard};

/// Anything that can be disposed.
///
/// All implementations are idempotent and callable from any thread,
/// including from inside an observer callback of the sequence being disposed.
pub trait Disposable: Send + Sync {
    /// Runs the cleanup if it has not run yet.
    fn dispose(&self);

    /// Returns true once `dispose` has been called.
    fn is_disposed(&self) -> bool;
}
