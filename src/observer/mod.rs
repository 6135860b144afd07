//! The consumer side of the contract.
//!
//! An [`Observer`] receives zero or more `on_next` calls followed by at most
//! one of `on_error` / `on_completed`. Observers never see concurrent or
//! overlapping calls and never see anything after a terminal call or after
//! the subscription is disposed: the [`Sink`] each observer is wrapped in at
//! subscribe time enforces that, whatever the producer does.
//!
//! Observers that only care about some callbacks use [`FnObserver`], which
//! fills the missing slots with no-op defaults.

pub mod callback;
pub mod sink;

pub use callback::FnObserver;
pub use sink::Sink;

use crate::error::Fault;

/// A consumer of a push sequence.
///
/// Panics raised inside these methods are not intercepted; they unwind out
/// of whichever call delivered the notification (typically a scheduler drive
/// loop).
pub trait Observer<T>: Send {
    /// Receives the next value.
    fn on_next(&mut self, value: T);

    /// Receives a terminal failure.
    fn on_error(&mut self, fault: Fault);

    /// Receives terminal success.
    fn on_completed(&mut self);
}

/// A boxed observer.
pub type BoxObserver<T> = Box<dyn Observer<T>>;

impl<T, O: Observer<T> + ?Sized> Observer<T> for Box<O> {
    fn on_next(&mut self, value: T) {
        (**self).on_next(value);
    }

    fn on_error(&mut self, fault: Fault) {
        (**self).on_error(fault);
    }

    fn on_completed(&mut self) {
        (**self).on_completed();
    }
}
