//! Reified sequence events.
//!
//! A [`Notification`] is one observer call turned into a value: `Next(v)`,
//! `Error(fault)` or `Completed`. Recording harnesses store them, and the
//! `materialize` / `dematerialize` operators convert between a live sequence
//! and a sequence of notifications.

use crate::error::Fault;
use crate::observer::Observer;
use core::fmt;

/// One observer call as an immutable value.
///
/// Equality is structural: `Next(a) == Next(b)` iff `a == b`; faults compare
/// with [`Fault`]'s structural equality.
#[derive(Clone, PartialEq)]
pub enum Notification<T> {
    /// A value.
    Next(T),
    /// Terminal failure.
    Error(Fault),
    /// Terminal success.
    Completed,
}

impl<T> Notification<T> {
    /// Returns true for `Error` and `Completed`.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::Next(_))
    }

    /// Returns true if this is `Next`.
    #[must_use]
    pub const fn is_next(&self) -> bool {
        matches!(self, Self::Next(_))
    }

    /// Returns the carried value, if any.
    #[must_use]
    pub const fn value(&self) -> Option<&T> {
        match self {
            Self::Next(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the carried fault, if any.
    #[must_use]
    pub const fn fault(&self) -> Option<&Fault> {
        match self {
            Self::Error(f) => Some(f),
            _ => None,
        }
    }

    /// Maps the value of a `Next` notification.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Notification<U> {
        match self {
            Self::Next(v) => Notification::Next(f(v)),
            Self::Error(e) => Notification::Error(e),
            Self::Completed => Notification::Completed,
        }
    }

    /// Delivers this notification to an observer.
    pub fn accept<O: Observer<T> + ?Sized>(self, observer: &mut O) {
        match self {
            Self::Next(v) => observer.on_next(v),
            Self::Error(e) => observer.on_error(e),
            Self::Completed => observer.on_completed(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Notification<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Next(v) => write!(f, "OnNext({v:?})"),
            Self::Error(e) => write!(f, "OnError({e})"),
            Self::Completed => write!(f, "OnCompleted"),
        }
    }
}
