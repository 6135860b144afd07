//! Scheduler clock instants.

use core::fmt;
use std::ops::Add;
use std::time::Duration;

/// An instant on a scheduler clock, in integer ticks.
///
/// On wall-clock schedulers one tick is one nanosecond since the scheduler's
/// epoch. On the virtual-time scheduler ticks are whatever the test says they
/// are; `Duration` delays convert at one tick per nanosecond.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Time(u64);

impl Time {
    /// The zero instant (epoch).
    pub const ZERO: Self = Self(0);

    /// The maximum representable instant.
    pub const MAX: Self = Self(u64::MAX);

    /// Creates a time from a raw tick count.
    #[must_use]
    pub const fn from_ticks(ticks: u64) -> Self {
        Self(ticks)
    }

    /// Returns the raw tick count.
    #[must_use]
    pub const fn ticks(self) -> u64 {
        self.0
    }

    /// Adds a number of ticks, saturating on overflow.
    #[must_use]
    pub const fn saturating_add_ticks(self, ticks: u64) -> Self {
        Self(self.0.saturating_add(ticks))
    }

    /// Returns the number of ticks from `earlier` to `self`, or 0 if `self`
    /// is not later.
    #[must_use]
    pub const fn ticks_since(self, earlier: Self) -> u64 {
        self.0.saturating_sub(earlier.0)
    }

    /// Converts a delay into ticks (one tick per nanosecond).
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn ticks_of(delay: Duration) -> u64 {
        delay.as_nanos().min(u128::from(u64::MAX)) as u64
    }
}

impl Add<Duration> for Time {
    type Output = Self;

    fn add(self, rhs: Duration) -> Self::Output {
        self.saturating_add_ticks(Self::ticks_of(rhs))
    }
}

impl From<u64> for Time {
    fn from(ticks: u64) -> Self {
        Self(ticks)
    }
}

impl fmt::Debug for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
