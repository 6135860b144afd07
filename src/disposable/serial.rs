//! A swappable disposal slot.

use super::{Disposable, Subscription};
use parking_lot::Mutex;

#[derive(Debug, Default)]
struct SerialState {
    current: Option<Subscription>,
    disposed: bool,
}

/// Holds at most one subscription; replacing it disposes the previous one.
///
/// Used wherever an operator moves from one upstream to the next (switch,
/// concat, catch, repeat). Once the slot itself is disposed, anything later
/// assigned to it is disposed on assignment.
#[derive(Debug, Default)]
pub struct SerialDisposable {
    state: Mutex<SerialState>,
}

impl SerialDisposable {
    /// Creates an empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the current subscription, disposing the previous one.
    pub fn set(&self, sub: Subscription) {
        let previous = {
            let mut state = self.state.lock();
            if state.disposed {
                None
            } else {
                Some(state.current.replace(sub.clone()))
            }
        };
        match previous {
            None => sub.dispose(),
            Some(Some(old)) => old.dispose(),
            Some(None) => {}
        }
    }

    /// Disposes the current subscription without disposing the slot.
    pub fn clear(&self) {
        let old = self.state.lock().current.take();
        if let Some(old) = old {
            old.dispose();
        }
    }

    /// Disposes the slot and its current subscription.
    pub fn dispose(&self) {
        let old = {
            let mut state = self.state.lock();
            state.disposed = true;
            state.current.take()
        };
        if let Some(old) = old {
            old.dispose();
        }
    }

    /// Returns true once the slot has been disposed.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.state.lock().disposed
    }
}

impl Disposable for SerialDisposable {
    fn dispose(&self) {
        Self::dispose(self);
    }

    fn is_disposed(&self) -> bool {
        Self::is_disposed(self)
    }
}
