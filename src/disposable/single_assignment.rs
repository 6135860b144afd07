//! A write-once disposal slot.

use super::{Disposable, Subscription};
use crate::error::{Error, Result};
use parking_lot::Mutex;

#[derive(Debug, Default)]
enum Slot {
    #[default]
    Empty,
    Assigned(Subscription),
    Disposed,
}

/// A slot assigned at most once, which may be disposed before assignment.
///
/// `subscribe` can deliver notifications (and therefore trigger disposal)
/// before it returns the handle to store. Disposing the slot early makes the
/// eventual assignment dispose its value on arrival.
#[derive(Debug, Default)]
pub struct SingleAssignmentDisposable {
    slot: Mutex<Slot>,
}

impl SingleAssignmentDisposable {
    /// Creates an unassigned slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns the subscription.
    ///
    /// If the slot was disposed first, `sub` is disposed immediately and the
    /// call still succeeds. A second assignment is rejected; the rejected
    /// value is disposed.
    pub fn set(&self, sub: Subscription) -> Result<()> {
        let outcome = {
            let mut slot = self.slot.lock();
            match &*slot {
                Slot::Empty => {
                    *slot = Slot::Assigned(sub.clone());
                    Ok(false)
                }
                Slot::Disposed => Ok(true),
                Slot::Assigned(_) => Err(()),
            }
        };
        match outcome {
            Ok(false) => Ok(()),
            Ok(true) => {
                sub.dispose();
                Ok(())
            }
            Err(()) => {
                sub.dispose();
                Err(Error::invalid_state(
                    "single-assignment disposable assigned twice",
                ))
            }
        }
    }

    /// Returns true if a value has been assigned (or the slot was disposed).
    #[must_use]
    pub fn is_assigned(&self) -> bool {
        !matches!(*self.slot.lock(), Slot::Empty)
    }

    /// Disposes the slot and any assigned value.
    pub fn dispose(&self) {
        let previous = std::mem::replace(&mut *self.slot.lock(), Slot::Disposed);
        if let Slot::Assigned(sub) = previous {
            sub.dispose();
        }
    }

    /// Returns true once the slot has been disposed.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        matches!(*self.slot.lock(), Slot::Disposed)
    }
}

impl Disposable for SingleAssignmentDisposable {
    fn dispose(&self) {
        Self::dispose(self);
    }

    fn is_disposed(&self) -> bool {
        Self::is_disposed(self)
    }
}
