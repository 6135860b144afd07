//! A group of subscriptions disposed together.

use super::{Disposable, Subscription};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Key returned by [`CompositeDisposable::add`], used to remove one member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemberKey(u64);

/// A disposable group.
///
/// Combinators keep every live upstream subscription in one of these so that
/// a terminal transition can release all of them in one call. Adding to a
/// group that is already disposed disposes the new member immediately.
#[derive(Debug, Default)]
pub struct CompositeDisposable {
    disposed: AtomicBool,
    next_key: AtomicU64,
    members: Mutex<Vec<(MemberKey, Subscription)>>,
}

impl CompositeDisposable {
    /// Creates an empty group.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a member, returning its key.
    pub fn add(&self, sub: Subscription) -> MemberKey {
        let key = MemberKey(self.next_key.fetch_add(1, Ordering::Relaxed));
        {
            let mut members = self.members.lock();
            if !self.disposed.load(Ordering::Acquire) {
                members.push((key, sub));
                return key;
            }
        }
        sub.dispose();
        key
    }

    /// Removes and disposes one member. Returns false if it was not present.
    pub fn remove(&self, key: MemberKey) -> bool {
        let removed = {
            let mut members = self.members.lock();
            members
                .iter()
                .position(|(k, _)| *k == key)
                .map(|idx| members.swap_remove(idx).1)
        };
        match removed {
            Some(sub) => {
                sub.dispose();
                true
            }
            None => false,
        }
    }

    /// Returns the number of live members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.lock().len()
    }

    /// Returns true if the group has no live members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Disposes every member; later additions are disposed on arrival.
    pub fn dispose(&self) {
        let members = {
            let mut members = self.members.lock();
            if self.disposed.swap(true, Ordering::AcqRel) {
                return;
            }
            std::mem::take(&mut *members)
        };
        for (_, sub) in members {
            sub.dispose();
        }
    }

    /// Returns true once the group has been disposed.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }
}

impl Disposable for CompositeDisposable {
    fn dispose(&self) {
        Self::dispose(self);
    }

    fn is_disposed(&self) -> bool {
        Self::is_disposed(self)
    }
}
