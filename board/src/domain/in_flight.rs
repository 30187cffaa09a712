//! Per-key in-flight guards.
//!
//! The board runs on a single thread, so handlers only interleave at await
//! points. A guard taken before the first await and held until the handler
//! finishes serialises work per key: a second attempt for the same key is
//! refused while the first is still outstanding.

use std::cell::RefCell;
use std::collections::HashSet;
use std::hash::Hash;

/// Set of keys with work outstanding.
#[derive(Debug)]
pub struct InFlight<K> {
    active: RefCell<HashSet<K>>,
}

impl<K> Default for InFlight<K> {
    fn default() -> Self {
        Self {
            active: RefCell::new(HashSet::new()),
        }
    }
}

impl<K: Eq + Hash + Clone> InFlight<K> {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `key` busy; `None` when it already is.
    ///
    /// # Examples
    /// ```
    /// use board::domain::InFlight;
    ///
    /// let guards = InFlight::new();
    /// let first = guards.try_acquire(&"a");
    /// assert!(first.is_some());
    /// assert!(guards.try_acquire(&"a").is_none());
    /// drop(first);
    /// assert!(guards.try_acquire(&"a").is_some());
    /// ```
    pub fn try_acquire(&self, key: &K) -> Option<InFlightGuard<'_, K>> {
        let inserted = self.active.borrow_mut().insert(key.clone());
        inserted.then(|| InFlightGuard {
            owner: self,
            key: key.clone(),
        })
    }

    /// Whether `key` is busy.
    pub fn contains(&self, key: &K) -> bool {
        self.active.borrow().contains(key)
    }

    /// Number of busy keys.
    pub fn len(&self) -> usize {
        self.active.borrow().len()
    }

    /// Whether nothing is busy.
    pub fn is_empty(&self) -> bool {
        self.active.borrow().is_empty()
    }
}

/// Releases its key when dropped, whichever way the handler finished.
#[derive(Debug)]
pub struct InFlightGuard<'a, K: Eq + Hash> {
    owner: &'a InFlight<K>,
    key: K,
}

impl<K: Eq + Hash> Drop for InFlightGuard<'_, K> {
    fn drop(&mut self) {
        self.owner.active.borrow_mut().remove(&self.key);
    }
}
