//! Ordered tap storage.
//!
//! [`TapRegistry::insert`] places each new tap at the rightmost position
//! allowed by its `before` and `stage` constraints, scanning backward from
//! the end:
//!
//! 1. An existing tap named in `before` is passed over and struck off the set.
//! 2. While names remain in the set, every tap is passed over.
//! 3. Otherwise taps in a later stage are passed over.
//! 4. The first tap left is where the scan stops; the new tap goes after it.
//!
//! Constraints are applied only at insertion. A `before` naming a tap that is
//! registered later has no effect.

use core::fmt;

use hashbrown::HashSet;

use crate::tap::Tap;

/// The ordered taps of one hook.
pub struct TapRegistry<A, R> {
    taps: Vec<Tap<A, R>>,
}

impl<A, R> TapRegistry<A, R> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self { taps: Vec::new() }
    }

    /// Inserts a tap, returning the position it landed at.
    pub fn insert(&mut self, tap: Tap<A, R>) -> usize {
        let index = self.position_for(&tap);
        tracing::trace!(tap = tap.name(), index, stage = tap.stage(), "tap inserted");
        self.taps.insert(index, tap);
        index
    }

    fn position_for(&self, tap: &Tap<A, R>) -> usize {
        let mut before: HashSet<&str> = tap.before().iter().map(String::as_str).collect();
        let mut index = self.taps.len();

        while index > 0 {
            let existing = &self.taps[index - 1];
            if before.remove(existing.name())
                || !before.is_empty()
                || existing.stage() > tap.stage()
            {
                index -= 1;
                continue;
            }
            break;
        }
        index
    }

    /// Returns the taps in execution order.
    #[must_use]
    pub fn as_slice(&self) -> &[Tap<A, R>] {
        &self.taps
    }

    /// Iterates the taps in execution order.
    pub fn iter(&self) -> core::slice::Iter<'_, Tap<A, R>> {
        self.taps.iter()
    }

    /// Returns the tap names in execution order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.taps.iter().map(Tap::name).collect()
    }

    /// Returns the number of taps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.taps.len()
    }

    /// Returns `true` if no tap is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.taps.is_empty()
    }
}

impl<A, R> Default for TapRegistry<A, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A, R> Clone for TapRegistry<A, R> {
    fn clone(&self) -> Self {
        Self {
            taps: self.taps.clone(),
        }
    }
}

impl<A, R> fmt::Debug for TapRegistry<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.taps.iter().map(Tap::name)).finish()
    }
}

impl<'a, A, R> IntoIterator for &'a TapRegistry<A, R> {
    type Item = &'a Tap<A, R>;
    type IntoIter = core::slice::Iter<'a, Tap<A, R>>;

    fn into_iter(self) -> Self::IntoIter {
        self.taps.iter()
    }
}
