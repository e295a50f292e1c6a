//! Per-invocation context shared by context taps.
//!
//! Taps registered through the `*_with_context` methods receive a
//! [`TapContext`] as their leading parameter. One context is allocated for
//! each invocation whose plan contains a context tap, and it is dropped when
//! the invocation ends. Values never leak from one call into the next.

use core::any::{Any, TypeId};
use core::fmt;
use std::sync::Arc;

use hashbrown::HashMap;
use parking_lot::Mutex;

/// A type-keyed value bag threaded through every tap of one invocation.
///
/// Cloning is cheap and yields a handle to the same storage, so a promise
/// tap can move a clone into its future.
///
/// # Example
///
/// ```
/// use hookline_tap::context::TapContext;
///
/// #[derive(Clone, Debug, PartialEq)]
/// struct Visited(Vec<&'static str>);
///
/// let ctx = TapContext::new();
/// ctx.insert(Visited(vec!["parse"]));
/// ctx.with_mut(|visited: &mut Visited| visited.0.push("emit"));
///
/// assert_eq!(ctx.get::<Visited>(), Some(Visited(vec!["parse", "emit"])));
/// ```
#[derive(Clone, Default)]
pub struct TapContext {
    values: Arc<Mutex<HashMap<TypeId, Box<dyn Any + Send>>>>,
}

impl TapContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a value, returning the previous value of the same type.
    pub fn insert<T: Any + Send>(&self, value: T) -> Option<T> {
        self.values
            .lock()
            .insert(TypeId::of::<T>(), Box::new(value))
            .and_then(|previous| previous.downcast::<T>().ok())
            .map(|previous| *previous)
    }

    /// Returns a clone of the stored value of type `T`.
    #[must_use]
    pub fn get<T: Any + Send + Clone>(&self) -> Option<T> {
        self.values
            .lock()
            .get(&TypeId::of::<T>())
            .and_then(|value| value.downcast_ref::<T>())
            .cloned()
    }

    /// Runs `f` on the stored value of type `T`.
    ///
    /// The context is locked while `f` runs; `f` must not touch the same
    /// context again.
    pub fn with_mut<T: Any + Send, U>(&self, f: impl FnOnce(&mut T) -> U) -> Option<U> {
        let mut values = self.values.lock();
        values
            .get_mut(&TypeId::of::<T>())
            .and_then(|value| value.downcast_mut::<T>())
            .map(f)
    }

    /// Returns `true` if a value of type `T` is stored.
    #[must_use]
    pub fn contains<T: Any + Send>(&self) -> bool {
        self.values.lock().contains_key(&TypeId::of::<T>())
    }

    /// Removes and returns the stored value of type `T`.
    pub fn remove<T: Any + Send>(&self) -> Option<T> {
        self.values
            .lock()
            .remove(&TypeId::of::<T>())
            .and_then(|value| value.downcast::<T>().ok())
            .map(|value| *value)
    }

    /// Returns the number of stored values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.lock().len()
    }

    /// Returns `true` if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.lock().is_empty()
    }
}

impl fmt::Debug for TapContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TapContext")
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_replaces_by_type() {
        let ctx = TapContext::new();
        assert_eq!(ctx.insert(1_u32), None);
        assert_eq!(ctx.insert(2_u32), Some(1));
        assert_eq!(ctx.insert(String::from("x")), None);
        assert_eq!(ctx.len(), 2);
    }

    #[test]
    fn clones_share_storage() {
        let ctx = TapContext::new();
        let handle = ctx.clone();
        handle.insert(5_i64);

        assert!(ctx.contains::<i64>());
        assert_eq!(ctx.remove::<i64>(), Some(5));
        assert!(handle.is_empty());
    }

    #[test]
    fn with_mut_on_missing_value() {
        let ctx = TapContext::new();
        assert_eq!(ctx.with_mut(|n: &mut u8| *n += 1), None);
    }
}
