//! Hooks created on demand per key.

use core::fmt;
use core::hash::Hash;
use std::sync::Arc;

use hashbrown::HashMap;
use hookline_tap::error::HookError;
use hookline_tap::options::TapOptions;
use hookline_tap::tap::{IntoTapOutput, TapCallback};
use parking_lot::RwLock;

use crate::tapable::Tapable;

/// Rewrites hooks as a [`HookMap`] creates them.
///
/// Implemented for any `Fn(&K, H) -> H`.
pub trait HookMapInterceptor<K, H>: Send + Sync + 'static {
    /// Returns the hook to store for `key`, given the freshly created `hook`.
    fn factory(&self, key: &K, hook: H) -> H;
}

impl<K, H, F> HookMapInterceptor<K, H> for F
where
    F: Fn(&K, H) -> H + Send + Sync + 'static,
{
    fn factory(&self, key: &K, hook: H) -> H {
        self(key, hook)
    }
}

type HookFactory<K, H> = Box<dyn Fn(&K) -> Result<H, HookError> + Send + Sync>;

/// A keyed collection of hooks that creates each hook on first use.
///
/// # Example
///
/// ```
/// use hookline_hooks::prelude::*;
///
/// let by_ext = HookMap::new(|_ext: &String| SyncBailHook::<(String,), String>::new(["path"]));
/// by_ext.tap("js".to_owned(), "javascript", |(path,)| Some(format!("js:{path}")))?;
///
/// let hook = by_ext.get(&"js".to_owned()).expect("created by tap");
/// assert_eq!(hook.call(("a.js".into(),))?, Some("js:a.js".to_owned()));
/// assert!(by_ext.get(&"css".to_owned()).is_none());
/// # Ok::<(), HookError>(())
/// ```
pub struct HookMap<K, H> {
    hooks: RwLock<HashMap<K, Arc<H>>>,
    factory: HookFactory<K, H>,
    interceptors: RwLock<Vec<Arc<dyn HookMapInterceptor<K, H>>>>,
}

impl<K, H> HookMap<K, H>
where
    K: Eq + Hash + Clone + 'static,
    H: Tapable + 'static,
{
    /// Creates an empty map that builds hooks with `factory`.
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn(&K) -> Result<H, HookError> + Send + Sync + 'static,
    {
        Self {
            hooks: RwLock::new(HashMap::new()),
            factory: Box::new(factory),
            interceptors: RwLock::new(Vec::new()),
        }
    }

    /// Returns the hook for `key` if it was already created.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<Arc<H>> {
        self.hooks.read().get(key).cloned()
    }

    /// Returns the hook for `key`, creating it first if needed.
    ///
    /// Interceptors added with [`intercept`](Self::intercept) see every hook
    /// created after they were added, in the order they were added.
    pub fn for_key(&self, key: K) -> Result<Arc<H>, HookError> {
        if let Some(hook) = self.get(&key) {
            return Ok(hook);
        }

        let mut hook = (self.factory)(&key)?;
        let interceptors = self.interceptors.read().clone();
        for interceptor in &interceptors {
            hook = interceptor.factory(&key, hook);
        }

        // Another thread may have created the hook in the meantime; the first
        // one stored wins.
        let mut hooks = self.hooks.write();
        let hook = hooks.entry(key).or_insert_with(|| Arc::new(hook));
        Ok(Arc::clone(hook))
    }

    /// Registers a synchronous tap on the hook for `key`.
    pub fn tap<F, O>(&self, key: K, options: impl Into<TapOptions>, f: F) -> Result<(), HookError>
    where
        F: Fn(H::Args) -> O + Send + Sync + 'static,
        O: IntoTapOutput<H::Result>,
    {
        self.for_key(key)?.tap(options, f)
    }

    /// Registers a callback-convention tap on the hook for `key`.
    pub fn tap_async<F>(&self, key: K, options: impl Into<TapOptions>, f: F) -> Result<(), HookError>
    where
        F: Fn(H::Args, TapCallback<H::Result>) + Send + Sync + 'static,
    {
        self.for_key(key)?.tap_async(options, f)
    }

    /// Registers a promise-convention tap on the hook for `key`.
    pub fn tap_promise<F, Fut>(
        &self,
        key: K,
        options: impl Into<TapOptions>,
        f: F,
    ) -> Result<(), HookError>
    where
        F: Fn(H::Args) -> Fut + Send + Sync + 'static,
        Fut: Future + Send + 'static,
        Fut::Output: IntoTapOutput<H::Result>,
    {
        self.for_key(key)?.tap_promise(options, f)
    }

    /// Adds an interceptor applied to hooks created from now on.
    pub fn intercept(&self, interceptor: impl HookMapInterceptor<K, H>) {
        self.interceptors.write().push(Arc::new(interceptor));
    }

    /// Returns the keys that have a hook.
    #[must_use]
    pub fn keys(&self) -> Vec<K> {
        self.hooks.read().keys().cloned().collect()
    }

    /// Returns the number of created hooks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.hooks.read().len()
    }

    /// Returns `true` if no hook has been created yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hooks.read().is_empty()
    }
}

impl<K: fmt::Debug + 'static, H: 'static> fmt::Debug for HookMap<K, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hooks = self.hooks.read();
        f.debug_struct("HookMap")
            .field("keys", &hooks.keys().collect::<Vec<_>>())
            .field("interceptors", &self.interceptors.read().len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::{SyncHook, SyncWaterfallHook};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn creates_once_per_key() {
        let created = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&created);
        let map = HookMap::new(move |_key: &&'static str| {
            counter.fetch_add(1, Ordering::SeqCst);
            SyncHook::<(u8,)>::new(["n"])
        });

        let first = map.for_key("a").expect("factory should succeed");
        let again = map.for_key("a").expect("factory should succeed");
        map.for_key("b").expect("factory should succeed");

        assert!(Arc::ptr_eq(&first, &again));
        assert_eq!(created.load(Ordering::SeqCst), 2);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn get_does_not_create() {
        let map = HookMap::new(|_key: &u32| SyncHook::<()>::new(Vec::<String>::new()));
        assert!(map.get(&1).is_none());
        assert!(map.is_empty());
    }

    #[test]
    fn factory_errors_propagate() {
        let map = HookMap::new(|_key: &u32| SyncWaterfallHook::<(u8,)>::new(Vec::<String>::new()));
        let err = map
            .tap(1, "t", |(n,)| Some(n))
            .expect_err("waterfall hooks need an argument");
        assert!(matches!(err, HookError::InsufficientArguments { .. }));
        assert!(map.is_empty());
    }

    #[test]
    fn interceptors_see_later_hooks_only() {
        let map = HookMap::new(|_key: &u32| SyncHook::<(u8,)>::new(["n"]));
        map.for_key(1).expect("factory should succeed");

        map.intercept(|key: &u32, hook: SyncHook<(u8,)>| hook.with_name(format!("hook-{key}")));
        let named = map.for_key(2).expect("factory should succeed");
        let unnamed = map.for_key(1).expect("factory should succeed");

        assert_eq!(named.core().name(), Some("hook-2"));
        assert_eq!(unnamed.core().name(), None);

        let mut keys = map.keys();
        keys.sort_unstable();
        assert_eq!(keys, [1, 2]);
    }
}
