//! Hooks addressed by name.

use core::fmt;
use std::sync::Arc;

use downcast_rs::{DowncastSync, impl_downcast};
use hashbrown::HashMap;
use hookline_hooks::tapable::Tapable;
use hookline_tap::error::HookError;

/// A hook with its argument and result types erased.
///
/// Implemented for every [`Tapable`] hook.
pub trait ErasedHook: DowncastSync {
    /// Returns the type name of the hook, such as `"SyncBailHook"`.
    fn type_name(&self) -> &'static str;

    /// Returns `true` if a tap or interceptor is registered.
    fn is_used(&self) -> bool;
}

impl_downcast!(sync ErasedHook);

impl<H: Tapable + 'static> ErasedHook for H {
    fn type_name(&self) -> &'static str {
        self.core().type_name()
    }

    fn is_used(&self) -> bool {
        Tapable::is_used(self)
    }
}

/// Converts a dashed, underscored or spaced name to camel case.
///
/// ```
/// use hookline_legacy::camel_case;
///
/// assert_eq!(camel_case("after-compile"), "afterCompile");
/// assert_eq!(camel_case("after_compile"), "afterCompile");
/// assert_eq!(camel_case("after compile"), "afterCompile");
/// assert_eq!(camel_case("emit"), "emit");
/// ```
#[must_use]
pub fn camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = false;
    for ch in name.chars() {
        if matches!(ch, '-' | '_' | ' ') {
            upper = !out.is_empty();
        } else if upper {
            out.extend(ch.to_uppercase());
            upper = false;
        } else {
            out.push(ch);
        }
    }
    out
}

/// Hooks stored under names.
///
/// Lookups try the exact name first, then its [`camel_case`] form.
#[derive(Default)]
pub struct HookSet {
    hooks: HashMap<String, Arc<dyn ErasedHook>>,
}

impl HookSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `hook` under `name` and returns a shared handle to it.
    ///
    /// A hook previously stored under the same name is replaced.
    pub fn insert<H: Tapable + 'static>(&mut self, name: impl Into<String>, hook: H) -> Arc<H> {
        let hook = Arc::new(hook);
        self.insert_shared(name, Arc::clone(&hook));
        hook
    }

    /// Stores an already shared hook under `name`.
    pub fn insert_shared<H: Tapable + 'static>(&mut self, name: impl Into<String>, hook: Arc<H>) {
        self.hooks.insert(name.into(), hook);
    }

    /// Builder form of [`insert`](Self::insert).
    #[must_use]
    pub fn with_hook<H: Tapable + 'static>(mut self, name: impl Into<String>, hook: H) -> Self {
        self.insert(name, hook);
        self
    }

    /// Resolves `name` to the key it is stored under.
    fn resolve(&self, name: &str) -> Option<(&str, &Arc<dyn ErasedHook>)> {
        if let Some((key, hook)) = self.hooks.get_key_value(name) {
            return Some((key.as_str(), hook));
        }
        let camel = camel_case(name);
        let (key, hook) = self.hooks.get_key_value(camel.as_str())?;
        tracing::debug!(requested = name, resolved = %key, "legacy hook name resolved by camel case");
        Some((key.as_str(), hook))
    }

    /// Returns the erased hook stored under `name`.
    pub fn get_erased(&self, name: &str) -> Result<Arc<dyn ErasedHook>, HookError> {
        self.resolve(name)
            .map(|(_, hook)| Arc::clone(hook))
            .ok_or_else(|| HookError::UnknownHookName(name.to_owned()))
    }

    /// Returns the hook stored under `name` as an `H`.
    ///
    /// Fails with [`HookError::UnknownHookName`] if nothing matches and with
    /// [`HookError::HookTypeMismatch`] if the stored hook is not an `H`.
    pub fn get<H: Tapable + 'static>(&self, name: &str) -> Result<Arc<H>, HookError> {
        let (key, hook) = self
            .resolve(name)
            .ok_or_else(|| HookError::UnknownHookName(name.to_owned()))?;
        let key = key.to_owned();
        Arc::clone(hook)
            .downcast_arc::<H>()
            .map_err(|_| HookError::HookTypeMismatch {
                name: key,
                expected: core::any::type_name::<H>(),
            })
    }

    /// Returns `true` if `name` resolves to a hook.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }

    /// Returns the stored names in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.hooks.keys().map(String::as_str)
    }

    /// Returns the number of stored hooks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Returns `true` if no hook is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

impl fmt::Debug for HookSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (name, hook) in &self.hooks {
            map.entry(name, &hook.type_name());
        }
        map.finish()
    }
}
