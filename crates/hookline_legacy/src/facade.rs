//! The string-named plugin facade.

use hookline_hooks::prelude::{
    AsyncParallelBailHook, AsyncParallelHook, AsyncSeriesBailHook, AsyncSeriesHook,
    AsyncSeriesWaterfallHook, SyncBailHook, SyncHook, SyncWaterfallHook, Tapable,
};
use hookline_tap::args::{HookArgs, WaterfallArgs};
use hookline_tap::error::HookError;
use hookline_tap::tap::{IntoTapOutput, TapCallback};

use crate::hook_set::HookSet;

/// A plugin written against the name-based registration API.
///
/// # Example
///
/// ```
/// use hookline_hooks::prelude::*;
/// use hookline_legacy::{HookSet, LegacyPlugin, PluginFacade};
///
/// struct Banner;
///
/// impl LegacyPlugin for Banner {
///     fn apply(&self, facade: &PluginFacade<'_>) -> Result<(), HookError> {
///         facade.plugin::<SyncWaterfallHook<(String,)>, _, _>("render", |(page,)| {
///             Some(format!("<banner/>{page}"))
///         })
///     }
/// }
///
/// let hooks = HookSet::new().with_hook("render", SyncWaterfallHook::<(String,)>::new(["page"])?);
/// let facade = PluginFacade::new(&hooks);
/// facade.apply(&Banner)?;
///
/// assert_eq!(facade.apply_plugins_waterfall("render", ("body".to_owned(),))?, "<banner/>body");
/// # Ok::<(), HookError>(())
/// ```
pub trait LegacyPlugin {
    /// Registers the plugin's taps through `facade`.
    fn apply(&self, facade: &PluginFacade<'_>) -> Result<(), HookError>;
}

/// Name-based registration and invocation over a borrowed [`HookSet`].
///
/// Taps registered here are named `legacy:<name>`. Every method resolves
/// the name through [`HookSet::get`], so unknown names fail with
/// [`HookError::UnknownHookName`] and names bound to another hook type fail
/// with [`HookError::HookTypeMismatch`]. The callback-style methods deliver
/// lookup failures through the callback.
#[derive(Debug, Clone, Copy)]
pub struct PluginFacade<'a> {
    hooks: &'a HookSet,
}

fn legacy_tap_name(name: &str) -> String {
    format!("legacy:{name}")
}

impl<'a> PluginFacade<'a> {
    /// Creates a facade over `hooks`.
    #[must_use]
    pub fn new(hooks: &'a HookSet) -> Self {
        Self { hooks }
    }

    /// Returns the adapted hook set.
    #[must_use]
    pub fn hooks(&self) -> &'a HookSet {
        self.hooks
    }

    /// Applies a plugin.
    pub fn apply(&self, plugin: &dyn LegacyPlugin) -> Result<(), HookError> {
        plugin.apply(self)
    }

    // ─── Registration ────────────────────────────────────────────────────────

    /// Registers a synchronous tap on the `H` hook named `name`.
    pub fn plugin<H, F, O>(&self, name: &str, f: F) -> Result<(), HookError>
    where
        H: Tapable + 'static,
        F: Fn(H::Args) -> O + Send + Sync + 'static,
        O: IntoTapOutput<H::Result>,
    {
        self.hooks.get::<H>(name)?.tap(legacy_tap_name(name), f)
    }

    /// Registers a callback-convention tap on the `H` hook named `name`.
    pub fn plugin_async<H, F>(&self, name: &str, f: F) -> Result<(), HookError>
    where
        H: Tapable + 'static,
        F: Fn(H::Args, TapCallback<H::Result>) + Send + Sync + 'static,
    {
        self.hooks.get::<H>(name)?.tap_async(legacy_tap_name(name), f)
    }

    /// Returns `true` if `name` resolves to a hook with taps or interceptors.
    #[must_use]
    pub fn has_plugins(&self, name: &str) -> bool {
        self.hooks
            .get_erased(name)
            .is_ok_and(|hook| hook.is_used())
    }

    // ─── Synchronous invocation ──────────────────────────────────────────────

    /// Calls the [`SyncHook`] named `name`.
    pub fn apply_plugins<A: HookArgs>(&self, name: &str, args: A) -> Result<(), HookError> {
        self.hooks.get::<SyncHook<A>>(name)?.call(args)
    }

    /// Calls the [`SyncWaterfallHook`] named `name` and returns the final
    /// leading value.
    pub fn apply_plugins_waterfall<A: WaterfallArgs>(
        &self,
        name: &str,
        args: A,
    ) -> Result<A::Head, HookError> {
        self.hooks.get::<SyncWaterfallHook<A>>(name)?.call(args)
    }

    /// Calls the [`SyncBailHook`] named `name` and returns the first value.
    pub fn apply_plugins_bail_result<A, R>(
        &self,
        name: &str,
        args: A,
    ) -> Result<Option<R>, HookError>
    where
        A: HookArgs,
        R: Send + 'static,
    {
        self.hooks.get::<SyncBailHook<A, R>>(name)?.call(args)
    }

    // ─── Callback invocation ─────────────────────────────────────────────────

    /// Runs the [`AsyncSeriesHook`] named `name`.
    pub fn apply_plugins_async_series<A, F>(&self, name: &str, args: A, callback: F)
    where
        A: HookArgs,
        F: FnOnce(Result<(), HookError>) + Send + 'static,
    {
        match self.hooks.get::<AsyncSeriesHook<A>>(name) {
            Ok(hook) => hook.call_async(args, callback),
            Err(err) => callback(Err(err)),
        }
    }

    /// Runs the [`AsyncSeriesBailHook`] named `name`.
    pub fn apply_plugins_async_series_bail_result<A, R, F>(&self, name: &str, args: A, callback: F)
    where
        A: HookArgs,
        R: Send + 'static,
        F: FnOnce(Result<Option<R>, HookError>) + Send + 'static,
    {
        match self.hooks.get::<AsyncSeriesBailHook<A, R>>(name) {
            Ok(hook) => hook.call_async(args, callback),
            Err(err) => callback(Err(err)),
        }
    }

    /// Runs the [`AsyncSeriesWaterfallHook`] named `name`.
    pub fn apply_plugins_async_waterfall<A, F>(&self, name: &str, args: A, callback: F)
    where
        A: WaterfallArgs,
        F: FnOnce(Result<A::Head, HookError>) + Send + 'static,
    {
        match self.hooks.get::<AsyncSeriesWaterfallHook<A>>(name) {
            Ok(hook) => hook.call_async(args, callback),
            Err(err) => callback(Err(err)),
        }
    }

    /// Runs the [`AsyncParallelHook`] named `name`.
    pub fn apply_plugins_parallel<A, F>(&self, name: &str, args: A, callback: F)
    where
        A: HookArgs,
        F: FnOnce(Result<(), HookError>) + Send + 'static,
    {
        match self.hooks.get::<AsyncParallelHook<A>>(name) {
            Ok(hook) => hook.call_async(args, callback),
            Err(err) => callback(Err(err)),
        }
    }

    /// Runs the [`AsyncParallelBailHook`] named `name`.
    pub fn apply_plugins_parallel_bail_result<A, R, F>(&self, name: &str, args: A, callback: F)
    where
        A: HookArgs,
        R: Send + 'static,
        F: FnOnce(Result<Option<R>, HookError>) + Send + 'static,
    {
        match self.hooks.get::<AsyncParallelBailHook<A, R>>(name) {
            Ok(hook) => hook.call_async(args, callback),
            Err(err) => callback(Err(err)),
        }
    }
}
