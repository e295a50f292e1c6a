//! Asynchronous hooks that await each tap before starting the next.
//!
//! These hooks accept all three tap conventions and are invoked through
//! [`call_async`](AsyncSeriesHook::call_async) or
//! [`promise`](AsyncSeriesHook::promise). Outcomes that are known before
//! any tap suspends are delivered before the invocation method returns.

use core::fmt;

use futures::FutureExt;
use hookline_tap::args::{HookArgs, WaterfallArgs};
use hookline_tap::error::HookError;

use crate::hook_core::HookCore;
use crate::kind::{HookKind, HookMode};
use crate::machine::WaterfallOps;
use crate::tapable::Tapable;

// ─────────────────────────────────────────────────────────────────────────────
// AsyncSeriesHook
// ─────────────────────────────────────────────────────────────────────────────

/// Runs every tap in order, awaiting each one.
///
/// # Example
///
/// ```
/// use hookline_hooks::prelude::*;
///
/// # futures::executor::block_on(async {
/// let emit = AsyncSeriesHook::<(String,)>::new(["asset"])?;
/// emit.tap_promise("write", |(asset,)| async move {
///     tracing::info!(%asset, "written");
/// })?;
/// emit.tap_async("notify", |(_asset,), done| done.done())?;
///
/// emit.promise(("main.js".into(),)).await?;
/// # Ok::<(), HookError>(())
/// # }).unwrap();
/// ```
pub struct AsyncSeriesHook<A> {
    core: HookCore<A, ()>,
}

impl<A: HookArgs> AsyncSeriesHook<A> {
    /// Creates a hook whose arguments are named `arg_names`.
    pub fn new<I, S>(arg_names: I) -> Result<Self, HookError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(Self {
            core: HookCore::new(HookKind::Basic, HookMode::Series, "AsyncSeriesHook", arg_names)?,
        })
    }

    /// Sets the name used in log fields.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.core.set_name(name);
        self
    }

    /// Runs the hook and passes the outcome to `callback`.
    pub fn call_async<F>(&self, args: A, callback: F)
    where
        F: FnOnce(Result<(), HookError>) + Send + 'static,
    {
        self.core
            .call_async(args, move |settled| callback(settled.map(|_| ())));
    }

    /// Runs the hook and returns a future resolving to the outcome.
    pub fn promise(&self, args: A) -> impl Future<Output = Result<(), HookError>> + Send + 'static {
        self.core.promise(args).map(|settled| settled.map(|_| ()))
    }
}

impl<A: HookArgs> Tapable for AsyncSeriesHook<A> {
    type Args = A;
    type Result = ();

    fn core(&self) -> &HookCore<A, ()> {
        &self.core
    }
}

impl<A: 'static> fmt::Debug for AsyncSeriesHook<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.core, f)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// AsyncSeriesBailHook
// ─────────────────────────────────────────────────────────────────────────────

/// Runs taps in order until one produces a value.
pub struct AsyncSeriesBailHook<A, R> {
    core: HookCore<A, R>,
}

impl<A: HookArgs, R: Send + 'static> AsyncSeriesBailHook<A, R> {
    /// Creates a hook whose arguments are named `arg_names`.
    pub fn new<I, S>(arg_names: I) -> Result<Self, HookError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(Self {
            core: HookCore::new(
                HookKind::Bail,
                HookMode::Series,
                "AsyncSeriesBailHook",
                arg_names,
            )?,
        })
    }

    /// Sets the name used in log fields.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.core.set_name(name);
        self
    }

    /// Runs the hook and passes the outcome to `callback`.
    pub fn call_async<F>(&self, args: A, callback: F)
    where
        F: FnOnce(Result<Option<R>, HookError>) + Send + 'static,
    {
        self.core.call_async(args, callback);
    }

    /// Runs the hook and returns a future resolving to the first value produced.
    pub fn promise(
        &self,
        args: A,
    ) -> impl Future<Output = Result<Option<R>, HookError>> + Send + 'static {
        self.core.promise(args)
    }
}

impl<A: HookArgs, R: Send + 'static> Tapable for AsyncSeriesBailHook<A, R> {
    type Args = A;
    type Result = R;

    fn core(&self) -> &HookCore<A, R> {
        &self.core
    }
}

impl<A: 'static, R: 'static> fmt::Debug for AsyncSeriesBailHook<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.core, f)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// AsyncSeriesLoopHook
// ─────────────────────────────────────────────────────────────────────────────

/// Repeats passes over the taps until one full pass produces no value.
pub struct AsyncSeriesLoopHook<A> {
    core: HookCore<A, ()>,
}

impl<A: HookArgs> AsyncSeriesLoopHook<A> {
    /// Creates a hook whose arguments are named `arg_names`.
    pub fn new<I, S>(arg_names: I) -> Result<Self, HookError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(Self {
            core: HookCore::new(
                HookKind::Loop,
                HookMode::Series,
                "AsyncSeriesLoopHook",
                arg_names,
            )?,
        })
    }

    /// Sets the name used in log fields.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.core.set_name(name);
        self
    }

    /// Runs the hook and passes the outcome to `callback`.
    pub fn call_async<F>(&self, args: A, callback: F)
    where
        F: FnOnce(Result<(), HookError>) + Send + 'static,
    {
        self.core
            .call_async(args, move |settled| callback(settled.map(|_| ())));
    }

    /// Runs the hook and returns a future resolving once a pass produces no value.
    pub fn promise(&self, args: A) -> impl Future<Output = Result<(), HookError>> + Send + 'static {
        self.core.promise(args).map(|settled| settled.map(|_| ()))
    }
}

impl<A: HookArgs> Tapable for AsyncSeriesLoopHook<A> {
    type Args = A;
    type Result = ();

    fn core(&self) -> &HookCore<A, ()> {
        &self.core
    }
}

impl<A: 'static> fmt::Debug for AsyncSeriesLoopHook<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.core, f)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// AsyncSeriesWaterfallHook
// ─────────────────────────────────────────────────────────────────────────────

/// Threads each tap's value into the first argument of the next tap.
pub struct AsyncSeriesWaterfallHook<A: WaterfallArgs> {
    core: HookCore<A, A::Head>,
}

impl<A: WaterfallArgs> AsyncSeriesWaterfallHook<A> {
    /// Creates a hook whose arguments are named `arg_names`.
    ///
    /// Fails with [`HookError::InsufficientArguments`] when `arg_names` is empty.
    pub fn new<I, S>(arg_names: I) -> Result<Self, HookError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let core = HookCore::new(
            HookKind::Waterfall,
            HookMode::Series,
            "AsyncSeriesWaterfallHook",
            arg_names,
        )?;
        Ok(Self {
            core: core.with_waterfall(WaterfallOps::for_args()),
        })
    }

    /// Sets the name used in log fields.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.core.set_name(name);
        self
    }

    /// Runs the hook and passes the final leading value to `callback`.
    pub fn call_async<F>(&self, args: A, callback: F)
    where
        F: FnOnce(Result<A::Head, HookError>) + Send + 'static,
    {
        let initial = args.head().clone();
        self.core.call_async(args, move |settled| {
            callback(settled.map(|value| value.unwrap_or(initial)));
        });
    }

    /// Runs the hook and returns a future resolving to the final leading value.
    pub fn promise(
        &self,
        args: A,
    ) -> impl Future<Output = Result<A::Head, HookError>> + Send + 'static {
        let initial = args.head().clone();
        self.core
            .promise(args)
            .map(move |settled| settled.map(|value| value.unwrap_or(initial)))
    }
}

impl<A: WaterfallArgs> Tapable for AsyncSeriesWaterfallHook<A> {
    type Args = A;
    type Result = A::Head;

    fn core(&self) -> &HookCore<A, A::Head> {
        &self.core
    }
}

impl<A: WaterfallArgs> fmt::Debug for AsyncSeriesWaterfallHook<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.core, f)
    }
}
