//! Asynchronous hooks that start every tap at once.
//!
//! Taps start in registration order within a single call. Synchronous taps
//! that fail or, for bail hooks, decide the outcome stop the remaining taps
//! from starting. Taps already running are never cancelled; their late
//! outcomes are discarded.

use core::fmt;

use futures::FutureExt;
use hookline_tap::args::HookArgs;
use hookline_tap::error::HookError;

use crate::hook_core::HookCore;
use crate::kind::{HookKind, HookMode};
use crate::tapable::Tapable;

// ─────────────────────────────────────────────────────────────────────────────
// AsyncParallelHook
// ─────────────────────────────────────────────────────────────────────────────

/// Starts every tap and waits for all of them.
///
/// The first error, in completion order, settles the invocation.
///
/// # Example
///
/// ```
/// use hookline_hooks::prelude::*;
///
/// # futures::executor::block_on(async {
/// let make = AsyncParallelHook::<(u32,)>::new(["chunk"])?;
/// make.tap_promise("hash", |(chunk,)| async move { tracing::debug!(chunk, "hashed") })?;
/// make.tap_promise("minify", |(chunk,)| async move { tracing::debug!(chunk, "minified") })?;
///
/// make.promise((3,)).await?;
/// # Ok::<(), HookError>(())
/// # }).unwrap();
/// ```
pub struct AsyncParallelHook<A> {
    core: HookCore<A, ()>,
}

impl<A: HookArgs> AsyncParallelHook<A> {
    /// Creates a hook whose arguments are named `arg_names`.
    pub fn new<I, S>(arg_names: I) -> Result<Self, HookError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(Self {
            core: HookCore::new(
                HookKind::Basic,
                HookMode::Parallel,
                "AsyncParallelHook",
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

    /// Runs the hook and returns a future resolving once every tap settled,
    /// or at the first error.
    pub fn promise(&self, args: A) -> impl Future<Output = Result<(), HookError>> + Send + 'static {
        self.core.promise(args).map(|settled| settled.map(|_| ()))
    }
}

impl<A: HookArgs> Tapable for AsyncParallelHook<A> {
    type Args = A;
    type Result = ();

    fn core(&self) -> &HookCore<A, ()> {
        &self.core
    }
}

impl<A: 'static> fmt::Debug for AsyncParallelHook<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.core, f)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// AsyncParallelBailHook
// ─────────────────────────────────────────────────────────────────────────────

/// Starts every tap; the lowest-index tap with a value or error wins.
///
/// The winner is decided by registration order, not completion order: a
/// value from tap 2 is held back until taps 0 and 1 have settled without
/// one.
pub struct AsyncParallelBailHook<A, R> {
    core: HookCore<A, R>,
}

impl<A: HookArgs, R: Send + 'static> AsyncParallelBailHook<A, R> {
    /// Creates a hook whose arguments are named `arg_names`.
    pub fn new<I, S>(arg_names: I) -> Result<Self, HookError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(Self {
            core: HookCore::new(
                HookKind::Bail,
                HookMode::Parallel,
                "AsyncParallelBailHook",
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

    /// Runs the hook and returns a future resolving to the winning outcome.
    pub fn promise(
        &self,
        args: A,
    ) -> impl Future<Output = Result<Option<R>, HookError>> + Send + 'static {
        self.core.promise(args)
    }
}

impl<A: HookArgs, R: Send + 'static> Tapable for AsyncParallelBailHook<A, R> {
    type Args = A;
    type Result = R;

    fn core(&self) -> &HookCore<A, R> {
        &self.core
    }
}

impl<A: 'static, R: 'static> fmt::Debug for AsyncParallelBailHook<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.core, f)
    }
}
