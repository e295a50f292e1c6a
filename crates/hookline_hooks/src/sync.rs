//! Synchronous hook types.
//!
//! Synchronous hooks accept only [`tap`](Tapable::tap) registrations and can
//! be invoked through all three conventions. Every convention runs the taps
//! on the caller's stack and delivers before returning.

use core::fmt;

use futures::FutureExt;
use hookline_tap::args::{HookArgs, WaterfallArgs};
use hookline_tap::error::HookError;

use crate::hook_core::HookCore;
use crate::kind::{HookKind, HookMode};
use crate::machine::WaterfallOps;
use crate::tapable::Tapable;

// ─────────────────────────────────────────────────────────────────────────────
// SyncHook
// ─────────────────────────────────────────────────────────────────────────────

/// Runs every tap in order; results are ignored and the first error stops
/// the invocation.
///
/// # Example
///
/// ```
/// use hookline_hooks::prelude::*;
/// use std::sync::{Arc, Mutex};
///
/// let seen = Arc::new(Mutex::new(Vec::new()));
/// let hook = SyncHook::<(u32,)>::new(["id"])?;
///
/// let log = Arc::clone(&seen);
/// hook.tap("record", move |(id,)| log.lock().unwrap().push(id))?;
///
/// hook.call((7,))?;
/// assert_eq!(*seen.lock().unwrap(), [7]);
/// # Ok::<(), HookError>(())
/// ```
pub struct SyncHook<A> {
    core: HookCore<A, ()>,
}

impl<A: HookArgs> SyncHook<A> {
    /// Creates a hook whose arguments are named `arg_names`.
    ///
    /// Fails with [`HookError::ArityMismatch`] unless there is one name per
    /// element of `A`.
    pub fn new<I, S>(arg_names: I) -> Result<Self, HookError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(Self {
            core: HookCore::new(HookKind::Basic, HookMode::Sync, "SyncHook", arg_names)?,
        })
    }

    /// Sets the name used in log fields.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.core.set_name(name);
        self
    }

    /// Runs the hook and returns once every tap has run.
    pub fn call(&self, args: A) -> Result<(), HookError> {
        self.core.call(args).map(|_| ())
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

impl<A: HookArgs> Tapable for SyncHook<A> {
    type Args = A;
    type Result = ();

    fn core(&self) -> &HookCore<A, ()> {
        &self.core
    }
}

impl<A: 'static> fmt::Debug for SyncHook<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.core, f)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// SyncBailHook
// ─────────────────────────────────────────────────────────────────────────────

/// Runs taps in order until one returns a value.
///
/// # Example
///
/// ```
/// use hookline_hooks::prelude::*;
///
/// let resolve = SyncBailHook::<(&'static str,), String>::new(["request"])?;
/// resolve.tap("relative", |(req,)| req.starts_with("./").then(|| format!("/src/{}", &req[2..])))?;
/// resolve.tap("fallback", |(req,)| Some(format!("/node_modules/{req}")))?;
///
/// assert_eq!(resolve.call(("./a",))?.as_deref(), Some("/src/a"));
/// assert_eq!(resolve.call(("b",))?.as_deref(), Some("/node_modules/b"));
/// # Ok::<(), HookError>(())
/// ```
pub struct SyncBailHook<A, R> {
    core: HookCore<A, R>,
}

impl<A: HookArgs, R: Send + 'static> SyncBailHook<A, R> {
    /// Creates a hook whose arguments are named `arg_names`.
    pub fn new<I, S>(arg_names: I) -> Result<Self, HookError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(Self {
            core: HookCore::new(HookKind::Bail, HookMode::Sync, "SyncBailHook", arg_names)?,
        })
    }

    /// Sets the name used in log fields.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.core.set_name(name);
        self
    }

    /// Runs the hook, returning the first value produced, if any.
    pub fn call(&self, args: A) -> Result<Option<R>, HookError> {
        self.core.call(args)
    }

    /// Runs the hook and passes the outcome to `callback`.
    pub fn call_async<F>(&self, args: A, callback: F)
    where
        F: FnOnce(Result<Option<R>, HookError>) + Send + 'static,
    {
        self.core.call_async(args, callback);
    }

    /// Runs the hook and returns a future resolving to the outcome.
    pub fn promise(
        &self,
        args: A,
    ) -> impl Future<Output = Result<Option<R>, HookError>> + Send + 'static {
        self.core.promise(args)
    }
}

impl<A: HookArgs, R: Send + 'static> Tapable for SyncBailHook<A, R> {
    type Args = A;
    type Result = R;

    fn core(&self) -> &HookCore<A, R> {
        &self.core
    }
}

impl<A: 'static, R: 'static> fmt::Debug for SyncBailHook<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.core, f)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// SyncWaterfallHook
// ─────────────────────────────────────────────────────────────────────────────

/// Threads each tap's value into the first argument of the next tap.
///
/// A tap returning `None` leaves the value unchanged. The call returns the
/// final value of the first argument.
///
/// # Example
///
/// ```
/// use hookline_hooks::prelude::*;
///
/// let hook = SyncWaterfallHook::<(String, u32)>::new(["source", "level"])?;
/// hook.tap("banner", |(source, _)| Some(format!("/* v1 */\n{source}")))?;
/// hook.tap("noop", |_| None)?;
/// hook.tap("trim", |(source, level)| (level > 0).then(|| source.trim_end().to_owned()))?;
///
/// assert_eq!(hook.call(("x;\n".into(), 1))?, "/* v1 */\nx;");
/// # Ok::<(), HookError>(())
/// ```
pub struct SyncWaterfallHook<A: WaterfallArgs> {
    core: HookCore<A, A::Head>,
}

impl<A: WaterfallArgs> SyncWaterfallHook<A> {
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
            HookMode::Sync,
            "SyncWaterfallHook",
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

    /// Runs the hook, returning the final leading value.
    pub fn call(&self, args: A) -> Result<A::Head, HookError> {
        let initial = args.head().clone();
        self.core.call(args).map(|value| value.unwrap_or(initial))
    }

    /// Runs the hook and passes the outcome to `callback`.
    pub fn call_async<F>(&self, args: A, callback: F)
    where
        F: FnOnce(Result<A::Head, HookError>) + Send + 'static,
    {
        let initial = args.head().clone();
        self.core.call_async(args, move |settled| {
            callback(settled.map(|value| value.unwrap_or(initial)));
        });
    }

    /// Runs the hook and returns a future resolving to the outcome.
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

impl<A: WaterfallArgs> Tapable for SyncWaterfallHook<A> {
    type Args = A;
    type Result = A::Head;

    fn core(&self) -> &HookCore<A, A::Head> {
        &self.core
    }
}

impl<A: WaterfallArgs> fmt::Debug for SyncWaterfallHook<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.core, f)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// SyncLoopHook
// ─────────────────────────────────────────────────────────────────────────────

/// Repeats passes over the taps until one full pass produces no value.
///
/// Any tap returning `Some(())` restarts the pass from the first tap.
pub struct SyncLoopHook<A> {
    core: HookCore<A, ()>,
}

impl<A: HookArgs> SyncLoopHook<A> {
    /// Creates a hook whose arguments are named `arg_names`.
    pub fn new<I, S>(arg_names: I) -> Result<Self, HookError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(Self {
            core: HookCore::new(HookKind::Loop, HookMode::Sync, "SyncLoopHook", arg_names)?,
        })
    }

    /// Sets the name used in log fields.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.core.set_name(name);
        self
    }

    /// Runs the hook until a pass completes without a value.
    pub fn call(&self, args: A) -> Result<(), HookError> {
        self.core.call(args).map(|_| ())
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

impl<A: HookArgs> Tapable for SyncLoopHook<A> {
    type Args = A;
    type Result = ();

    fn core(&self) -> &HookCore<A, ()> {
        &self.core
    }
}

impl<A: 'static> fmt::Debug for SyncLoopHook<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.core, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::{CallConvention, Strategy, TapShape};
    use hookline_tap::tap::TapConvention;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    #[test]
    fn arity_is_checked_at_construction() {
        let err = SyncHook::<(u8, u8)>::new(["only-one"]).expect_err("arity mismatch");
        assert!(matches!(
            err,
            HookError::ArityMismatch {
                hook: "SyncHook",
                declared: 1,
                expected: 2
            }
        ));
    }

    #[test]
    fn waterfall_needs_an_argument() {
        let err = SyncWaterfallHook::<(u8,)>::new(Vec::<&str>::new()).expect_err("no args");
        assert!(matches!(
            err,
            HookError::InsufficientArguments {
                hook: "SyncWaterfallHook"
            }
        ));
    }

    #[test]
    fn async_taps_are_rejected() {
        let hook = SyncHook::<()>::new(Vec::<&str>::new()).expect("valid hook");
        let err = hook
            .tap_async("cb", |(), callback| callback.done())
            .expect_err("sync hooks reject callback taps");
        assert!(matches!(
            err,
            HookError::UnsupportedOnHookKind {
                method: "tap_async",
                hook: "SyncHook"
            }
        ));
        assert!(hook.tap_promise("p", |()| async {}).is_err());
        assert!(!hook.is_used());
    }

    #[test]
    fn blank_names_are_rejected() {
        let hook = SyncBailHook::<(), u8>::new(Vec::<&str>::new()).expect("valid hook");
        for name in ["", " ", "\n"] {
            let err = hook.tap(name, |()| None).expect_err("blank name");
            assert!(matches!(err, HookError::InvalidTapName { method: "tap" }));
        }
    }

    #[test]
    fn error_stops_later_taps() {
        let hook = SyncHook::<()>::new(Vec::<&str>::new()).expect("valid hook");
        let ran = Arc::new(AtomicUsize::new(0));
        hook.tap("fails", |()| Err::<(), _>("broken"))
            .expect("registration should succeed");
        let counter = Arc::clone(&ran);
        hook.tap("after", move |()| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .expect("registration should succeed");

        let err = hook.call(()).expect_err("tap error propagates");
        assert_eq!(err.tap_name(), Some("fails"));
        assert_eq!(ran.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn call_async_delivers_before_returning() {
        let hook = SyncBailHook::<(u8,), u8>::new(["n"]).expect("valid hook");
        hook.tap("double", |(n,)| Some(n * 2))
            .expect("registration should succeed");

        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);
        hook.call_async((4,), move |result| {
            *sink.lock().expect("lock") = Some(result.ok().flatten());
        });
        assert_eq!(*seen.lock().expect("lock"), Some(Some(8)));
    }

    #[test]
    fn plan_cache_tracks_registrations() {
        let hook = SyncHook::<()>::new(Vec::<&str>::new()).expect("valid hook");
        let empty = hook.plan_info(CallConvention::Sync);
        assert_eq!(empty.shape, TapShape::None);
        assert_eq!(empty.strategy, Strategy::Empty);

        hook.tap("a", |()| ()).expect("registration should succeed");
        let single = hook.plan_info(CallConvention::Sync);
        assert_eq!(single.shape, TapShape::Single(TapConvention::Sync));
        assert_eq!(single.strategy, Strategy::Inline);

        hook.intercept(hookline_tap::interceptor::InterceptorFn::new());
        assert_eq!(hook.plan_info(CallConvention::Sync).shape, TapShape::Intercepted);
    }

    #[test]
    fn loop_interceptor_fires_each_pass() {
        let hook = SyncLoopHook::<()>::new(Vec::<&str>::new()).expect("valid hook");
        let passes = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&passes);
        hook.intercept(
            hookline_tap::interceptor::InterceptorFn::new().on_loop(move |_: &()| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );

        let remaining = Arc::new(AtomicUsize::new(3));
        let left = Arc::clone(&remaining);
        hook.tap("countdown", move |()| {
            (left.fetch_sub(1, Ordering::SeqCst) > 1).then_some(())
        })
        .expect("registration should succeed");

        hook.call(()).expect("loop completes");
        // Two restarts plus the initial pass.
        assert_eq!(passes.load(Ordering::SeqCst), 3);
    }
}
