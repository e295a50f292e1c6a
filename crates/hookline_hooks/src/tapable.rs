//! The registration surface shared by every hook type.

use hookline_tap::args::HookArgs;
use hookline_tap::context::TapContext;
use hookline_tap::error::HookError;
use hookline_tap::interceptor::Interceptor;
use hookline_tap::options::TapOptions;
use hookline_tap::tap::{IntoTapOutput, Tap, TapCallback};

use crate::hook_core::HookCore;
use crate::kind::CallConvention;
use crate::plan::PlanInfo;

/// Registration and inspection methods shared by all hook types.
///
/// Every `tap*` method accepts a bare name or a [`TapOptions`]. Names must
/// not be blank. Synchronous hook types reject [`tap_async`](Self::tap_async)
/// and [`tap_promise`](Self::tap_promise) with
/// [`HookError::UnsupportedOnHookKind`].
///
/// # Example
///
/// ```
/// use hookline_hooks::prelude::*;
///
/// let hook = SyncHook::<(String,)>::new(["file"])?;
/// hook.tap("log", |(file,)| tracing::info!(%file, "emitted"))?;
/// hook.tap(TapOptions::new("first").with_stage(-1), |_| ())?;
///
/// let names: Vec<String> = hook.taps().iter().map(|t| t.name().to_owned()).collect();
/// assert_eq!(names, ["first", "log"]);
/// # Ok::<(), HookError>(())
/// ```
pub trait Tapable: Send + Sync {
    /// Argument tuple passed to every tap.
    type Args: HookArgs;
    /// Value type taps may produce.
    type Result: Send + 'static;

    /// Returns the shared hook state.
    fn core(&self) -> &HookCore<Self::Args, Self::Result>;

    /// Registers a synchronous tap.
    fn tap<F, O>(&self, options: impl Into<TapOptions>, f: F) -> Result<(), HookError>
    where
        F: Fn(Self::Args) -> O + Send + Sync + 'static,
        O: IntoTapOutput<Self::Result>,
    {
        self.core().register("tap", Tap::sync(options, f))
    }

    /// Registers a synchronous tap that receives the invocation context.
    fn tap_with_context<F, O>(&self, options: impl Into<TapOptions>, f: F) -> Result<(), HookError>
    where
        F: Fn(&TapContext, Self::Args) -> O + Send + Sync + 'static,
        O: IntoTapOutput<Self::Result>,
    {
        self.core().register("tap", Tap::sync_with_context(options, f))
    }

    /// Registers a callback-convention tap.
    fn tap_async<F>(&self, options: impl Into<TapOptions>, f: F) -> Result<(), HookError>
    where
        F: Fn(Self::Args, TapCallback<Self::Result>) + Send + Sync + 'static,
    {
        self.core().register("tap_async", Tap::callback(options, f))
    }

    /// Registers a callback-convention tap that receives the invocation context.
    fn tap_async_with_context<F>(
        &self,
        options: impl Into<TapOptions>,
        f: F,
    ) -> Result<(), HookError>
    where
        F: Fn(&TapContext, Self::Args, TapCallback<Self::Result>) + Send + Sync + 'static,
    {
        self.core()
            .register("tap_async", Tap::callback_with_context(options, f))
    }

    /// Registers a promise-convention tap.
    fn tap_promise<F, Fut>(&self, options: impl Into<TapOptions>, f: F) -> Result<(), HookError>
    where
        F: Fn(Self::Args) -> Fut + Send + Sync + 'static,
        Fut: Future + Send + 'static,
        Fut::Output: IntoTapOutput<Self::Result>,
    {
        self.core().register("tap_promise", Tap::promise(options, f))
    }

    /// Registers a promise-convention tap that receives the invocation context.
    fn tap_promise_with_context<F, Fut>(
        &self,
        options: impl Into<TapOptions>,
        f: F,
    ) -> Result<(), HookError>
    where
        F: Fn(&TapContext, Self::Args) -> Fut + Send + Sync + 'static,
        Fut: Future + Send + 'static,
        Fut::Output: IntoTapOutput<Self::Result>,
    {
        self.core()
            .register("tap_promise", Tap::promise_with_context(options, f))
    }

    /// Appends an interceptor.
    fn intercept(&self, interceptor: impl Interceptor<Self::Args, Self::Result>) {
        self.core().intercept(interceptor);
    }

    /// Returns `true` if a tap or interceptor is registered.
    fn is_used(&self) -> bool {
        self.core().is_used()
    }

    /// Returns the registered taps in execution order.
    fn taps(&self) -> Vec<Tap<Self::Args, Self::Result>> {
        self.core().taps()
    }

    /// Describes the plan used for invocations through `convention`.
    fn plan_info(&self, convention: CallConvention) -> PlanInfo {
        self.core().plan_info(convention)
    }

    /// Returns a view that fills unset options of every registration.
    fn with_options(&self, options: impl Into<TapOptions>) -> WithOptions<'_, Self>
    where
        Self: Sized,
    {
        WithOptions {
            hook: self,
            defaults: options.into(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// WithOptions
// ─────────────────────────────────────────────────────────────────────────────

/// A hook view that pre-fills tap options.
///
/// Options given to each registration win over the defaults.
///
/// # Example
///
/// ```
/// use hookline_hooks::prelude::*;
///
/// let hook = SyncHook::<()>::new(Vec::<String>::new())?;
/// hook.tap("main", |()| ())?;
///
/// let early = hook.with_options(TapOptions::default().with_stage(-10));
/// early.tap("setup", |()| ())?;
///
/// assert_eq!(hook.taps()[0].name(), "setup");
/// # Ok::<(), HookError>(())
/// ```
#[derive(Debug)]
pub struct WithOptions<'a, H> {
    hook: &'a H,
    defaults: TapOptions,
}

impl<'a, H: Tapable> WithOptions<'a, H> {
    fn merge(&self, options: impl Into<TapOptions>) -> TapOptions {
        options.into().merged_over(&self.defaults)
    }

    /// Registers a synchronous tap.
    pub fn tap<F, O>(&self, options: impl Into<TapOptions>, f: F) -> Result<(), HookError>
    where
        F: Fn(H::Args) -> O + Send + Sync + 'static,
        O: IntoTapOutput<H::Result>,
    {
        self.hook.tap(self.merge(options), f)
    }

    /// Registers a synchronous tap that receives the invocation context.
    pub fn tap_with_context<F, O>(
        &self,
        options: impl Into<TapOptions>,
        f: F,
    ) -> Result<(), HookError>
    where
        F: Fn(&TapContext, H::Args) -> O + Send + Sync + 'static,
        O: IntoTapOutput<H::Result>,
    {
        self.hook.tap_with_context(self.merge(options), f)
    }

    /// Registers a callback-convention tap.
    pub fn tap_async<F>(&self, options: impl Into<TapOptions>, f: F) -> Result<(), HookError>
    where
        F: Fn(H::Args, TapCallback<H::Result>) + Send + Sync + 'static,
    {
        self.hook.tap_async(self.merge(options), f)
    }

    /// Registers a promise-convention tap.
    pub fn tap_promise<F, Fut>(&self, options: impl Into<TapOptions>, f: F) -> Result<(), HookError>
    where
        F: Fn(H::Args) -> Fut + Send + Sync + 'static,
        Fut: Future + Send + 'static,
        Fut::Output: IntoTapOutput<H::Result>,
    {
        self.hook.tap_promise(self.merge(options), f)
    }

    /// Appends an interceptor to the underlying hook.
    pub fn intercept(&self, interceptor: impl Interceptor<H::Args, H::Result>) {
        self.hook.intercept(interceptor);
    }

    /// Returns `true` if the underlying hook has taps or interceptors.
    #[must_use]
    pub fn is_used(&self) -> bool {
        self.hook.is_used()
    }

    /// Returns a view with further defaults layered over these.
    #[must_use]
    pub fn with_options(&self, options: impl Into<TapOptions>) -> WithOptions<'a, H> {
        WithOptions {
            hook: self.hook,
            defaults: self.merge(options),
        }
    }
}
