//! Registered callbacks and their calling conventions.
//!
//! A [`Tap`] pairs a callback with its identity (`name`, `stage`, `before`).
//! Taps are immutable once built; interceptors that want to change one
//! build a replacement.
//!
//! # Calling Conventions
//!
//! | Convention | Callback shape |
//! |------------|----------------|
//! | [`Sync`](TapConvention::Sync) | `Fn(A) -> impl IntoTapOutput<R>` |
//! | [`Callback`](TapConvention::Callback) | `Fn(A, TapCallback<R>)` |
//! | [`Promise`](TapConvention::Promise) | `Fn(A) -> impl Future<Output = impl IntoTapOutput<R>>` |
//!
//! Each constructor has a `*_with_context` twin whose callback also receives
//! the invocation's [`TapContext`].

use core::fmt;
use core::pin::Pin;
use std::sync::Arc;

use futures::FutureExt;
use futures::channel::oneshot;

use crate::args::HookArgs;
use crate::context::TapContext;
use crate::error::{BoxError, CallbackDropped};
use crate::options::TapOptions;

/// A boxed, sendable future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// What a tap produces: a value, "no value" (`None`), or an error.
pub type TapOutput<R> = Result<Option<R>, BoxError>;

// ─────────────────────────────────────────────────────────────────────────────
// TapConvention
// ─────────────────────────────────────────────────────────────────────────────

/// How a tap delivers its outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TapConvention {
    /// Returns its outcome directly.
    Sync,
    /// Settles a [`TapCallback`].
    Callback,
    /// Returns a future.
    Promise,
}

impl TapConvention {
    /// Returns the lowercase label used in logs and shape signatures.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sync => "sync",
            Self::Callback => "async",
            Self::Promise => "promise",
        }
    }
}

impl fmt::Display for TapConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// IntoTapOutput
// ─────────────────────────────────────────────────────────────────────────────

/// Conversion from a tap's return value into a [`TapOutput`].
///
/// | Returned | Meaning |
/// |----------|---------|
/// | `()` | no value |
/// | `Option<R>` | `Some` is a value, `None` is no value |
/// | `Result<(), E>` | no value, or an error |
/// | `Result<Option<R>, E>` | the full output |
pub trait IntoTapOutput<R> {
    /// Performs the conversion.
    fn into_tap_output(self) -> TapOutput<R>;
}

impl<R> IntoTapOutput<R> for () {
    fn into_tap_output(self) -> TapOutput<R> {
        Ok(None)
    }
}

impl<R> IntoTapOutput<R> for Option<R> {
    fn into_tap_output(self) -> TapOutput<R> {
        Ok(self)
    }
}

impl<R, E: Into<BoxError>> IntoTapOutput<R> for Result<(), E> {
    fn into_tap_output(self) -> TapOutput<R> {
        self.map(|()| None).map_err(Into::into)
    }
}

impl<R, E: Into<BoxError>> IntoTapOutput<R> for Result<Option<R>, E> {
    fn into_tap_output(self) -> TapOutput<R> {
        self.map_err(Into::into)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// TapCallback
// ─────────────────────────────────────────────────────────────────────────────

/// One-shot completion handle passed to callback-convention taps.
///
/// Settle it exactly once. Dropping it unsettled delivers a
/// [`CallbackDropped`] error in its place.
///
/// # Example
///
/// ```
/// use hookline_tap::tap::{TapCallback, TapOutput};
/// use std::sync::{Arc, Mutex};
///
/// let seen: Arc<Mutex<Option<TapOutput<u32>>>> = Arc::default();
/// let sink = Arc::clone(&seen);
/// let callback = TapCallback::new(move |output| *sink.lock().unwrap() = Some(output));
///
/// callback.value(7);
/// assert!(matches!(*seen.lock().unwrap(), Some(Ok(Some(7)))));
/// ```
pub struct TapCallback<R> {
    complete: Option<Box<dyn FnOnce(TapOutput<R>) + Send>>,
}

impl<R: Send + 'static> TapCallback<R> {
    /// Creates a handle that forwards the tap's outcome to `complete`.
    pub fn new(complete: impl FnOnce(TapOutput<R>) + Send + 'static) -> Self {
        Self {
            complete: Some(Box::new(complete)),
        }
    }

    fn channel() -> (Self, oneshot::Receiver<TapOutput<R>>) {
        let (tx, rx) = oneshot::channel();
        let callback = Self::new(move |output| {
            // The receiver is gone once the invocation stopped listening.
            let _ = tx.send(output);
        });
        (callback, rx)
    }

    /// Settles with "no value".
    pub fn done(self) {
        self.complete(Ok(None));
    }

    /// Settles with a value.
    pub fn value(self, value: R) {
        self.complete(Ok(Some(value)));
    }

    /// Settles with an error.
    pub fn error(self, error: impl Into<BoxError>) {
        self.complete(Err(error.into()));
    }

    /// Settles with anything convertible into a tap output.
    pub fn settle(self, output: impl IntoTapOutput<R>) {
        self.complete(output.into_tap_output());
    }

    fn complete(mut self, output: TapOutput<R>) {
        if let Some(complete) = self.complete.take() {
            complete(output);
        }
    }
}

impl<R> Drop for TapCallback<R> {
    fn drop(&mut self) {
        if let Some(complete) = self.complete.take() {
            complete(Err(CallbackDropped.into()));
        }
    }
}

impl<R> fmt::Debug for TapCallback<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TapCallback")
            .field("settled", &self.complete.is_none())
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tap
// ─────────────────────────────────────────────────────────────────────────────

/// Result of starting a tap.
pub enum TapCall<R> {
    /// The tap settled before returning.
    Ready(TapOutput<R>),
    /// The tap is still running.
    Pending(BoxFuture<'static, TapOutput<R>>),
}

type SyncFn<A, R> = dyn Fn(Option<&TapContext>, A) -> TapOutput<R> + Send + Sync;
type CallbackFn<A, R> = dyn Fn(Option<&TapContext>, A, TapCallback<R>) + Send + Sync;
type PromiseFn<A, R> =
    dyn Fn(Option<&TapContext>, A) -> BoxFuture<'static, TapOutput<R>> + Send + Sync;

enum TapBody<A, R> {
    Sync(Arc<SyncFn<A, R>>),
    Callback(Arc<CallbackFn<A, R>>),
    Promise(Arc<PromiseFn<A, R>>),
}

impl<A, R> Clone for TapBody<A, R> {
    fn clone(&self) -> Self {
        match self {
            Self::Sync(f) => Self::Sync(Arc::clone(f)),
            Self::Callback(f) => Self::Callback(Arc::clone(f)),
            Self::Promise(f) => Self::Promise(Arc::clone(f)),
        }
    }
}

/// Runs `f` with the invocation context, or a throwaway one when the
/// invocation did not allocate any.
fn with_context<T>(ctx: Option<&TapContext>, f: impl FnOnce(&TapContext) -> T) -> T {
    match ctx {
        Some(ctx) => f(ctx),
        None => f(&TapContext::new()),
    }
}

/// A registered callback with its identity and ordering constraints.
///
/// `A` is the hook's argument tuple and `R` the value type taps may produce.
///
/// # Example
///
/// ```
/// use hookline_tap::tap::{Tap, TapCall, TapConvention};
///
/// let tap = Tap::<(u32,), u32>::sync("double", |(n,)| Some(n * 2));
/// assert_eq!(tap.convention(), TapConvention::Sync);
///
/// match tap.invoke(None, (21,)) {
///     TapCall::Ready(output) => assert_eq!(output.ok().flatten(), Some(42)),
///     TapCall::Pending(_) => unreachable!("sync taps settle immediately"),
/// }
/// ```
pub struct Tap<A, R> {
    name: Arc<str>,
    stage: i32,
    before: Arc<[String]>,
    context: bool,
    body: TapBody<A, R>,
}

impl<A: HookArgs, R: Send + 'static> Tap<A, R> {
    fn build(options: TapOptions, context: bool, body: TapBody<A, R>) -> Self {
        let (name, stage, before) = options.into_parts();
        Self {
            name: name.into(),
            stage,
            before: before.into(),
            context,
            body,
        }
    }

    /// Creates a synchronous tap.
    pub fn sync<F, O>(options: impl Into<TapOptions>, f: F) -> Self
    where
        F: Fn(A) -> O + Send + Sync + 'static,
        O: IntoTapOutput<R>,
    {
        let body = move |_: Option<&TapContext>, args: A| f(args).into_tap_output();
        Self::build(options.into(), false, TapBody::Sync(Arc::new(body)))
    }

    /// Creates a synchronous tap that receives the invocation context.
    pub fn sync_with_context<F, O>(options: impl Into<TapOptions>, f: F) -> Self
    where
        F: Fn(&TapContext, A) -> O + Send + Sync + 'static,
        O: IntoTapOutput<R>,
    {
        let body = move |ctx: Option<&TapContext>, args: A| {
            with_context(ctx, |ctx| f(ctx, args).into_tap_output())
        };
        Self::build(options.into(), true, TapBody::Sync(Arc::new(body)))
    }

    /// Creates a callback-convention tap.
    pub fn callback<F>(options: impl Into<TapOptions>, f: F) -> Self
    where
        F: Fn(A, TapCallback<R>) + Send + Sync + 'static,
    {
        let body = move |_: Option<&TapContext>, args: A, callback: TapCallback<R>| {
            f(args, callback);
        };
        Self::build(options.into(), false, TapBody::Callback(Arc::new(body)))
    }

    /// Creates a callback-convention tap that receives the invocation context.
    pub fn callback_with_context<F>(options: impl Into<TapOptions>, f: F) -> Self
    where
        F: Fn(&TapContext, A, TapCallback<R>) + Send + Sync + 'static,
    {
        let body = move |ctx: Option<&TapContext>, args: A, callback: TapCallback<R>| {
            with_context(ctx, |ctx| f(ctx, args, callback));
        };
        Self::build(options.into(), true, TapBody::Callback(Arc::new(body)))
    }

    /// Creates a promise-convention tap.
    pub fn promise<F, Fut>(options: impl Into<TapOptions>, f: F) -> Self
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future + Send + 'static,
        Fut::Output: IntoTapOutput<R>,
    {
        let body = move |_: Option<&TapContext>, args: A| -> BoxFuture<'static, TapOutput<R>> {
            f(args).map(<Fut::Output as IntoTapOutput<R>>::into_tap_output).boxed()
        };
        Self::build(options.into(), false, TapBody::Promise(Arc::new(body)))
    }

    /// Creates a promise-convention tap that receives the invocation context.
    ///
    /// The returned future must be `'static`; clone the context into it when
    /// it is needed after the first suspension.
    pub fn promise_with_context<F, Fut>(options: impl Into<TapOptions>, f: F) -> Self
    where
        F: Fn(&TapContext, A) -> Fut + Send + Sync + 'static,
        Fut: Future + Send + 'static,
        Fut::Output: IntoTapOutput<R>,
    {
        let body = move |ctx: Option<&TapContext>, args: A| -> BoxFuture<'static, TapOutput<R>> {
            with_context(ctx, |ctx| f(ctx, args))
                .map(<Fut::Output as IntoTapOutput<R>>::into_tap_output)
                .boxed()
        };
        Self::build(options.into(), true, TapBody::Promise(Arc::new(body)))
    }

    /// Returns a copy of this tap with a different identity.
    ///
    /// The callback is shared with the original.
    #[must_use]
    pub fn with_options(&self, options: impl Into<TapOptions>) -> Self {
        Self::build(options.into(), self.context, self.body.clone())
    }

    /// Starts the tap.
    ///
    /// Callback taps that settle before returning are reported as
    /// [`TapCall::Ready`].
    pub fn invoke(&self, ctx: Option<&TapContext>, args: A) -> TapCall<R> {
        match &self.body {
            TapBody::Sync(f) => TapCall::Ready(f(ctx, args)),
            TapBody::Promise(f) => TapCall::Pending(f(ctx, args)),
            TapBody::Callback(f) => {
                let (callback, mut rx) = TapCallback::channel();
                f(ctx, args, callback);
                match rx.try_recv() {
                    Ok(Some(output)) => TapCall::Ready(output),
                    Ok(None) => TapCall::Pending(
                        async move {
                            rx.await
                                .unwrap_or_else(|_| Err(CallbackDropped.into()))
                        }
                        .boxed(),
                    ),
                    Err(_) => TapCall::Ready(Err(CallbackDropped.into())),
                }
            }
        }
    }

    /// Starts a callback-convention tap, handing it `callback` directly.
    ///
    /// Taps of other conventions are not started; the arguments and the
    /// callback come back in `Err`.
    pub fn invoke_callback(
        &self,
        ctx: Option<&TapContext>,
        args: A,
        callback: TapCallback<R>,
    ) -> Result<(), (A, TapCallback<R>)> {
        match &self.body {
            TapBody::Callback(f) => {
                f(ctx, args, callback);
                Ok(())
            }
            TapBody::Sync(_) | TapBody::Promise(_) => Err((args, callback)),
        }
    }
}

impl<A, R> Tap<A, R> {
    /// Returns the tap name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns a shared handle to the tap name.
    #[must_use]
    pub fn shared_name(&self) -> Arc<str> {
        Arc::clone(&self.name)
    }

    /// Returns the stage the tap runs in.
    #[must_use]
    pub fn stage(&self) -> i32 {
        self.stage
    }

    /// Returns the names this tap was placed before.
    #[must_use]
    pub fn before(&self) -> &[String] {
        &self.before
    }

    /// Returns `true` if the tap takes the invocation context.
    #[must_use]
    pub fn uses_context(&self) -> bool {
        self.context
    }

    /// Returns the tap's calling convention.
    #[must_use]
    pub fn convention(&self) -> TapConvention {
        match self.body {
            TapBody::Sync(_) => TapConvention::Sync,
            TapBody::Callback(_) => TapConvention::Callback,
            TapBody::Promise(_) => TapConvention::Promise,
        }
    }

    /// Rebuilds the options this tap was registered with.
    #[must_use]
    pub fn options(&self) -> TapOptions {
        let options = TapOptions::new(self.name.as_ref()).with_stage(self.stage);
        if self.before.is_empty() {
            options
        } else {
            options.with_before_all(self.before.iter().cloned())
        }
    }
}

impl<A, R> Clone for Tap<A, R> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            stage: self.stage,
            before: Arc::clone(&self.before),
            context: self.context,
            body: self.body.clone(),
        }
    }
}

impl<A, R> fmt::Debug for Tap<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tap")
            .field("name", &self.name)
            .field("convention", &self.convention())
            .field("stage", &self.stage)
            .field("before", &self.before)
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}
