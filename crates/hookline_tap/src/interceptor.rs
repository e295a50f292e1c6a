//! Observers that rewrite taps and watch invocations.
//!
//! # Hooks into the Lifecycle
//!
//! | Method | Fires |
//! |--------|-------|
//! | [`register`](Interceptor::register) | once per tap registered after the interceptor |
//! | [`call`](Interceptor::call) | once per invocation, before any tap runs |
//! | [`loop_iteration`](Interceptor::loop_iteration) | before every pass of a loop hook |
//! | [`tap`](Interceptor::tap) | before each tap runs, may substitute the tap |
//!
//! Interceptors fire in the order they were added. `register` is not applied
//! to taps that were already present when the interceptor was added.

use core::fmt;
use std::sync::Arc;

use crate::tap::Tap;

/// An observer and rewriter attached to a hook.
///
/// Every method has a no-op default, so implementors only override what
/// they need.
///
/// # Example
///
/// ```
/// use hookline_tap::interceptor::Interceptor;
/// use std::sync::atomic::{AtomicUsize, Ordering};
///
/// #[derive(Default)]
/// struct CallCounter(AtomicUsize);
///
/// impl Interceptor<(u32,), ()> for CallCounter {
///     fn name(&self) -> Option<&str> {
///         Some("call-counter")
///     }
///
///     fn call(&self, _args: &(u32,)) {
///         self.0.fetch_add(1, Ordering::Relaxed);
///     }
/// }
/// ```
pub trait Interceptor<A, R>: Send + Sync + 'static {
    /// Diagnostic name.
    fn name(&self) -> Option<&str> {
        None
    }

    /// Observes an invocation before any tap runs.
    fn call(&self, _args: &A) {}

    /// Observes the start of each pass of a loop hook.
    fn loop_iteration(&self, _args: &A) {}

    /// Observes, and may replace, a tap about to run.
    fn tap(&self, tap: Tap<A, R>) -> Tap<A, R> {
        tap
    }

    /// Rewrites a tap as it is registered.
    fn register(&self, tap: Tap<A, R>) -> Tap<A, R> {
        tap
    }
}

impl<A, R, I> Interceptor<A, R> for Arc<I>
where
    I: Interceptor<A, R>,
{
    fn name(&self) -> Option<&str> {
        I::name(self)
    }

    fn call(&self, args: &A) {
        I::call(self, args);
    }

    fn loop_iteration(&self, args: &A) {
        I::loop_iteration(self, args);
    }

    fn tap(&self, tap: Tap<A, R>) -> Tap<A, R> {
        I::tap(self, tap)
    }

    fn register(&self, tap: Tap<A, R>) -> Tap<A, R> {
        I::register(self, tap)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// InterceptorFn
// ─────────────────────────────────────────────────────────────────────────────

type ArgsObserver<A> = Box<dyn Fn(&A) + Send + Sync>;
type TapRewriter<A, R> = Box<dyn Fn(Tap<A, R>) -> Tap<A, R> + Send + Sync>;

/// An interceptor assembled from closures.
///
/// # Example
///
/// ```
/// use hookline_tap::interceptor::InterceptorFn;
///
/// let interceptor = InterceptorFn::<(String,), ()>::new()
///     .with_name("audit")
///     .on_call(|(path,)| tracing::info!(%path, "compiling"))
///     .on_register(|tap| {
///         let options = tap.options().with_stage(tap.stage() - 1);
///         tap.with_options(options)
///     });
/// ```
pub struct InterceptorFn<A, R> {
    name: Option<String>,
    call: Option<ArgsObserver<A>>,
    loop_iteration: Option<ArgsObserver<A>>,
    tap: Option<TapRewriter<A, R>>,
    register: Option<TapRewriter<A, R>>,
}

impl<A, R> InterceptorFn<A, R> {
    /// Creates an interceptor that does nothing.
    #[must_use]
    pub fn new() -> Self {
        Self {
            name: None,
            call: None,
            loop_iteration: None,
            tap: None,
            register: None,
        }
    }

    /// Sets the diagnostic name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the invocation observer.
    #[must_use]
    pub fn on_call(mut self, f: impl Fn(&A) + Send + Sync + 'static) -> Self {
        self.call = Some(Box::new(f));
        self
    }

    /// Sets the loop pass observer.
    #[must_use]
    pub fn on_loop(mut self, f: impl Fn(&A) + Send + Sync + 'static) -> Self {
        self.loop_iteration = Some(Box::new(f));
        self
    }

    /// Sets the per-run tap rewriter.
    #[must_use]
    pub fn on_tap(mut self, f: impl Fn(Tap<A, R>) -> Tap<A, R> + Send + Sync + 'static) -> Self {
        self.tap = Some(Box::new(f));
        self
    }

    /// Sets the registration rewriter.
    #[must_use]
    pub fn on_register(
        mut self,
        f: impl Fn(Tap<A, R>) -> Tap<A, R> + Send + Sync + 'static,
    ) -> Self {
        self.register = Some(Box::new(f));
        self
    }
}

impl<A, R> Default for InterceptorFn<A, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: 'static, R: 'static> Interceptor<A, R> for InterceptorFn<A, R> {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn call(&self, args: &A) {
        if let Some(f) = &self.call {
            f(args);
        }
    }

    fn loop_iteration(&self, args: &A) {
        if let Some(f) = &self.loop_iteration {
            f(args);
        }
    }

    fn tap(&self, tap: Tap<A, R>) -> Tap<A, R> {
        match &self.tap {
            Some(f) => f(tap),
            None => tap,
        }
    }

    fn register(&self, tap: Tap<A, R>) -> Tap<A, R> {
        match &self.register {
            Some(f) => f(tap),
            None => tap,
        }
    }
}

impl<A, R> fmt::Debug for InterceptorFn<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterceptorFn")
            .field("name", &self.name)
            .field("call", &self.call.is_some())
            .field("loop", &self.loop_iteration.is_some())
            .field("tap", &self.tap.is_some())
            .field("register", &self.register.is_some())
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// InterceptorChain
// ─────────────────────────────────────────────────────────────────────────────

/// The interceptors of one hook, in the order they were added.
pub struct InterceptorChain<A, R> {
    interceptors: Vec<Arc<dyn Interceptor<A, R>>>,
}

impl<A: 'static, R: 'static> InterceptorChain<A, R> {
    /// Creates an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self {
            interceptors: Vec::new(),
        }
    }

    /// Appends an interceptor.
    pub fn push(&mut self, interceptor: impl Interceptor<A, R>) {
        self.interceptors.push(Arc::new(interceptor));
    }

    /// Passes a newly registered tap through every `register` hook.
    pub fn register(&self, tap: Tap<A, R>) -> Tap<A, R> {
        self.interceptors
            .iter()
            .fold(tap, |tap, interceptor| interceptor.register(tap))
    }

    /// Notifies every interceptor of an invocation.
    pub fn call(&self, args: &A) {
        for interceptor in &self.interceptors {
            interceptor.call(args);
        }
    }

    /// Notifies every interceptor of a loop pass.
    pub fn loop_iteration(&self, args: &A) {
        for interceptor in &self.interceptors {
            interceptor.loop_iteration(args);
        }
    }

    /// Passes a tap about to run through every `tap` hook.
    pub fn tap(&self, tap: Tap<A, R>) -> Tap<A, R> {
        self.interceptors
            .iter()
            .fold(tap, |tap, interceptor| interceptor.tap(tap))
    }

    /// Returns the names of named interceptors.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.interceptors
            .iter()
            .filter_map(|interceptor| interceptor.name())
            .collect()
    }

    /// Returns the number of interceptors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    /// Returns `true` if the chain is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }
}

impl<A: 'static, R: 'static> Default for InterceptorChain<A, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A, R> Clone for InterceptorChain<A, R> {
    fn clone(&self) -> Self {
        Self {
            interceptors: self.interceptors.clone(),
        }
    }
}

impl<A: 'static, R: 'static> fmt::Debug for InterceptorChain<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterceptorChain")
            .field("len", &self.interceptors.len())
            .field("names", &self.names())
            .finish()
    }
}
