//! Fan-out registration across several hooks.

use std::sync::Arc;

use hookline_tap::error::HookError;
use hookline_tap::interceptor::Interceptor;
use hookline_tap::options::TapOptions;
use hookline_tap::tap::{IntoTapOutput, TapCallback};

use crate::tapable::Tapable;

/// Registers the same tap or interceptor on every hook it holds.
///
/// Registration stops at the first hook that rejects it; hooks earlier in
/// the list keep the tap.
///
/// # Example
///
/// ```
/// use hookline_hooks::prelude::*;
/// use std::sync::Arc;
///
/// let before = Arc::new(SyncHook::<(u32,)>::new(["id"])?);
/// let after = Arc::new(SyncHook::<(u32,)>::new(["id"])?);
/// let both = MultiHook::new([Arc::clone(&before), Arc::clone(&after)]);
///
/// both.tap("audit", |(id,)| tracing::debug!(id, "audited"))?;
/// assert!(before.is_used() && after.is_used());
/// # Ok::<(), HookError>(())
/// ```
#[derive(Debug)]
pub struct MultiHook<H> {
    hooks: Vec<Arc<H>>,
    defaults: TapOptions,
}

impl<H> Clone for MultiHook<H> {
    fn clone(&self) -> Self {
        Self {
            hooks: self.hooks.clone(),
            defaults: self.defaults.clone(),
        }
    }
}

impl<H: Tapable> MultiHook<H> {
    /// Groups `hooks`.
    pub fn new(hooks: impl IntoIterator<Item = Arc<H>>) -> Self {
        Self {
            hooks: hooks.into_iter().collect(),
            defaults: TapOptions::default(),
        }
    }

    fn merge(&self, options: impl Into<TapOptions>) -> TapOptions {
        options.into().merged_over(&self.defaults)
    }

    /// Registers a synchronous tap on every hook.
    pub fn tap<F, O>(&self, options: impl Into<TapOptions>, f: F) -> Result<(), HookError>
    where
        F: Fn(H::Args) -> O + Send + Sync + 'static,
        O: IntoTapOutput<H::Result>,
    {
        let options = self.merge(options);
        let f = Arc::new(f);
        for hook in &self.hooks {
            let f = Arc::clone(&f);
            hook.tap(options.clone(), move |args| (*f)(args))?;
        }
        Ok(())
    }

    /// Registers a callback-convention tap on every hook.
    pub fn tap_async<F>(&self, options: impl Into<TapOptions>, f: F) -> Result<(), HookError>
    where
        F: Fn(H::Args, TapCallback<H::Result>) + Send + Sync + 'static,
    {
        let options = self.merge(options);
        let f = Arc::new(f);
        for hook in &self.hooks {
            let f = Arc::clone(&f);
            hook.tap_async(options.clone(), move |args, callback| (*f)(args, callback))?;
        }
        Ok(())
    }

    /// Registers a promise-convention tap on every hook.
    pub fn tap_promise<F, Fut>(&self, options: impl Into<TapOptions>, f: F) -> Result<(), HookError>
    where
        F: Fn(H::Args) -> Fut + Send + Sync + 'static,
        Fut: Future + Send + 'static,
        Fut::Output: IntoTapOutput<H::Result>,
    {
        let options = self.merge(options);
        let f = Arc::new(f);
        for hook in &self.hooks {
            let f = Arc::clone(&f);
            hook.tap_promise(options.clone(), move |args| (*f)(args))?;
        }
        Ok(())
    }

    /// Appends one shared interceptor to every hook.
    pub fn intercept(&self, interceptor: impl Interceptor<H::Args, H::Result>) {
        let interceptor = Arc::new(interceptor);
        for hook in &self.hooks {
            hook.intercept(Arc::clone(&interceptor));
        }
    }

    /// Returns `true` if any hook has taps or interceptors.
    #[must_use]
    pub fn is_used(&self) -> bool {
        self.hooks.iter().any(|hook| hook.is_used())
    }

    /// Returns a group over the same hooks with defaults layered over these.
    #[must_use]
    pub fn with_options(&self, options: impl Into<TapOptions>) -> Self {
        Self {
            hooks: self.hooks.clone(),
            defaults: self.merge(options),
        }
    }

    /// Returns the grouped hooks.
    #[must_use]
    pub fn hooks(&self) -> &[Arc<H>] {
        &self.hooks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::async_series::AsyncSeriesHook;
    use crate::sync::SyncHook;
    use hookline_tap::interceptor::InterceptorFn;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn pair() -> (Arc<SyncHook<(u8,)>>, Arc<SyncHook<(u8,)>>) {
        (
            Arc::new(SyncHook::new(["n"]).expect("arity should match")),
            Arc::new(SyncHook::new(["n"]).expect("arity should match")),
        )
    }

    #[test]
    fn tap_reaches_every_hook() {
        let (a, b) = pair();
        let calls = Arc::new(AtomicUsize::new(0));
        let multi = MultiHook::new([Arc::clone(&a), Arc::clone(&b)]);

        let counter = Arc::clone(&calls);
        multi
            .tap("count", move |(n,)| {
                counter.fetch_add(usize::from(n), Ordering::SeqCst);
            })
            .expect("registration should succeed");

        a.call((1,)).expect("call should succeed");
        b.call((2,)).expect("call should succeed");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn rejection_stops_fan_out() {
        let (a, b) = pair();
        let multi = MultiHook::new([a, b]);
        let err = multi
            .tap_async("cb", |_args, done| done.done())
            .expect_err("sync hooks reject callback taps");
        assert!(matches!(err, HookError::UnsupportedOnHookKind { .. }));
        assert!(!multi.is_used());
    }

    #[test]
    fn with_options_applies_defaults() {
        let (a, b) = pair();
        a.tap("existing", |_| ()).expect("registration should succeed");

        let multi = MultiHook::new([Arc::clone(&a), Arc::clone(&b)])
            .with_options(TapOptions::default().with_stage(-5));
        multi.tap("early", |_| ()).expect("registration should succeed");

        assert_eq!(a.taps()[0].name(), "early");
        assert_eq!(b.taps()[0].stage(), -5);
    }

    #[test]
    fn intercept_is_shared() {
        let (a, b) = pair();
        let multi = MultiHook::new([Arc::clone(&a), Arc::clone(&b)]);
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        multi.intercept(InterceptorFn::new().on_call(move |_args: &(u8,)| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        assert!(multi.is_used());
        a.call((0,)).expect("call should succeed");
        b.call((0,)).expect("call should succeed");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn promise_taps_fan_out() {
        let hooks = [
            Arc::new(AsyncSeriesHook::<(u8,)>::new(["n"]).expect("arity should match")),
            Arc::new(AsyncSeriesHook::<(u8,)>::new(["n"]).expect("arity should match")),
        ];
        let multi = MultiHook::new(hooks.iter().cloned());
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        multi
            .tap_promise("p", move |_args| {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                }
            })
            .expect("registration should succeed");

        for hook in &hooks {
            hook.promise((1,)).await.expect("promise should resolve");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
