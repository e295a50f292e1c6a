//! State shared by every hook type.
//!
//! [`HookCore`] owns the tap registry, the interceptor chain and the plan
//! cache of one hook. The public hook types are thin wrappers that fix the
//! kind and mode and shape the outcome for their callers.

use core::fmt;
use std::sync::Arc;

use futures::FutureExt;
use futures::channel::oneshot;
use hookline_tap::args::HookArgs;
use hookline_tap::error::HookError;
use hookline_tap::interceptor::{Interceptor, InterceptorChain};
use hookline_tap::registry::TapRegistry;
use hookline_tap::tap::{BoxFuture, Tap, TapConvention};
use parking_lot::RwLock;

use crate::kind::{CallConvention, HookKind, HookMode, Strategy};
use crate::machine::{Settled, WaterfallOps};
use crate::plan::{ExecutionPlan, ExecutionPlanner, HookDescriptor, PlanInfo};
use crate::run::{forward_callback, forward_promise, run_inline, spawn_driven};

struct HookState<A, R> {
    registry: TapRegistry<A, R>,
    interceptors: InterceptorChain<A, R>,
    plans: [Option<Arc<ExecutionPlan<A, R>>>; 3],
}

impl<A, R> HookState<A, R> {
    fn invalidate(&mut self) {
        self.plans = [None, None, None];
    }
}

/// Registry, interceptors and plan cache of one hook.
///
/// # Thread Safety
///
/// Registration takes a short write lock. Invocations only clone the cached
/// plan out of the lock, so taps may register further taps while running;
/// those take effect from the next invocation.
pub struct HookCore<A, R> {
    descriptor: HookDescriptor,
    waterfall: Option<WaterfallOps<A, R>>,
    state: RwLock<HookState<A, R>>,
}

impl<A: HookArgs, R: Send + 'static> HookCore<A, R> {
    pub(crate) fn new<I, S>(
        kind: HookKind,
        mode: HookMode,
        type_name: &'static str,
        arg_names: I,
    ) -> Result<Self, HookError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let arg_names: Vec<String> = arg_names.into_iter().map(Into::into).collect();
        if kind == HookKind::Waterfall && arg_names.is_empty() {
            return Err(HookError::InsufficientArguments { hook: type_name });
        }
        if arg_names.len() != A::ARITY {
            return Err(HookError::ArityMismatch {
                hook: type_name,
                declared: arg_names.len(),
                expected: A::ARITY,
            });
        }

        Ok(Self {
            descriptor: HookDescriptor {
                kind,
                mode,
                type_name,
                name: None,
                arg_names,
            },
            waterfall: None,
            state: RwLock::new(HookState {
                registry: TapRegistry::new(),
                interceptors: InterceptorChain::new(),
                plans: [None, None, None],
            }),
        })
    }

    pub(crate) fn with_waterfall(mut self, ops: WaterfallOps<A, R>) -> Self {
        self.waterfall = Some(ops);
        self
    }

    pub(crate) fn set_name(&mut self, name: impl Into<String>) {
        self.descriptor.name = Some(Arc::from(name.into()));
    }

    // ─── Registration ────────────────────────────────────────────────────────

    fn check_convention(
        &self,
        method: &'static str,
        convention: TapConvention,
    ) -> Result<(), HookError> {
        if self.descriptor.mode == HookMode::Sync && convention != TapConvention::Sync {
            return Err(HookError::UnsupportedOnHookKind {
                method,
                hook: self.descriptor.type_name,
            });
        }
        Ok(())
    }

    /// Registers a tap built by one of the `tap*` methods.
    ///
    /// `method` names the public method in errors.
    pub fn register(&self, method: &'static str, tap: Tap<A, R>) -> Result<(), HookError> {
        self.check_convention(method, tap.convention())?;
        if tap.name().trim().is_empty() {
            return Err(HookError::InvalidTapName { method });
        }

        let interceptors = self.state.read().interceptors.clone();
        let tap = interceptors.register(tap);
        self.check_convention(method, tap.convention())?;
        if tap.name().trim().is_empty() {
            return Err(HookError::InvalidTapName { method });
        }

        let mut state = self.state.write();
        let index = state.registry.insert(tap);
        state.invalidate();
        tracing::trace!(hook = %self.descriptor.label(), method, index, "tap registered");
        Ok(())
    }

    /// Appends an interceptor.
    pub fn intercept(&self, interceptor: impl Interceptor<A, R>) {
        let mut state = self.state.write();
        state.interceptors.push(interceptor);
        state.invalidate();
    }

    // ─── Inspection ──────────────────────────────────────────────────────────

    /// Returns `true` if a tap or interceptor is registered.
    #[must_use]
    pub fn is_used(&self) -> bool {
        let state = self.state.read();
        !state.registry.is_empty() || !state.interceptors.is_empty()
    }

    /// Returns the registered taps in execution order.
    #[must_use]
    pub fn taps(&self) -> Vec<Tap<A, R>> {
        self.state.read().registry.as_slice().to_vec()
    }

    /// Returns the type name of the hook, such as `"SyncBailHook"`.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.descriptor.type_name
    }

    /// Returns the diagnostic name set through `with_name`.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.descriptor.name.as_deref()
    }

    /// Returns the declared argument names.
    #[must_use]
    pub fn arg_names(&self) -> &[String] {
        &self.descriptor.arg_names
    }

    /// Returns the hook kind.
    #[must_use]
    pub fn kind(&self) -> HookKind {
        self.descriptor.kind
    }

    /// Returns the hook mode.
    #[must_use]
    pub fn mode(&self) -> HookMode {
        self.descriptor.mode
    }

    /// Describes the plan used for invocations through `convention`.
    #[must_use]
    pub fn plan_info(&self, convention: CallConvention) -> PlanInfo {
        self.plan(convention).info
    }

    fn plan(&self, convention: CallConvention) -> Arc<ExecutionPlan<A, R>> {
        let slot = convention.slot();
        let cached = self.state.read().plans[slot].clone();
        if let Some(plan) = cached {
            return plan;
        }

        let mut state = self.state.write();
        if let Some(plan) = &state.plans[slot] {
            return Arc::clone(plan);
        }
        let plan = Arc::new(ExecutionPlanner::compile(
            &self.descriptor,
            self.waterfall,
            &state.registry,
            &state.interceptors,
            convention,
        ));
        state.plans[slot] = Some(Arc::clone(&plan));
        plan
    }

    // ─── Invocation ──────────────────────────────────────────────────────────

    pub(crate) fn call(&self, args: A) -> Settled<R> {
        let plan = self.plan(CallConvention::Sync);
        match plan.info.strategy {
            Strategy::Empty => plan.empty(&args),
            Strategy::Inline | Strategy::Forward | Strategy::Driven => run_inline(&plan, args),
        }
    }

    pub(crate) fn call_async(&self, args: A, callback: impl FnOnce(Settled<R>) + Send + 'static) {
        let plan = self.plan(CallConvention::Callback);
        match plan.info.strategy {
            Strategy::Empty => callback(plan.empty(&args)),
            Strategy::Inline => callback(run_inline(&plan, args)),
            Strategy::Forward => forward_callback(plan, args, Box::new(callback)),
            Strategy::Driven => spawn_driven(plan, args, Box::new(callback)),
        }
    }

    pub(crate) fn promise(&self, args: A) -> BoxFuture<'static, Settled<R>> {
        let plan = self.plan(CallConvention::Promise);
        match plan.info.strategy {
            Strategy::Empty => futures::future::ready(plan.empty(&args)).boxed(),
            Strategy::Inline => futures::future::ready(run_inline(&plan, args)).boxed(),
            Strategy::Forward => forward_promise(plan, args),
            Strategy::Driven => {
                let (tx, rx) = oneshot::channel();
                spawn_driven(
                    plan,
                    args,
                    Box::new(move |settled| {
                        // A dropped receiver means the caller stopped waiting.
                        let _ = tx.send(settled);
                    }),
                );
                rx.map(|received| received.unwrap_or_else(|_| Err(HookError::InvocationAbandoned)))
                    .boxed()
            }
        }
    }
}

impl<A: 'static, R: 'static> fmt::Debug for HookCore<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        f.debug_struct(self.descriptor.type_name)
            .field("name", &self.descriptor.name)
            .field("args", &self.descriptor.arg_names)
            .field("taps", &state.registry)
            .field("interceptors", &state.interceptors.len())
            .finish()
    }
}
