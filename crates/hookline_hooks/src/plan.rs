//! Execution planning and the per-convention plan cache entries.
//!
//! A plan is compiled lazily the first time a hook is invoked through a
//! calling convention, and reused until a tap or interceptor is added.
//!
//! # Strategy Selection
//!
//! | Shape | Hook mode | Requested convention | Strategy |
//! |-------|-----------|----------------------|----------|
//! | `none` | any | any | [`Empty`](Strategy::Empty) |
//! | any other | sync | any | [`Inline`](Strategy::Inline) |
//! | `single:sync`, `multiple-homogeneous:sync` | series, parallel | any | [`Inline`](Strategy::Inline) |
//! | `single:<c>`, non-loop kind | series, parallel | same as `<c>` | [`Forward`](Strategy::Forward) |
//! | everything else | series, parallel | any | [`Driven`](Strategy::Driven) |

use std::sync::Arc;

use hookline_tap::args::HookArgs;
use hookline_tap::context::TapContext;
use hookline_tap::interceptor::InterceptorChain;
use hookline_tap::registry::TapRegistry;
use hookline_tap::tap::{Tap, TapConvention};

use crate::kind::{CallConvention, HookKind, HookMode, Strategy, TapShape};
use crate::machine::{SeriesMachine, Settled, WaterfallOps, empty_outcome};

/// Static description of a hook, fixed at construction.
#[derive(Debug, Clone)]
pub(crate) struct HookDescriptor {
    pub(crate) kind: HookKind,
    pub(crate) mode: HookMode,
    pub(crate) type_name: &'static str,
    pub(crate) name: Option<Arc<str>>,
    pub(crate) arg_names: Vec<String>,
}

impl HookDescriptor {
    /// Name used in log fields.
    pub(crate) fn label(&self) -> Arc<str> {
        self.name
            .clone()
            .unwrap_or_else(|| Arc::from(self.type_name))
    }
}

/// Summary of the plan a hook would use for a calling convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanInfo {
    /// Tap-shape signature the plan was compiled for.
    pub shape: TapShape,
    /// Selected execution strategy.
    pub strategy: Strategy,
    /// Calling convention the plan serves.
    pub convention: CallConvention,
}

// ─────────────────────────────────────────────────────────────────────────────
// ExecutionPlan
// ─────────────────────────────────────────────────────────────────────────────

/// An immutable, compiled plan shared by every invocation that uses it.
pub(crate) struct ExecutionPlan<A, R> {
    pub(crate) label: Arc<str>,
    pub(crate) kind: HookKind,
    pub(crate) mode: HookMode,
    pub(crate) info: PlanInfo,
    pub(crate) uses_context: bool,
    pub(crate) taps: Vec<Tap<A, R>>,
    pub(crate) interceptors: InterceptorChain<A, R>,
    pub(crate) waterfall: Option<WaterfallOps<A, R>>,
}

impl<A: HookArgs, R: Send + 'static> ExecutionPlan<A, R> {
    /// Allocates the per-invocation context when a tap asks for one.
    pub(crate) fn new_context(&self) -> Option<TapContext> {
        self.uses_context.then(TapContext::new)
    }

    /// Returns the tap at `index` as rewritten by the interceptors.
    pub(crate) fn prepare(&self, index: usize) -> Tap<A, R> {
        let tap = self.taps[index].clone();
        if self.interceptors.is_empty() {
            tap
        } else {
            self.interceptors.tap(tap)
        }
    }

    /// Creates the iteration state for one series invocation.
    pub(crate) fn series(&self, args: A) -> SeriesMachine<A, R> {
        SeriesMachine::new(self.kind, self.waterfall, args, self.taps.len())
    }

    /// Outcome of an invocation with nothing to run.
    pub(crate) fn empty(&self, args: &A) -> Settled<R> {
        empty_outcome(self.waterfall, args)
    }

    /// Runs the interceptors' invocation observers, and the first loop
    /// observer for loop hooks that have taps.
    pub(crate) fn begin(&self, args: &A) {
        self.interceptors.call(args);
        if self.kind == HookKind::Loop && !self.taps.is_empty() {
            self.interceptors.loop_iteration(args);
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ExecutionPlanner
// ─────────────────────────────────────────────────────────────────────────────

/// Classifies tap sets and selects execution strategies.
pub struct ExecutionPlanner;

impl ExecutionPlanner {
    /// Computes the tap-shape signature of a tap list.
    #[must_use]
    pub fn classify<A, R>(taps: &[Tap<A, R>], interceptors: usize) -> TapShape {
        if interceptors > 0 {
            return TapShape::Intercepted;
        }
        let Some((first, rest)) = taps.split_first() else {
            return TapShape::None;
        };

        let convention = first.convention();
        if rest.is_empty() {
            TapShape::Single(convention)
        } else if rest.iter().all(|tap| tap.convention() == convention) {
            TapShape::Homogeneous(convention)
        } else {
            TapShape::Heterogeneous
        }
    }

    /// Picks the strategy for a shape and requested convention.
    #[must_use]
    pub fn select(
        kind: HookKind,
        mode: HookMode,
        shape: TapShape,
        convention: CallConvention,
    ) -> Strategy {
        match shape {
            TapShape::None => Strategy::Empty,
            _ if mode == HookMode::Sync => Strategy::Inline,
            TapShape::Single(TapConvention::Sync) | TapShape::Homogeneous(TapConvention::Sync) => {
                Strategy::Inline
            }
            TapShape::Single(tap) if kind != HookKind::Loop && convention.matches(tap) => {
                Strategy::Forward
            }
            _ => Strategy::Driven,
        }
    }

    pub(crate) fn compile<A: HookArgs, R: Send + 'static>(
        descriptor: &HookDescriptor,
        waterfall: Option<WaterfallOps<A, R>>,
        registry: &TapRegistry<A, R>,
        interceptors: &InterceptorChain<A, R>,
        convention: CallConvention,
    ) -> ExecutionPlan<A, R> {
        let shape = Self::classify(registry.as_slice(), interceptors.len());
        let strategy = Self::select(descriptor.kind, descriptor.mode, shape, convention);
        let label = descriptor.label();

        tracing::debug!(
            hook = %label,
            kind = ?descriptor.kind,
            mode = ?descriptor.mode,
            %shape,
            %convention,
            %strategy,
            "execution plan compiled"
        );

        ExecutionPlan {
            label,
            kind: descriptor.kind,
            mode: descriptor.mode,
            info: PlanInfo {
                shape,
                strategy,
                convention,
            },
            uses_context: registry.iter().any(Tap::uses_context),
            taps: registry.as_slice().to_vec(),
            interceptors: interceptors.clone(),
            waterfall,
        }
    }
}
