//! Runners that execute a plan for one invocation.
//!
//! `run_inline` is the only runner that never suspends. The others build
//! futures that either the caller awaits ([`Forward`](crate::kind::Strategy::Forward))
//! or the inline task driver polls ([`Driven`](crate::kind::Strategy::Driven)).

use std::sync::Arc;

use futures::{FutureExt, StreamExt};
use futures::stream::FuturesUnordered;
use hookline_tap::args::HookArgs;
use hookline_tap::error::HookError;
use hookline_tap::tap::{BoxFuture, TapCall, TapCallback, TapConvention, TapOutput};

use crate::driver::spawn_inline;
use crate::kind::{HookKind, HookMode};
use crate::machine::{BailConvergence, Join, Outcome, ParallelJoin, Settled, Step};
use crate::plan::ExecutionPlan;

/// One-shot sink for the outcome of an invocation.
pub(crate) type Delivery<R> = Box<dyn FnOnce(Settled<R>) + Send>;

/// Runs every tap on the caller's stack.
///
/// An asynchronous tap that does not settle before returning fails the
/// invocation with [`HookError::NotSynchronous`].
pub(crate) fn run_inline<A: HookArgs, R: Send + 'static>(
    plan: &ExecutionPlan<A, R>,
    args: A,
) -> Settled<R> {
    let context = plan.new_context();
    plan.begin(&args);
    let mut machine = plan.series(args);

    while let Some(index) = machine.position() {
        let tap = plan.prepare(index);
        tracing::trace!(hook = %plan.label, tap = tap.name(), index, "invoking tap");

        let output = match tap.invoke(context.as_ref(), machine.args().clone()) {
            TapCall::Ready(output) => output,
            TapCall::Pending(_) => {
                return Err(HookError::NotSynchronous {
                    tap: tap.name().to_owned(),
                });
            }
        };

        match machine.record(tap.name(), output) {
            Step::Continue => {}
            Step::Restart => plan.interceptors.loop_iteration(machine.args()),
            Step::Finish(settled) => return settled,
        }
    }
    machine.finish()
}

/// Runs taps one after another, awaiting each asynchronous tap.
async fn run_series<A: HookArgs, R: Send + 'static>(
    plan: &ExecutionPlan<A, R>,
    args: A,
) -> Settled<R> {
    let context = plan.new_context();
    plan.begin(&args);
    let mut machine = plan.series(args);

    while let Some(index) = machine.position() {
        let tap = plan.prepare(index);
        tracing::trace!(hook = %plan.label, tap = tap.name(), index, "invoking tap");

        let output = match tap.invoke(context.as_ref(), machine.args().clone()) {
            TapCall::Ready(output) => output,
            TapCall::Pending(future) => future.await,
        };

        match machine.record(tap.name(), output) {
            Step::Continue => {}
            Step::Restart => plan.interceptors.loop_iteration(machine.args()),
            Step::Finish(settled) => return settled,
        }
    }
    machine.finish()
}

/// Starts every accepted tap, then joins their outcomes.
///
/// The outcome is delivered as soon as `join` decides it; the remaining taps
/// keep running and their outcomes are discarded.
async fn run_parallel<A, R, J>(
    plan: Arc<ExecutionPlan<A, R>>,
    args: A,
    mut join: J,
    deliver: Delivery<R>,
) where
    A: HookArgs,
    R: Send + 'static,
    J: Join<R>,
{
    let context = plan.new_context();
    plan.begin(&args);

    let mut deliver = Some(deliver);
    let mut settle = |outcome: Outcome<R>| {
        if let Some(settled) = outcome.into_settled()
            && let Some(deliver) = deliver.take()
        {
            deliver(settled);
        }
    };

    let mut pending = FuturesUnordered::new();
    for index in 0..plan.taps.len() {
        if !join.accepts(index) {
            tracing::trace!(hook = %plan.label, index, "remaining taps skipped");
            break;
        }
        let tap = plan.prepare(index);
        tracing::trace!(hook = %plan.label, tap = tap.name(), index, "starting tap");

        match tap.invoke(context.as_ref(), args.clone()) {
            TapCall::Ready(output) => settle(join.record(index, tap.name(), output)),
            TapCall::Pending(future) => {
                let name = tap.shared_name();
                pending.push(async move { (index, name, future.await) });
            }
        }
    }

    while let Some((index, name, output)) = pending.next().await {
        settle(join.record(index, &name, output));
    }
    settle(join.finish());
}

/// Builds the state machine future for a driven invocation.
fn run_driven<A: HookArgs, R: Send + 'static>(
    plan: Arc<ExecutionPlan<A, R>>,
    args: A,
    deliver: Delivery<R>,
) -> BoxFuture<'static, ()> {
    match (plan.mode, plan.kind) {
        (HookMode::Parallel, HookKind::Bail) => {
            let join = BailConvergence::new(plan.taps.len());
            run_parallel(plan, args, join, deliver).boxed()
        }
        (HookMode::Parallel, _) => {
            run_parallel(plan, args, ParallelJoin::default(), deliver).boxed()
        }
        _ => async move {
            let settled = run_series(&plan, args).await;
            deliver(settled);
        }
        .boxed(),
    }
}

/// Drives an invocation on the inline task driver.
pub(crate) fn spawn_driven<A: HookArgs, R: Send + 'static>(
    plan: Arc<ExecutionPlan<A, R>>,
    args: A,
    deliver: Delivery<R>,
) {
    spawn_inline(run_driven(plan, args, deliver));
}

// ─────────────────────────────────────────────────────────────────────────────
// Forward
// ─────────────────────────────────────────────────────────────────────────────

/// Shapes a single tap's output into the invocation outcome.
fn conclude<A: HookArgs, R: Send + 'static>(
    plan: &ExecutionPlan<A, R>,
    args: A,
    tap: &str,
    output: TapOutput<R>,
) -> Settled<R> {
    let mut machine = plan.series(args);
    match machine.record(tap, output) {
        Step::Finish(settled) => settled,
        Step::Continue | Step::Restart => machine.finish(),
    }
}

/// Hands the caller's callback straight to a single callback tap.
pub(crate) fn forward_callback<A: HookArgs, R: Send + 'static>(
    plan: Arc<ExecutionPlan<A, R>>,
    args: A,
    deliver: Delivery<R>,
) {
    let tap = plan.prepare(0);
    let context = plan.new_context();
    let name = tap.shared_name();
    let leading = args.clone();
    let shaping = Arc::clone(&plan);

    let callback = TapCallback::new(move |output: TapOutput<R>| {
        deliver(conclude(&shaping, leading, &name, output));
    });

    debug_assert_eq!(tap.convention(), TapConvention::Callback);
    tracing::trace!(hook = %plan.label, tap = tap.name(), "forwarding callback");
    // Only callback taps are forwarded; a refused callback is dropped and
    // fails the invocation.
    let _ = tap.invoke_callback(context.as_ref(), args, callback);
}

/// Awaits a single promise tap directly.
pub(crate) fn forward_promise<A: HookArgs, R: Send + 'static>(
    plan: Arc<ExecutionPlan<A, R>>,
    args: A,
) -> BoxFuture<'static, Settled<R>> {
    let tap = plan.prepare(0);
    let context = plan.new_context();
    let name = tap.shared_name();
    let leading = args.clone();

    tracing::trace!(hook = %plan.label, tap = tap.name(), "forwarding promise");
    match tap.invoke(context.as_ref(), args) {
        TapCall::Ready(output) => {
            futures::future::ready(conclude(&plan, leading, &name, output)).boxed()
        }
        TapCall::Pending(future) => future
            .map(move |output| conclude(&plan, leading, &name, output))
            .boxed(),
    }
}
