//! Behavior of the asynchronous series hook types.


use std::sync::mpsc;

use hookline_hooks::prelude::*;
use test_utils::{Boom, Counter, ExecutionLog, millis};

// ═══════════════════════════════════════════════════════════════════════════════
// ORDERING ACROSS CONVENTIONS
// ═══════════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn mixed_conventions_run_strictly_in_order() {
    let log = ExecutionLog::new();
    let hook = AsyncSeriesHook::<(u8,)>::new(["n"]).expect("arity should match");

    hook.tap_promise("slow", {
        let log = log.clone();
        move |_| {
            let log = log.clone();
            async move {
                tokio::time::sleep(millis(20)).await;
                log.push("slow");
            }
        }
    })
    .expect("registration should succeed");
    hook.tap("sync", {
        let log = log.clone();
        move |_| log.push("sync")
    })
    .expect("registration should succeed");
    hook.tap_async("callback", {
        let log = log.clone();
        move |_, done| {
            log.push("callback");
            done.done();
        }
    })
    .expect("registration should succeed");

    hook.promise((1,)).await.expect("promise should resolve");
    assert_eq!(log.entries(), ["slow", "sync", "callback"]);
}

#[test]
fn synchronously_settling_taps_deliver_before_returning() {
    let hook = AsyncSeriesBailHook::<(u8,), u8>::new(["n"]).expect("arity should match");
    hook.tap_async("none", |_, done| done.done())
        .expect("registration should succeed");
    hook.tap_async("value", |(n,), done| done.value(n + 1))
        .expect("registration should succeed");

    let (tx, rx) = mpsc::channel();
    hook.call_async((1,), move |outcome| {
        tx.send(outcome).expect("receiver should be alive");
    });

    let outcome = rx.try_recv().expect("outcome should be delivered inline");
    assert_eq!(outcome.expect("call should succeed"), Some(2));
}

#[test]
fn many_synchronous_settlements_do_not_recurse() {
    let calls = Counter::new();
    let hook = AsyncSeriesHook::<(u8, u8)>::new(["a", "b"]).expect("arity should match");
    for _ in 0..2_000 {
        let sync_calls = calls.clone();
        hook.tap("TestPlugin", move |_| {
            sync_calls.bump();
        })
        .expect("registration should succeed");
        let callback_calls = calls.clone();
        hook.tap_async("TestPlugin", move |_, done| {
            callback_calls.bump();
            done.done();
        })
        .expect("registration should succeed");
        let promise_calls = calls.clone();
        hook.tap_promise("TestPlugin", move |_| {
            promise_calls.bump();
            async {}
        })
        .expect("registration should succeed");
    }

    let outcome = futures::executor::block_on(hook.promise((1, 2)));
    outcome.expect("promise should resolve");
    assert_eq!(calls.get(), 6_000);
}

// ═══════════════════════════════════════════════════════════════════════════════
// KINDS
// ═══════════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn series_bail_skips_remaining_taps() {
    let skipped = Counter::new();
    let hook = AsyncSeriesBailHook::<(), String>::new(Vec::<String>::new())
        .expect("arity should match");
    hook.tap_promise("none", |()| async { None::<String> })
        .expect("registration should succeed");
    hook.tap_async("found", |(), done| done.value("found".to_owned()))
        .expect("registration should succeed");
    hook.tap("skipped", {
        let skipped = skipped.clone();
        move |()| {
            skipped.bump();
        }
    })
    .expect("registration should succeed");

    let value = hook.promise(()).await.expect("promise should resolve");
    assert_eq!(value.as_deref(), Some("found"));
    assert_eq!(skipped.get(), 0);
}

#[tokio::test]
async fn series_waterfall_threads_values_across_conventions() {
    let hook = AsyncSeriesWaterfallHook::<(i32, i32)>::new(["total", "step"])
        .expect("arity should match");
    hook.tap_promise("add", |(total, step)| async move { Some(total + step) })
        .expect("registration should succeed");
    hook.tap_async("skip", |_, done| done.done())
        .expect("registration should succeed");
    hook.tap("double", |(total, _)| Some(total * 2))
        .expect("registration should succeed");

    assert_eq!(hook.promise((1, 2)).await.expect("promise should resolve"), 6);
}

#[tokio::test]
async fn series_loop_counts_to_forty_two() {
    let calls = Counter::new();
    let hook = AsyncSeriesLoopHook::<()>::new(Vec::<String>::new()).expect("arity should match");
    hook.tap_promise("count", {
        let calls = calls.clone();
        move |()| {
            let again = calls.bump() < 42;
            async move { again.then_some(()) }
        }
    })
    .expect("registration should succeed");

    hook.promise(()).await.expect("promise should resolve");
    assert_eq!(calls.get(), 42);
}

// ═══════════════════════════════════════════════════════════════════════════════
// ERRORS
// ═══════════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn callback_errors_stop_the_series() {
    let log = ExecutionLog::new();
    let hook = AsyncSeriesHook::<()>::new(Vec::<String>::new()).expect("arity should match");
    hook.tap_async("fails", |(), done| done.error(Boom("callback")))
        .expect("registration should succeed");
    hook.tap("after", {
        let log = log.clone();
        move |()| log.push("after")
    })
    .expect("registration should succeed");

    let err = hook.promise(()).await.expect_err("first tap fails");
    assert_eq!(err.tap_name(), Some("fails"));
    assert!(log.is_empty());
}

#[tokio::test]
async fn dropped_callbacks_become_errors() {
    let hook = AsyncSeriesHook::<()>::new(Vec::<String>::new()).expect("arity should match");
    hook.tap_async("forgets", |(), done| drop(done))
        .expect("registration should succeed");

    let err = hook.promise(()).await.expect_err("dropped callback fails");
    assert!(err.tap_error().is_some_and(|source| source.is::<CallbackDropped>()));
}

#[tokio::test]
async fn callbacks_may_settle_on_other_threads() {
    let hook = AsyncSeriesWaterfallHook::<(u32,)>::new(["n"]).expect("arity should match");
    hook.tap_async("threaded", |(n,), done| {
        std::thread::spawn(move || {
            std::thread::sleep(millis(10));
            done.value(n * 10);
        });
    })
    .expect("registration should succeed");
    hook.tap("plus-one", |(n,)| Some(n + 1))
        .expect("registration should succeed");

    assert_eq!(hook.promise((4,)).await.expect("promise should resolve"), 41);
}

// ═══════════════════════════════════════════════════════════════════════════════
// PLANS
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn plans_follow_the_tap_shape() {
    let hook = AsyncSeriesHook::<()>::new(Vec::<String>::new()).expect("arity should match");
    assert_eq!(hook.plan_info(CallConvention::Promise).strategy, Strategy::Empty);

    hook.tap_promise("only", |()| async {})
        .expect("registration should succeed");
    let promise = hook.plan_info(CallConvention::Promise);
    assert_eq!(promise.shape, TapShape::Single(TapConvention::Promise));
    assert_eq!(promise.strategy, Strategy::Forward);
    assert_eq!(hook.plan_info(CallConvention::Callback).strategy, Strategy::Driven);

    hook.tap("sync", |()| ()).expect("registration should succeed");
    assert_eq!(hook.plan_info(CallConvention::Promise).shape, TapShape::Heterogeneous);

    hook.intercept(InterceptorFn::new());
    let intercepted = hook.plan_info(CallConvention::Promise);
    assert_eq!(intercepted.shape, TapShape::Intercepted);
    assert_eq!(intercepted.strategy, Strategy::Driven);
}

#[test]
fn single_callback_tap_receives_the_callers_callback() {
    let hook = AsyncSeriesWaterfallHook::<(u32,)>::new(["size"]).expect("arity should match");
    hook.tap_async("halve", |(size,), done| done.value(size / 2))
        .expect("registration should succeed");
    assert_eq!(hook.plan_info(CallConvention::Callback).strategy, Strategy::Forward);

    let (tx, rx) = mpsc::channel();
    hook.call_async((8,), move |outcome| {
        tx.send(outcome).expect("receiver alive");
    });
    let outcome = rx.try_recv().expect("callback tap settled inline");
    assert_eq!(outcome.expect("call should succeed"), 4);
}

#[test]
fn sync_only_taps_run_inline_on_async_hooks() {
    let hook = AsyncSeriesHook::<()>::new(Vec::<String>::new()).expect("arity should match");
    hook.tap("a", |()| ()).expect("registration should succeed");
    hook.tap("b", |()| ()).expect("registration should succeed");

    for convention in CallConvention::ALL {
        assert_eq!(hook.plan_info(convention).strategy, Strategy::Inline);
    }
}
