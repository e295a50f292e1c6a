//! Behavior of the asynchronous parallel hook types.


use std::sync::Arc;

use hookline_hooks::prelude::*;
use test_utils::{Boom, Counter, ExecutionLog, millis};
use tokio::sync::Notify;

// ═══════════════════════════════════════════════════════════════════════════════
// PARALLEL
// ═══════════════════════════════════════════════════════════════════════════════

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn taps_run_concurrently() {
    let hook = AsyncParallelHook::<()>::new(Vec::<String>::new()).expect("arity should match");
    let signal = Arc::new(Notify::new());

    // The first tap only finishes once the second one has started.
    hook.tap_promise("waits", {
        let signal = Arc::clone(&signal);
        move |()| {
            let signal = Arc::clone(&signal);
            async move { signal.notified().await }
        }
    })
    .expect("registration should succeed");
    hook.tap_promise("signals", {
        let signal = Arc::clone(&signal);
        move |()| {
            let signal = Arc::clone(&signal);
            async move { signal.notify_one() }
        }
    })
    .expect("registration should succeed");

    tokio::time::timeout(millis(1_000), hook.promise(()))
        .await
        .expect("taps should not run one after another")
        .expect("promise should resolve");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn first_error_settles_and_the_rest_keep_running() {
    let log = ExecutionLog::new();
    let hook = AsyncParallelHook::<()>::new(Vec::<String>::new()).expect("arity should match");
    hook.tap_promise("fails-fast", |()| async {
        tokio::time::sleep(millis(5)).await;
        Err::<(), _>(Boom("fast"))
    })
    .expect("registration should succeed");
    hook.tap_promise("finishes-later", {
        let log = log.clone();
        move |()| {
            let log = log.clone();
            async move {
                tokio::time::sleep(millis(40)).await;
                log.push("finished");
            }
        }
    })
    .expect("registration should succeed");

    let err = hook.promise(()).await.expect_err("first tap fails");
    assert_eq!(err.tap_name(), Some("fails-fast"));
    assert!(log.is_empty());

    tokio::time::sleep(millis(100)).await;
    assert_eq!(log.entries(), ["finished"]);
}

#[tokio::test]
async fn synchronous_failure_stops_later_launches() {
    let started = Counter::new();
    let hook = AsyncParallelHook::<(u8,)>::new(["n"]).expect("arity should match");
    hook.tap("fails", |_| Err::<(), _>(Boom("sync")))
        .expect("registration should succeed");
    hook.tap_promise("never", {
        let started = started.clone();
        move |_| {
            started.bump();
            async {}
        }
    })
    .expect("registration should succeed");

    let err = hook.promise((1,)).await.expect_err("first tap fails");
    assert_eq!(err.tap_name(), Some("fails"));
    assert_eq!(started.get(), 0);
}

#[test]
fn callback_taps_all_settle_before_delivery() {
    let hook = AsyncParallelHook::<(u8,)>::new(["n"]).expect("arity should match");
    let done_calls = Counter::new();
    for name in ["a", "b", "c"] {
        let done_calls = done_calls.clone();
        hook.tap_async(name, move |_, done| {
            done_calls.bump();
            done.done();
        })
        .expect("registration should succeed");
    }

    let (tx, rx) = std::sync::mpsc::channel();
    hook.call_async((1,), move |outcome| {
        tx.send(outcome).expect("receiver should be alive");
    });
    rx.try_recv()
        .expect("outcome should be delivered inline")
        .expect("call should succeed");
    assert_eq!(done_calls.get(), 3);
}

// ═══════════════════════════════════════════════════════════════════════════════
// PARALLEL BAIL
// ═══════════════════════════════════════════════════════════════════════════════

fn delayed(value: &'static str, ms: u64) -> impl Future<Output = Option<&'static str>> + Send {
    async move {
        tokio::time::sleep(millis(ms)).await;
        Some(value)
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn lowest_index_wins_over_earliest_completion() {
    let hook = AsyncParallelBailHook::<(), &'static str>::new(Vec::<String>::new())
        .expect("arity should match");
    hook.tap_promise("A", |()| async { None::<&'static str> })
        .expect("registration should succeed");
    hook.tap_promise("B", |()| delayed("B", 60))
        .expect("registration should succeed");
    hook.tap_promise("C", |()| delayed("C", 5))
        .expect("registration should succeed");

    assert_eq!(hook.promise(()).await.expect("promise should resolve"), Some("B"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn lower_index_error_beats_higher_index_value() {
    let hook = AsyncParallelBailHook::<(), u8>::new(Vec::<String>::new())
        .expect("arity should match");
    hook.tap_promise("slow-fail", |()| async {
        tokio::time::sleep(millis(20)).await;
        Err::<Option<u8>, _>(Boom("late"))
    })
    .expect("registration should succeed");
    hook.tap("instant", |()| Some(1)).expect("registration should succeed");

    let err = hook.promise(()).await.expect_err("index 0 decides");
    assert_eq!(err.tap_name(), Some("slow-fail"));
}

#[tokio::test]
async fn synchronous_value_skips_later_taps() {
    let started = Counter::new();
    let hook = AsyncParallelBailHook::<(), u8>::new(Vec::<String>::new())
        .expect("arity should match");
    hook.tap("first", |()| Some(7)).expect("registration should succeed");
    hook.tap_promise("second", {
        let started = started.clone();
        move |()| {
            started.bump();
            async { Some(8) }
        }
    })
    .expect("registration should succeed");

    assert_eq!(hook.promise(()).await.expect("promise should resolve"), Some(7));
    assert_eq!(started.get(), 0);
}

#[tokio::test]
async fn no_values_resolves_to_none() {
    let hook = AsyncParallelBailHook::<(u8,), u8>::new(["n"]).expect("arity should match");
    hook.tap_async("cb", |_, done| done.done())
        .expect("registration should succeed");
    hook.tap_promise("p", |_| async { None::<u8> })
        .expect("registration should succeed");

    assert_eq!(hook.promise((1,)).await.expect("promise should resolve"), None);
}
