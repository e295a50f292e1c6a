//! Name-based registration and invocation through `PluginFacade`.

use std::sync::Arc;
use std::sync::mpsc;

use hookline_hooks::prelude::*;
use hookline_legacy::{HookSet, PluginFacade};
use parking_lot::Mutex;

// ═══════════════════════════════════════════════════════════════════════════════
// SETUP
// ═══════════════════════════════════════════════════════════════════════════════

fn compiler_hooks() -> HookSet {
    HookSet::new()
        .with_hook("run", SyncHook::<(u32,)>::new(["id"]).expect("arity"))
        .with_hook(
            "shouldEmit",
            SyncBailHook::<(u32,), bool>::new(["id"]).expect("arity"),
        )
        .with_hook(
            "assetPath",
            SyncWaterfallHook::<(String,)>::new(["path"]).expect("arity"),
        )
        .with_hook("emit", AsyncSeriesHook::<(u32,)>::new(["id"]).expect("arity"))
        .with_hook(
            "make",
            AsyncParallelHook::<(u32,)>::new(["id"]).expect("arity"),
        )
        .with_hook(
            "resolve",
            AsyncParallelBailHook::<(String,), String>::new(["request"]).expect("arity"),
        )
}

fn receive<T>(rx: &mpsc::Receiver<T>) -> T {
    rx.try_recv().expect("outcome should be delivered inline")
}

// ═══════════════════════════════════════════════════════════════════════════════
// REGISTRATION
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn plugins_register_legacy_named_taps() {
    let hooks = compiler_hooks();
    let facade = PluginFacade::new(&hooks);
    assert!(!facade.has_plugins("run"));

    facade
        .plugin::<SyncHook<(u32,)>, _, _>("run", |_| ())
        .expect("registration should succeed");

    assert!(facade.has_plugins("run"));
    let run = hooks.get::<SyncHook<(u32,)>>("run").expect("stored");
    assert_eq!(run.taps()[0].name(), "legacy:run");
}

#[test]
fn dashed_names_resolve_to_camel_case_hooks() {
    let hooks = compiler_hooks();
    let facade = PluginFacade::new(&hooks);
    facade
        .plugin::<SyncWaterfallHook<(String,)>, _, _>("asset-path", |(path,)| {
            Some(format!("dist/{path}"))
        })
        .expect("registration should succeed");

    let path = facade
        .apply_plugins_waterfall("asset_path", ("main.js".to_owned(),))
        .expect("call should succeed");
    assert_eq!(path, "dist/main.js");
}

#[test]
fn unknown_and_mismatched_names_fail() {
    let hooks = compiler_hooks();
    let facade = PluginFacade::new(&hooks);

    let err = facade
        .plugin::<SyncHook<(u32,)>, _, _>("compile", |_| ())
        .expect_err("no such hook");
    assert!(matches!(err, HookError::UnknownHookName(ref name) if name == "compile"));

    let err = facade
        .apply_plugins("shouldEmit", (1_u32,))
        .expect_err("shouldEmit is a bail hook");
    assert!(matches!(err, HookError::HookTypeMismatch { ref name, .. } if name == "shouldEmit"));
    assert!(!facade.has_plugins("compile"));
}

// ═══════════════════════════════════════════════════════════════════════════════
// INVOCATION
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn sync_invocations_forward_to_hooks() {
    let hooks = compiler_hooks();
    let facade = PluginFacade::new(&hooks);
    let seen = Arc::new(Mutex::new(Vec::new()));

    facade
        .plugin::<SyncHook<(u32,)>, _, _>("run", {
            let seen = Arc::clone(&seen);
            move |(id,)| seen.lock().push(id)
        })
        .expect("registration should succeed");
    facade
        .plugin::<SyncBailHook<(u32,), bool>, _, _>("should-emit", |(id,)| (id == 0).then_some(false))
        .expect("registration should succeed");

    facade.apply_plugins("run", (9_u32,)).expect("call should succeed");
    assert_eq!(*seen.lock(), [9]);
    assert_eq!(
        facade.apply_plugins_bail_result::<_, bool>("shouldEmit", (0_u32,)).expect("call should succeed"),
        Some(false)
    );
    assert_eq!(
        facade.apply_plugins_bail_result::<_, bool>("shouldEmit", (1_u32,)).expect("call should succeed"),
        None
    );
}

#[test]
fn callback_invocations_deliver_through_the_callback() {
    let hooks = compiler_hooks();
    let facade = PluginFacade::new(&hooks);
    facade
        .plugin_async::<AsyncSeriesHook<(u32,)>, _>("emit", |_, done| done.done())
        .expect("registration should succeed");
    facade
        .plugin_async::<AsyncParallelHook<(u32,)>, _>("make", |_, done| done.done())
        .expect("registration should succeed");
    facade
        .plugin_async::<AsyncParallelBailHook<(String,), String>, _>("resolve", |(request,), done| {
            done.value(format!("./{request}"));
        })
        .expect("registration should succeed");

    let (tx, rx) = mpsc::channel::<Result<Option<String>, HookError>>();
    let sender = tx.clone();
    facade.apply_plugins_async_series("emit", (1_u32,), move |outcome| {
        sender.send(outcome.map(|()| None)).expect("receiver alive");
    });
    assert!(receive(&rx).is_ok());

    let sender = tx.clone();
    facade.apply_plugins_parallel("make", (1_u32,), move |outcome| {
        sender.send(outcome.map(|()| None)).expect("receiver alive");
    });
    assert!(receive(&rx).is_ok());

    facade.apply_plugins_parallel_bail_result("resolve", ("lib".to_owned(),), move |outcome| {
        tx.send(outcome).expect("receiver alive");
    });
    assert_eq!(
        receive(&rx).expect("call should succeed").as_deref(),
        Some("./lib")
    );
}

#[test]
fn lookup_failures_reach_the_callback() {
    let hooks = compiler_hooks();
    let facade = PluginFacade::new(&hooks);
    let (tx, rx) = mpsc::channel();
    facade.apply_plugins_async_series("missing", (1_u32,), move |outcome| {
        tx.send(outcome).expect("receiver alive");
    });
    assert!(matches!(receive(&rx), Err(HookError::UnknownHookName(_))));
}

#[tokio::test]
async fn async_waterfall_and_series_bail_use_their_hooks() {
    let hooks = HookSet::new()
        .with_hook(
            "optimize",
            AsyncSeriesWaterfallHook::<(u32,)>::new(["size"]).expect("arity"),
        )
        .with_hook(
            "cache",
            AsyncSeriesBailHook::<(String,), u32>::new(["key"]).expect("arity"),
        );
    let facade = PluginFacade::new(&hooks);
    facade
        .plugin_async::<AsyncSeriesWaterfallHook<(u32,)>, _>("optimize", |(size,), done| {
            tokio::spawn(async move { done.value(size / 2) });
        })
        .expect("registration should succeed");
    facade
        .plugin::<AsyncSeriesBailHook<(String,), u32>, _, _>("cache", |(key,)| {
            (key == "hit").then_some(1)
        })
        .expect("registration should succeed");

    let (tx, rx) = tokio::sync::oneshot::channel();
    facade.apply_plugins_async_waterfall("optimize", (100_u32,), move |outcome| {
        let _ = tx.send(outcome);
    });
    assert_eq!(rx.await.expect("callback ran").expect("call should succeed"), 50);

    let (tx, rx) = tokio::sync::oneshot::channel();
    facade.apply_plugins_async_series_bail_result("cache", ("hit".to_owned(),), move |outcome| {
        let _ = tx.send(outcome);
    });
    assert_eq!(rx.await.expect("callback ran").expect("call should succeed"), Some(1_u32));
}
