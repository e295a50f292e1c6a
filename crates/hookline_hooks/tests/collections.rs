//! Keyed hook maps and fan-out groups.


use std::sync::Arc;

use hookline_hooks::prelude::*;
use test_utils::ExecutionLog;

#[tokio::test]
async fn hook_map_routes_registrations_by_key() {
    let map = HookMap::new(|_kind: &&'static str| {
        AsyncSeriesWaterfallHook::<(String,)>::new(["source"])
    });
    map.tap_promise("css", "minify", |(source,)| async move {
        Some(source.replace(' ', ""))
    })
    .expect("registration should succeed");
    map.tap_async("js", "wrap", |(source,), done| done.value(format!("({source})")))
        .expect("registration should succeed");

    let css = map.get(&"css").expect("css hook was created");
    let js = map.get(&"js").expect("js hook was created");
    assert_eq!(
        css.promise(("a { }".into(),)).await.expect("promise should resolve"),
        "a{}"
    );
    assert_eq!(
        js.promise(("x".into(),)).await.expect("promise should resolve"),
        "(x)"
    );
    assert_eq!(map.len(), 2);
}

#[test]
fn hook_map_interceptor_can_attach_taps() {
    let log = ExecutionLog::new();
    let map = HookMap::new(|_stage: &u8| SyncHook::<()>::new(Vec::<String>::new()));
    map.intercept({
        let log = log.clone();
        move |stage: &u8, hook: SyncHook<()>| {
            let log = log.clone();
            let stage = *stage;
            // A failed registration only loses the audit entry.
            let _ = hook.tap("audit", move |()| log.push(format!("stage-{stage}")));
            hook
        }
    });

    map.for_key(3)
        .expect("factory should succeed")
        .call(())
        .expect("call should succeed");
    assert_eq!(log.entries(), ["stage-3"]);
}

#[test]
fn multi_hook_with_options_orders_every_member() {
    let log = ExecutionLog::new();
    let hooks: Vec<Arc<SyncHook<()>>> = (0..2)
        .map(|_| Arc::new(SyncHook::new(Vec::<String>::new()).expect("arity should match")))
        .collect();
    for hook in &hooks {
        let log = log.clone();
        hook.tap("main", move |()| log.push("main"))
            .expect("registration should succeed");
    }

    let multi = MultiHook::new(hooks.iter().cloned());
    multi
        .with_options(TapOptions::default().with_before("main"))
        .tap("setup", {
            let log = log.clone();
            move |()| log.push("setup")
        })
        .expect("registration should succeed");

    for hook in &hooks {
        hook.call(()).expect("call should succeed");
    }
    assert_eq!(log.entries(), ["setup", "main", "setup", "main"]);
}

#[test]
fn with_options_view_layers_defaults() {
    let hook = SyncHook::<()>::new(Vec::<String>::new()).expect("arity should match");
    hook.tap("plain", |()| ()).expect("registration should succeed");

    let late = hook.with_options(TapOptions::default().with_stage(10));
    late.tap("late", |()| ()).expect("registration should succeed");
    late.with_options(TapOptions::default().with_before("plain"))
        .tap(TapOptions::new("explicit").with_stage(-1), |()| ())
        .expect("registration should succeed");

    let taps = hook.taps();
    let order: Vec<(&str, i32)> = taps.iter().map(|t| (t.name(), t.stage())).collect();
    assert_eq!(order, [("explicit", -1), ("plain", 0), ("late", 10)]);
}
