//! Hook types and execution planning for hookline (Layer 2).
//!
//! `hookline_hooks` turns the registration primitives of `hookline_tap` into
//! invocable hooks. Each hook compiles an execution plan per calling
//! convention from the shape of its registered taps, caches it, and reuses it
//! until the next registration.
//!
//! # Hook Types
//!
//! | Type | Taps run | Outcome |
//! |------|----------|---------|
//! | [`SyncHook`] | in order | `()` |
//! | [`SyncBailHook`] | in order until one produces a value | first value |
//! | [`SyncWaterfallHook`] | in order, threading values | final first argument |
//! | [`SyncLoopHook`] | restarts while any tap produces a value | `()` |
//! | [`AsyncSeriesHook`] | in order, awaiting each | `()` |
//! | [`AsyncSeriesBailHook`] | in order until one produces a value | first value |
//! | [`AsyncSeriesWaterfallHook`] | in order, threading values | final first argument |
//! | [`AsyncSeriesLoopHook`] | restarts while any tap produces a value | `()` |
//! | [`AsyncParallelHook`] | all at once | `()` or first error |
//! | [`AsyncParallelBailHook`] | all at once | lowest-index value or error |
//!
//! [`HookMap`] creates hooks per key on demand and [`MultiHook`] fans one
//! registration out to several hooks.
//!
//! # Example
//!
//! ```
//! use hookline_hooks::prelude::*;
//!
//! let resolve = SyncWaterfallHook::<(u32, &'static str)>::new(["size", "name"])?;
//! resolve.tap("double", |(size, _)| Some(size * 2))?;
//! resolve.tap("pad", |(size, _)| Some(size + 1))?;
//!
//! assert_eq!(resolve.call((20, "bundle"))?, 41);
//! # Ok::<(), HookError>(())
//! ```
//!
//! # Architecture
//!
//! - **Layer 1** (`hookline_tap`): registration primitives
//! - **Layer 2** (`hookline_hooks`): execution planning and the hook types (this crate)
//! - **Layer 3** (`hookline_legacy`, `hookline_tracing`): adapters and tooling

/// Hook kinds, modes and plan classification enums.
pub mod kind;

/// Execution planning.
pub mod plan;

/// State shared by every hook type.
pub mod hook_core;

/// The registration trait implemented by every hook.
pub mod tapable;

/// Synchronous hooks.
pub mod sync;

/// Asynchronous series hooks.
pub mod async_series;

/// Asynchronous parallel hooks.
pub mod async_parallel;

/// Keyed hook collections.
pub mod hook_map;

/// Fan-out registration.
pub mod multi_hook;

mod driver;
mod machine;
mod run;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use crate::async_parallel::{AsyncParallelBailHook, AsyncParallelHook};
    pub use crate::async_series::{
        AsyncSeriesBailHook, AsyncSeriesHook, AsyncSeriesLoopHook, AsyncSeriesWaterfallHook,
    };
    pub use crate::hook_core::HookCore;
    pub use crate::hook_map::{HookMap, HookMapInterceptor};
    pub use crate::kind::{CallConvention, HookKind, HookMode, Strategy, TapShape};
    pub use crate::multi_hook::MultiHook;
    pub use crate::plan::{ExecutionPlanner, PlanInfo};
    pub use crate::sync::{SyncBailHook, SyncHook, SyncLoopHook, SyncWaterfallHook};
    pub use crate::tapable::{Tapable, WithOptions};
    pub use hookline_tap::prelude::*;
}

// Re-export key types at crate root for convenience
pub use async_parallel::{AsyncParallelBailHook, AsyncParallelHook};
pub use async_series::{
    AsyncSeriesBailHook, AsyncSeriesHook, AsyncSeriesLoopHook, AsyncSeriesWaterfallHook,
};
pub use hook_map::HookMap;
pub use multi_hook::MultiHook;
pub use sync::{SyncBailHook, SyncHook, SyncLoopHook, SyncWaterfallHook};
pub use tapable::Tapable;
