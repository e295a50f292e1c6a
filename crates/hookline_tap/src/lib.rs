//! Tap registration primitives for hookline (Layer 1).
//!
//! `hookline_tap` holds everything a hook needs before it can run anything:
//!
//! - [`args`] - Argument tuples and waterfall accumulators
//! - [`options`] - Tap identity and ordering constraints
//! - [`tap`] - Registered callbacks and their calling conventions
//! - [`registry`] - Ordered tap storage honoring `stage` and `before`
//! - [`interceptor`] - Observers that rewrite taps and watch invocations
//! - [`context`] - Per-invocation value bag shared by context taps
//! - [`error`] - The error taxonomy shared by every layer
//!
//! # Architecture
//!
//! - **Layer 1** (`hookline_tap`): registration primitives (this crate)
//! - **Layer 2** (`hookline_hooks`): execution planning and the hook types
//! - **Layer 3** (`hookline_legacy`, `hookline_tracing`): adapters and tooling
//!
//! # Example
//!
//! ```
//! use hookline_tap::options::TapOptions;
//! use hookline_tap::registry::TapRegistry;
//! use hookline_tap::tap::Tap;
//!
//! let mut registry = TapRegistry::<(u32,), ()>::new();
//! registry.insert(Tap::sync("late", |_| ()));
//! registry.insert(Tap::sync(TapOptions::new("early").with_stage(-1), |_| ()));
//!
//! assert_eq!(registry.names(), ["early", "late"]);
//! ```

pub mod args;
pub mod context;
pub mod error;
pub mod interceptor;
pub mod options;
pub mod registry;
pub mod tap;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use crate::args::{HookArgs, WaterfallArgs};
    pub use crate::context::TapContext;
    pub use crate::error::{BoxError, CallbackDropped, HookError};
    pub use crate::interceptor::{Interceptor, InterceptorChain, InterceptorFn};
    pub use crate::options::TapOptions;
    pub use crate::registry::TapRegistry;
    pub use crate::tap::{
        BoxFuture, IntoTapOutput, Tap, TapCall, TapCallback, TapConvention, TapOutput,
    };
}
