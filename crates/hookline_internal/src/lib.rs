//! # hookline Internal Library
//!
//! Re-exports the hookline crates for convenience.

/// Layer 1: Tap registration primitives.
pub use hookline_tap;

/// Layer 2: Hook types and execution planning.
pub use hookline_hooks;

/// Layer 3: String-named plugin facade.
#[cfg(feature = "legacy")]
pub use hookline_legacy;

/// Layer 3: Subscriber setup.
#[cfg(feature = "subscriber")]
pub use hookline_tracing;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use hookline_hooks::prelude::*;

    #[cfg(feature = "legacy")]
    pub use hookline_legacy::{HookSet, LegacyPlugin, PluginFacade};
}
