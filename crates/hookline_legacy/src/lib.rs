//! String-named plugin registration over typed hooks (Layer 3).
//!
//! Older plugin code addresses extension points by name, as in
//! `plugin("after-compile", f)`. This crate keeps such code working on top of
//! typed hooks:
//!
//! - [`HookSet`] - Hooks stored under names, erased to a common trait
//! - [`PluginFacade`] - `plugin` / `apply_plugins*` methods over a borrowed [`HookSet`]
//! - [`LegacyPlugin`] - Plugins that register through the facade
//!
//! # Example
//!
//! ```
//! use hookline_hooks::prelude::*;
//! use hookline_legacy::{HookSet, PluginFacade};
//!
//! let mut hooks = HookSet::new();
//! hooks.insert("afterCompile", SyncWaterfallHook::<(u32,)>::new(["size"])?);
//!
//! let facade = PluginFacade::new(&hooks);
//! facade.plugin::<SyncWaterfallHook<(u32,)>, _, _>("after-compile", |(size,)| Some(size + 1))?;
//!
//! assert_eq!(facade.apply_plugins_waterfall("afterCompile", (1_u32,))?, 2);
//! # Ok::<(), HookError>(())
//! ```

mod facade;
mod hook_set;

pub use facade::{LegacyPlugin, PluginFacade};
pub use hook_set::{ErasedHook, HookSet, camel_case};
