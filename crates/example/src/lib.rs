//! Example asset pipeline built on hookline.
//!
//! A [`Compiler`] exposes its extension points as hooks. Plugins tap them to
//! resolve entries, transform sources, post-process assets per extension and
//! decide what gets emitted.
//!
//! ```text
//! run ──▶ for each entry: resolve ──▶ transform ──▶ assets[ext] ──▶ should_emit
//!                                                                      │
//!                                                              done ◀──┘
//! ```

pub mod plugins;

use std::sync::Arc;

use hookline_hooks::prelude::*;
use hookline_legacy::{HookSet, LegacyPlugin, PluginFacade};

/// Summary of one compilation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stats {
    /// Emitted assets as `(path, source)` pairs.
    pub emitted: Vec<(String, String)>,
    /// Paths that `should_emit` rejected.
    pub skipped: Vec<String>,
}

/// The hooks a [`Compiler`] exposes.
pub struct CompilerHooks {
    /// Runs once before any entry is processed. Receives the project name.
    pub run: AsyncSeriesHook<(String,)>,
    /// Maps an entry request to a path. The first plugin with an answer wins.
    pub resolve: AsyncParallelBailHook<(String,), String>,
    /// Rewrites a source. Receives `(source, path)`.
    pub transform: AsyncSeriesWaterfallHook<(String, String)>,
    /// Post-processes sources per file extension.
    pub assets: HookMap<String, SyncWaterfallHook<(String,)>>,
    /// Returns `Some(false)` to drop an asset. Also reachable as `"shouldEmit"`.
    pub should_emit: Arc<SyncBailHook<(String,), bool>>,
    /// Receives the final statistics. Also reachable as `"done"`.
    pub done: Arc<SyncHook<(Stats,)>>,
    legacy: HookSet,
}

impl CompilerHooks {
    fn new() -> Result<Self, HookError> {
        let mut legacy = HookSet::new();
        let should_emit = legacy.insert(
            "shouldEmit",
            SyncBailHook::new(["path"])?.with_name("should_emit"),
        );
        let done = legacy.insert("done", SyncHook::new(["stats"])?.with_name("done"));

        Ok(Self {
            run: AsyncSeriesHook::new(["project"])?.with_name("run"),
            resolve: AsyncParallelBailHook::new(["request"])?.with_name("resolve"),
            transform: AsyncSeriesWaterfallHook::new(["source", "path"])?.with_name("transform"),
            assets: HookMap::new(|ext: &String| {
                Ok(SyncWaterfallHook::new(["source"])?.with_name(format!("assets[{ext}]")))
            }),
            should_emit,
            done,
            legacy,
        })
    }
}

/// A unit of pipeline behavior.
pub trait CompilerPlugin {
    /// Taps the compiler's hooks.
    fn apply(&self, compiler: &Compiler) -> Result<(), HookError>;
}

/// Drives entries through the pipeline hooks.
pub struct Compiler {
    project: String,
    hooks: CompilerHooks,
}

impl Compiler {
    /// Creates a compiler with no plugins applied.
    pub fn new(project: impl Into<String>) -> Result<Self, HookError> {
        Ok(Self {
            project: project.into(),
            hooks: CompilerHooks::new()?,
        })
    }

    /// Applies `plugin`.
    pub fn with_plugin(self, plugin: impl CompilerPlugin) -> Result<Self, HookError> {
        plugin.apply(&self)?;
        Ok(self)
    }

    /// Returns the compiler's hooks.
    #[must_use]
    pub fn hooks(&self) -> &CompilerHooks {
        &self.hooks
    }

    /// Applies a plugin that registers by hook name.
    pub fn with_legacy_plugin(self, plugin: impl LegacyPlugin) -> Result<Self, HookError> {
        self.plugin_facade().apply(&plugin)?;
        Ok(self)
    }

    /// Returns a name-based view of the hooks that have legacy names.
    #[must_use]
    pub fn plugin_facade(&self) -> PluginFacade<'_> {
        PluginFacade::new(&self.hooks.legacy)
    }

    /// Compiles `entries`.
    pub async fn compile(&self, entries: &[&str]) -> Result<Stats, HookError> {
        self.hooks.run.promise((self.project.clone(),)).await?;

        let mut stats = Stats::default();
        for entry in entries {
            let request = (*entry).to_owned();
            let path = self
                .hooks
                .resolve
                .promise((request.clone(),))
                .await?
                .unwrap_or(request);
            tracing::debug!(entry, %path, "resolved");

            let source = format!("/* {path} */");
            let source = self
                .hooks
                .transform
                .promise((source, path.clone()))
                .await?;

            let source = match path.rsplit_once('.') {
                Some((_, ext)) => match self.hooks.assets.get(&ext.to_owned()) {
                    Some(hook) => hook.call((source,))?,
                    None => source,
                },
                None => source,
            };

            if self.hooks.should_emit.call((path.clone(),))? == Some(false) {
                tracing::info!(%path, "skipped");
                stats.skipped.push(path);
            } else {
                stats.emitted.push((path, source));
            }
        }

        self.hooks.done.call((stats.clone(),))?;
        Ok(stats)
    }
}
