//! Plugins used by the `pipeline` binary.

use core::time::Duration;

use hookline_hooks::prelude::*;
use hookline_legacy::{LegacyPlugin, PluginFacade};

use crate::{Compiler, CompilerPlugin, Stats};

/// Appends the first matching extension to entries that have none.
///
/// Every extension gets its own resolver tap; they race, and the first
/// extension in the list wins regardless of which answers first.
#[derive(Debug, Clone)]
pub struct ExtensionResolver {
    extensions: Vec<String>,
}

impl ExtensionResolver {
    /// Creates a resolver trying `extensions` in order.
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            extensions: extensions.into_iter().map(Into::into).collect(),
        }
    }
}

impl CompilerPlugin for ExtensionResolver {
    fn apply(&self, compiler: &Compiler) -> Result<(), HookError> {
        let known = self.extensions.clone();
        for (index, ext) in self.extensions.iter().enumerate() {
            let ext = ext.clone();
            let known = known.clone();
            // Later extensions answer sooner.
            let delay = Duration::from_millis((known.len() - index) as u64 * 5);
            compiler.hooks().resolve.tap_promise(
                format!("resolve-{ext}"),
                move |(request,)| {
                    let ext = ext.clone();
                    let has_known = request
                        .rsplit_once('.')
                        .is_some_and(|(_, current)| known.iter().any(|k| k == current));
                    async move {
                        tokio::time::sleep(delay).await;
                        (!has_known).then(|| format!("{request}.{ext}"))
                    }
                },
            )?;
        }
        Ok(())
    }
}

/// Prepends a banner comment to every source.
#[derive(Debug, Clone)]
pub struct BannerPlugin {
    banner: String,
}

impl BannerPlugin {
    /// Creates a plugin writing `banner`.
    pub fn new(banner: impl Into<String>) -> Self {
        Self {
            banner: banner.into(),
        }
    }
}

impl CompilerPlugin for BannerPlugin {
    fn apply(&self, compiler: &Compiler) -> Result<(), HookError> {
        let banner = self.banner.clone();
        compiler
            .hooks()
            .transform
            .tap(TapOptions::new("banner").with_stage(100), move |(source, _path)| {
                Some(format!("// {banner}\n{source}"))
            })
    }
}

/// Strips whitespace from CSS assets.
#[derive(Debug, Clone, Copy)]
pub struct MinifyCss;

impl CompilerPlugin for MinifyCss {
    fn apply(&self, compiler: &Compiler) -> Result<(), HookError> {
        compiler
            .hooks()
            .assets
            .tap("css".to_owned(), "minify-css", |(source,)| {
                Some(source.split_whitespace().collect::<String>())
            })
    }
}

/// Keeps `*.test.*` files out of the output.
#[derive(Debug, Clone, Copy)]
pub struct SkipTests;

impl CompilerPlugin for SkipTests {
    fn apply(&self, compiler: &Compiler) -> Result<(), HookError> {
        compiler
            .hooks()
            .should_emit
            .tap("skip-tests", |(path,)| path.contains(".test.").then_some(false))
    }
}

/// Logs the project name when a compilation starts.
#[derive(Debug, Clone, Copy)]
pub struct RunLogger;

impl CompilerPlugin for RunLogger {
    fn apply(&self, compiler: &Compiler) -> Result<(), HookError> {
        compiler.hooks().run.intercept(
            InterceptorFn::new()
                .with_name("run-logger")
                .on_call(|(project,): &(String,)| tracing::info!(%project, "compilation started")),
        );
        Ok(())
    }
}

/// Logs the final statistics, registering by hook name.
#[derive(Debug, Clone, Copy)]
pub struct StatsLogger;

impl LegacyPlugin for StatsLogger {
    fn apply(&self, facade: &PluginFacade<'_>) -> Result<(), HookError> {
        facade.plugin::<SyncHook<(Stats,)>, _, _>("done", |(stats,)| {
            tracing::info!(
                emitted = stats.emitted.len(),
                skipped = stats.skipped.len(),
                "compilation finished"
            );
        })
    }
}
