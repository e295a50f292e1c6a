//! Example asset pipeline CLI.
//!
//! # Usage
//!
//! ```bash
//! pipeline <entry>...
//! ```
//!
//! Set `RUST_LOG=debug` to watch plans being compiled.

use example::Compiler;
use example::plugins::{BannerPlugin, ExtensionResolver, MinifyCss, RunLogger, SkipTests, StatsLogger};
use hookline_tracing::{TracingConfig, TracingFormat};

#[tokio::main]
async fn main() {
    TracingConfig::from_env()
        .with_format(TracingFormat::Compact)
        .init();

    let entries: Vec<String> = std::env::args().skip(1).collect();
    if entries.is_empty() {
        eprintln!("Usage: pipeline <entry>...");
        eprintln!("Example: pipeline main theme.css main.test");
        std::process::exit(1);
    }

    let compiler = Compiler::new("pipeline")
        .and_then(|c| c.with_plugin(RunLogger))
        .and_then(|c| c.with_plugin(ExtensionResolver::new(["js", "css"])))
        .and_then(|c| c.with_plugin(BannerPlugin::new("built with hookline")))
        .and_then(|c| c.with_plugin(MinifyCss))
        .and_then(|c| c.with_plugin(SkipTests))
        .and_then(|c| c.with_legacy_plugin(StatsLogger));
    let compiler = match compiler {
        Ok(compiler) => compiler,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let entries: Vec<&str> = entries.iter().map(String::as_str).collect();
    match compiler.compile(&entries).await {
        Ok(stats) => {
            for (path, source) in &stats.emitted {
                tracing::info!(%path, bytes = source.len(), "emitted");
            }
        }
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
