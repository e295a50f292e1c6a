//! Subscriber setup for hookline (Layer 3).
//!
//! The library crates only emit events through `tracing` macros. Binaries
//! and tests install a subscriber with [`TracingConfig`]:
//!
//! | Target | Level | Emitted when |
//! |--------|-------|--------------|
//! | `hookline_tap::registry` | `TRACE` | a tap is placed in a registry |
//! | `hookline_hooks::hook_core` | `TRACE` | a tap is registered on a hook |
//! | `hookline_hooks::plan` | `DEBUG` | an execution plan is compiled |
//! | `hookline_hooks::run` | `TRACE` | a tap is started |
//! | `hookline_hooks::machine` | `DEBUG` | an error from a discarded parallel outcome is dropped |
//! | `hookline_legacy::hook_set` | `DEBUG` | a legacy name resolves through camel casing |
//!
//! # Example
//!
//! ```
//! use hookline_tracing::{TracingConfig, TracingFormat};
//! use tracing::Level;
//!
//! // Development: compact output with plan compilation visible
//! TracingConfig::default()
//!     .with_level(Level::DEBUG)
//!     .with_format(TracingFormat::Compact)
//!     .init();
//!
//! // Production: JSON output, hook internals at warn
//! let prod = TracingConfig::default()
//!     .with_format(TracingFormat::Json)
//!     .with_env_filter("info,hookline_hooks=warn");
//! assert!(prod.env_filter().is_some());
//! ```

use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};

// ─────────────────────────────────────────────────────────────────────────────
// TracingFormat
// ─────────────────────────────────────────────────────────────────────────────

/// Tracing output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TracingFormat {
    /// Human-readable colored output (default).
    #[default]
    Pretty,
    /// Compact single-line output.
    Compact,
    /// JSON structured output for log aggregation.
    Json,
}

// ─────────────────────────────────────────────────────────────────────────────
// TracingError
// ─────────────────────────────────────────────────────────────────────────────

/// Errors returned by [`TracingConfig::try_init`].
#[derive(Debug, thiserror::Error)]
pub enum TracingError {
    /// The filter string could not be parsed.
    #[error("invalid filter directive: {0}")]
    InvalidFilter(#[from] ParseError),

    /// A global subscriber was already installed.
    #[error("tracing subscriber already initialized: {0}")]
    AlreadyInitialized(#[from] TryInitError),
}

// ─────────────────────────────────────────────────────────────────────────────
// TracingConfig
// ─────────────────────────────────────────────────────────────────────────────

/// Subscriber configuration.
///
/// Without an explicit filter, events at `level` and above are shown for
/// every target.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    level: Level,
    format: TracingFormat,
    env_filter: Option<String>,
    span_events: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: TracingFormat::Pretty,
            env_filter: None,
            span_events: false,
        }
    }
}

impl TracingConfig {
    /// Creates a configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration that uses the `RUST_LOG` variable as its
    /// filter, when set.
    #[must_use]
    pub fn from_env() -> Self {
        let config = Self::default();
        match std::env::var(EnvFilter::DEFAULT_ENV) {
            Ok(filter) if !filter.trim().is_empty() => config.with_env_filter(filter),
            _ => config,
        }
    }

    /// Sets the maximum log level.
    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Sets the output format.
    #[must_use]
    pub fn with_format(mut self, format: TracingFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets a filter string, such as `"info,hookline_hooks=trace"`.
    ///
    /// The filter replaces the level as the source of truth.
    #[must_use]
    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// Enables span enter/exit events in output.
    #[must_use]
    pub fn with_span_events(mut self, enabled: bool) -> Self {
        self.span_events = enabled;
        self
    }

    /// Returns the configured level.
    #[must_use]
    pub fn level(&self) -> Level {
        self.level
    }

    /// Returns the configured format.
    #[must_use]
    pub fn format(&self) -> TracingFormat {
        self.format
    }

    /// Returns the configured filter string.
    #[must_use]
    pub fn env_filter(&self) -> Option<&str> {
        self.env_filter.as_deref()
    }

    /// Returns `true` if span enter/exit events are shown.
    #[must_use]
    pub fn span_events(&self) -> bool {
        self.span_events
    }

    /// Builds the filter layer.
    pub fn build_filter(&self) -> Result<EnvFilter, TracingError> {
        match &self.env_filter {
            Some(filter) => Ok(EnvFilter::try_new(filter)?),
            None => Ok(EnvFilter::new(self.level.as_str())),
        }
    }

    /// Installs the global subscriber.
    ///
    /// Fails if the filter does not parse or a subscriber is already
    /// installed.
    pub fn try_init(&self) -> Result<(), TracingError> {
        let env_filter = self.build_filter()?;
        let span_events = if self.span_events {
            FmtSpan::ENTER | FmtSpan::EXIT
        } else {
            FmtSpan::NONE
        };

        let registry = tracing_subscriber::registry().with(env_filter);
        match self.format {
            TracingFormat::Pretty => registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .pretty()
                        .with_span_events(span_events),
                )
                .try_init()?,
            TracingFormat::Compact => registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .compact()
                        .with_span_events(span_events),
                )
                .try_init()?,
            TracingFormat::Json => registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_span_events(span_events),
                )
                .try_init()?,
        }

        tracing::debug!(level = %self.level, format = ?self.format, "tracing initialized");
        Ok(())
    }

    /// Installs the global subscriber, keeping any subscriber already
    /// installed.
    ///
    /// An unparsable filter falls back to the configured level.
    pub fn init(&self) {
        let outcome = match self.try_init() {
            Err(TracingError::InvalidFilter(err)) => {
                let fallback = Self {
                    env_filter: None,
                    ..self.clone()
                };
                fallback.try_init().map(|()| Some(err))
            }
            other => other.map(|()| None),
        };
        if let Ok(Some(err)) = outcome {
            tracing::warn!(error = %err, level = %self.level, "invalid filter, using level");
        }
    }
}
