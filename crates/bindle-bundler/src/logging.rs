//! Subscriber setup for applications (feature `logging`).
//!
//! As a library, bindle only emits `tracing` events plus one span per
//! compilation phase. Binaries that want bindle's default console output
//! call [`init_logging`] once at startup.

use std::sync::Once;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

static INIT: Once = Once::new();

/// Verbosity for the bindle crates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Silent,
    Error,
    Warn,
    /// Run summaries (default)
    #[default]
    Info,
    /// Phase transitions and per-module events
    Debug,
    Trace,
}

impl LogLevel {
    /// `--verbose` wins over `--quiet`.
    pub fn from_flags(verbose: bool, quiet: bool) -> Self {
        match (verbose, quiet) {
            (true, _) => LogLevel::Debug,
            (false, true) => LogLevel::Error,
            (false, false) => LogLevel::Info,
        }
    }

    fn directive(self) -> &'static str {
        match self {
            LogLevel::Silent => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// `EnvFilter` directive enabling `level` for every bindle crate.
pub fn filter_directive(level: LogLevel) -> String {
    let level = level.directive();
    format!("bindle_graph={level},bindle_bundler={level},bindle_cli={level}")
}

/// Install a compact stderr subscriber for the bindle crates.
///
/// `RUST_LOG` replaces the level-derived filter when `prefer_env` is set
/// and the variable parses. Only the first call in a process has an effect.
///
/// ```rust,no_run
/// use bindle_bundler::logging::{LogLevel, init_logging};
///
/// init_logging(LogLevel::Info, true, true);
/// ```
pub fn init_logging(level: LogLevel, ansi: bool, prefer_env: bool) {
    INIT.call_once(|| {
        let fallback = || EnvFilter::new(filter_directive(level));
        let filter = if prefer_env {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback())
        } else {
            fallback()
        };

        let installed = tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .compact()
                    .with_target(false)
                    .with_level(true)
                    .with_ansi(ansi)
                    .with_writer(std::io::stderr)
                    .without_time(),
            )
            .try_init();
        if installed.is_err() {
            tracing::debug!("a global subscriber was already installed");
        }
    });
}
