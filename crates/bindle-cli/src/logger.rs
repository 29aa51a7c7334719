//! Logging setup for the CLI.
//!
//! `--verbose` and `--quiet` pin the level for every bindle crate. Without
//! either flag, `RUST_LOG` is honoured and `info` is the fallback.
//!
//! ```rust,no_run
//! use bindle_cli::logger::init_logger;
//!
//! init_logger(false, false, false);
//! tracing::info!("starting build");
//! ```

use bindle_bundler::logging::{LogLevel, init_logging};

/// Install the global tracing subscriber. Call once, before any logging.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    let level = LogLevel::from_flags(verbose, quiet);
    init_logging(level, !no_color, !(verbose || quiet));
}

/// Whether colored output should be used.
///
/// `NO_COLOR` disables colors, `FORCE_COLOR` forces them, otherwise the
/// terminal is asked.
pub fn should_use_colors() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if std::env::var_os("FORCE_COLOR").is_some() {
        return true;
    }
    console::Term::stderr().features().colors_supported()
}
