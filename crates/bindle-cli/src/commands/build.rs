//! `bindle build`: load configuration, compile once, report the artifact.

use std::path::{Path, PathBuf};
use std::time::Duration;

use bindle_bundler::{Compiler, RunOutcome};
use console::style;

use crate::cli::BuildArgs;
use crate::config::BindleConfig;
use crate::error::{CliError, Result};

/// Execute the build command.
///
/// 1. Resolve the working directory (`--cwd`, else the process cwd)
/// 2. Load configuration (flags > env > file > defaults)
/// 3. Build the compiler, which applies plugins
/// 4. Run one compilation and print a summary
pub async fn execute(args: BuildArgs) -> Result<()> {
    let cwd = resolve_cwd(args.cwd.as_deref())?;
    let config = BindleConfig::load(&args, &cwd)?;
    let bundle = config.to_bundle_config(&cwd)?;

    let compiler = Compiler::new(bundle)?;
    if !compiler.plugin_names().is_empty() {
        tracing::debug!(plugins = ?compiler.plugin_names(), "plugins applied");
    }

    let outcome = compiler.run().await?;
    print_summary(&outcome, &cwd);
    Ok(())
}

fn resolve_cwd(flag: Option<&Path>) -> Result<PathBuf> {
    let current = std::env::current_dir()?;
    let cwd = match flag {
        Some(dir) => current.join(dir),
        None => current,
    };
    if !cwd.is_dir() {
        return Err(CliError::InvalidArgument(format!(
            "working directory {} does not exist",
            cwd.display()
        )));
    }
    Ok(cwd)
}

fn print_summary(outcome: &RunOutcome, cwd: &Path) {
    let path = outcome.artifact.path.strip_prefix(cwd).unwrap_or(&outcome.artifact.path);
    eprintln!(
        "{} {} {}",
        style("✓").for_stderr().green().bold(),
        style(path.display()).for_stderr().bold(),
        style(format!(
            "({} modules, {}, {})",
            outcome.module_count,
            format_size(outcome.artifact.size as u64),
            format_duration(outcome.duration)
        ))
        .for_stderr()
        .dim()
    );
}

/// `0 B`, `512 B`, `1.50 KB`, `2.00 MB`
pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];

    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.2} {}", size, UNITS[unit])
    }
}

/// `50ms`, `1.50s`, `1m 30s`
pub fn format_duration(duration: Duration) -> String {
    let total_ms = duration.as_millis();
    if total_ms < 1000 {
        format!("{}ms", total_ms)
    } else if total_ms < 60_000 {
        format!("{:.2}s", duration.as_secs_f64())
    } else {
        let secs = duration.as_secs();
        format!("{}m {}s", secs / 60, secs % 60)
    }
}
