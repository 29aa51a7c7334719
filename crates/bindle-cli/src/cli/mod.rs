//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Bindle - bundle a module graph into a single file.
#[derive(Parser, Debug)]
#[command(name = "bindle", version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Bundle an entry module and everything it requires
    Build(BuildArgs),
}

/// Arguments for `bindle build`.
#[derive(Args, Debug, Clone, Default)]
pub struct BuildArgs {
    /// Entry module. Overrides `entry` from the config file.
    pub entry: Option<String>,

    /// Output directory
    #[arg(short = 'o', long = "out-dir", value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Output file name inside the output directory
    #[arg(short = 'f', long, value_name = "FILENAME")]
    pub filename: Option<String>,

    /// Path to a config file (default: bindle.config.json in the working directory)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Working directory for relative paths
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,
}
