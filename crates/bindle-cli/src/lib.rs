//! Bindle CLI - bundle a module graph into one self-executing file.
//!
//! The binary is a thin collaborator around [`bindle_bundler::Compiler`]:
//! it loads `bindle.config.json`, maps loader and plugin names onto the
//! built-ins, runs the compiler once and reports the outcome.
//!
//! - [`cli`] - clap argument definitions
//! - [`config`] - layered configuration (defaults, file, env, flags)
//! - [`builtins`] - named loaders and plugins usable from config files
//! - [`commands`] - command implementations
//! - [`error`] - error types with actionable hints
//! - [`logger`] - tracing subscriber setup

pub mod builtins;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logger;

pub use error::{CliError, ConfigError, Result, ResultExt};
