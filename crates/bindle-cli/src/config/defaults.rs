use std::path::PathBuf;

/// Config file looked up in the working directory.
pub const CONFIG_FILE: &str = "bindle.config.json";

/// Prefix for environment overrides, e.g. `BINDLE_ENTRY`.
pub const ENV_PREFIX: &str = "BINDLE_";

pub fn default_out_dir() -> PathBuf {
    PathBuf::from("dist")
}

pub fn default_filename() -> String {
    "main.js".to_string()
}
