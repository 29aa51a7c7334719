use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format as _, Json, Serialized},
};
use serde::Serialize;

use super::{BindleConfig, CONFIG_FILE, ENV_PREFIX};
use crate::cli::BuildArgs;
use crate::error::{ConfigError, Result};

/// Environment keys honoured after `BINDLE_` is stripped and `__` becomes `.`.
const ENV_KEYS: &[&str] = &["entry", "output.directory", "output.filename", "output.banner"];

/// Flag values that override everything else. Absent flags serialize to
/// nothing, so they never mask file or environment values.
#[derive(Debug, Default, Serialize)]
struct Overrides<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    entry: Option<&'a str>,
    #[serde(skip_serializing_if = "OutputOverrides::is_empty")]
    output: OutputOverrides<'a>,
}

#[derive(Debug, Default, Serialize)]
struct OutputOverrides<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    directory: Option<&'a Path>,
    #[serde(skip_serializing_if = "Option::is_none")]
    filename: Option<&'a str>,
}

impl OutputOverrides<'_> {
    fn is_empty(&self) -> bool {
        self.directory.is_none() && self.filename.is_none()
    }
}

impl BindleConfig {
    /// Load configuration for `args`, rooted at `cwd`.
    ///
    /// An explicit `--config` path must exist. Otherwise
    /// `<cwd>/bindle.config.json` is used when present.
    pub fn load(args: &BuildArgs, cwd: &Path) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(BindleConfig::default()));

        if let Some(path) = Self::config_file(args.config.as_deref(), cwd)? {
            tracing::debug!(path = %path.display(), "loading config file");
            figment = figment.merge(Json::file(path));
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__").only(ENV_KEYS));

        let overrides = Overrides {
            entry: args.entry.as_deref(),
            output: OutputOverrides {
                directory: args.out_dir.as_deref(),
                filename: args.filename.as_deref(),
            },
        };
        figment = figment.merge(Serialized::defaults(overrides));

        figment.extract().map_err(|e| {
            ConfigError::Invalid {
                message: e.to_string(),
                hint: format!("Check {CONFIG_FILE} syntax and field names"),
            }
            .into()
        })
    }

    fn config_file(explicit: Option<&Path>, cwd: &Path) -> Result<Option<PathBuf>> {
        match explicit {
            Some(path) => {
                let path = cwd.join(path);
                if path.is_file() {
                    Ok(Some(path))
                } else {
                    Err(ConfigError::NotFound(path).into())
                }
            }
            None => {
                let path = cwd.join(CONFIG_FILE);
                Ok(path.is_file().then_some(path))
            }
        }
    }
}
