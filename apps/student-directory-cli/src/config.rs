use std::path::Path;

use anyhow::{Context, Result, bail};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use student_directory::DirectoryConfig;

/// Environment variables with this prefix override file settings,
/// e.g. `STUDENT_DIRECTORY__BASE_URL`.
pub const ENV_PREFIX: &str = "STUDENT_DIRECTORY__";

/// Command-line values that win over every other layer.
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub base_url: Option<String>,
}

/// Layered config: defaults, then YAML (if given), then env, then CLI.
pub fn load(path: Option<&Path>, overrides: &CliOverrides) -> Result<DirectoryConfig> {
    let mut figment = Figment::from(Serialized::defaults(DirectoryConfig::default()));
    if let Some(path) = path {
        if !path.is_file() {
            bail!("config file does not exist: {}", path.display());
        }
        figment = figment.merge(Yaml::file(path));
    }
    figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

    let mut config: DirectoryConfig = figment.extract().context("invalid configuration")?;
    if let Some(base_url) = &overrides.base_url {
        config.base_url.clone_from(base_url);
    }
    config.page_size()?;
    Ok(config)
}
