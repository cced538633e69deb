use serde::Deserialize;
use std::path::{Path, PathBuf};
use directories::{BaseDirs, ProjectDirs};
use anyhow::{Context, Result};
use std::fs;
use log::debug;

use crate::codec::GenerateOptions;

#[derive(Deserialize, Debug, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub generate: GenerateOptions,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct GeneralConfig {
    /// Restrict categories to the built-in list when validating.
    #[serde(default)]
    pub strict_categories: bool,
    /// Where managed `.desktop` files live. Defaults to the user's
    /// `applications` data directory.
    #[serde(default)]
    pub applications_dir: Option<PathBuf>,
}

impl Config {
    pub fn applications_dir(&self) -> Option<PathBuf> {
        self.general.applications_dir.clone().or_else(|| {
            BaseDirs::new().map(|dirs| dirs.data_dir().join("applications"))
        })
    }
}

pub fn default_config_path() -> PathBuf {
    let proj_dirs = ProjectDirs::from("org", "deskcrafter", "deskcrafter");
    if let Some(dirs) = &proj_dirs {
        dirs.config_dir().join("config.toml")
    } else {
        PathBuf::from("config.toml")
    }
}

pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let config_path = match path {
        Some(p) => p.to_path_buf(),
        None => default_config_path(),
    };

    if !config_path.exists() {
        debug!("No config at {:?}, using defaults", config_path);
        return Ok(Config::default());
    }

    let content = fs::read_to_string(&config_path)
        .with_context(|| format!("reading {}", config_path.display()))?;
    let config: Config = toml::from_str(&content)
        .with_context(|| format!("parsing {}", config_path.display()))?;
    Ok(config)
}
