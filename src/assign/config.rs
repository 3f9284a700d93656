use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub assign: AssignConfig,
}

/// `[assign]` table; every key is optional and overridden by CLI flags.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AssignConfig {
    pub default_district: Option<String>,
    pub name_property: Option<String>,
    #[serde(default)]
    pub sanitize: bool,
    pub whitelist_file: Option<PathBuf>,
    pub migrate_folder: Option<PathBuf>,
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }
}
