//! Layered configuration
//!
//! Later layers win: user config dir, then `.cleanstation/config.yaml` in the
//! working directory, then environment, then command-line flags.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::entities::configuration::Language;
use crate::yaml::{parse_yaml_file, YamlError};

pub const ENV_CATALOG: &str = "CLEANSTATION_CATALOG";
pub const ENV_DATABASE: &str = "CLEANSTATION_DB";
pub const LOCAL_DIR: &str = ".cleanstation";
pub const CONFIG_FILE: &str = "config.yaml";

const DEFAULT_CATALOG_DIR: &str = "catalog";
const DEFAULT_LOG_LEVEL: &str = "warn";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid config file: {0}")]
    Yaml(#[from] YamlError),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory of catalog YAML bundles
    pub catalog_dir: Option<PathBuf>,
    /// SQLite order database
    pub database: Option<PathBuf>,
    /// Default tracing filter when `CLEANSTATION_LOG` is unset
    pub log_level: Option<String>,
    /// Manual language applied when an order payload names none
    pub default_language: Option<Language>,
}

impl Config {
    /// Load every layer up to and including the environment
    pub fn load() -> Result<Self, ConfigError> {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let mut config = Self::load_files(Self::user_config_path().as_deref(), &cwd)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// `config.yaml` under the platform config directory
    pub fn user_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "cleanstation")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    /// Merge the user file (if any) with the working directory's local file
    pub fn load_files(user: Option<&Path>, root: &Path) -> Result<Self, ConfigError> {
        let mut config = Config::default();
        let local = root.join(LOCAL_DIR).join(CONFIG_FILE);
        for path in user.into_iter().chain(std::iter::once(local.as_path())) {
            if path.exists() {
                let layer: Config = parse_yaml_file(path)?;
                tracing::debug!(path = %path.display(), "config layer loaded");
                config.merge(layer);
            }
        }
        Ok(config)
    }

    /// Apply environment overrides through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(ENV_CATALOG).filter(|s| !s.is_empty()) {
            self.catalog_dir = Some(PathBuf::from(dir));
        }
        if let Some(db) = lookup(ENV_DATABASE).filter(|s| !s.is_empty()) {
            self.database = Some(PathBuf::from(db));
        }
    }

    /// Values set in `other` replace ours
    pub fn merge(&mut self, other: Config) {
        if other.catalog_dir.is_some() {
            self.catalog_dir = other.catalog_dir;
        }
        if other.database.is_some() {
            self.database = other.database;
        }
        if other.log_level.is_some() {
            self.log_level = other.log_level;
        }
        if other.default_language.is_some() {
            self.default_language = other.default_language;
        }
    }

    pub fn catalog_dir(&self) -> PathBuf {
        self.catalog_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CATALOG_DIR))
    }

    pub fn database(&self) -> PathBuf {
        self.database
            .clone()
            .unwrap_or_else(|| Path::new(LOCAL_DIR).join("orders.db"))
    }

    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }
}
