//! Configuration system for memtree.

mod env_parser;
mod loader;
mod overrides;
mod paths;
mod validation;

#[cfg(test)]
mod tests_utils;
#[cfg(test)]
use tests_utils::ENV_MUTEX;

use crate::errors::Error;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub use loader::{ConfigFile, default_config_path};

/// Name of the store used when none is given.
pub const DEFAULT_STORE_NAME: &str = "default";

/// A named store declared under `[stores.<name>]`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoreConfig {
    /// Root directory of the store.
    pub path: PathBuf,

    /// Free-form description shown by `memtree stores`.
    #[serde(default)]
    pub description: Option<String>,
}

/// Configuration values with priority: defaults < config file < env vars.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding stores that have no explicit path.
    pub data_dir: PathBuf,

    /// Store used when the caller does not name one.
    pub default_store: String,

    /// Explicitly declared stores, keyed by name.
    pub stores: BTreeMap<String, StoreConfig>,
}

impl Default for Config {
    fn default() -> Self {
        // Use home directory with sensible fallback for systems without HOME
        let home = dirs::home_dir().unwrap_or_else(|| {
            std::env::var("HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("."))
        });

        Self {
            data_dir: home.join(".memtree"),
            default_store: DEFAULT_STORE_NAME.to_string(),
            stores: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Load configuration with defaults, file values, and environment overrides.
    ///
    /// `explicit` is a config file named on the command line; otherwise
    /// `MEMTREE_CONFIG` or the per-user default location is used.
    pub fn load(explicit: Option<&Path>) -> Result<Self, Error> {
        let file_config = loader::load_from_file(explicit)?;

        let mut config = Config::default();

        if let Some(file) = file_config {
            config.merge_from_file(file);
        }

        overrides::apply_env_overrides(&mut config.data_dir, &mut config.default_store)?;

        config.validate()?;

        Ok(config)
    }

    /// Merge configuration from a file into this config.
    fn merge_from_file(&mut self, file: ConfigFile) {
        if !file.data_dir.as_os_str().is_empty() {
            self.data_dir = paths::expand_tilde_path(&file.data_dir);
        }
        if !file.default_store.is_empty() {
            self.default_store = file.default_store;
        }
        for (name, mut store) in file.stores {
            paths::expand_tilde(&mut store.path);
            self.stores.insert(name, store);
        }
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<(), Error> {
        let validator = validation::ConfigValidator {
            data_dir: self.data_dir.clone(),
            default_store: self.default_store.clone(),
            stores: self
                .stores
                .iter()
                .map(|(name, store)| (name.clone(), store.path.clone()))
                .collect(),
        };

        validator.validate()
    }

    /// Root directory for `name`: its declared path, or `<data_dir>/<name>`.
    pub fn store_path(&self, name: &str) -> PathBuf {
        self.stores
            .get(name)
            .map(|store| store.path.clone())
            .unwrap_or_else(|| self.data_dir.join(name))
    }
}
