//! Environment variable parsing utilities for configuration.

use crate::errors::Error;
use std::path::PathBuf;

use super::paths;

pub const DATA_DIR_VAR: &str = "MEMTREE_DATA_DIR";
pub const DEFAULT_STORE_VAR: &str = "MEMTREE_DEFAULT_STORE";
pub const CONFIG_VAR: &str = "MEMTREE_CONFIG";

/// Parse environment variable value or return error if empty/whitespace.
fn parse_env_string(name: &str, value: &str) -> Result<String, Error> {
    if value.trim().is_empty() {
        return Err(Error::Config(format!("{name} cannot be empty")));
    }
    Ok(value.trim().to_string())
}

/// Parse environment variable as a path, expanding tilde.
fn parse_env_path(name: &str, value: &str) -> Result<PathBuf, Error> {
    if value.trim().is_empty() {
        return Err(Error::Config(format!("{name} cannot be empty")));
    }
    Ok(paths::expand_tilde_path(&PathBuf::from(value)))
}

/// Apply MEMTREE_DATA_DIR environment variable override.
pub fn apply_data_dir_override(data_dir: &mut PathBuf) -> Result<(), Error> {
    if let Ok(val) = std::env::var(DATA_DIR_VAR) {
        *data_dir = parse_env_path(DATA_DIR_VAR, &val)?;
    }
    Ok(())
}

/// Apply MEMTREE_DEFAULT_STORE environment variable override.
pub fn apply_default_store_override(default_store: &mut String) -> Result<(), Error> {
    if let Ok(val) = std::env::var(DEFAULT_STORE_VAR) {
        *default_store = parse_env_string(DEFAULT_STORE_VAR, &val)?;
    }
    Ok(())
}

/// Config file named by MEMTREE_CONFIG, if set.
pub fn config_path_from_env() -> Result<Option<PathBuf>, Error> {
    std::env::var(CONFIG_VAR)
        .ok()
        .map(|val| parse_env_path(CONFIG_VAR, &val))
        .transpose()
}
