//! Configuration file loading and parsing.

use crate::errors::Error;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::StoreConfig;
use super::env_parser;

/// Configuration loaded from TOML file.
#[derive(Debug, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub data_dir: PathBuf,

    #[serde(default)]
    pub default_store: String,

    #[serde(default)]
    pub stores: BTreeMap<String, StoreConfig>,
}

/// Per-user config location: `<config_dir>/memtree/config.toml`.
pub fn default_config_path() -> PathBuf {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    let config_dir = dirs::config_dir().unwrap_or_else(|| home.join(".config"));
    config_dir.join("memtree/config.toml")
}

/// Load configuration from TOML file.
///
/// An explicitly named file (argument or `MEMTREE_CONFIG`) must exist; the
/// default location is optional.
pub fn load_from_file(explicit: Option<&Path>) -> Result<Option<ConfigFile>, Error> {
    let named = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => env_parser::config_path_from_env()?,
    };

    let config_path = match named {
        Some(path) if !path.exists() => {
            return Err(Error::Config(format!(
                "Config file {} does not exist",
                path.display()
            )));
        }
        Some(path) => path,
        None => {
            let path = default_config_path();
            if !path.exists() {
                return Ok(None);
            }
            path
        }
    };

    let content = std::fs::read_to_string(&config_path).map_err(|e| {
        Error::Config(format!(
            "Failed to read config file {}: {e}",
            config_path.display()
        ))
    })?;

    let config: ConfigFile = toml::from_str(&content).map_err(|e| {
        Error::Config(format!(
            "Failed to parse config file {}: {e}",
            config_path.display()
        ))
    })?;

    Ok(Some(config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_toml() {
        let content = r#"
This is not valid TOML
 [[unclosed bracket
 "#;

        let result: Result<ConfigFile, _> = toml::from_str(content);
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_config_file() {
        let config: ConfigFile = toml::from_str("").unwrap();

        assert!(config.data_dir.as_os_str().is_empty());
        assert!(config.default_store.is_empty());
        assert!(config.stores.is_empty());
    }

    #[test]
    fn test_store_tables() {
        let content = r#"
            [stores.work]
            path = "~/work-memories"
            description = "Work notes"

            [stores.scratch]
            path = "/tmp/scratch"
        "#;

        let config: ConfigFile = toml::from_str(content).unwrap();

        assert_eq!(config.stores.len(), 2);
        assert_eq!(
            config.stores["work"].description.as_deref(),
            Some("Work notes")
        );
        assert_eq!(config.stores["scratch"].description, None);
    }

    #[test]
    fn test_store_without_path_rejected() {
        let content = "[stores.work]\ndescription = \"no path\"\n";

        let result: Result<ConfigFile, _> = toml::from_str(content);
        assert!(result.is_err());
    }

    #[test]
    fn test_default_config_path() {
        assert!(default_config_path().ends_with("memtree/config.toml"));
    }
}
