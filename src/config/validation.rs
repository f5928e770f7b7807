//! Configuration validation logic.

use crate::errors::Error;
use crate::path::slugify;
use std::path::PathBuf;

/// Validates configuration values.
pub struct ConfigValidator {
    /// Directory holding implicitly placed stores.
    pub data_dir: PathBuf,
    /// Store used when none is named.
    pub default_store: String,
    /// Declared stores as `(name, path)` pairs.
    pub stores: Vec<(String, PathBuf)>,
}

impl ConfigValidator {
    /// Validate all configuration values for correctness and constraints.
    ///
    /// Checks that:
    /// - Data directory is not empty
    /// - Default store name is a non-empty slug
    /// - Every declared store has a slug name and a non-empty path
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if any validation check fails.
    pub fn validate(&self) -> Result<(), Error> {
        self.validate_data_dir()?;
        validate_store_name("default_store", &self.default_store)?;
        self.validate_stores()?;

        Ok(())
    }

    fn validate_data_dir(&self) -> Result<(), Error> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(Error::Config("Data directory cannot be empty".to_string()));
        }

        Ok(())
    }

    fn validate_stores(&self) -> Result<(), Error> {
        for (name, path) in &self.stores {
            validate_store_name("store name", name)?;
            if path.as_os_str().is_empty() {
                return Err(Error::Config(format!("Store '{name}' has an empty path")));
            }
        }

        Ok(())
    }
}

fn validate_store_name(field: &str, name: &str) -> Result<(), Error> {
    if name.trim().is_empty() {
        return Err(Error::Config(format!("{field} cannot be empty")));
    }
    if slugify(name) != name {
        return Err(Error::Config(format!(
            "Invalid {field} '{name}' (use lowercase letters, digits and '-')"
        )));
    }

    Ok(())
}
