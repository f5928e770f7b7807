//! Environment variable overrides for configuration.

use crate::errors::Error;
use std::path::PathBuf;

use super::env_parser;

/// Apply environment variable overrides to configuration.
pub fn apply_env_overrides(data_dir: &mut PathBuf, default_store: &mut String) -> Result<(), Error> {
    env_parser::apply_data_dir_override(data_dir)?;
    env_parser::apply_default_store_override(default_store)?;
    Ok(())
}
