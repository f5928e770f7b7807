//! Store registry: maps store names to root locations.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;

use crate::config::Config;

/// A named store and where it lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreDefinition {
    pub name: String,
    pub path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl StoreDefinition {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Known stores, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    stores: BTreeMap<String, StoreDefinition>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a store definition.
    pub fn register(&mut self, store: StoreDefinition) -> &mut Self {
        self.stores.insert(store.name.clone(), store);
        self
    }

    pub fn with_store(mut self, store: StoreDefinition) -> Self {
        self.register(store);
        self
    }

    pub fn get(&self, name: &str) -> Option<&StoreDefinition> {
        self.stores.get(name)
    }

    /// Definitions in name order.
    pub fn iter(&self) -> impl Iterator<Item = &StoreDefinition> {
        self.stores.values()
    }

    pub fn len(&self) -> usize {
        self.stores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }

    /// Build the registry described by `config`.
    ///
    /// Declared stores are taken as-is; the default store is added under
    /// `data_dir` when it is not declared.
    pub fn from_config(config: &Config) -> Self {
        let mut registry = Self::new();
        for (name, store) in &config.stores {
            registry.register(StoreDefinition {
                name: name.clone(),
                path: store.path.clone(),
                description: store.description.clone(),
            });
        }
        if registry.get(&config.default_store).is_none() {
            registry.register(StoreDefinition::new(
                config.default_store.clone(),
                config.store_path(&config.default_store),
            ));
        }
        registry
    }
}
