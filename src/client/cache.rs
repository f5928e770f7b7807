//! Per-store adapter cache owned by the root client.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use tracing::debug;

use crate::errors::StorageError;
use crate::registry::StoreDefinition;
use crate::storage::SharedStorage;

/// One storage adapter per store name.
///
/// Entries are created on first use and live as long as the cache. They are
/// never evicted and are not refreshed when the store's definition changes.
#[derive(Default)]
pub struct AdapterCache {
    adapters: Mutex<HashMap<String, SharedStorage>>,
}

impl AdapterCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached adapter for `store`, building it with `create` on
    /// first access.
    ///
    /// A failed build caches nothing.
    pub fn get_or_create<F>(&self, store: &StoreDefinition, create: F) -> Result<SharedStorage, StorageError>
    where
        F: FnOnce(&StoreDefinition) -> Result<SharedStorage, StorageError>,
    {
        let mut adapters = self.adapters.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(adapter) = adapters.get(&store.name) {
            return Ok(adapter.clone());
        }

        let adapter = create(store)?;
        debug!(store = %store.name, path = %store.path.display(), "storage adapter created");
        adapters.insert(store.name.clone(), adapter.clone());
        Ok(adapter)
    }

    /// Number of cached adapters.
    pub fn len(&self) -> usize {
        self.adapters.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for AdapterCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterCache").field("len", &self.len()).finish()
    }
}
