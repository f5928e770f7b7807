//! Navigation clients: `Memtree` → [`StoreClient`] → [`CategoryClient`] →
//! [`MemoryClient`].
//!
//! Handles are cheap to build and never fail. They carry a normalized path
//! string and the store name; the path is parsed and the store resolved by
//! the first async operation, which is where `INVALID_PATH` and
//! `STORE_NOT_FOUND` surface.

mod cache;
mod category;
mod memory;

use std::sync::Arc;

pub use cache::AdapterCache;
pub use category::CategoryClient;
pub use memory::MemoryClient;

use crate::errors::{
    CategoryError, CategoryErrorCode, MemoryError, MemoryErrorCode, StorageError,
};
use crate::path;
use crate::registry::{Registry, StoreDefinition};
use crate::storage::{FilesystemStorage, SharedStorage};

/// Builds the storage adapter for a store definition.
pub type StorageFactory =
    Arc<dyn Fn(&StoreDefinition) -> Result<SharedStorage, StorageError> + Send + Sync>;

/// Factory producing a [`FilesystemStorage`] rooted at each store's path.
pub fn filesystem_factory() -> StorageFactory {
    Arc::new(
        |store: &StoreDefinition| -> Result<SharedStorage, StorageError> {
            Ok(Arc::new(FilesystemStorage::new(&store.path)))
        },
    )
}

/// Why a store name could not be turned into an adapter.
#[derive(Debug)]
pub(crate) enum ResolveError {
    UnknownStore(String),
    Factory(String, StorageError),
}

impl From<ResolveError> for CategoryError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::UnknownStore(name) => CategoryError::new(
                CategoryErrorCode::StoreNotFound,
                format!("Store '{name}' is not registered"),
            ),
            ResolveError::Factory(name, cause) => {
                CategoryError::storage("open store", name, cause)
            }
        }
    }
}

impl From<ResolveError> for MemoryError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::UnknownStore(name) => MemoryError::new(
                MemoryErrorCode::StoreNotFound,
                format!("Store '{name}' is not registered"),
            ),
            ResolveError::Factory(name, cause) => MemoryError::storage("open store", name, cause),
        }
    }
}

struct Inner {
    registry: Registry,
    factory: StorageFactory,
    cache: AdapterCache,
}

/// Root handle: owns the registry, the adapter factory and the adapter
/// cache. Clones share all three.
#[derive(Clone)]
pub struct Memtree {
    inner: Arc<Inner>,
}

impl Memtree {
    pub fn new(registry: Registry, factory: StorageFactory) -> Self {
        Self {
            inner: Arc::new(Inner {
                registry,
                factory,
                cache: AdapterCache::new(),
            }),
        }
    }

    /// Handle to a named store. Unknown names fail on first use.
    pub fn get_store(&self, name: &str) -> StoreClient {
        StoreClient {
            root: self.clone(),
            name: name.to_string(),
        }
    }

    /// Registered stores in name order.
    pub fn stores(&self) -> Vec<StoreDefinition> {
        self.inner.registry.iter().cloned().collect()
    }

    pub fn registry(&self) -> &Registry {
        &self.inner.registry
    }

    pub fn adapter_cache(&self) -> &AdapterCache {
        &self.inner.cache
    }

    pub(crate) fn resolve(&self, name: &str) -> Result<SharedStorage, ResolveError> {
        let store = self
            .inner
            .registry
            .get(name)
            .ok_or_else(|| ResolveError::UnknownStore(name.to_string()))?;
        self.inner
            .cache
            .get_or_create(store, |def| (self.inner.factory)(def))
            .map_err(|e| ResolveError::Factory(name.to_string(), e))
    }
}

impl std::fmt::Debug for Memtree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Memtree")
            .field("registry", &self.inner.registry)
            .field("cache", &self.inner.cache)
            .finish_non_exhaustive()
    }
}

/// Handle to one store.
#[derive(Debug, Clone)]
pub struct StoreClient {
    root: Memtree,
    name: String,
}

impl StoreClient {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The store's root category.
    pub fn root_category(&self) -> CategoryClient {
        CategoryClient::new(self.root.clone(), self.name.clone(), path::normalize(""))
    }

    /// Category at `raw_path` from the store root.
    pub fn get_category(&self, raw_path: &str) -> CategoryClient {
        self.root_category().get_category(raw_path)
    }

    /// Memory at `raw_path` from the store root.
    pub fn get_memory(&self, raw_path: &str) -> MemoryClient {
        MemoryClient::new(self.root.clone(), self.name.clone(), path::normalize(raw_path))
    }
}
