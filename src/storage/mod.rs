//! Storage port consumed by the category and memory operations.
//!
//! The engine never touches a backend directly: it is handed an
//! `Arc<dyn StoragePort>` and goes through the three narrow interfaces
//! below. [`fs::FilesystemStorage`] is the bundled implementation.

pub mod fs;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::errors::StorageError;
use crate::index::{CategoryIndex, CategoryMemoryEntry};
use crate::memory_types::Memory;
use crate::path::{CategoryPath, MemoryPath};

pub use fs::FilesystemStorage;

/// Result type for storage port calls.
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Outcome of a full reindex.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReindexResult {
    pub warnings: Vec<String>,
}

/// Persistence of individual memory records.
#[async_trait]
pub trait MemoryStorage: Send + Sync {
    /// `Ok(None)` when no record exists at `path`.
    async fn read(&self, path: &MemoryPath) -> StorageResult<Option<Memory>>;

    /// Create or overwrite the record at `memory.path`.
    async fn write(&self, memory: &Memory) -> StorageResult<()>;

    async fn remove(&self, path: &MemoryPath) -> StorageResult<()>;

    /// Relocate a record; the caller guarantees `to` is free.
    async fn move_to(&self, from: &MemoryPath, to: &MemoryPath) -> StorageResult<()>;
}

/// Persistence and maintenance of category indexes.
#[async_trait]
pub trait IndexStorage: Send + Sync {
    /// `Ok(None)` when the category has no index yet.
    async fn read(&self, path: &CategoryPath) -> StorageResult<Option<CategoryIndex>>;

    /// Replace a category's index.
    async fn write(&self, path: &CategoryPath, index: &CategoryIndex) -> StorageResult<()>;

    /// Rebuild every index in the store from the records actually present.
    async fn reindex(&self) -> StorageResult<ReindexResult>;

    /// Add or refresh exactly one entry in the owning category's index and
    /// the memory counts of its ancestors.
    async fn update_after_memory_write(
        &self,
        path: &MemoryPath,
        entry: CategoryMemoryEntry,
    ) -> StorageResult<()>;

    /// Drop one entry from the owning category's index.
    async fn remove_after_memory_delete(&self, path: &MemoryPath) -> StorageResult<()>;
}

/// Category existence and the parent-side entries of categories.
#[async_trait]
pub trait CategoryStorage: Send + Sync {
    async fn exists(&self, path: &CategoryPath) -> StorageResult<bool>;

    /// Create `path` and any missing ancestors.
    async fn ensure(&self, path: &CategoryPath) -> StorageResult<()>;

    /// Remove `path` together with everything below it.
    async fn delete(&self, path: &CategoryPath) -> StorageResult<()>;

    /// Set (`Some`) or clear (`None`) the description stored on the
    /// category's entry in its parent's index.
    async fn update_subcategory_description(
        &self,
        path: &CategoryPath,
        description: Option<&str>,
    ) -> StorageResult<()>;

    /// Drop the category's entry from its parent's index.
    async fn remove_subcategory_entry(&self, path: &CategoryPath) -> StorageResult<()>;
}

/// One store's complete storage port.
pub trait StoragePort: Send + Sync {
    fn memories(&self) -> &dyn MemoryStorage;
    fn indexes(&self) -> &dyn IndexStorage;
    fn categories(&self) -> &dyn CategoryStorage;
}

/// Shared handle to a store's port.
pub type SharedStorage = Arc<dyn StoragePort>;
