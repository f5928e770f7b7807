use crate::errors::MemoryError;
use crate::memory::{self, GetMemoryOptions, MoveResult};
use crate::memory_types::{Memory, MemoryMetadata, MemoryUpdate};
use crate::path::{self, MemoryPath};
use crate::storage::SharedStorage;

use super::{CategoryClient, Memtree};

/// Handle to a memory inside a store.
#[derive(Debug, Clone)]
pub struct MemoryClient {
    root: Memtree,
    store: String,
    raw_path: String,
}

impl MemoryClient {
    pub(super) fn new(root: Memtree, store: String, raw_path: String) -> Self {
        Self {
            root,
            store,
            raw_path,
        }
    }

    pub fn raw_path(&self) -> &str {
        &self.raw_path
    }

    pub fn store_name(&self) -> &str {
        &self.store
    }

    /// The owning category.
    pub fn category(&self) -> CategoryClient {
        let parent = path::parent_of(&self.raw_path).unwrap_or_else(|| path::normalize(""));
        CategoryClient::new(self.root.clone(), self.store.clone(), parent)
    }

    fn storage(&self) -> Result<SharedStorage, MemoryError> {
        Ok(self.root.resolve(&self.store)?)
    }

    pub async fn create(&self, content: &str, metadata: MemoryMetadata) -> Result<Memory, MemoryError> {
        let storage = self.storage()?;
        memory::create(storage.as_ref(), &self.raw_path, content, metadata).await
    }

    pub async fn get(&self, options: GetMemoryOptions) -> Result<Memory, MemoryError> {
        let storage = self.storage()?;
        memory::get(storage.as_ref(), &self.raw_path, options).await
    }

    pub async fn update(&self, changes: MemoryUpdate) -> Result<Memory, MemoryError> {
        let storage = self.storage()?;
        memory::update(storage.as_ref(), &self.raw_path, changes).await
    }

    /// Move to `destination`, a path from the store root.
    pub async fn move_to(&self, destination: &str) -> Result<MoveResult, MemoryError> {
        let storage = self.storage()?;
        memory::move_memory(storage.as_ref(), &self.raw_path, destination).await
    }

    pub async fn remove(&self) -> Result<MemoryPath, MemoryError> {
        let storage = self.storage()?;
        memory::remove(storage.as_ref(), &self.raw_path).await
    }
}

#[cfg(test)]
mod tests {
    use crate::client::{Memtree, filesystem_factory};
    use crate::category::ListMemoriesOptions;
    use crate::errors::MemoryErrorCode;
    use crate::memory::GetMemoryOptions;
    use crate::memory_types::{MemoryMetadata, MemoryUpdate};
    use crate::registry::{Registry, StoreDefinition};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_memory_lifecycle_through_clients() {
        let dir = TempDir::new().unwrap();
        let registry = Registry::new().with_store(StoreDefinition::new("main", dir.path()));
        let store = Memtree::new(registry, filesystem_factory()).get_store("main");

        let note = store.get_category("inbox").get_memory("idea");
        assert_eq!(note.category().raw_path(), "/inbox");

        note.create("first draft", MemoryMetadata::default())
            .await
            .unwrap();
        let updated = note
            .update(MemoryUpdate {
                content: Some("second draft".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(updated.content, "second draft");

        let moved = note.move_to("projects/idea").await.unwrap();
        assert_eq!(moved.to.to_string(), "projects/idea");

        let err = note.get(GetMemoryOptions::default()).await.unwrap_err();
        assert_eq!(err.code, MemoryErrorCode::MemoryNotFound);

        let target = store.get_memory("/projects/idea");
        assert_eq!(
            target.get(GetMemoryOptions::default()).await.unwrap().content,
            "second draft"
        );
        let listed = target
            .category()
            .list_memories(ListMemoriesOptions::default())
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);

        target.remove().await.unwrap();
        assert!(
            target
                .category()
                .list_memories(ListMemoriesOptions::default())
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_root_level_memory_path_rejected_when_blank() {
        let dir = TempDir::new().unwrap();
        let registry = Registry::new().with_store(StoreDefinition::new("main", dir.path()));
        let store = Memtree::new(registry, filesystem_factory()).get_store("main");

        let err = store
            .root_category()
            .get_memory("")
            .get(GetMemoryOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.code, MemoryErrorCode::InvalidPath);
    }
}
