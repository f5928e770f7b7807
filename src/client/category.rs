use crate::category::{
    self, CreateCategoryResult, DeleteCategoryResult, ListMemoriesOptions, PruneOptions,
    PruneResult, SetDescriptionResult,
};
use crate::errors::CategoryError;
use crate::index::{CategoryMemoryEntry, SubcategoryEntry};
use crate::path;
use crate::storage::{ReindexResult, SharedStorage};

use super::{Memtree, MemoryClient};

/// Handle to a category inside a store.
///
/// Navigation is synchronous path arithmetic on the normalized string;
/// operations parse the path and resolve the store when awaited.
#[derive(Debug, Clone)]
pub struct CategoryClient {
    root: Memtree,
    store: String,
    raw_path: String,
}

impl CategoryClient {
    pub(super) fn new(root: Memtree, store: String, raw_path: String) -> Self {
        Self {
            root,
            store,
            raw_path,
        }
    }

    /// Normalized path, `/` for the root.
    pub fn raw_path(&self) -> &str {
        &self.raw_path
    }

    pub fn store_name(&self) -> &str {
        &self.store
    }

    pub fn is_root(&self) -> bool {
        path::parent_of(&self.raw_path).is_none()
    }

    /// Category at `relative` below this one.
    pub fn get_category(&self, relative: &str) -> CategoryClient {
        Self::new(
            self.root.clone(),
            self.store.clone(),
            path::join(&self.raw_path, relative),
        )
    }

    /// Enclosing category; `None` at the root.
    pub fn parent(&self) -> Option<CategoryClient> {
        path::parent_of(&self.raw_path)
            .map(|parent| Self::new(self.root.clone(), self.store.clone(), parent))
    }

    /// Memory named `slug` in this category.
    pub fn get_memory(&self, slug: &str) -> MemoryClient {
        MemoryClient::new(
            self.root.clone(),
            self.store.clone(),
            path::join(&self.raw_path, slug),
        )
    }

    fn storage(&self) -> Result<SharedStorage, CategoryError> {
        Ok(self.root.resolve(&self.store)?)
    }

    pub async fn create(&self) -> Result<CreateCategoryResult, CategoryError> {
        let storage = self.storage()?;
        category::create(storage.as_ref(), &self.raw_path).await
    }

    pub async fn delete(&self) -> Result<DeleteCategoryResult, CategoryError> {
        let storage = self.storage()?;
        category::delete(storage.as_ref(), &self.raw_path).await
    }

    pub async fn set_description(&self, text: &str) -> Result<SetDescriptionResult, CategoryError> {
        let storage = self.storage()?;
        category::set_description(storage.as_ref(), &self.raw_path, text).await
    }

    pub async fn list_memories(
        &self,
        options: ListMemoriesOptions,
    ) -> Result<Vec<CategoryMemoryEntry>, CategoryError> {
        let storage = self.storage()?;
        category::list_memories(storage.as_ref(), &self.raw_path, options).await
    }

    pub async fn list_subcategories(&self) -> Result<Vec<SubcategoryEntry>, CategoryError> {
        let storage = self.storage()?;
        category::list_subcategories(storage.as_ref(), &self.raw_path).await
    }

    /// Store-wide prune, whichever category it is called from.
    pub async fn prune(&self, options: PruneOptions) -> Result<PruneResult, CategoryError> {
        let storage = self.storage()?;
        category::prune(storage.as_ref(), options).await
    }

    /// Store-wide reindex, whichever category it is called from.
    pub async fn reindex(&self) -> Result<ReindexResult, CategoryError> {
        let storage = self.storage()?;
        category::reindex(storage.as_ref()).await
    }
}
