use std::io::ErrorKind;

use async_trait::async_trait;
use tracing::debug;

use super::FilesystemStorage;
use crate::errors::StorageError;
use crate::path::CategoryPath;
use crate::storage::{CategoryStorage, StorageResult};

#[async_trait]
impl CategoryStorage for FilesystemStorage {
    async fn exists(&self, path: &CategoryPath) -> StorageResult<bool> {
        let dir = self.category_dir(path);
        match tokio::fs::metadata(&dir).await {
            Ok(meta) => Ok(meta.is_dir()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::io(dir, e)),
        }
    }

    async fn ensure(&self, path: &CategoryPath) -> StorageResult<()> {
        let dir = self.category_dir(path);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| StorageError::io(&dir, e))?;

        // register every level with its parent, leaving existing entries alone
        for level in path.lineage().into_iter().skip(1) {
            let Some(parent) = level.parent() else { continue };
            let mut index = self.load_index(&parent).await?.unwrap_or_default();
            if index.subcategory(&level).is_some() {
                continue;
            }
            let count = self.memory_count(&level).await?;
            index.upsert_subcategory(&level, count);
            self.store_index(&parent, &index).await?;
        }
        debug!(category = %path, "category ensured");
        Ok(())
    }

    async fn delete(&self, path: &CategoryPath) -> StorageResult<()> {
        let dir = self.category_dir(path);
        match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => {
                debug!(category = %path, "category directory removed");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::io(dir, e)),
        }
    }

    async fn update_subcategory_description(
        &self,
        path: &CategoryPath,
        description: Option<&str>,
    ) -> StorageResult<()> {
        let parent = path
            .parent()
            .ok_or_else(|| StorageError::Other("the root category has no description".to_string()))?;
        let mut index = self.load_index(&parent).await?.unwrap_or_default();
        let count = self.memory_count(path).await?;
        index.set_description(path, count, description.map(str::to_string));
        self.store_index(&parent, &index).await
    }

    async fn remove_subcategory_entry(&self, path: &CategoryPath) -> StorageResult<()> {
        let Some(parent) = path.parent() else {
            return Ok(());
        };
        let Some(mut index) = self.load_index(&parent).await? else {
            return Ok(());
        };
        if index.remove_subcategory(path) {
            self.store_index(&parent, &index).await?;
        }
        Ok(())
    }
}
