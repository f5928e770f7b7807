use std::collections::VecDeque;

use chrono::Utc;
use tracing::{info, warn};

use super::{PruneOptions, PruneResult, PrunedMemory};
use crate::errors::{CategoryError, StorageError};
use crate::path::CategoryPath;
use crate::storage::{ReindexResult, StoragePort};

/// Rebuild every index of the store from its stored records.
pub async fn reindex(storage: &dyn StoragePort) -> Result<ReindexResult, CategoryError> {
    storage
        .indexes()
        .reindex()
        .await
        .map_err(|e| CategoryError::storage("reindex store", "", e))
}

/// Find (and unless `dry_run`, delete) every memory in the store whose
/// `expires_at` is at or before `now`.
///
/// Walks the index tree from the root, not the storage tree: expired
/// records missing from their category's index are only found after a
/// reindex. A real prune finishes with a full reindex.
pub async fn prune(storage: &dyn StoragePort, options: PruneOptions) -> Result<PruneResult, CategoryError> {
    let now = options.now.unwrap_or_else(Utc::now);
    let mut pruned = Vec::new();
    let mut queue = VecDeque::from([CategoryPath::root()]);

    while let Some(category) = queue.pop_front() {
        let index = storage
            .indexes()
            .read(&category)
            .await
            .map_err(|e| CategoryError::storage("read category index", category.to_string(), e))?;
        let Some(index) = index else { continue };

        for entry in &index.memories {
            let memory = match storage.memories().read(&entry.path).await {
                Ok(Some(memory)) => memory,
                Ok(None) => continue,
                Err(err @ StorageError::Record { .. }) => {
                    warn!(memory = %entry.path, error = %err, "skipping unreadable memory during prune");
                    continue;
                }
                Err(err) => {
                    return Err(CategoryError::storage("read memory", entry.path.to_string(), err));
                }
            };
            if let Some(expires_at) = memory.metadata.expires_at.filter(|at| *at <= now) {
                pruned.push(PrunedMemory {
                    path: entry.path.clone(),
                    expires_at,
                });
            }
        }
        queue.extend(index.subcategories.into_iter().map(|sub| sub.path));
    }

    if options.dry_run {
        info!(candidates = pruned.len(), "prune dry run");
        return Ok(PruneResult { pruned });
    }

    for item in &pruned {
        storage
            .memories()
            .remove(&item.path)
            .await
            .map_err(|e| CategoryError::storage("remove expired memory", item.path.to_string(), e))?;
        storage
            .indexes()
            .remove_after_memory_delete(&item.path)
            .await
            .map_err(|e| CategoryError::storage("update category index", item.path.to_string(), e))?;
    }
    reindex(storage).await?;

    info!(pruned = pruned.len(), "prune complete");
    Ok(PruneResult { pruned })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory_types::{Memory, MemoryMetadata};
    use crate::path::MemoryPath;
    use crate::storage::{FilesystemStorage, IndexStorage, MemoryStorage};
    use crate::index::CategoryMemoryEntry;
    use chrono::{Duration, TimeZone};
    use tempfile::TempDir;

    async fn put(storage: &FilesystemStorage, path: &str, expires: Option<chrono::DateTime<Utc>>) {
        let memory = Memory::new(
            MemoryPath::parse(path).unwrap(),
            "content",
            MemoryMetadata::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
                .with_expires_at(expires),
        );
        MemoryStorage::write(storage, &memory).await.unwrap();
        storage
            .update_after_memory_write(&memory.path, CategoryMemoryEntry::from_memory(&memory))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_dry_run_changes_nothing() {
        let dir = TempDir::new().unwrap();
        let storage = FilesystemStorage::new(dir.path());
        let past = Utc::now() - Duration::days(1);
        put(&storage, "a/old", Some(past)).await;
        put(&storage, "a/b/older", Some(past)).await;
        put(&storage, "a/fresh", None).await;

        let result = prune(
            &storage,
            PruneOptions {
                dry_run: true,
                now: None,
            },
        )
        .await
        .unwrap();

        let mut paths: Vec<String> = result.pruned.iter().map(|p| p.path.to_string()).collect();
        paths.sort();
        assert_eq!(paths, vec!["a/b/older", "a/old"]);
        assert!(dir.path().join("a/old.md").exists());
        assert!(dir.path().join("a/b/older.md").exists());
    }

    #[tokio::test]
    async fn test_prune_removes_and_reindexes() {
        let dir = TempDir::new().unwrap();
        let storage = FilesystemStorage::new(dir.path());
        let cutoff = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        put(&storage, "a/at-cutoff", Some(cutoff)).await;
        put(&storage, "a/later", Some(cutoff + Duration::seconds(1))).await;

        let result = prune(
            &storage,
            PruneOptions {
                dry_run: false,
                now: Some(cutoff),
            },
        )
        .await
        .unwrap();

        assert_eq!(result.pruned.len(), 1);
        assert_eq!(result.pruned[0].path.to_string(), "a/at-cutoff");
        assert_eq!(result.pruned[0].expires_at, cutoff);
        assert!(!dir.path().join("a/at-cutoff.md").exists());

        let index = IndexStorage::read(&storage, &CategoryPath::parse("a").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(index.memories.len(), 1);
    }

    #[tokio::test]
    async fn test_prune_tolerates_non_utf8_neighbour() {
        let dir = TempDir::new().unwrap();
        let storage = FilesystemStorage::new(dir.path());
        let past = Utc::now() - Duration::days(1);
        put(&storage, "docs/old", Some(past)).await;
        put(&storage, "docs/keep", None).await;
        std::fs::write(dir.path().join("docs/bin.md"), [0xff, 0xfe, 0x00]).unwrap();

        let result = prune(&storage, PruneOptions::default()).await.unwrap();
        assert_eq!(result.pruned.len(), 1);
        assert!(!dir.path().join("docs/old.md").exists());

        let docs = IndexStorage::read(&storage, &CategoryPath::parse("docs").unwrap())
            .await
            .unwrap()
            .unwrap();
        let paths: Vec<String> = docs.memories.iter().map(|e| e.path.to_string()).collect();
        assert_eq!(paths, vec!["docs/bin", "docs/keep"]);
    }
}
