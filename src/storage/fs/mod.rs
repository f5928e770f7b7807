//! Filesystem implementation of the storage port.
//!
//! Layout under the store root:
//!
//! ```text
//! <root>/index.yaml                 root index (top-level categories)
//! <root>/standards/index.yaml       index of "standards"
//! <root>/standards/style.md         memory "standards/style"
//! ```
//!
//! Every write goes through a hidden temporary file followed by a rename.

mod categories;
mod indexes;
mod memories;
mod record;

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;
use uuid::Uuid;

use super::{CategoryStorage, IndexStorage, MemoryStorage, StoragePort, StorageResult};
use crate::errors::StorageError;
use crate::index::CategoryIndex;
use crate::path::{CategoryPath, MemoryPath};

pub use record::{parse_record, render_record};

/// Name of the per-directory index file.
pub const INDEX_FILE_NAME: &str = "index.yaml";
/// Extension of memory record files.
pub const MEMORY_EXTENSION: &str = "md";

/// Storage port backed by a directory tree.
#[derive(Debug, Clone)]
pub struct FilesystemStorage {
    root: PathBuf,
}

impl FilesystemStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub(crate) fn category_dir(&self, path: &CategoryPath) -> PathBuf {
        let mut dir = self.root.clone();
        for segment in path.segments() {
            dir.push(segment.as_str());
        }
        dir
    }

    pub(crate) fn memory_file(&self, path: &MemoryPath) -> PathBuf {
        self.category_dir(path.category())
            .join(format!("{}.{MEMORY_EXTENSION}", path.slug()))
    }

    fn index_file(&self, path: &CategoryPath) -> PathBuf {
        self.category_dir(path).join(INDEX_FILE_NAME)
    }

    /// Read a category's index; `None` when no index file exists.
    pub(crate) async fn load_index(&self, path: &CategoryPath) -> StorageResult<Option<CategoryIndex>> {
        let file = self.index_file(path);
        let bytes = match tokio::fs::read(&file).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StorageError::io(file, e)),
        };
        let text = String::from_utf8(bytes).map_err(|e| StorageError::Index {
            path: file.clone(),
            message: format!("index is not valid UTF-8: {e}"),
        })?;
        if text.trim().is_empty() {
            return Ok(Some(CategoryIndex::default()));
        }
        serde_yaml::from_str(&text)
            .map(Some)
            .map_err(|e| StorageError::Index {
                path: file,
                message: e.to_string(),
            })
    }

    /// Replace a category's index, creating its directory if needed.
    pub(crate) async fn store_index(&self, path: &CategoryPath, index: &CategoryIndex) -> StorageResult<()> {
        let dir = self.category_dir(path);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| StorageError::io(&dir, e))?;
        let yaml = serde_yaml::to_string(index).map_err(|e| StorageError::Index {
            path: self.index_file(path),
            message: e.to_string(),
        })?;
        write_atomic(&self.index_file(path), yaml.as_bytes()).await?;
        debug!(
            category = %path,
            memories = index.memories.len(),
            subcategories = index.subcategories.len(),
            "index written"
        );
        Ok(())
    }

    /// Number of direct memories recorded in a category's index.
    pub(crate) async fn memory_count(&self, path: &CategoryPath) -> StorageResult<usize> {
        Ok(self
            .load_index(path)
            .await?
            .map(|index| index.memories.len())
            .unwrap_or(0))
    }

    /// Propagate a category's memory count into its parent's index and make
    /// sure every ancestor is listed by its own parent.
    ///
    /// Stops at the first ancestor whose entry is already up to date.
    pub(crate) async fn refresh_ancestors(&self, category: &CategoryPath, memory_count: usize) -> StorageResult<()> {
        let mut current = category.clone();
        let mut count = memory_count;

        while let Some(parent) = current.parent() {
            let mut index = self.load_index(&parent).await?.unwrap_or_default();
            if index.subcategory(&current).map(|e| e.memory_count) == Some(count) {
                break;
            }
            index.upsert_subcategory(&current, count);
            self.store_index(&parent, &index).await?;
            count = index.memories.len();
            current = parent;
        }
        Ok(())
    }
}

impl StoragePort for FilesystemStorage {
    fn memories(&self) -> &dyn MemoryStorage {
        self
    }

    fn indexes(&self) -> &dyn IndexStorage {
        self
    }

    fn categories(&self) -> &dyn CategoryStorage {
        self
    }
}

/// Write `contents` to `target` through a temporary sibling and a rename.
pub(crate) async fn write_atomic(target: &Path, contents: &[u8]) -> StorageResult<()> {
    let dir = target.parent().unwrap_or_else(|| Path::new("."));
    let file_name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp = dir.join(format!(".{file_name}.{}.tmp", Uuid::new_v4()));

    tokio::fs::write(&tmp, contents)
        .await
        .map_err(|e| StorageError::io(&tmp, e))?;
    if let Err(e) = tokio::fs::rename(&tmp, target).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(StorageError::io(target, e));
    }
    Ok(())
}
