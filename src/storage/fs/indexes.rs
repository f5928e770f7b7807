use std::collections::{HashMap, VecDeque};
use std::io::ErrorKind;
use std::path::Path;

use async_trait::async_trait;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{FilesystemStorage, INDEX_FILE_NAME, MEMORY_EXTENSION};
use crate::errors::StorageError;
use crate::index::reindex::{ChildKind, ResolvedName, resolve_names};
use crate::index::{CategoryIndex, CategoryMemoryEntry, SubcategoryEntry};
use crate::memory_types::estimate_tokens;
use crate::path::{CategoryPath, MemoryPath, Slug};
use crate::storage::{IndexStorage, MemoryStorage, ReindexResult, StorageResult};

/// Raw child names of one directory.
#[derive(Debug, Default)]
struct DirChildren {
    /// Memory file stems (without the `.md` extension).
    files: Vec<String>,
    dirs: Vec<String>,
}

/// Canonical children of one category after renaming.
#[derive(Debug, Default)]
struct Listing {
    memories: Vec<Slug>,
    subcategories: Vec<CategoryPath>,
}

fn display(category: &CategoryPath) -> String {
    if category.is_root() {
        "/".to_string()
    } else {
        category.to_string()
    }
}

async fn list_children(dir: &Path, warnings: &mut Vec<String>) -> StorageResult<DirChildren> {
    let mut children = DirChildren::default();
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(children),
        Err(e) => return Err(StorageError::io(dir, e)),
    };

    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| StorageError::io(dir, e))?
    {
        let Ok(name) = entry.file_name().into_string() else {
            warnings.push(format!(
                "skipping non UTF-8 name {:?} in {}",
                entry.file_name(),
                dir.display()
            ));
            continue;
        };
        if name.starts_with('.') || name == INDEX_FILE_NAME {
            continue;
        }
        let file_type = entry
            .file_type()
            .await
            .map_err(|e| StorageError::io(entry.path(), e))?;
        if file_type.is_dir() {
            children.dirs.push(name);
        } else if file_type.is_file() {
            let path = Path::new(&name);
            if path.extension().and_then(|e| e.to_str()) == Some(MEMORY_EXTENSION) {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    children.files.push(stem.to_string());
                }
            }
        }
    }
    Ok(children)
}

/// Rename `from` to `to` through a temporary name so case-only renames work
/// on case-insensitive filesystems. Returns `false` (and leaves `from` in
/// place) when `to` is already taken.
async fn rename_child(from: &Path, to: &Path) -> StorageResult<bool> {
    let dir = from.parent().unwrap_or_else(|| Path::new("."));
    let tmp = dir.join(format!(".reindex-{}.tmp", Uuid::new_v4()));

    tokio::fs::rename(from, &tmp)
        .await
        .map_err(|e| StorageError::io(from, e))?;

    let taken = tokio::fs::try_exists(to)
        .await
        .map_err(|e| StorageError::io(to, e))?;
    let target = if taken { from } else { to };
    tokio::fs::rename(&tmp, target)
        .await
        .map_err(|e| StorageError::io(target, e))?;
    Ok(!taken)
}

impl FilesystemStorage {
    /// Rename children whose on-disk name differs from their slug; returns
    /// the slugs that now resolve to a real entry.
    async fn apply_names(
        &self,
        dir: &Path,
        kind: ChildKind,
        names: Vec<ResolvedName>,
        warnings: &mut Vec<String>,
    ) -> StorageResult<Vec<Slug>> {
        let file_name = |base: &str| match kind {
            ChildKind::Memory => format!("{base}.{MEMORY_EXTENSION}"),
            ChildKind::Category => base.to_string(),
        };

        let mut slugs = Vec::with_capacity(names.len());
        for name in names {
            if name.needs_rename() {
                let from = dir.join(file_name(&name.raw));
                let to = dir.join(file_name(name.slug.as_str()));
                if !rename_child(&from, &to).await? {
                    warnings.push(format!(
                        "cannot rename {kind} '{}' to '{}' in {}: target exists; skipped",
                        name.raw,
                        name.slug,
                        dir.display()
                    ));
                    continue;
                }
                debug!(from = %from.display(), to = %to.display(), "renamed during reindex");
            }
            slugs.push(name.slug);
        }
        Ok(slugs)
    }

    /// Build the index entry for one memory, tolerating corrupted records.
    async fn rebuild_entry(
        &self,
        path: MemoryPath,
        warnings: &mut Vec<String>,
    ) -> StorageResult<Option<CategoryMemoryEntry>> {
        match MemoryStorage::read(self, &path).await {
            Ok(Some(memory)) => Ok(Some(CategoryMemoryEntry::from_memory(&memory))),
            Ok(None) => Ok(None),
            Err(err @ StorageError::Record { .. }) => {
                warnings.push(format!("indexing unparseable memory '{path}': {err}"));
                let file = self.memory_file(&path);
                let bytes = tokio::fs::read(&file)
                    .await
                    .map_err(|e| StorageError::io(&file, e))?;
                Ok(Some(CategoryMemoryEntry {
                    path,
                    token_estimate: estimate_tokens(&String::from_utf8_lossy(&bytes)),
                    updated_at: None,
                }))
            }
            Err(err) => Err(err),
        }
    }

    /// Rebuild every index from the directory tree.
    ///
    /// Top-down pass: resolve slugs per directory, rename non-canonical
    /// children, remember previous descriptions. Bottom-up pass: read every
    /// record and write each directory's index, so subcategory memory counts
    /// are known before their parent is written.
    async fn rebuild_all(&self) -> StorageResult<ReindexResult> {
        tokio::fs::create_dir_all(self.root())
            .await
            .map_err(|e| StorageError::io(self.root(), e))?;

        let mut warnings = Vec::new();
        let mut order: Vec<CategoryPath> = Vec::new();
        let mut listings: HashMap<CategoryPath, Listing> = HashMap::new();
        let mut descriptions: HashMap<CategoryPath, String> = HashMap::new();
        let mut queue = VecDeque::from([CategoryPath::root()]);

        while let Some(category) = queue.pop_front() {
            let dir = self.category_dir(&category);
            let location = display(&category);

            match self.load_index(&category).await {
                Ok(Some(previous)) => {
                    for sub in previous.subcategories {
                        if let Some(description) = sub.description {
                            descriptions.insert(sub.path, description);
                        }
                    }
                }
                Ok(None) => {}
                Err(err) => warnings.push(format!("discarding unreadable index of '{location}': {err}")),
            }

            let children = list_children(&dir, &mut warnings).await?;

            let dirs = resolve_names(&location, ChildKind::Category, &children.dirs);
            warnings.extend(dirs.warnings);
            let dir_slugs = self
                .apply_names(&dir, ChildKind::Category, dirs.names, &mut warnings)
                .await?;

            let files = resolve_names(&location, ChildKind::Memory, &children.files);
            warnings.extend(files.warnings);
            let file_slugs = self
                .apply_names(&dir, ChildKind::Memory, files.names, &mut warnings)
                .await?;

            let subcategories: Vec<CategoryPath> =
                dir_slugs.into_iter().map(|slug| category.child(slug)).collect();
            queue.extend(subcategories.iter().cloned());

            listings.insert(
                category.clone(),
                Listing {
                    memories: file_slugs,
                    subcategories,
                },
            );
            order.push(category);
        }

        let mut counts: HashMap<CategoryPath, usize> = HashMap::new();
        for category in order.iter().rev() {
            let Some(listing) = listings.remove(category) else { continue };
            let mut index = CategoryIndex::default();

            for slug in listing.memories {
                let path = MemoryPath::new(category.clone(), slug);
                if let Some(entry) = self.rebuild_entry(path, &mut warnings).await? {
                    index.memories.push(entry);
                }
            }
            for child in listing.subcategories {
                index.subcategories.push(SubcategoryEntry {
                    memory_count: counts.get(&child).copied().unwrap_or(0),
                    description: descriptions.remove(&child),
                    path: child,
                });
            }
            index.memories.sort_by(|a, b| a.path.cmp(&b.path));
            index.subcategories.sort_by(|a, b| a.path.cmp(&b.path));

            counts.insert(category.clone(), index.memories.len());
            self.store_index(category, &index).await?;
        }

        for warning in &warnings {
            warn!("{warning}");
        }
        info!(
            categories = order.len(),
            warnings = warnings.len(),
            "reindex complete"
        );
        Ok(ReindexResult { warnings })
    }
}

#[async_trait]
impl IndexStorage for FilesystemStorage {
    async fn read(&self, path: &CategoryPath) -> StorageResult<Option<CategoryIndex>> {
        self.load_index(path).await
    }

    async fn write(&self, path: &CategoryPath, index: &CategoryIndex) -> StorageResult<()> {
        self.store_index(path, index).await
    }

    async fn reindex(&self) -> StorageResult<ReindexResult> {
        self.rebuild_all().await
    }

    async fn update_after_memory_write(
        &self,
        path: &MemoryPath,
        entry: CategoryMemoryEntry,
    ) -> StorageResult<()> {
        let category = path.category();
        let mut index = self.load_index(category).await?.unwrap_or_default();
        index.upsert_memory(entry);
        self.store_index(category, &index).await?;
        self.refresh_ancestors(category, index.memories.len()).await
    }

    async fn remove_after_memory_delete(&self, path: &MemoryPath) -> StorageResult<()> {
        let category = path.category();
        let Some(mut index) = self.load_index(category).await? else {
            return Ok(());
        };
        if index.remove_memory(path) {
            self.store_index(category, &index).await?;
            self.refresh_ancestors(category, index.memories.len()).await?;
        }
        Ok(())
    }
}
