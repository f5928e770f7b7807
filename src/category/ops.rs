use tracing::{debug, info};

use super::{
    CreateCategoryResult, DeleteCategoryResult, ListMemoriesOptions, SetDescriptionResult,
};
use crate::errors::{CategoryError, CategoryErrorCode};
use crate::index::{
    CategoryIndex, CategoryMemoryEntry, MAX_DESCRIPTION_LENGTH, SubcategoryEntry,
    normalize_description,
};
use crate::path::CategoryPath;
use crate::storage::StoragePort;

async fn require_exists(storage: &dyn StoragePort, path: &CategoryPath) -> Result<(), CategoryError> {
    let exists = storage
        .categories()
        .exists(path)
        .await
        .map_err(|e| CategoryError::storage("check category", path.to_string(), e))?;
    if exists {
        Ok(())
    } else {
        Err(CategoryError::new(
            CategoryErrorCode::CategoryNotFound,
            format!("Category '{path}' does not exist"),
        )
        .with_path(path.to_string()))
    }
}

async fn read_index(storage: &dyn StoragePort, path: &CategoryPath) -> Result<CategoryIndex, CategoryError> {
    storage
        .indexes()
        .read(path)
        .await
        .map(Option::unwrap_or_default)
        .map_err(|e| CategoryError::storage("read category index", path.to_string(), e))
}

/// Create a category and any missing ancestors.
///
/// Idempotent: an existing category yields `created: false`. The root
/// cannot be created.
pub async fn create(storage: &dyn StoragePort, raw_path: &str) -> Result<CreateCategoryResult, CategoryError> {
    let path = CategoryPath::parse(raw_path)?;
    if path.is_root() {
        return Err(CategoryError::new(
            CategoryErrorCode::InvalidPath,
            "The root category cannot be created",
        )
        .with_path(raw_path));
    }

    let categories = storage.categories();
    let exists = categories
        .exists(&path)
        .await
        .map_err(|e| CategoryError::storage("check category", path.to_string(), e))?;
    if exists {
        debug!(category = %path, "category already exists");
        return Ok(CreateCategoryResult {
            path,
            created: false,
        });
    }

    categories
        .ensure(&path)
        .await
        .map_err(|e| CategoryError::storage("create category", path.to_string(), e))?;
    info!(category = %path, "category created");
    Ok(CreateCategoryResult {
        path,
        created: true,
    })
}

/// Recursively delete a category and drop it from its parent's index.
///
/// The root and top-level categories are protected.
pub async fn delete(storage: &dyn StoragePort, raw_path: &str) -> Result<DeleteCategoryResult, CategoryError> {
    let path = CategoryPath::parse(raw_path)?;
    if path.depth() <= 1 {
        return Err(CategoryError::new(
            CategoryErrorCode::RootCategoryRejected,
            format!("Top-level category '{path}' cannot be deleted"),
        )
        .with_path(path.to_string()));
    }
    require_exists(storage, &path).await?;

    let categories = storage.categories();
    categories
        .delete(&path)
        .await
        .map_err(|e| CategoryError::storage("delete category", path.to_string(), e))?;
    categories
        .remove_subcategory_entry(&path)
        .await
        .map_err(|e| CategoryError::storage("update parent index", path.to_string(), e))?;

    info!(category = %path, "category deleted");
    Ok(DeleteCategoryResult {
        path,
        deleted: true,
    })
}

/// Set or clear a category's description.
///
/// Whitespace-only text clears it. The description lives on the category's
/// entry in its parent's index.
pub async fn set_description(
    storage: &dyn StoragePort,
    raw_path: &str,
    text: &str,
) -> Result<SetDescriptionResult, CategoryError> {
    let path = CategoryPath::parse(raw_path)?;
    if path.is_root() {
        return Err(CategoryError::new(
            CategoryErrorCode::RootCategoryRejected,
            "The root category has no description",
        )
        .with_path(raw_path));
    }
    require_exists(storage, &path).await?;

    let description = normalize_description(text);
    if let Some(text) = &description {
        let length = text.chars().count();
        if length > MAX_DESCRIPTION_LENGTH {
            return Err(CategoryError::new(
                CategoryErrorCode::DescriptionTooLong,
                format!(
                    "Description is {length} characters; the limit is {MAX_DESCRIPTION_LENGTH}"
                ),
            )
            .with_path(path.to_string()));
        }
    }

    storage
        .categories()
        .update_subcategory_description(&path, description.as_deref())
        .await
        .map_err(|e| CategoryError::storage("update description", path.to_string(), e))?;
    debug!(category = %path, cleared = description.is_none(), "description updated");
    Ok(SetDescriptionResult { path, description })
}

/// Direct memories of a category, from its index.
pub async fn list_memories(
    storage: &dyn StoragePort,
    raw_path: &str,
    _options: ListMemoriesOptions,
) -> Result<Vec<CategoryMemoryEntry>, CategoryError> {
    let path = CategoryPath::parse(raw_path)?;
    Ok(read_index(storage, &path).await?.memories)
}

/// Direct subcategories of a category, from its index.
pub async fn list_subcategories(
    storage: &dyn StoragePort,
    raw_path: &str,
) -> Result<Vec<SubcategoryEntry>, CategoryError> {
    let path = CategoryPath::parse(raw_path)?;
    Ok(read_index(storage, &path).await?.subcategories)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::FilesystemStorage;
    use tempfile::TempDir;

    fn store() -> (TempDir, FilesystemStorage) {
        let dir = TempDir::new().unwrap();
        let storage = FilesystemStorage::new(dir.path());
        (dir, storage)
    }

    #[tokio::test]
    async fn test_create_is_idempotent() {
        let (_dir, storage) = store();
        let first = create(&storage, "/standards").await.unwrap();
        let second = create(&storage, "standards/").await.unwrap();
        assert!(first.created);
        assert!(!second.created);

        let subs = list_subcategories(&storage, "/").await.unwrap();
        assert_eq!(subs.len(), 1);
    }

    #[tokio::test]
    async fn test_create_root_and_bad_paths_rejected() {
        let (_dir, storage) = store();
        for raw in ["/", "", "/!!!"] {
            let err = create(&storage, raw).await.unwrap_err();
            assert_eq!(err.code, CategoryErrorCode::InvalidPath, "{raw:?}");
        }
    }

    #[tokio::test]
    async fn test_create_auto_creates_parents() {
        let (_dir, storage) = store();
        create(&storage, "a/b/c").await.unwrap();
        let subs = list_subcategories(&storage, "a/b").await.unwrap();
        assert_eq!(subs[0].path.to_string(), "a/b/c");
        let created_again = create(&storage, "a/b").await.unwrap();
        assert!(!created_again.created);
    }

    #[tokio::test]
    async fn test_delete_top_level_always_rejected() {
        let (_dir, storage) = store();
        create(&storage, "standards").await.unwrap();
        for raw in ["standards", "missing", "/"] {
            let err = delete(&storage, raw).await.unwrap_err();
            assert_eq!(err.code, CategoryErrorCode::RootCategoryRejected, "{raw:?}");
        }
    }

    #[tokio::test]
    async fn test_delete_nested() {
        let (_dir, storage) = store();
        create(&storage, "standards/rust/old").await.unwrap();

        let result = delete(&storage, "standards/rust").await.unwrap();
        assert!(result.deleted);
        assert!(list_subcategories(&storage, "standards").await.unwrap().is_empty());

        let err = delete(&storage, "standards/rust").await.unwrap_err();
        assert_eq!(err.code, CategoryErrorCode::CategoryNotFound);
    }

    #[tokio::test]
    async fn test_set_description_rules() {
        let (_dir, storage) = store();
        let err = set_description(&storage, "ghost", "x").await.unwrap_err();
        assert_eq!(err.code, CategoryErrorCode::CategoryNotFound);

        create(&storage, "standards").await.unwrap();
        let set = set_description(&storage, "standards", "  Coding standards  ")
            .await
            .unwrap();
        assert_eq!(set.description.as_deref(), Some("Coding standards"));

        let too_long = "x".repeat(MAX_DESCRIPTION_LENGTH + 1);
        let err = set_description(&storage, "standards", &too_long).await.unwrap_err();
        assert_eq!(err.code, CategoryErrorCode::DescriptionTooLong);

        let exact = "y".repeat(MAX_DESCRIPTION_LENGTH);
        assert!(set_description(&storage, "standards", &exact).await.is_ok());

        let cleared = set_description(&storage, "/standards", "").await.unwrap();
        assert_eq!(cleared.description, None);
        let subs = list_subcategories(&storage, "/").await.unwrap();
        assert_eq!(subs[0].description, None);
    }

    #[tokio::test]
    async fn test_list_without_index_is_empty() {
        let (_dir, storage) = store();
        let memories = list_memories(&storage, "nothing/here", ListMemoriesOptions::default())
            .await
            .unwrap();
        assert!(memories.is_empty());
        assert!(list_subcategories(&storage, "nothing").await.unwrap().is_empty());
    }
}
