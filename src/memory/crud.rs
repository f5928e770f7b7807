//! Create, read, update and remove operations for single memories.

use chrono::Utc;
use tracing::{debug, info};

use super::GetMemoryOptions;
use crate::errors::{MemoryError, MemoryErrorCode, StorageError};
use crate::index::CategoryMemoryEntry;
use crate::memory_types::{Memory, MemoryMetadata, MemoryUpdate};
use crate::path::MemoryPath;
use crate::storage::StoragePort;

pub(crate) fn not_found(path: &MemoryPath) -> MemoryError {
    MemoryError::new(
        MemoryErrorCode::MemoryNotFound,
        format!("Memory '{path}' does not exist"),
    )
    .with_path(path.to_string())
}

/// Read a record, wrapping storage failures.
pub(crate) async fn load(storage: &dyn StoragePort, path: &MemoryPath) -> Result<Option<Memory>, MemoryError> {
    storage
        .memories()
        .read(path)
        .await
        .map_err(|e| MemoryError::storage("read memory", path.to_string(), e))
}

/// Whether a record sits at `path`; corrupted records count as present.
pub(crate) async fn occupied(storage: &dyn StoragePort, path: &MemoryPath) -> Result<bool, MemoryError> {
    match storage.memories().read(path).await {
        Ok(Some(_)) | Err(StorageError::Record { .. }) => Ok(true),
        Ok(None) => Ok(false),
        Err(e) => Err(MemoryError::storage("read memory", path.to_string(), e)),
    }
}

pub(crate) async fn load_existing(storage: &dyn StoragePort, path: &MemoryPath) -> Result<Memory, MemoryError> {
    load(storage, path).await?.ok_or_else(|| not_found(path))
}

/// Persist a record and refresh its entry in the owning category's index.
pub(crate) async fn persist(storage: &dyn StoragePort, memory: &Memory) -> Result<(), MemoryError> {
    let path = memory.path.to_string();
    storage
        .memories()
        .write(memory)
        .await
        .map_err(|e| MemoryError::storage("write memory", path.clone(), e))?;
    storage
        .indexes()
        .update_after_memory_write(&memory.path, CategoryMemoryEntry::from_memory(memory))
        .await
        .map_err(|e| MemoryError::storage("update category index", path, e))
}

#[must_use = "handle the error or the memory may not have been stored"]
/// Create a memory.
///
/// # Errors
///
/// - `INVALID_PATH` if the path does not parse
/// - `INVALID_INPUT` if `metadata.source` is blank
/// - `DESTINATION_EXISTS` if a record already exists at the path
pub async fn create(
    storage: &dyn StoragePort,
    raw_path: &str,
    content: &str,
    metadata: MemoryMetadata,
) -> Result<Memory, MemoryError> {
    let path = MemoryPath::parse(raw_path)?;
    if metadata.source.trim().is_empty() {
        return Err(
            MemoryError::new(MemoryErrorCode::InvalidInput, "Memory source cannot be empty")
                .with_path(path.to_string()),
        );
    }
    if occupied(storage, &path).await? {
        return Err(MemoryError::new(
            MemoryErrorCode::DestinationExists,
            format!("Memory '{path}' already exists"),
        )
        .with_path(path.to_string()));
    }

    let memory = Memory::new(path, content, metadata);
    persist(storage, &memory).await?;
    info!(memory = %memory.path, tokens = memory.token_estimate(), "memory created");
    Ok(memory)
}

#[must_use = "handle the error or results may be lost"]
/// Fetch a memory.
///
/// Expired records fail with `MEMORY_EXPIRED` unless
/// `options.include_expired` is set.
pub async fn get(
    storage: &dyn StoragePort,
    raw_path: &str,
    options: GetMemoryOptions,
) -> Result<Memory, MemoryError> {
    let path = MemoryPath::parse(raw_path)?;
    let memory = load_existing(storage, &path).await?;

    let now = options.now.unwrap_or_else(Utc::now);
    if !options.include_expired && memory.metadata.is_expired(now) {
        return Err(MemoryError::new(
            MemoryErrorCode::MemoryExpired,
            format!("Memory '{path}' has expired"),
        )
        .with_path(path.to_string()));
    }
    Ok(memory)
}

#[must_use = "handle the error or the update may be lost"]
/// Apply a partial update.
///
/// Only supplied fields change; `updated_at` is always refreshed.
///
/// # Errors
///
/// - `INVALID_INPUT` if `changes` supplies no field
/// - `MEMORY_NOT_FOUND` if there is no record at the path
pub async fn update(
    storage: &dyn StoragePort,
    raw_path: &str,
    changes: MemoryUpdate,
) -> Result<Memory, MemoryError> {
    let path = MemoryPath::parse(raw_path)?;
    if changes.is_empty() {
        return Err(
            MemoryError::new(MemoryErrorCode::InvalidInput, "No updates provided")
                .with_path(path.to_string()),
        );
    }
    let mut memory = load_existing(storage, &path).await?;

    if let Some(content) = changes.content {
        memory.content = content;
    }
    if let Some(tags) = changes.tags {
        memory.metadata.tags = tags;
    }
    if let Some(citations) = changes.citations {
        memory.metadata.citations = citations;
    }
    if let Some(expires_at) = changes.expires_at {
        memory.metadata.expires_at = expires_at;
    }
    memory.metadata.updated_at = Some(Utc::now());

    persist(storage, &memory).await?;
    debug!(memory = %memory.path, "memory updated");
    Ok(memory)
}

#[must_use = "handle the error or the memory may still exist"]
/// Delete a memory and drop its index entry.
pub async fn remove(storage: &dyn StoragePort, raw_path: &str) -> Result<MemoryPath, MemoryError> {
    let path = MemoryPath::parse(raw_path)?;
    // corrupted records can still be removed
    if !occupied(storage, &path).await? {
        return Err(not_found(&path));
    }

    storage
        .memories()
        .remove(&path)
        .await
        .map_err(|e| MemoryError::storage("remove memory", path.to_string(), e))?;
    storage
        .indexes()
        .remove_after_memory_delete(&path)
        .await
        .map_err(|e| MemoryError::storage("update category index", path.to_string(), e))?;

    info!(memory = %path, "memory removed");
    Ok(path)
}
