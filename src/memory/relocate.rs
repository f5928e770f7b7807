//! Moving memories between paths and categories.

use tracing::info;

use super::MoveResult;
use super::crud::{load_existing, occupied};
use crate::errors::{MemoryError, MemoryErrorCode};
use crate::index::CategoryMemoryEntry;
use crate::path::MemoryPath;
use crate::storage::StoragePort;

#[must_use = "handle the error or the memory may not have moved"]
/// Move a memory to a new path, possibly in another category.
///
/// The source entry leaves its category's index and the destination entry
/// joins the destination category's index.
///
/// # Errors
///
/// - `MEMORY_NOT_FOUND` if the source does not exist
/// - `DESTINATION_EXISTS` if the destination is occupied (including when it
///   is the source itself)
pub async fn move_memory(
    storage: &dyn StoragePort,
    raw_from: &str,
    raw_to: &str,
) -> Result<MoveResult, MemoryError> {
    let from = MemoryPath::parse(raw_from)?;
    let to = MemoryPath::parse(raw_to)?;

    let mut memory = load_existing(storage, &from).await?;
    if occupied(storage, &to).await? {
        return Err(MemoryError::new(
            MemoryErrorCode::DestinationExists,
            format!("Memory '{to}' already exists"),
        )
        .with_path(to.to_string()));
    }

    storage
        .memories()
        .move_to(&from, &to)
        .await
        .map_err(|e| MemoryError::storage("move memory", from.to_string(), e))?;
    storage
        .indexes()
        .remove_after_memory_delete(&from)
        .await
        .map_err(|e| MemoryError::storage("update source index", from.to_string(), e))?;

    memory.path = to.clone();
    storage
        .indexes()
        .update_after_memory_write(&to, CategoryMemoryEntry::from_memory(&memory))
        .await
        .map_err(|e| MemoryError::storage("update destination index", to.to_string(), e))?;

    info!(from = %from, to = %to, "memory moved");
    Ok(MoveResult { from, to })
}
