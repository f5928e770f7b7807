//! Category operations: create, delete, describe, list, prune and reindex.
//!
//! Every function takes the store's [`StoragePort`](crate::storage::StoragePort)
//! and a raw path; the path is parsed here, so invalid input surfaces as
//! `INVALID_PATH` from the first call that needs it.

mod ops;
mod prune;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::path::{CategoryPath, MemoryPath};

pub use ops::{create, delete, list_memories, list_subcategories, set_description};
pub use prune::{prune, reindex};

/// Outcome of [`create`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateCategoryResult {
    pub path: CategoryPath,
    pub created: bool,
}

/// Outcome of [`delete`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteCategoryResult {
    pub path: CategoryPath,
    pub deleted: bool,
}

/// Outcome of [`set_description`]; `None` means the description was cleared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetDescriptionResult {
    pub path: CategoryPath,
    pub description: Option<String>,
}

/// Options for [`list_memories`].
///
/// `include_expired` is accepted for interface compatibility; index entries
/// carry no expiry, so listing never filters.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListMemoriesOptions {
    pub include_expired: bool,
}

/// Options for [`prune`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PruneOptions {
    pub dry_run: bool,
    /// Reference time; defaults to the current time.
    pub now: Option<DateTime<Utc>>,
}

/// A memory removed (or, in dry-run mode, selected) by [`prune`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrunedMemory {
    pub path: MemoryPath,
    pub expires_at: DateTime<Utc>,
}

/// Outcome of [`prune`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PruneResult {
    pub pruned: Vec<PrunedMemory>,
}
