//! Memory operations: create, get, update, move and remove single records.
//!
//! Each mutation keeps the owning category's index in step through the
//! storage port's incremental index calls.

mod crud;
mod relocate;

use chrono::{DateTime, Utc};
use serde::Serialize;

pub use crud::{create, get, remove, update};
pub use relocate::move_memory;

use crate::path::MemoryPath;

/// Options for [`get`].
#[derive(Debug, Clone, Copy, Default)]
pub struct GetMemoryOptions {
    /// Return expired records instead of failing with `MEMORY_EXPIRED`.
    pub include_expired: bool,
    /// Reference time for the expiry check; defaults to now.
    pub now: Option<DateTime<Utc>>,
}

/// Outcome of [`move_memory`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveResult {
    pub from: MemoryPath,
    pub to: MemoryPath,
}

#[cfg(test)]
mod tests;
