//! Memory record data types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::path::MemoryPath;

/// Source recorded when the caller does not supply one.
pub const DEFAULT_SOURCE: &str = "user";

/// Metadata persisted alongside a memory's content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryMetadata {
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub source: String,
    #[serde(default)]
    pub citations: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl MemoryMetadata {
    /// Fresh metadata stamped with `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            created_at: now,
            updated_at: None,
            tags: Vec::new(),
            source: DEFAULT_SOURCE.to_string(),
            citations: Vec::new(),
            expires_at: None,
        }
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn with_citations(mut self, citations: Vec<String>) -> Self {
        self.citations = citations;
        self
    }

    pub fn with_expires_at(mut self, expires_at: Option<DateTime<Utc>>) -> Self {
        self.expires_at = expires_at;
        self
    }

    /// True when `expires_at` is at or before `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

impl Default for MemoryMetadata {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

/// A single stored text record.
#[derive(Debug, Clone, PartialEq)]
pub struct Memory {
    pub path: MemoryPath,
    pub content: String,
    pub metadata: MemoryMetadata,
}

impl Memory {
    pub fn new(path: MemoryPath, content: impl Into<String>, metadata: MemoryMetadata) -> Self {
        Self {
            path,
            content: content.into(),
            metadata,
        }
    }

    pub fn token_estimate(&self) -> usize {
        estimate_tokens(&self.content)
    }
}

/// Rough token count: one token per four characters, rounded up.
pub fn estimate_tokens(content: &str) -> usize {
    content.chars().count().div_ceil(4)
}

/// Partial update applied by `update`.
///
/// `None` leaves a field untouched. `expires_at` is three-way:
/// `Some(Some(t))` sets it, `Some(None)` clears it, `None` preserves it.
#[derive(Debug, Clone, Default)]
pub struct MemoryUpdate {
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    pub citations: Option<Vec<String>>,
    pub expires_at: Option<Option<DateTime<Utc>>>,
}

impl MemoryUpdate {
    pub fn is_empty(&self) -> bool {
        self.content.is_none()
            && self.tags.is_none()
            && self.citations.is_none()
            && self.expires_at.is_none()
    }
}
