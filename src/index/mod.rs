//! Category indexes and the rules that keep them consistent.
//!
//! A [`CategoryIndex`] lists the direct children of one category. Storage
//! adapters persist it; this module owns the entry-level rules (upsert,
//! removal, description handling) and, in [`reindex`], the name resolution
//! used when indexes are rebuilt from what is actually stored.

pub mod reindex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::memory_types::Memory;
use crate::path::{CategoryPath, MemoryPath};

/// Maximum description length, in characters, after trimming.
pub const MAX_DESCRIPTION_LENGTH: usize = 500;

/// Index entry for a memory directly inside a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryMemoryEntry {
    pub path: MemoryPath,
    pub token_estimate: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl CategoryMemoryEntry {
    pub fn from_memory(memory: &Memory) -> Self {
        Self {
            path: memory.path.clone(),
            token_estimate: memory.token_estimate(),
            updated_at: memory.metadata.updated_at.or(Some(memory.metadata.created_at)),
        }
    }
}

/// Index entry for a direct subcategory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubcategoryEntry {
    pub path: CategoryPath,
    pub memory_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Denormalized listing of a category's direct children.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryIndex {
    #[serde(default)]
    pub memories: Vec<CategoryMemoryEntry>,
    #[serde(default)]
    pub subcategories: Vec<SubcategoryEntry>,
}

impl CategoryIndex {
    /// Insert or replace the entry with the same path.
    pub fn upsert_memory(&mut self, entry: CategoryMemoryEntry) {
        match self.memories.iter_mut().find(|e| e.path == entry.path) {
            Some(existing) => *existing = entry,
            None => {
                self.memories.push(entry);
                self.memories.sort_by(|a, b| a.path.cmp(&b.path));
            }
        }
    }

    /// Drop a memory entry. Returns whether one was present.
    pub fn remove_memory(&mut self, path: &MemoryPath) -> bool {
        let before = self.memories.len();
        self.memories.retain(|e| &e.path != path);
        self.memories.len() != before
    }

    pub fn subcategory(&self, path: &CategoryPath) -> Option<&SubcategoryEntry> {
        self.subcategories.iter().find(|e| &e.path == path)
    }

    /// Insert a subcategory entry or refresh its memory count, keeping any
    /// existing description.
    pub fn upsert_subcategory(&mut self, path: &CategoryPath, memory_count: usize) {
        match self.subcategories.iter_mut().find(|e| &e.path == path) {
            Some(existing) => existing.memory_count = memory_count,
            None => {
                self.subcategories.push(SubcategoryEntry {
                    path: path.clone(),
                    memory_count,
                    description: None,
                });
                self.subcategories.sort_by(|a, b| a.path.cmp(&b.path));
            }
        }
    }

    /// Set or clear the description of a subcategory entry, creating the
    /// entry when missing.
    pub fn set_description(
        &mut self,
        path: &CategoryPath,
        memory_count: usize,
        description: Option<String>,
    ) {
        if self.subcategory(path).is_none() {
            self.upsert_subcategory(path, memory_count);
        }
        if let Some(entry) = self.subcategories.iter_mut().find(|e| &e.path == path) {
            entry.description = description;
        }
    }

    pub fn remove_subcategory(&mut self, path: &CategoryPath) -> bool {
        let before = self.subcategories.len();
        self.subcategories.retain(|e| &e.path != path);
        self.subcategories.len() != before
    }

    pub fn is_empty(&self) -> bool {
        self.memories.is_empty() && self.subcategories.is_empty()
    }
}

/// Trim a description; empty or whitespace-only text means "absent".
pub fn normalize_description(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(path: &str, tokens: usize) -> CategoryMemoryEntry {
        CategoryMemoryEntry {
            path: MemoryPath::parse(path).unwrap(),
            token_estimate: tokens,
            updated_at: None,
        }
    }

    #[test]
    fn test_upsert_memory_replaces_same_path() {
        let mut index = CategoryIndex::default();
        index.upsert_memory(entry("a/x", 1));
        index.upsert_memory(entry("a/y", 2));
        index.upsert_memory(entry("a/x", 10));

        assert_eq!(index.memories.len(), 2);
        assert_eq!(index.memories[0].token_estimate, 10);
        assert_eq!(index.memories[1].token_estimate, 2);
    }

    #[test]
    fn test_remove_memory() {
        let mut index = CategoryIndex::default();
        index.upsert_memory(entry("a/x", 1));
        assert!(index.remove_memory(&MemoryPath::parse("a/x").unwrap()));
        assert!(!index.remove_memory(&MemoryPath::parse("a/x").unwrap()));
        assert!(index.is_empty());
    }

    #[test]
    fn test_upsert_subcategory_keeps_description() {
        let mut index = CategoryIndex::default();
        let path = CategoryPath::parse("a/b").unwrap();
        index.set_description(&path, 0, Some("docs".to_string()));
        index.upsert_subcategory(&path, 3);

        let sub = index.subcategory(&path).unwrap();
        assert_eq!(sub.memory_count, 3);
        assert_eq!(sub.description.as_deref(), Some("docs"));
        assert_eq!(index.subcategories.len(), 1);
    }

    #[test]
    fn test_set_description_clears() {
        let mut index = CategoryIndex::default();
        let path = CategoryPath::parse("a").unwrap();
        index.set_description(&path, 1, Some("x".to_string()));
        index.set_description(&path, 1, None);
        assert_eq!(index.subcategory(&path).unwrap().description, None);
    }

    #[test]
    fn test_normalize_description() {
        assert_eq!(normalize_description("   "), None);
        assert_eq!(normalize_description(" hi "), Some("hi".to_string()));
    }

    #[test]
    fn test_index_yaml_shape() {
        let mut index = CategoryIndex::default();
        index.upsert_memory(entry("standards/style", 5));
        index.upsert_subcategory(&CategoryPath::parse("standards/rust").unwrap(), 2);

        let yaml = serde_yaml::to_string(&index).unwrap();
        assert!(yaml.contains("path: standards/style"));
        assert!(yaml.contains("token_estimate: 5"));
        assert!(yaml.contains("memory_count: 2"));
        assert!(!yaml.contains("description"));

        let back: CategoryIndex = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, index);
    }
}
