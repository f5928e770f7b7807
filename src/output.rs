//! JSON response types and formatting for CLI output.

use memtree::index::{CategoryMemoryEntry, SubcategoryEntry};
use memtree::memory_types::Memory;
use serde::Serialize;

/// A memory with its metadata flattened for display.
#[derive(Serialize)]
pub struct MemoryResponse {
    pub path: String,
    pub content: String,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    pub tags: Vec<String>,
    pub source: String,
    pub citations: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
    pub token_estimate: usize,
}

impl From<&Memory> for MemoryResponse {
    fn from(memory: &Memory) -> Self {
        let meta = &memory.metadata;
        Self {
            path: memory.path.to_string(),
            content: memory.content.clone(),
            created_at: meta.created_at.to_rfc3339(),
            updated_at: meta.updated_at.map(|t| t.to_rfc3339()),
            tags: meta.tags.clone(),
            source: meta.source.clone(),
            citations: meta.citations.clone(),
            expires_at: meta.expires_at.map(|t| t.to_rfc3339()),
            token_estimate: memory.token_estimate(),
        }
    }
}

/// Response for a single-path mutation (`add`, `update`, `remove`, ...).
#[derive(Serialize)]
pub struct StatusResponse {
    pub status: String,
    pub path: String,
}

impl StatusResponse {
    pub fn new(status: &str, path: impl Into<String>) -> Self {
        Self {
            status: status.to_string(),
            path: path.into(),
        }
    }
}

/// Response for listing a category.
#[derive(Serialize)]
pub struct ListResponse {
    pub category: String,
    pub subcategories: Vec<SubcategoryEntry>,
    pub memories: Vec<CategoryMemoryEntry>,
}

/// Response for errors.
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

/// Print a value as formatted JSON to stdout.
pub fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Failed to serialize JSON: {e}");
            std::process::exit(1);
        }
    }
}

/// Display form of a category path, `/` for the root.
pub fn display_category(path: &str) -> String {
    if path.is_empty() {
        "/".to_string()
    } else {
        path.to_string()
    }
}
