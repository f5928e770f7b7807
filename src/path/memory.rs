use std::fmt;

use serde::{Deserialize, Serialize};

use super::category::CategoryPath;
use super::slug::Slug;
use super::{SEPARATOR, normalize};
use crate::errors::PathError;

/// Owning category plus a terminal slug.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MemoryPath {
    category: CategoryPath,
    slug: Slug,
}

impl MemoryPath {
    pub fn new(category: CategoryPath, slug: Slug) -> Self {
        Self { category, slug }
    }

    /// Parse `category/.../slug`. The terminal slug must be non-empty after
    /// normalization.
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        let canonical = normalize(raw);
        let (category, leaf) = match canonical.rfind(SEPARATOR) {
            Some(idx) => (&canonical[..idx], &canonical[idx + 1..]),
            None => ("", canonical.as_str()),
        };
        if leaf.is_empty() {
            return Err(PathError::new(raw, "memory path has no slug"));
        }
        let slug = Slug::parse(leaf).map_err(|e| PathError::new(raw, e.reason))?;
        let category = CategoryPath::parse(category).map_err(|e| PathError::new(raw, e.reason))?;
        Ok(Self { category, slug })
    }

    pub fn category(&self) -> &CategoryPath {
        &self.category
    }

    pub fn slug(&self) -> &Slug {
        &self.slug
    }
}

impl fmt::Display for MemoryPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.category.is_root() {
            write!(f, "{}", self.slug)
        } else {
            write!(f, "{}{SEPARATOR}{}", self.category, self.slug)
        }
    }
}

impl TryFrom<String> for MemoryPath {
    type Error = PathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<MemoryPath> for String {
    fn from(path: MemoryPath) -> Self {
        path.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_memory_path() {
        let path = MemoryPath::parse("standards/Style Guide").unwrap();
        assert_eq!(path.category().to_string(), "standards");
        assert_eq!(path.slug().as_str(), "style-guide");
        assert_eq!(path.to_string(), "standards/style-guide");
    }

    #[test]
    fn test_parse_root_level_memory() {
        let path = MemoryPath::parse("/notes").unwrap();
        assert!(path.category().is_root());
        assert_eq!(path.to_string(), "notes");
    }

    #[test]
    fn test_parse_rejects_empty_slug() {
        assert!(MemoryPath::parse("").is_err());
        assert!(MemoryPath::parse("/").is_err());
        assert!(MemoryPath::parse("standards/!!!").is_err());
    }

    #[test]
    fn test_parse_rejects_bad_category() {
        let err = MemoryPath::parse("!!!/style").unwrap_err();
        assert_eq!(err.path, "!!!/style");
    }
}
