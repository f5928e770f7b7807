use std::fmt;

use serde::{Deserialize, Serialize};

use super::slug::{Slug, slugify};
use super::{SEPARATOR, normalize};
use crate::errors::PathError;

/// Ordered sequence of slug segments; the empty sequence is the root.
///
/// The string form joins segments with `/` and has no leading separator;
/// the root's string form is the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CategoryPath {
    segments: Vec<Slug>,
}

impl CategoryPath {
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a raw or canonical path.
    ///
    /// Every segment is slugified. A segment that slugifies to the empty
    /// string is rejected.
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        let canonical = normalize(raw);
        let mut segments = Vec::new();
        for segment in canonical.split(SEPARATOR).filter(|s| !s.is_empty()) {
            if slugify(segment).is_empty() {
                return Err(PathError::new(
                    raw,
                    format!("segment '{segment}' is empty after normalization"),
                ));
            }
            segments.push(Slug::parse(segment)?);
        }
        Ok(Self { segments })
    }

    pub(crate) fn from_segments(segments: Vec<Slug>) -> Self {
        Self { segments }
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    pub fn segments(&self) -> &[Slug] {
        &self.segments
    }

    /// Last segment, `None` at the root.
    pub fn name(&self) -> Option<&Slug> {
        self.segments.last()
    }

    /// Drop the last segment; `None` at the root.
    pub fn parent(&self) -> Option<CategoryPath> {
        if self.is_root() {
            return None;
        }
        let mut segments = self.segments.clone();
        segments.pop();
        Some(Self { segments })
    }

    pub fn child(&self, slug: Slug) -> CategoryPath {
        let mut segments = self.segments.clone();
        segments.push(slug);
        Self { segments }
    }

    /// Root first, then every ancestor down to (and including) `self`.
    pub fn lineage(&self) -> Vec<CategoryPath> {
        (0..=self.segments.len())
            .map(|n| Self::from_segments(self.segments[..n].to_vec()))
            .collect()
    }
}

impl fmt::Display for CategoryPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, "{SEPARATOR}")?;
            }
            f.write_str(segment.as_str())?;
        }
        Ok(())
    }
}

impl TryFrom<String> for CategoryPath {
    type Error = PathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CategoryPath> for String {
    fn from(path: CategoryPath) -> Self {
        path.to_string()
    }
}
