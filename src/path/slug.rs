//! Slug normalization.

use std::fmt;

use crate::errors::PathError;

/// Lowercase a raw name and collapse every run of non-alphanumeric
/// characters into a single `-`, stripping leading and trailing dashes.
///
/// May return an empty string (e.g. for `"!!!"`).
pub fn slugify(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_dash = false;

    // lowercasing can emit combining marks (e.g. `İ`), so classify afterwards
    for ch in raw.trim().chars().flat_map(char::to_lowercase) {
        if ch.is_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(ch);
        } else {
            pending_dash = true;
        }
    }
    out
}

/// A non-empty, normalized identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Slug(String);

impl Slug {
    /// Slugify `raw`; an empty result is an error.
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        let slug = slugify(raw);
        if slug.is_empty() {
            return Err(PathError::new(raw, "slug is empty after normalization"));
        }
        Ok(Slug(slug))
    }

    /// Wrap a name produced by [`slugify`], normalizing it again if it
    /// is not already slug-shaped.
    pub(crate) fn from_normalized(slug: &str) -> Self {
        Slug(slugify(slug))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
