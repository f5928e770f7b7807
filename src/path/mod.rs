//! Canonical path model for categories and memories.
//!
//! Raw strings are first brought into display form with [`normalize`]
//! (never fails), then validated with [`CategoryPath::parse`] or
//! [`MemoryPath::parse`] at the first fallible operation.

mod category;
mod memory;
mod slug;

pub use category::CategoryPath;
pub use memory::MemoryPath;
pub use slug::{Slug, slugify};

/// Separator between path segments.
pub const SEPARATOR: char = '/';

/// Bring a raw path into display form.
///
/// Trims surrounding whitespace, collapses repeated separators, ensures a
/// single leading separator and drops any trailing one. Empty or
/// whitespace-only input maps to the root, `/`.
pub fn normalize(raw: &str) -> String {
    let segments: Vec<&str> = raw
        .trim()
        .split(SEPARATOR)
        .filter(|segment| !segment.is_empty())
        .collect();

    if segments.is_empty() {
        return SEPARATOR.to_string();
    }

    let mut out = String::with_capacity(raw.len() + 1);
    for segment in segments {
        out.push(SEPARATOR);
        out.push_str(segment);
    }
    out
}

/// Join a relative path onto a normalized base and normalize the result.
pub fn join(base: &str, relative: &str) -> String {
    normalize(&format!("{base}{SEPARATOR}{relative}"))
}

/// Drop the last segment of a normalized path.
///
/// Returns `None` at the root.
pub fn parent_of(normalized: &str) -> Option<String> {
    let normalized = normalize(normalized);
    if normalized == "/" {
        return None;
    }
    match normalized.rfind(SEPARATOR) {
        Some(0) | None => Some(SEPARATOR.to_string()),
        Some(idx) => Some(normalized[..idx].to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_root_forms() {
        assert_eq!(normalize(""), "/");
        assert_eq!(normalize("   "), "/");
        assert_eq!(normalize("/"), "/");
        assert_eq!(normalize("////"), "/");
    }

    #[test]
    fn test_normalize_collapses_separators() {
        assert_eq!(normalize("///foo"), "/foo");
        assert_eq!(normalize("foo//bar/"), "/foo/bar");
        assert_eq!(normalize("  /a/b/c/  "), "/a/b/c");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let samples = [
            "",
            "/",
            "a",
            "//a//b//",
            "  spaced / path ",
            "Mixed/Case/Segments/",
            "/!!!/",
            "a/../b",
        ];
        for raw in samples {
            let once = normalize(raw);
            assert_eq!(normalize(&once), once, "not idempotent for {raw:?}");
        }
    }

    #[test]
    fn test_join() {
        assert_eq!(join("/", "///foo"), "/foo");
        assert_eq!(join("/a", "b/c"), "/a/b/c");
        assert_eq!(join("/a", ""), "/a");
    }

    #[test]
    fn test_parent_of() {
        assert_eq!(parent_of("/a/b").as_deref(), Some("/a"));
        assert_eq!(parent_of("/a").as_deref(), Some("/"));
        assert_eq!(parent_of("/"), None);
    }
}
