//! Markdown-with-frontmatter encoding of memory records.

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{RecordErrorKind, StorageError};
use crate::memory_types::{DEFAULT_SOURCE, Memory, MemoryMetadata};
use crate::path::MemoryPath;

const DELIMITER: &str = "---";

#[derive(Debug, Serialize, Deserialize)]
struct Frontmatter {
    created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    updated_at: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default = "default_source")]
    source: String,
    #[serde(default)]
    citations: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expires_at: Option<String>,
}

fn default_source() -> String {
    DEFAULT_SOURCE.to_string()
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn record_error(kind: RecordErrorKind, file: &Path, message: impl Into<String>) -> StorageError {
    StorageError::Record {
        kind,
        path: file.to_path_buf(),
        message: message.into(),
    }
}

fn parse_timestamp(file: &Path, field: &str, value: &str) -> Result<DateTime<Utc>, StorageError> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| {
            record_error(
                RecordErrorKind::InvalidTimestamp,
                file,
                format!("{field} '{value}': {e}"),
            )
        })
}

/// Split `text` into its frontmatter YAML and its body.
fn split_frontmatter<'a>(file: &Path, text: &'a str) -> Result<(&'a str, &'a str), StorageError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let rest = text
        .strip_prefix(DELIMITER)
        .and_then(|r| r.strip_prefix("\r\n").or_else(|| r.strip_prefix('\n')))
        .ok_or_else(|| {
            record_error(
                RecordErrorKind::MissingFrontmatter,
                file,
                "record does not start with '---'",
            )
        })?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end_matches(['\r', '\n']) == DELIMITER {
            let yaml = &rest[..offset];
            let body = &rest[offset + line.len()..];
            let body = body
                .strip_prefix("\r\n")
                .or_else(|| body.strip_prefix('\n'))
                .unwrap_or(body);
            return Ok((yaml, body));
        }
        offset += line.len();
    }

    Err(record_error(
        RecordErrorKind::InvalidFrontmatter,
        file,
        "frontmatter is not terminated by '---'",
    ))
}

/// Decode a record read from `file` into a [`Memory`] at `path`.
pub fn parse_record(path: &MemoryPath, file: &Path, text: &str) -> Result<Memory, StorageError> {
    let (yaml, body) = split_frontmatter(file, text)?;
    let front: Frontmatter = serde_yaml::from_str(yaml)
        .map_err(|e| record_error(RecordErrorKind::InvalidFrontmatter, file, e.to_string()))?;

    let metadata = MemoryMetadata {
        created_at: parse_timestamp(file, "created_at", &front.created_at)?,
        updated_at: front
            .updated_at
            .as_deref()
            .map(|v| parse_timestamp(file, "updated_at", v))
            .transpose()?,
        tags: front.tags,
        source: front.source,
        citations: front.citations,
        expires_at: front
            .expires_at
            .as_deref()
            .map(|v| parse_timestamp(file, "expires_at", v))
            .transpose()?,
    };

    Ok(Memory::new(path.clone(), body, metadata))
}

/// Encode a memory as frontmatter followed by a blank line and the content.
pub fn render_record(memory: &Memory) -> Result<String, StorageError> {
    let meta = &memory.metadata;
    let front = Frontmatter {
        created_at: format_timestamp(&meta.created_at),
        updated_at: meta.updated_at.as_ref().map(format_timestamp),
        tags: meta.tags.clone(),
        source: meta.source.clone(),
        citations: meta.citations.clone(),
        expires_at: meta.expires_at.as_ref().map(format_timestamp),
    };
    let yaml = serde_yaml::to_string(&front)
        .map_err(|e| StorageError::Other(format!("cannot encode frontmatter for {}: {e}", memory.path)))?;
    Ok(format!("{DELIMITER}\n{yaml}{DELIMITER}\n\n{}", memory.content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn path() -> MemoryPath {
        MemoryPath::parse("standards/style").unwrap()
    }

    fn file() -> &'static Path {
        Path::new("/store/standards/style.md")
    }

    fn kind_of(err: StorageError) -> RecordErrorKind {
        match err {
            StorageError::Record { kind, .. } => kind,
            other => panic!("expected record error, got {other:?}"),
        }
    }

    #[test]
    fn test_render_then_parse_preserves_fields() {
        let created = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let expires = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        let memory = Memory::new(
            path(),
            "\nUse rustfmt.\n",
            MemoryMetadata::new(created)
                .with_tags(vec!["rust".into(), "style".into()])
                .with_source("mcp")
                .with_citations(vec!["https://example.com/style".into()])
                .with_expires_at(Some(expires)),
        );

        let text = render_record(&memory).unwrap();
        assert!(text.starts_with("---\n"));
        let parsed = parse_record(&path(), file(), &text).unwrap();
        assert_eq!(parsed, memory);
    }

    #[test]
    fn test_parse_handwritten_record() {
        let text = "---\ncreated_at: 2024-01-02T03:04:05Z\ntags: [a]\nsource: user\n---\n\nBody text\n";
        let memory = parse_record(&path(), file(), text).unwrap();
        assert_eq!(memory.content, "Body text\n");
        assert_eq!(memory.metadata.tags, vec!["a".to_string()]);
        assert!(memory.metadata.citations.is_empty());
        assert!(memory.metadata.expires_at.is_none());
    }

    #[test]
    fn test_missing_frontmatter() {
        let err = parse_record(&path(), file(), "just text").unwrap_err();
        assert_eq!(kind_of(err), RecordErrorKind::MissingFrontmatter);
    }

    #[test]
    fn test_unterminated_frontmatter() {
        let err = parse_record(&path(), file(), "---\ncreated_at: x\nbody").unwrap_err();
        assert_eq!(kind_of(err), RecordErrorKind::InvalidFrontmatter);
    }

    #[test]
    fn test_frontmatter_without_created_at() {
        let err = parse_record(&path(), file(), "---\ntags: []\n---\nbody").unwrap_err();
        assert_eq!(kind_of(err), RecordErrorKind::InvalidFrontmatter);
    }

    #[test]
    fn test_invalid_timestamp() {
        let text = "---\ncreated_at: yesterday\n---\nbody";
        let err = parse_record(&path(), file(), text).unwrap_err();
        assert_eq!(kind_of(err), RecordErrorKind::InvalidTimestamp);
    }
}
