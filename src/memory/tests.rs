//! Tests for memory operations against the filesystem adapter.

use super::*;
use crate::category;
use crate::errors::MemoryErrorCode;
use crate::memory_types::{MemoryMetadata, MemoryUpdate};
use crate::path::CategoryPath;
use crate::storage::{FilesystemStorage, IndexStorage};
use chrono::{Duration, Utc};
use tempfile::TempDir;

fn store() -> (TempDir, FilesystemStorage) {
    let dir = TempDir::new().unwrap();
    let storage = FilesystemStorage::new(dir.path());
    (dir, storage)
}

async fn entries(storage: &FilesystemStorage, category: &str) -> Vec<String> {
    IndexStorage::read(storage, &CategoryPath::parse(category).unwrap())
        .await
        .unwrap()
        .unwrap_or_default()
        .memories
        .iter()
        .map(|e| e.path.to_string())
        .collect()
}

#[tokio::test]
async fn test_create_and_get() {
    let (dir, storage) = store();
    let metadata = MemoryMetadata::new(Utc::now()).with_tags(vec!["style".to_string()]);
    let created = create(&storage, "standards/style", "Use rustfmt.", metadata)
        .await
        .unwrap();
    assert_eq!(created.path.to_string(), "standards/style");
    assert!(dir.path().join("standards/style.md").exists());

    let memory = get(&storage, "/standards/style/", GetMemoryOptions::default())
        .await
        .unwrap();
    assert_eq!(memory.content, "Use rustfmt.");
    assert_eq!(memory.metadata.tags, vec!["style"]);
    assert_eq!(entries(&storage, "standards").await, vec!["standards/style"]);
}

#[tokio::test]
async fn test_create_existing_fails() {
    let (_dir, storage) = store();
    create(&storage, "notes/a", "one", MemoryMetadata::default())
        .await
        .unwrap();
    let err = create(&storage, "notes/a", "two", MemoryMetadata::default())
        .await
        .unwrap_err();
    assert_eq!(err.code, MemoryErrorCode::DestinationExists);
    assert_eq!(err.path.as_deref(), Some("notes/a"));
}

#[tokio::test]
async fn test_create_rejects_bad_input() {
    let (_dir, storage) = store();
    let err = create(&storage, "notes/!!!", "x", MemoryMetadata::default())
        .await
        .unwrap_err();
    assert_eq!(err.code, MemoryErrorCode::InvalidPath);

    let err = create(
        &storage,
        "notes/a",
        "x",
        MemoryMetadata::default().with_source("  "),
    )
    .await
    .unwrap_err();
    assert_eq!(err.code, MemoryErrorCode::InvalidInput);
}

#[tokio::test]
async fn test_get_missing() {
    let (_dir, storage) = store();
    let err = get(&storage, "notes/ghost", GetMemoryOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.code, MemoryErrorCode::MemoryNotFound);
}

#[tokio::test]
async fn test_get_expired() {
    let (_dir, storage) = store();
    let past = Utc::now() - Duration::hours(1);
    create(
        &storage,
        "notes/old",
        "stale",
        MemoryMetadata::default().with_expires_at(Some(past)),
    )
    .await
    .unwrap();

    let err = get(&storage, "notes/old", GetMemoryOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.code, MemoryErrorCode::MemoryExpired);

    let memory = get(
        &storage,
        "notes/old",
        GetMemoryOptions {
            include_expired: true,
            now: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(memory.content, "stale");

    // evaluated against the supplied clock
    let earlier = GetMemoryOptions {
        include_expired: false,
        now: Some(past - Duration::minutes(1)),
    };
    assert!(get(&storage, "notes/old", earlier).await.is_ok());
}

#[tokio::test]
async fn test_update_partial_fields() {
    let (_dir, storage) = store();
    let expires = Utc::now() + Duration::days(7);
    create(
        &storage,
        "notes/a",
        "original",
        MemoryMetadata::default()
            .with_tags(vec!["keep".to_string()])
            .with_expires_at(Some(expires)),
    )
    .await
    .unwrap();

    let updated = update(
        &storage,
        "notes/a",
        MemoryUpdate {
            content: Some("changed content".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(updated.content, "changed content");
    assert_eq!(updated.metadata.tags, vec!["keep"]);
    assert!(updated.metadata.updated_at.is_some());
    assert_eq!(
        updated.metadata.expires_at.map(|t| t.timestamp_millis()),
        Some(expires.timestamp_millis())
    );

    let index = IndexStorage::read(&storage, &CategoryPath::parse("notes").unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(index.memories[0].token_estimate, 4);
}

#[tokio::test]
async fn test_update_expiry_three_way() {
    let (_dir, storage) = store();
    create(&storage, "notes/a", "x", MemoryMetadata::default())
        .await
        .unwrap();

    let later = Utc::now() + Duration::days(1);
    let set = update(
        &storage,
        "notes/a",
        MemoryUpdate {
            expires_at: Some(Some(later)),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert!(set.metadata.expires_at.is_some());

    let kept = update(
        &storage,
        "notes/a",
        MemoryUpdate {
            tags: Some(vec![]),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert!(kept.metadata.expires_at.is_some());

    let cleared = update(
        &storage,
        "notes/a",
        MemoryUpdate {
            expires_at: Some(None),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(cleared.metadata.expires_at, None);

    let reread = get(&storage, "notes/a", GetMemoryOptions::default())
        .await
        .unwrap();
    assert_eq!(reread.metadata.expires_at, None);
}

#[tokio::test]
async fn test_update_errors() {
    let (_dir, storage) = store();
    let err = update(&storage, "notes/a", MemoryUpdate::default())
        .await
        .unwrap_err();
    assert_eq!(err.code, MemoryErrorCode::InvalidInput);

    let err = update(
        &storage,
        "notes/a",
        MemoryUpdate {
            content: Some("x".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.code, MemoryErrorCode::MemoryNotFound);
}

#[tokio::test]
async fn test_move_across_categories() {
    let (dir, storage) = store();
    create(&storage, "inbox/idea", "move me", MemoryMetadata::default())
        .await
        .unwrap();
    create(&storage, "inbox/other", "stay", MemoryMetadata::default())
        .await
        .unwrap();

    let result = move_memory(&storage, "inbox/idea", "projects/alpha/idea")
        .await
        .unwrap();
    assert_eq!(result.from.to_string(), "inbox/idea");
    assert_eq!(result.to.to_string(), "projects/alpha/idea");

    assert!(!dir.path().join("inbox/idea.md").exists());
    assert_eq!(entries(&storage, "inbox").await, vec!["inbox/other"]);
    assert_eq!(
        entries(&storage, "projects/alpha").await,
        vec!["projects/alpha/idea"]
    );

    let moved = get(&storage, "projects/alpha/idea", GetMemoryOptions::default())
        .await
        .unwrap();
    assert_eq!(moved.content, "move me");
}

#[tokio::test]
async fn test_move_errors() {
    let (_dir, storage) = store();
    let err = move_memory(&storage, "a/missing", "a/target")
        .await
        .unwrap_err();
    assert_eq!(err.code, MemoryErrorCode::MemoryNotFound);

    create(&storage, "a/one", "1", MemoryMetadata::default())
        .await
        .unwrap();
    create(&storage, "a/two", "2", MemoryMetadata::default())
        .await
        .unwrap();
    let err = move_memory(&storage, "a/one", "a/two").await.unwrap_err();
    assert_eq!(err.code, MemoryErrorCode::DestinationExists);

    let err = move_memory(&storage, "a/one", "/a/one").await.unwrap_err();
    assert_eq!(err.code, MemoryErrorCode::DestinationExists);
}

#[tokio::test]
async fn test_remove() {
    let (dir, storage) = store();
    create(&storage, "notes/a", "x", MemoryMetadata::default())
        .await
        .unwrap();

    let removed = remove(&storage, "notes/a").await.unwrap();
    assert_eq!(removed.to_string(), "notes/a");
    assert!(!dir.path().join("notes/a.md").exists());
    assert!(entries(&storage, "notes").await.is_empty());

    let err = remove(&storage, "notes/a").await.unwrap_err();
    assert_eq!(err.code, MemoryErrorCode::MemoryNotFound);
}

#[tokio::test]
async fn test_corrupted_record_codes() {
    let (dir, storage) = store();
    category::create(&storage, "notes").await.unwrap();
    std::fs::write(dir.path().join("notes/plain.md"), "no frontmatter").unwrap();
    std::fs::write(dir.path().join("notes/broken.md"), "---\ntags: [\n").unwrap();
    std::fs::write(
        dir.path().join("notes/badtime.md"),
        "---\ncreated_at: yesterday\nsource: user\n---\nbody",
    )
    .unwrap();

    let cases = [
        ("notes/plain", MemoryErrorCode::MissingFrontmatter),
        ("notes/broken", MemoryErrorCode::InvalidFrontmatter),
        ("notes/badtime", MemoryErrorCode::InvalidTimestamp),
    ];
    for (path, code) in cases {
        let err = get(&storage, path, GetMemoryOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.code, code, "{path}");
    }

    // still removable
    remove(&storage, "notes/plain").await.unwrap();
    assert!(!dir.path().join("notes/plain.md").exists());
}

#[tokio::test]
async fn test_corrupted_destination_counts_as_existing() {
    let (dir, storage) = store();
    create(&storage, "docs/src", "body", MemoryMetadata::default())
        .await
        .unwrap();
    std::fs::write(dir.path().join("docs/x.md"), "garbage").unwrap();

    let err = create(&storage, "docs/x", "new", MemoryMetadata::default())
        .await
        .unwrap_err();
    assert_eq!(err.code, MemoryErrorCode::DestinationExists);

    let err = move_memory(&storage, "docs/src", "docs/x").await.unwrap_err();
    assert_eq!(err.code, MemoryErrorCode::DestinationExists);

    // neither file was touched
    assert_eq!(
        std::fs::read_to_string(dir.path().join("docs/x.md")).unwrap(),
        "garbage"
    );
    assert!(dir.path().join("docs/src.md").exists());
}

#[tokio::test]
async fn test_non_utf8_record_is_corrupted() {
    let (dir, storage) = store();
    category::create(&storage, "docs").await.unwrap();
    std::fs::write(dir.path().join("docs/bin.md"), [0xff, 0xfe, 0x00]).unwrap();

    let err = get(&storage, "docs/bin", GetMemoryOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.code, MemoryErrorCode::InvalidFrontmatter);

    remove(&storage, "docs/bin").await.unwrap();
    assert!(!dir.path().join("docs/bin.md").exists());
}
