use std::io::ErrorKind;

use async_trait::async_trait;
use tracing::debug;

use super::record::{parse_record, render_record};
use super::{FilesystemStorage, write_atomic};
use crate::errors::{RecordErrorKind, StorageError};
use crate::memory_types::Memory;
use crate::path::MemoryPath;
use crate::storage::{MemoryStorage, StorageResult};

#[async_trait]
impl MemoryStorage for FilesystemStorage {
    async fn read(&self, path: &MemoryPath) -> StorageResult<Option<Memory>> {
        let file = self.memory_file(path);
        let bytes = match tokio::fs::read(&file).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StorageError::io(file, e)),
        };
        match String::from_utf8(bytes) {
            Ok(text) => parse_record(path, &file, &text).map(Some),
            Err(e) => Err(StorageError::Record {
                kind: RecordErrorKind::InvalidFrontmatter,
                path: file,
                message: format!("record is not valid UTF-8: {e}"),
            }),
        }
    }

    async fn write(&self, memory: &Memory) -> StorageResult<()> {
        let dir = self.category_dir(memory.path.category());
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| StorageError::io(&dir, e))?;
        let text = render_record(memory)?;
        write_atomic(&self.memory_file(&memory.path), text.as_bytes()).await?;
        debug!(memory = %memory.path, "memory written");
        Ok(())
    }

    async fn remove(&self, path: &MemoryPath) -> StorageResult<()> {
        let file = self.memory_file(path);
        match tokio::fs::remove_file(&file).await {
            Ok(()) => {
                debug!(memory = %path, "memory removed");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::io(file, e)),
        }
    }

    async fn move_to(&self, from: &MemoryPath, to: &MemoryPath) -> StorageResult<()> {
        let dest_dir = self.category_dir(to.category());
        tokio::fs::create_dir_all(&dest_dir)
            .await
            .map_err(|e| StorageError::io(&dest_dir, e))?;
        let source = self.memory_file(from);
        tokio::fs::rename(&source, self.memory_file(to))
            .await
            .map_err(|e| StorageError::io(source, e))?;
        debug!(from = %from, to = %to, "memory moved");
        Ok(())
    }
}
