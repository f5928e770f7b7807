//! Error types for memtree.
//!
//! Operations return `Result<T, CategoryError>` or `Result<T, MemoryError>`;
//! both carry a machine-readable code, a message and the offending path.
//! Storage adapters report [`StorageError`], which the operation layer wraps
//! exactly once.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the CLI and configuration layer.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid date/time.
    #[error("Invalid date/time: {0}")]
    Chrono(#[from] chrono::ParseError),

    /// Category operation failed.
    #[error(transparent)]
    Category(#[from] CategoryError),

    /// Memory operation failed.
    #[error(transparent)]
    Memory(#[from] MemoryError),
}

impl Error {
    /// Machine-readable code used by `--json` error output.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Category(e) => e.code.as_str(),
            Error::Memory(e) => e.code.as_str(),
            Error::Config(_) => "CONFIG_ERROR",
            Error::Chrono(_) => "INVALID_INPUT",
        }
    }
}

/// Path parse failure produced by the path model.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid path '{path}': {reason}")]
pub struct PathError {
    pub path: String,
    pub reason: String,
}

impl PathError {
    pub(crate) fn new(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Kind of corruption found in a persisted memory record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordErrorKind {
    MissingFrontmatter,
    InvalidFrontmatter,
    InvalidTimestamp,
}

impl fmt::Display for RecordErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            RecordErrorKind::MissingFrontmatter => "missing frontmatter",
            RecordErrorKind::InvalidFrontmatter => "invalid frontmatter",
            RecordErrorKind::InvalidTimestamp => "invalid timestamp",
        };
        f.write_str(text)
    }
}

/// Failure raised by a storage port implementation.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Filesystem (or other backend) I/O failure.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A category index exists but cannot be read back.
    #[error("Unreadable index at {path}: {message}")]
    Index { path: PathBuf, message: String },

    /// A memory record exists but is corrupted.
    #[error("Corrupted record at {path} ({kind}): {message}")]
    Record {
        kind: RecordErrorKind,
        path: PathBuf,
        message: String,
    },

    /// Anything else the backend wants to surface.
    #[error("{0}")]
    Other(String),
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StorageError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Machine-readable category error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryErrorCode {
    InvalidPath,
    CategoryNotFound,
    RootCategoryRejected,
    DescriptionTooLong,
    StorageError,
    NotImplemented,
    StoreNotFound,
}

impl CategoryErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryErrorCode::InvalidPath => "INVALID_PATH",
            CategoryErrorCode::CategoryNotFound => "CATEGORY_NOT_FOUND",
            CategoryErrorCode::RootCategoryRejected => "ROOT_CATEGORY_REJECTED",
            CategoryErrorCode::DescriptionTooLong => "DESCRIPTION_TOO_LONG",
            CategoryErrorCode::StorageError => "STORAGE_ERROR",
            CategoryErrorCode::NotImplemented => "NOT_IMPLEMENTED",
            CategoryErrorCode::StoreNotFound => "STORE_NOT_FOUND",
        }
    }
}

impl fmt::Display for CategoryErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of a category operation.
#[derive(Error, Debug)]
#[error("[{code}] {message}")]
pub struct CategoryError {
    pub code: CategoryErrorCode,
    pub message: String,
    pub path: Option<String>,
    #[source]
    pub cause: Option<StorageError>,
}

impl CategoryError {
    pub fn new(code: CategoryErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            path: None,
            cause: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Wrap a storage failure one level as `STORAGE_ERROR`.
    pub fn storage(context: &str, path: impl Into<String>, cause: StorageError) -> Self {
        Self {
            code: CategoryErrorCode::StorageError,
            message: format!("Failed to {context}: {cause}"),
            path: Some(path.into()),
            cause: Some(cause),
        }
    }
}

impl From<PathError> for CategoryError {
    fn from(err: PathError) -> Self {
        CategoryError::new(CategoryErrorCode::InvalidPath, err.to_string()).with_path(err.path)
    }
}

/// Machine-readable memory error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryErrorCode {
    InvalidPath,
    MemoryNotFound,
    MemoryExpired,
    DestinationExists,
    InvalidInput,
    StorageError,
    MissingFrontmatter,
    InvalidFrontmatter,
    InvalidTimestamp,
    StoreNotFound,
}

impl MemoryErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemoryErrorCode::InvalidPath => "INVALID_PATH",
            MemoryErrorCode::MemoryNotFound => "MEMORY_NOT_FOUND",
            MemoryErrorCode::MemoryExpired => "MEMORY_EXPIRED",
            MemoryErrorCode::DestinationExists => "DESTINATION_EXISTS",
            MemoryErrorCode::InvalidInput => "INVALID_INPUT",
            MemoryErrorCode::StorageError => "STORAGE_ERROR",
            MemoryErrorCode::MissingFrontmatter => "MISSING_FRONTMATTER",
            MemoryErrorCode::InvalidFrontmatter => "INVALID_FRONTMATTER",
            MemoryErrorCode::InvalidTimestamp => "INVALID_TIMESTAMP",
            MemoryErrorCode::StoreNotFound => "STORE_NOT_FOUND",
        }
    }
}

impl fmt::Display for MemoryErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of a memory operation.
#[derive(Error, Debug)]
#[error("[{code}] {message}")]
pub struct MemoryError {
    pub code: MemoryErrorCode,
    pub message: String,
    pub path: Option<String>,
    #[source]
    pub cause: Option<StorageError>,
}

impl MemoryError {
    pub fn new(code: MemoryErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            path: None,
            cause: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Wrap a storage failure one level.
    ///
    /// Corrupted records keep their parse-level code; everything else
    /// becomes `STORAGE_ERROR`.
    pub fn storage(context: &str, path: impl Into<String>, cause: StorageError) -> Self {
        let code = match &cause {
            StorageError::Record { kind, .. } => match kind {
                RecordErrorKind::MissingFrontmatter => MemoryErrorCode::MissingFrontmatter,
                RecordErrorKind::InvalidFrontmatter => MemoryErrorCode::InvalidFrontmatter,
                RecordErrorKind::InvalidTimestamp => MemoryErrorCode::InvalidTimestamp,
            },
            _ => MemoryErrorCode::StorageError,
        };
        Self {
            code,
            message: format!("Failed to {context}: {cause}"),
            path: Some(path.into()),
            cause: Some(cause),
        }
    }
}

impl From<PathError> for MemoryError {
    fn from(err: PathError) -> Self {
        MemoryError::new(MemoryErrorCode::InvalidPath, err.to_string()).with_path(err.path)
    }
}
