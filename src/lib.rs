//! memtree - A hierarchical memory store for AI agents.
//!
//! Memories are short text records organized into nested categories. Every
//! category keeps an index of its direct children so listings never scan the
//! tree; mutations keep those indexes in step and `reindex` rebuilds them
//! from the stored records.
//!
//! # Example
//!
//! ```no_run
//! use memtree::client::{Memtree, filesystem_factory};
//! use memtree::memory::GetMemoryOptions;
//! use memtree::memory_types::MemoryMetadata;
//! use memtree::registry::{Registry, StoreDefinition};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = Registry::new().with_store(StoreDefinition::new("notes", "/tmp/notes"));
//! let tree = Memtree::new(registry, filesystem_factory());
//!
//! let standards = tree.get_store("notes").root_category().get_category("standards");
//! standards.create().await?;
//!
//! let style = standards.get_memory("style");
//! style.create("Run rustfmt before committing.", MemoryMetadata::default()).await?;
//!
//! let memory = style.get(GetMemoryOptions::default()).await?;
//! println!("{}", memory.content);
//! # Ok(())
//! # }
//! ```
//!
//! # Concurrency
//!
//! There is no locking. Concurrent mutations of one category can lose index
//! updates; `reindex` and a real `prune` touch the whole store.

pub mod category;
pub mod client;
pub mod config;
pub mod errors;
pub mod index;
pub mod memory;
pub mod memory_types;
pub mod path;
pub mod registry;
pub mod storage;

// Re-export public API
pub use client::{CategoryClient, MemoryClient, Memtree, StoreClient, filesystem_factory};
pub use config::Config;
pub use errors::{CategoryError, CategoryErrorCode, Error, MemoryError, MemoryErrorCode};
pub use memory_types::{Memory, MemoryMetadata, MemoryUpdate};
pub use path::{CategoryPath, MemoryPath};
pub use registry::{Registry, StoreDefinition};
pub use storage::{FilesystemStorage, StoragePort};
