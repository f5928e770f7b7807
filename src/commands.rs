//! Command handlers for memtree CLI.

use chrono::{DateTime, Utc};
use memtree::category::{ListMemoriesOptions, PruneOptions};
use memtree::client::{Memtree, StoreClient};
use memtree::errors::Error;
use memtree::memory::GetMemoryOptions;
use memtree::memory_types::{MemoryMetadata, MemoryUpdate};
use std::process::ExitCode;

use crate::output::*;

/// Commands supported by memtree CLI.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Create a memory
    Add {
        /// Memory path, e.g. `standards/rust/style`
        path: String,

        /// Memory text content
        content: String,

        /// Tag (repeatable)
        #[arg(short = 't', long = "tag")]
        tags: Vec<String>,

        /// Where the memory came from
        #[arg(long)]
        source: Option<String>,

        /// Citation (repeatable)
        #[arg(short = 'c', long = "citation")]
        citations: Vec<String>,

        /// Expiry timestamp (RFC 3339)
        #[arg(long)]
        expires_at: Option<String>,
    },
    /// Show a memory
    Get {
        /// Memory path
        path: String,

        /// Show the memory even if it has expired
        #[arg(long)]
        include_expired: bool,
    },
    /// Change fields of a memory
    Update {
        /// Memory path
        path: String,

        /// New content
        #[arg(long)]
        content: Option<String>,

        /// Replace tags (repeatable)
        #[arg(short = 't', long = "tag")]
        tags: Vec<String>,

        /// Remove all tags
        #[arg(long, conflicts_with = "tags")]
        clear_tags: bool,

        /// Replace citations (repeatable)
        #[arg(short = 'c', long = "citation")]
        citations: Vec<String>,

        /// Remove all citations
        #[arg(long, conflicts_with = "citations")]
        clear_citations: bool,

        /// New expiry timestamp (RFC 3339)
        #[arg(long)]
        expires_at: Option<String>,

        /// Remove the expiry
        #[arg(long, conflicts_with = "expires_at")]
        clear_expiry: bool,
    },
    /// Move a memory to another path
    Move {
        /// Current memory path
        from: String,
        /// New memory path
        to: String,
    },
    /// Delete a memory
    Remove {
        /// Memory path
        path: String,
    },
    /// Create a category and its parents
    Mkdir {
        /// Category path
        path: String,
    },
    /// Delete a category and everything in it
    Rmdir {
        /// Category path
        path: String,
    },
    /// Set or clear a category description
    Describe {
        /// Category path
        path: String,
        /// Description text; omit to clear
        text: Option<String>,
    },
    /// List a category's memories and subcategories
    List {
        /// Category path (default: store root)
        #[arg(default_value = "/")]
        path: String,

        /// Accepted for symmetry with `get`; listings are never filtered
        #[arg(long)]
        include_expired: bool,
    },
    /// Delete expired memories across the store
    Prune {
        /// Report what would be deleted without deleting
        #[arg(long)]
        dry_run: bool,
    },
    /// Rebuild every index in the store
    Reindex,
    /// List configured stores
    Stores,
    Version,
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, Error> {
    Ok(DateTime::parse_from_rfc3339(value.trim())?.with_timezone(&Utc))
}

/// `Some(values)` when given, `Some(vec![])` when cleared, `None` otherwise.
fn replacement(values: &[String], clear: bool) -> Option<Vec<String>> {
    if clear {
        Some(Vec::new())
    } else if values.is_empty() {
        None
    } else {
        Some(values.to_vec())
    }
}

/// Execute a CLI command against `store_name`.
pub async fn execute(
    command: &Commands,
    tree: &Memtree,
    store_name: &str,
    json: bool,
) -> Result<ExitCode, Error> {
    let store = tree.get_store(store_name);
    match command {
        Commands::Add {
            path,
            content,
            tags,
            source,
            citations,
            expires_at,
        } => {
            let mut metadata = MemoryMetadata::new(Utc::now())
                .with_tags(tags.clone())
                .with_citations(citations.clone())
                .with_expires_at(expires_at.as_deref().map(parse_timestamp).transpose()?);
            if let Some(source) = source {
                metadata = metadata.with_source(source.as_str());
            }
            handle_add(&store, path, content, metadata, json).await
        }
        Commands::Get {
            path,
            include_expired,
        } => handle_get(&store, path, *include_expired, json).await,
        Commands::Update {
            path,
            content,
            tags,
            clear_tags,
            citations,
            clear_citations,
            expires_at,
            clear_expiry,
        } => {
            let expires_at = match (expires_at, *clear_expiry) {
                (_, true) => Some(None),
                (Some(value), false) => Some(Some(parse_timestamp(value)?)),
                (None, false) => None,
            };
            let changes = MemoryUpdate {
                content: content.clone(),
                tags: replacement(tags, *clear_tags),
                citations: replacement(citations, *clear_citations),
                expires_at,
            };
            handle_update(&store, path, changes, json).await
        }
        Commands::Move { from, to } => handle_move(&store, from, to, json).await,
        Commands::Remove { path } => handle_remove(&store, path, json).await,
        Commands::Mkdir { path } => handle_mkdir(&store, path, json).await,
        Commands::Rmdir { path } => handle_rmdir(&store, path, json).await,
        Commands::Describe { path, text } => {
            handle_describe(&store, path, text.as_deref().unwrap_or(""), json).await
        }
        Commands::List {
            path,
            include_expired,
        } => handle_list(&store, path, *include_expired, json).await,
        Commands::Prune { dry_run } => handle_prune(&store, *dry_run, json).await,
        Commands::Reindex => handle_reindex(&store, json).await,
        Commands::Stores => handle_stores(tree, store_name, json),
        Commands::Version => handle_version(json),
    }
}

async fn handle_add(
    store: &StoreClient,
    path: &str,
    content: &str,
    metadata: MemoryMetadata,
    json: bool,
) -> Result<ExitCode, Error> {
    let memory = store.get_memory(path).create(content, metadata).await?;
    if json {
        print_json(&StatusResponse::new("added", memory.path.to_string()));
    } else {
        println!("Added memory: {}", memory.path);
    }
    Ok(ExitCode::SUCCESS)
}

async fn handle_get(
    store: &StoreClient,
    path: &str,
    include_expired: bool,
    json: bool,
) -> Result<ExitCode, Error> {
    let options = GetMemoryOptions {
        include_expired,
        now: None,
    };
    let memory = store.get_memory(path).get(options).await?;
    if json {
        print_json(&MemoryResponse::from(&memory));
    } else {
        let meta = &memory.metadata;
        println!("Path: {}", memory.path);
        println!("Source: {}", meta.source);
        if !meta.tags.is_empty() {
            println!("Tags: {}", meta.tags.join(", "));
        }
        if !meta.citations.is_empty() {
            println!("Citations: {}", meta.citations.join(", "));
        }
        println!("Created: {}", meta.created_at.to_rfc3339());
        if let Some(updated) = meta.updated_at {
            println!("Updated: {}", updated.to_rfc3339());
        }
        if let Some(expires) = meta.expires_at {
            println!("Expires: {}", expires.to_rfc3339());
        }
        println!();
        println!("{}", memory.content);
    }
    Ok(ExitCode::SUCCESS)
}

async fn handle_update(
    store: &StoreClient,
    path: &str,
    changes: MemoryUpdate,
    json: bool,
) -> Result<ExitCode, Error> {
    let memory = store.get_memory(path).update(changes).await?;
    if json {
        print_json(&StatusResponse::new("updated", memory.path.to_string()));
    } else {
        println!("Updated memory: {}", memory.path);
    }
    Ok(ExitCode::SUCCESS)
}

async fn handle_move(store: &StoreClient, from: &str, to: &str, json: bool) -> Result<ExitCode, Error> {
    let result = store.get_memory(from).move_to(to).await?;
    if json {
        print_json(&result);
    } else {
        println!("Moved memory: {} -> {}", result.from, result.to);
    }
    Ok(ExitCode::SUCCESS)
}

async fn handle_remove(store: &StoreClient, path: &str, json: bool) -> Result<ExitCode, Error> {
    let removed = store.get_memory(path).remove().await?;
    if json {
        print_json(&StatusResponse::new("removed", removed.to_string()));
    } else {
        println!("Removed memory: {removed}");
    }
    Ok(ExitCode::SUCCESS)
}

async fn handle_mkdir(store: &StoreClient, path: &str, json: bool) -> Result<ExitCode, Error> {
    let result = store.get_category(path).create().await?;
    if json {
        print_json(&result);
    } else if result.created {
        println!("Created category: {}", result.path);
    } else {
        println!("Category already exists: {}", result.path);
    }
    Ok(ExitCode::SUCCESS)
}

async fn handle_rmdir(store: &StoreClient, path: &str, json: bool) -> Result<ExitCode, Error> {
    let result = store.get_category(path).delete().await?;
    if json {
        print_json(&result);
    } else {
        println!("Deleted category: {}", result.path);
    }
    Ok(ExitCode::SUCCESS)
}

async fn handle_describe(
    store: &StoreClient,
    path: &str,
    text: &str,
    json: bool,
) -> Result<ExitCode, Error> {
    let result = store.get_category(path).set_description(text).await?;
    if json {
        print_json(&result);
    } else {
        match &result.description {
            Some(description) => println!("{}: {description}", result.path),
            None => println!("Cleared description: {}", result.path),
        }
    }
    Ok(ExitCode::SUCCESS)
}

async fn handle_list(
    store: &StoreClient,
    path: &str,
    include_expired: bool,
    json: bool,
) -> Result<ExitCode, Error> {
    let category = store.get_category(path);
    let subcategories = category.list_subcategories().await?;
    let memories = category
        .list_memories(ListMemoriesOptions { include_expired })
        .await?;

    if json {
        print_json(&ListResponse {
            category: category.raw_path().to_string(),
            subcategories,
            memories,
        });
    } else {
        for sub in &subcategories {
            let name = display_category(&sub.path.to_string());
            match &sub.description {
                Some(description) => {
                    println!("{name}/ ({} memories) - {description}", sub.memory_count)
                }
                None => println!("{name}/ ({} memories)", sub.memory_count),
            }
        }
        for entry in &memories {
            println!("{} (~{} tokens)", entry.path, entry.token_estimate);
        }
    }
    Ok(ExitCode::SUCCESS)
}

async fn handle_prune(store: &StoreClient, dry_run: bool, json: bool) -> Result<ExitCode, Error> {
    let result = store
        .root_category()
        .prune(PruneOptions { dry_run, now: None })
        .await?;
    if json {
        print_json(&result);
    } else {
        let verb = if dry_run { "Would prune" } else { "Pruned" };
        for item in &result.pruned {
            println!("{verb}: {} (expired {})", item.path, item.expires_at.to_rfc3339());
        }
        println!("{verb} {} memories", result.pruned.len());
    }
    Ok(ExitCode::SUCCESS)
}

async fn handle_reindex(store: &StoreClient, json: bool) -> Result<ExitCode, Error> {
    let result = store.root_category().reindex().await?;
    if json {
        print_json(&result);
    } else {
        for warning in &result.warnings {
            println!("warning: {warning}");
        }
        println!("Reindexed store '{}'", store.name());
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_stores(tree: &Memtree, current: &str, json: bool) -> Result<ExitCode, Error> {
    let stores = tree.stores();
    if json {
        print_json(&stores);
    } else {
        for store in &stores {
            let marker = if store.name == current { "*" } else { " " };
            match &store.description {
                Some(description) => println!(
                    "{marker} {} {} - {description}",
                    store.name,
                    store.path.display()
                ),
                None => println!("{marker} {} {}", store.name, store.path.display()),
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_version(json: bool) -> Result<ExitCode, Error> {
    if json {
        print_json(&serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
            "name": env!("CARGO_PKG_NAME")
        }));
    } else {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    }
    Ok(ExitCode::SUCCESS)
}
