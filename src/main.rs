mod commands;
mod output;

use clap::Parser;
use memtree::client::{Memtree, filesystem_factory};
use memtree::config::Config;
use memtree::errors::Error;
use memtree::registry::Registry;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use commands::Commands;
use output::{ErrorResponse, print_json};

/// memtree - A hierarchical memory store for AI agents
#[derive(Parser)]
#[command(name = "memtree", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (default: <config dir>/memtree/config.toml)
    #[arg(long, global = true, env = "MEMTREE_CONFIG")]
    config: Option<PathBuf>,

    /// Store to operate on (default: configured default store)
    #[arg(short, long, global = true)]
    store: Option<String>,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Verbose logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr so --json output stays clean
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("memtree={log_level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(&cli).await {
        Ok(code) => code,
        Err(e) => {
            if cli.json {
                print_json(&ErrorResponse {
                    error: e.to_string(),
                    code: e.code().to_string(),
                });
            } else {
                eprintln!("Error: {e}");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> Result<ExitCode, Error> {
    let config = Config::load(cli.config.as_deref())?;
    let tree = Memtree::new(Registry::from_config(&config), filesystem_factory());
    let store = cli.store.as_deref().unwrap_or(&config.default_store);
    commands::execute(&cli.command, &tree, store, cli.json).await
}
