mod server;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use record_bootstrap::{AppConfig, CliArgs};
use record_store::{
    DocumentStore, InMemoryStore, JsonFileStore, RecordStoreConfig, RecordStoreModule,
};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Record Server - customer records, support tickets and request audit log
#[derive(Parser)]
#[command(name = "record-server")]
#[command(about = "Record Server - customer records, support tickets and request audit log")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port override for HTTP server (overrides config and PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print effective configuration (YAML) and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Keep all collections in memory instead of the data directory
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Validate configuration and exit
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        port: cli.port,
        verbose: cli.verbose,
        mock: cli.mock,
    };

    // Layered config:
    // 1) defaults -> 2) YAML (if provided) -> 3) env (PORT, APP__*) -> 4) CLI overrides
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    if cli.print_config {
        print!("{}", config.to_yaml()?);
        return Ok(());
    }

    let data_dir = config.storage.resolved_data_dir()?;
    let _log_guard = record_bootstrap::init_logging(&config.logging, &data_dir)?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Record Server starting");

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config, &data_dir).await,
        Commands::Check => check_config(&config),
    }
}

fn check_config(config: &AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");
    config.module_config::<RecordStoreConfig>(RecordStoreModule::NAME)?;
    println!("Configuration is valid");
    println!("{}", config.to_yaml()?);
    Ok(())
}

fn build_store(config: &AppConfig, data_dir: &Path) -> Result<Arc<dyn DocumentStore>> {
    if config.storage.in_memory {
        tracing::info!("Mock mode enabled: collections are kept in memory only");
        return Ok(Arc::new(InMemoryStore::new()));
    }

    let store = JsonFileStore::new(data_dir)
        .with_context(|| format!("failed to prepare data directory {}", data_dir.display()))?;
    tracing::info!(data_dir = %store.dir().display(), "Using JSON file storage");
    Ok(Arc::new(store))
}

async fn run_server(config: AppConfig, data_dir: &Path) -> Result<()> {
    tracing::info!("Initializing modules...");

    let module_cfg: RecordStoreConfig = config.module_config(RecordStoreModule::NAME)?;
    let store = build_store(&config, data_dir)?;
    let module = RecordStoreModule::init(store, &module_cfg);

    let router = server::build_router(&module, &config.server);
    server::serve(router, &config.server).await
}
