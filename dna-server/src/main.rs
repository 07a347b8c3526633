//! dna-server - Deep Narrative Analysis microservice
//!
//! Runs guided interview sessions over HTTP: serves the question bank,
//! scores answer transcripts into a narrative profile, and renders reports.
//! Default port 5740.

use anyhow::{Context, Result};
use clap::Parser;
use dna_common::config::{
    default_config_path, load_bootstrap_config, LoggingConfig, RootFolderInitializer,
    RootFolderResolver,
};
use dna_common::events::EventBus;
use dna_server::{build_router, AppState};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Deep Narrative Analysis server
#[derive(Debug, Parser)]
#[command(name = "dna-server", version, about)]
struct Args {
    /// TOML config file (defaults to <config dir>/dna/dna-server.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Root folder holding dna.db
    #[arg(long, env = "DNA_ROOT_FOLDER")]
    root_folder: Option<PathBuf>,

    /// HTTP port (overrides TOML)
    #[arg(long, env = "DNA_PORT")]
    port: Option<u16>,

    /// Bind address (overrides TOML)
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config is read before tracing exists, so its source is logged after init.
    // An explicit --config that does not exist is fatal.
    let (config, config_path) =
        load_bootstrap_config(args.config.as_deref(), default_config_path())
            .context("Failed to load configuration")?;

    init_tracing(&config.logging)?;

    // Log build identification immediately after tracing init
    info!(
        "Starting Deep Narrative Analysis (dna-server) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    match &config_path {
        Some(path) => info!("Config: {}", path.display()),
        None => warn!("No config file found, using built-in defaults"),
    }

    let root_folder = RootFolderResolver::new("dna-server")
        .with_cli_arg(args.root_folder.clone())
        .with_toml(&config)
        .resolve();
    let initializer = RootFolderInitializer::new(root_folder);
    initializer
        .ensure_directory_exists()
        .context("Failed to initialize root folder")?;

    let db_path = initializer.database_path();
    info!("Database: {}", db_path.display());
    let pool = dna_server::db::init_database_pool(&db_path).await?;
    info!("✓ Database connection established");

    let event_bus = EventBus::new(100);
    let state = AppState::new(pool, event_bus, config.scoring)?;
    let app = build_router(state);

    let bind = args.bind.unwrap_or(config.bind_address);
    let port = args.port.unwrap_or(config.port);
    let listener = tokio::net::TcpListener::bind((bind.as_str(), port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", bind, port))?;
    info!("dna-server listening on http://{}:{}", bind, port);
    info!("Health check: http://{}:{}/health", bind, port);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Stderr logging by default, or append to `logging.file`
fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    match &logging.file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
        }
    }

    Ok(())
}
