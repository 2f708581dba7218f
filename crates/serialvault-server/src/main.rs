//! Serial Vault Server
//!
//! Signs device serial assertions and administers the model catalog.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};

use serialvault_core::config::{default_database_path, load_config};
use serialvault_core::tracing_init::init_tracing;
use serialvault_crypto::Ed25519Authority;
use serialvault_server::server::{AppState, build_router};
use serialvault_server::signing::VaultContext;
use serialvault_server::storage::VaultDatabase;

#[derive(Parser, Debug)]
#[command(name = "serialvault")]
#[command(version, about = "Serial Vault - device serial assertion signing service")]
struct Args {
    /// Path to a JSON settings file.
    #[arg(long, env = "SERIALVAULT_CONFIG")]
    config: Option<PathBuf>,

    /// Address to listen on (overrides the settings file).
    #[arg(long)]
    addr: Option<SocketAddr>,

    /// Path to SQLite database file.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Output logs as JSON (for structured log aggregation).
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = load_config(args.config.as_deref())?;
    if let Some(addr) = args.addr {
        config.server.addr = addr;
    }
    if let Some(path) = args.db_path {
        config.server.database_path = Some(path);
    }
    config.server.log_json |= args.log_json;

    init_tracing("serialvault_server=info", config.server.log_json)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        addr = %config.server.addr,
        "Starting serialvault"
    );
    if config.signing.api_keys.is_empty() {
        warn!("No API keys configured; every signing and admin request will be rejected");
    }

    let db_path = match config.server.database_path.clone() {
        Some(path) => path,
        None => default_db_path()?,
    };
    info!(path = %db_path.display(), "Opening vault database");
    let db = VaultDatabase::open(&db_path, config.server.max_connections).await?;

    let vault = VaultContext::new(db, Arc::new(Ed25519Authority), config.signing.clone());
    let app = build_router(AppState::new(vault));

    let listener = tokio::net::TcpListener::bind(config.server.addr).await?;
    info!(addr = %config.server.addr, "Vault listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Received shutdown signal");
            }
        })
        .await?;

    info!("Vault stopped");
    Ok(())
}

fn default_db_path() -> anyhow::Result<PathBuf> {
    if let Some(path) = default_database_path() {
        return Ok(path);
    }
    let home =
        dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Cannot determine home directory"))?;
    Ok(home.join(".serialvault").join("vault.db"))
}
