//! Token submission service entry point.
//!
//! Wires configuration, the JSON-RPC ledger client, the shared account
//! context, and the HTTP front end together, then serves until terminated.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use token_service::ledger::HttpLedgerClient;
use token_service::server::{self, AppState};
use token_service::{BatchDispatcher, Config, TokenContext};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    // Environment first: the signing key override is read at config load.
    dotenvy::dotenv().ok();

    info!("🚀 starting token service");
    info!("version: {}", env!("CARGO_PKG_VERSION"));

    info!("loading configuration from: {}", args.config);
    let config =
        Config::from_file(&args.config).with_context(|| format!("loading {}", args.config))?;

    let ledger = Arc::new(HttpLedgerClient::new(&config).context("building ledger client")?);

    let ctx = Arc::new(
        TokenContext::init(&config, ledger.as_ref())
            .await
            .context("initializing account context")?,
    );

    let dispatcher = Arc::new(BatchDispatcher::new(
        Arc::clone(&ctx),
        ledger,
        &config.submission,
    ));
    let state = Arc::new(AppState::new(dispatcher, &config.server));

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.server.bind_addr))?;
    info!("server listening on {}", config.server.bind_addr);

    axum::serve(listener, server::router(state))
        .await
        .context("server error")?;

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
