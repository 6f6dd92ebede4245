//! # ModuleHub Server
//!
//! Main binary: loads configuration, opens the SQLite catalogue, wires the
//! GitHub client and session guard into the API router, and serves HTTP.

use clap::Parser;
use modulehub_api::{build_router, guard::SessionGuard, AppState, SessionSettings};
use modulehub_db::{
    repository::{SqlModuleMapper, SqlUserStore},
    Database,
};
use modulehub_github::GithubClient;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(name = "modulehub", version, about = "Catalogue of modules hosted on GitHub")]
struct Cli {
    /// Configuration file (defaults to an optional `config.*` in the working directory)
    #[arg(short, long, env = "MODULEHUB_CONFIG")]
    config: Option<PathBuf>,

    /// Do not run database migrations at startup
    #[arg(long)]
    skip_migrations: bool,

    /// Emit logs as JSON lines
    #[arg(long, env = "MODULEHUB_JSON_LOGS")]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = modulehub_common::config::init(cli.config.as_deref())?;

    // Initialize tracing (structured logging)
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "modulehub=debug,tower_http=debug".into());
    if cli.json_logs {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    }

    tracing::info!("Starting ModuleHub v{}", env!("CARGO_PKG_VERSION"));

    let db = Database::connect(config).await?;
    if cli.skip_migrations {
        tracing::warn!("Skipping database migrations");
    } else {
        db.migrate().await?;
    }

    let github = Arc::new(GithubClient::from_config(&config.github)?);
    tracing::info!("GitHub API at {}", config.github.api_url);

    let users = Arc::new(SqlUserStore::new(db.pool.clone()));
    let guard = Arc::new(SessionGuard::new(
        users.clone(),
        config.auth.jwt_secret.clone(),
        config.auth.cookie_name.clone(),
    ));

    let state = AppState {
        modules: Arc::new(SqlModuleMapper::new(db.pool.clone())),
        users,
        github,
        guard,
        sessions: SessionSettings {
            secret: config.auth.jwt_secret.clone(),
            ttl_secs: config.auth.session_ttl_secs,
            cookie_name: config.auth.cookie_name.clone(),
            secure: config.auth.secure_cookie,
        },
        per_page: config.listing.per_page,
    };
    let router = build_router(state);

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);
    tracing::info!("Listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
    }
    tracing::info!("Shutdown signal received");
}
