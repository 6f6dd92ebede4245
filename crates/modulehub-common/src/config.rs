//! Application configuration loaded from environment variables and config files.
//!
//! Supports `.env` files for development and environment variables for production.
//! Config precedence: env vars > .env file > config.toml > defaults

use serde::Deserialize;
use std::path::Path;
use std::sync::OnceLock;

static CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// Initialize the global configuration from environment.
///
/// `path` overrides the default `config` file lookup (the file stays optional
/// either way). Should be called once at startup.
pub fn init(path: Option<&Path>) -> Result<&'static AppConfig, config::ConfigError> {
    // Load .env file if present (development)
    let _ = dotenvy::dotenv();

    let file = match path {
        Some(p) => config::File::from(p).required(true),
        None => config::File::with_name("config").required(false),
    };

    let cfg = defaults(config::Config::builder())?
        .add_source(file)
        // Environment variables (MODULEHUB__SERVER__PORT, MODULEHUB__GITHUB__TOKEN, etc.)
        .add_source(
            config::Environment::with_prefix("MODULEHUB")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let app_config: AppConfig = cfg.try_deserialize()?;
    app_config.check()?;
    Ok(CONFIG.get_or_init(|| app_config))
}

fn defaults(
    builder: config::ConfigBuilder<config::builder::DefaultState>,
) -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
    builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 8080)?
        .set_default("database.url", "sqlite://modulehub.db?mode=rwc")?
        .set_default("database.max_connections", 5)?
        .set_default("auth.session_ttl_secs", 1_209_600)? // 14 days
        .set_default("auth.cookie_name", "modulehub_session")?
        .set_default("auth.secure_cookie", false)?
        .set_default("github.api_url", "https://api.github.com")?
        .set_default("github.timeout_secs", 30)?
        .set_default("listing.per_page", 15)
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub github: GithubConfig,
    pub listing: ListingConfig,
}

/// Longest accepted session lifetime: one year.
pub const MAX_SESSION_TTL_SECS: u64 = 365 * 24 * 60 * 60;

impl AppConfig {
    /// Reject values that deserialize fine but cannot be used.
    pub fn check(&self) -> Result<(), config::ConfigError> {
        let ttl = self.auth.session_ttl_secs;
        if ttl == 0 || ttl > MAX_SESSION_TTL_SECS {
            return Err(config::ConfigError::Message(format!(
                "auth.session_ttl_secs must be between 1 and {MAX_SESSION_TTL_SECS}, got {ttl}"
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// SQLite connection URL, e.g. `sqlite://modulehub.db?mode=rwc`
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// HS256 signing secret for session tokens
    pub jwt_secret: String,
    /// Session lifetime in seconds
    pub session_ttl_secs: u64,
    /// Name of the cookie carrying the session token
    pub cookie_name: String,
    /// Mark the session cookie `Secure` (serve over HTTPS)
    pub secure_cookie: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GithubConfig {
    /// Base URL of the GitHub REST API. Point it at a GitHub Enterprise host if needed.
    pub api_url: String,
    /// Optional server token used for anonymous lookups (raises the rate limit).
    pub token: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ListingConfig {
    /// Page size of the public module catalogue
    pub per_page: u32,
}
