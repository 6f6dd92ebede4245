//! # modulehub-api
//!
//! HTTP layer for ModuleHub: the module controller (list, add, remove, view),
//! GitHub-token sign-in, the public catalogue and a health probe.

pub mod dispatch;
pub mod guard;
pub mod middleware;
pub mod routes;
pub mod service;

#[cfg(test)]
mod testing;

use axum::Router;
use modulehub_db::repository::{ModuleMapper, UserStore};
use modulehub_github::RepositoryRetriever;
use std::sync::Arc;

use crate::guard::AuthenticationGuard;
use crate::service::ModuleService;

/// How session cookies are issued.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub secret: String,
    pub ttl_secs: u64,
    pub cookie_name: String,
    /// Mark the cookie `Secure`
    pub secure: bool,
}

/// Shared application state available to all route handlers.
#[derive(Clone)]
pub struct AppState {
    /// Registered module records.
    pub modules: Arc<dyn ModuleMapper>,
    /// Signed-in GitHub accounts.
    pub users: Arc<dyn UserStore>,
    /// Repository host (GitHub).
    pub github: Arc<dyn RepositoryRetriever>,
    /// Decides whether a request is authenticated.
    pub guard: Arc<dyn AuthenticationGuard>,
    pub sessions: SessionSettings,
    /// Page size of the public catalogue.
    pub per_page: u32,
}

impl AppState {
    pub fn module_service(&self) -> ModuleService<'_> {
        ModuleService::new(self.modules.as_ref(), self.github.as_ref())
    }
}

/// Build the complete router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::catalogue::router())
        .merge(routes::health::router())
        .merge(routes::users::router())
        .merge(routes::modules::router())
        .layer(axum::middleware::from_fn(middleware::security_headers))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}
