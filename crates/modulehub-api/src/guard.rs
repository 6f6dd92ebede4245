//! Authentication guard: who, if anyone, is behind a request.
//!
//! Signed-in browsers carry a session JWT in a cookie. A missing, expired or
//! forged cookie, or a token whose user no longer exists, all mean the same
//! thing: not authenticated. None of them is an error.

use std::convert::Infallible;
use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::{request::Parts, HeaderMap};
use axum_extra::extract::cookie::CookieJar;
use modulehub_common::session;
use modulehub_db::repository::UserStore;
use uuid::Uuid;

use crate::AppState;

/// The signed-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub login: String,
    pub avatar_url: Option<String>,
    /// GitHub access token used for calls made on the user's behalf
    pub github_token: String,
}

#[async_trait]
pub trait AuthenticationGuard: Send + Sync {
    async fn identity(&self, headers: &HeaderMap) -> Option<Identity>;

    async fn is_authenticated(&self, headers: &HeaderMap) -> bool {
        self.identity(headers).await.is_some()
    }
}

/// Session-cookie guard used in production.
pub struct SessionGuard {
    users: Arc<dyn UserStore>,
    secret: String,
    cookie_name: String,
}

impl SessionGuard {
    pub fn new(users: Arc<dyn UserStore>, secret: impl Into<String>, cookie_name: impl Into<String>) -> Self {
        Self {
            users,
            secret: secret.into(),
            cookie_name: cookie_name.into(),
        }
    }
}

#[async_trait]
impl AuthenticationGuard for SessionGuard {
    async fn identity(&self, headers: &HeaderMap) -> Option<Identity> {
        let jar = CookieJar::from_headers(headers);
        let token = jar.get(&self.cookie_name)?.value().to_owned();

        let claims = match session::validate_token(&token, &self.secret) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::debug!("Rejected session cookie: {e}");
                return None;
            }
        };
        let user_id = claims.user_id()?;

        match self.users.find_by_id(user_id).await {
            Ok(Some(user)) => Some(Identity {
                user_id: user.id,
                login: user.login,
                avatar_url: user.avatar_url,
                github_token: user.github_token,
            }),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("Could not load session user {user_id}: {e}");
                None
            }
        }
    }
}

/// Extractor for the current identity, `None` for anonymous visitors.
/// Never rejects: the handler decides what an anonymous visit means.
pub struct CurrentIdentity(pub Option<Identity>);

impl FromRequestParts<Arc<AppState>> for CurrentIdentity {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(state.guard.identity(&parts.headers).await))
    }
}
