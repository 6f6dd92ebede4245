//! User model. Identities come from GitHub; there are no local passwords.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A signed-in GitHub account.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,

    /// Numeric GitHub account ID
    pub github_id: i64,

    /// GitHub login; doubles as the vendor name of the user's modules
    pub login: String,

    pub avatar_url: Option<String>,

    /// Access token presented at sign-in
    #[serde(skip_serializing)]
    pub github_token: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Form posted to `/user/login`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginForm {
    #[validate(length(min = 1, max = 255, message = "Access token is required"))]
    pub token: String,
}
