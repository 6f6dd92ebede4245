//! User repository: GitHub accounts that have signed in.

use async_trait::async_trait;
use chrono::Utc;
use modulehub_common::models::user::User;
use sqlx::SqlitePool;
use uuid::Uuid;

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, sqlx::Error>;

    /// Create the account on first sign-in, otherwise refresh login, avatar and token.
    async fn upsert_github_user(
        &self,
        github_id: i64,
        login: &str,
        avatar_url: Option<&str>,
        github_token: &str,
    ) -> Result<User, sqlx::Error>;
}

/// [`UserStore`] backed by the `users` table.
#[derive(Clone)]
pub struct SqlUserStore {
    pool: SqlitePool,
}

impl SqlUserStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for SqlUserStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, sqlx::Error> {
        find_by_id(&self.pool, id).await
    }

    async fn upsert_github_user(
        &self,
        github_id: i64,
        login: &str,
        avatar_url: Option<&str>,
        github_token: &str,
    ) -> Result<User, sqlx::Error> {
        upsert_github_user(&self.pool, github_id, login, avatar_url, github_token).await
    }
}

/// Find a user by their unique ID.
pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn upsert_github_user(
    pool: &SqlitePool,
    github_id: i64,
    login: &str,
    avatar_url: Option<&str>,
    github_token: &str,
) -> Result<User, sqlx::Error> {
    let now = Utc::now();
    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (id, github_id, login, avatar_url, github_token, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT (github_id) DO UPDATE SET
            login = excluded.login,
            avatar_url = excluded.avatar_url,
            github_token = excluded.github_token,
            updated_at = excluded.updated_at
        RETURNING *
        "#,
    )
    .bind(Uuid::now_v7())
    .bind(github_id)
    .bind(login)
    .bind(avatar_url)
    .bind(github_token)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await
}
