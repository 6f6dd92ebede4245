//! Module repository: the registered catalogue.

use async_trait::async_trait;
use chrono::Utc;
use modulehub_common::models::{
    module::{Module, NewModule},
    Page,
};
use sqlx::SqlitePool;
use uuid::Uuid;

/// Lookup and persistence of module records.
#[async_trait]
pub trait ModuleMapper: Send + Sync {
    /// Find a module by its name (the repository name, without vendor).
    async fn find_by_name(&self, name: &str) -> Result<Option<Module>, sqlx::Error>;

    /// Find a module by repository URL.
    async fn find_by_url(&self, url: &str) -> Result<Option<Module>, sqlx::Error>;

    /// All modules of one vendor, newest first.
    async fn find_by_owner(&self, owner: &str) -> Result<Vec<Module>, sqlx::Error>;

    /// Insert a module, or refresh the record registered under the same URL.
    async fn upsert(&self, module: &NewModule) -> Result<Module, sqlx::Error>;

    async fn delete(&self, id: Uuid) -> Result<(), sqlx::Error>;

    /// One page of the catalogue, newest first, optionally filtered by name.
    async fn list(
        &self,
        page: u32,
        per_page: u32,
        query: Option<&str>,
    ) -> Result<Page<Module>, sqlx::Error>;

    /// Whether the backing store answers.
    async fn ping(&self) -> bool;
}

/// [`ModuleMapper`] backed by the `modules` table.
#[derive(Clone)]
pub struct SqlModuleMapper {
    pool: SqlitePool,
}

impl SqlModuleMapper {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ModuleMapper for SqlModuleMapper {
    async fn find_by_name(&self, name: &str) -> Result<Option<Module>, sqlx::Error> {
        find_by_name(&self.pool, name).await
    }

    async fn find_by_url(&self, url: &str) -> Result<Option<Module>, sqlx::Error> {
        find_by_url(&self.pool, url).await
    }

    async fn find_by_owner(&self, owner: &str) -> Result<Vec<Module>, sqlx::Error> {
        find_by_owner(&self.pool, owner).await
    }

    async fn upsert(&self, module: &NewModule) -> Result<Module, sqlx::Error> {
        upsert_module(&self.pool, module).await
    }

    async fn delete(&self, id: Uuid) -> Result<(), sqlx::Error> {
        delete_module(&self.pool, id).await
    }

    async fn list(
        &self,
        page: u32,
        per_page: u32,
        query: Option<&str>,
    ) -> Result<Page<Module>, sqlx::Error> {
        list_modules(&self.pool, page, per_page, query).await
    }

    async fn ping(&self) -> bool {
        crate::health_check(&self.pool).await
    }
}

/// Find a module by name. Names are not unique across vendors; the oldest wins.
pub async fn find_by_name(pool: &SqlitePool, name: &str) -> Result<Option<Module>, sqlx::Error> {
    sqlx::query_as::<_, Module>(
        "SELECT * FROM modules WHERE name = ? ORDER BY created_at ASC, id ASC LIMIT 1",
    )
    .bind(name)
    .fetch_optional(pool)
    .await
}

pub async fn find_by_url(pool: &SqlitePool, url: &str) -> Result<Option<Module>, sqlx::Error> {
    sqlx::query_as::<_, Module>("SELECT * FROM modules WHERE url = ?")
        .bind(url)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_owner(pool: &SqlitePool, owner: &str) -> Result<Vec<Module>, sqlx::Error> {
    sqlx::query_as::<_, Module>(
        "SELECT * FROM modules WHERE LOWER(owner) = LOWER(?) ORDER BY created_at DESC, id DESC",
    )
    .bind(owner)
    .fetch_all(pool)
    .await
}

/// Register a module, or refresh its mutable fields if the URL is already known.
pub async fn upsert_module(pool: &SqlitePool, module: &NewModule) -> Result<Module, sqlx::Error> {
    let now = Utc::now();
    sqlx::query_as::<_, Module>(
        r#"
        INSERT INTO modules (id, name, description, url, owner, photo_url, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT (url) DO UPDATE SET
            name = excluded.name,
            description = excluded.description,
            owner = excluded.owner,
            photo_url = excluded.photo_url,
            updated_at = excluded.updated_at
        RETURNING *
        "#,
    )
    .bind(Uuid::now_v7())
    .bind(&module.name)
    .bind(&module.description)
    .bind(&module.url)
    .bind(&module.owner)
    .bind(&module.photo_url)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await
}

pub async fn delete_module(pool: &SqlitePool, id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM modules WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn list_modules(
    pool: &SqlitePool,
    page: u32,
    per_page: u32,
    query: Option<&str>,
) -> Result<Page<Module>, sqlx::Error> {
    // SQLite's LIKE is already case-insensitive for ASCII.
    let pattern = query
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(|q| format!("%{}%", escape_like(q)));

    let (total,): (i64,) = sqlx::query_as(
        r"SELECT COUNT(*) FROM modules WHERE (?1 IS NULL OR name LIKE ?1 ESCAPE '\')",
    )
    .bind(&pattern)
    .fetch_one(pool)
    .await?;

    let items = sqlx::query_as::<_, Module>(
        r"
        SELECT * FROM modules
        WHERE (?1 IS NULL OR name LIKE ?1 ESCAPE '\')
        ORDER BY created_at DESC, id DESC
        LIMIT ?2 OFFSET ?3
        ",
    )
    .bind(&pattern)
    .bind(i64::from(per_page))
    .bind(Page::<Module>::offset(page, per_page))
    .fetch_all(pool)
    .await?;

    Ok(Page {
        items,
        page: page.max(1),
        per_page,
        total,
    })
}

fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
