//! Module model: a registered, installable unit backed by a hosted repository.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A module registered in the catalogue.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Module {
    /// Unique module ID (UUID v7, time-sortable)
    pub id: Uuid,

    /// Module name, equal to the repository name
    pub name: String,

    pub description: Option<String>,

    /// Repository HTML URL; unique across the catalogue
    pub url: String,

    /// Vendor (repository owner login)
    pub owner: String,

    /// Owner avatar
    pub photo_url: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data needed to register (or refresh) a module.
#[derive(Debug, Clone)]
pub struct NewModule {
    pub name: String,
    pub description: Option<String>,
    pub url: String,
    pub owner: String,
    pub photo_url: Option<String>,
}

/// Form posted to `/module/add` and `/module/remove`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RepositoryForm {
    #[validate(length(min = 1, max = 100, message = "Owner is required"))]
    pub owner: String,

    #[validate(length(min = 1, max = 100, message = "Repository is required"))]
    pub repo: String,
}

/// Query string of the public catalogue.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogueQuery {
    pub page: Option<u32>,
    pub query: Option<String>,
}
