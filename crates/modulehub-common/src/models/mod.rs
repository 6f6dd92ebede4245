//! Domain models shared between the storage and HTTP layers.

pub mod module;
pub mod user;

use serde::Serialize;

/// A page of results.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

impl<T> Page<T> {
    /// Zero-based row offset of the first item on `page` (pages start at 1).
    pub fn offset(page: u32, per_page: u32) -> i64 {
        i64::from(page.max(1) - 1) * i64::from(per_page)
    }
}
