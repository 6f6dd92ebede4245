//! Repository layer: query functions organized by domain, plus the store
//! traits the HTTP layer depends on.

pub mod modules;
pub mod users;

pub use modules::{ModuleMapper, SqlModuleMapper};
pub use users::{SqlUserStore, UserStore};
