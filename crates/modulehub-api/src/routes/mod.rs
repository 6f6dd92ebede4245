//! Route modules.

pub mod catalogue;
pub mod health;
pub mod modules;
pub mod users;
