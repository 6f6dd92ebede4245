//! # modulehub-common
//!
//! Shared types, configuration, error handling, and utilities used across all ModuleHub crates.
//! No HTTP routing or storage logic lives here, only primitives and contracts.

pub mod config;
pub mod error;
pub mod models;
pub mod session;
pub mod validation;
