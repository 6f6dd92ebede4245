//! # modulehub-github
//!
//! Read-only access to the GitHub REST API: the signed-in user, repository
//! listings, repository metadata, file contents and code search.
//!
//! The HTTP layer only talks to the [`RepositoryRetriever`] trait so the
//! client can be swapped for an in-memory double in tests.

pub mod client;
pub mod error;
pub mod retriever;
pub mod types;

pub use client::GithubClient;
pub use error::GithubError;
pub use retriever::RepositoryRetriever;
pub use types::{ListParams, Repository, RepositoryCollection};
