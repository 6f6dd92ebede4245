//! GitHub client error types.

use modulehub_common::error::ModuleHubError;
use thiserror::Error;

/// Errors that can occur while talking to GitHub.
#[derive(Debug, Error)]
pub enum GithubError {
    #[error("HTTP error communicating with GitHub: {0}")]
    Http(#[from] reqwest::Error),

    #[error("GitHub returned status {status} for {path}")]
    Status { status: u16, path: String },

    #[error("Could not decode {path}: {reason}")]
    Decode { path: String, reason: String },

    #[error("Refusing path segment {segment:?}")]
    InvalidSegment { segment: String },

    #[error("{0} cannot be used as the API base URL")]
    InvalidBaseUrl(String),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl From<GithubError> for ModuleHubError {
    fn from(e: GithubError) -> Self {
        ModuleHubError::Upstream(e.to_string())
    }
}
