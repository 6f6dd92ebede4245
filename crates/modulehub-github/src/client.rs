//! GitHub REST client.
//!
//! [`GithubClient`] performs all outbound calls to the GitHub API. Calls made
//! on behalf of a signed-in user carry that user's token; anonymous calls fall
//! back to the optional server token from the config.
//!
//! A `404` from GitHub means "absent" and is returned as `Ok(None)`.
//! Request paths are assembled segment by segment; a `.`, `..` or empty
//! segment is refused before anything is sent.

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use modulehub_common::config::GithubConfig;
use reqwest::{Client, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::{
    error::GithubError,
    types::{
        CodeSearchResult, ContentFile, GithubUser, ListParams, Repository, RepositoryCollection,
    },
};

const ACCEPT: &str = "application/vnd.github+json";
const API_VERSION: &str = "2022-11-28";

// ─── Client ──────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct GithubClient {
    http: Client,
    api_url: Url,
    server_token: Option<String>,
}

impl GithubClient {
    pub fn new(
        api_url: impl AsRef<str>,
        server_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, GithubError> {
        let api_url = Url::parse(api_url.as_ref())?;
        if api_url.cannot_be_a_base() {
            return Err(GithubError::InvalidBaseUrl(api_url.to_string()));
        }

        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("ModuleHub/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            api_url,
            server_token: server_token.filter(|t| !t.is_empty()),
        })
    }

    pub fn from_config(config: &GithubConfig) -> Result<Self, GithubError> {
        Self::new(
            &config.api_url,
            config.token.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    // ── Users ────────────────────────────────────────────────────────────────

    /// Resolve the account behind `token`. A rejected token yields `None`.
    ///
    /// `GET /user`
    pub async fn authenticated_user(&self, token: &str) -> Result<Option<GithubUser>, GithubError> {
        let url = self.endpoint(&["user"])?;
        let Some(resp) = self.get(&url, &(), Some(token)).await? else {
            return Ok(None);
        };
        if resp.status() == StatusCode::UNAUTHORIZED {
            return Ok(None);
        }
        Ok(Some(json(&url, ensure_success(&url, resp)?).await?))
    }

    // ── Repository listings ──────────────────────────────────────────────────

    /// `GET /user/repos`
    pub async fn authenticated_user_repositories(
        &self,
        token: &str,
        params: &ListParams,
    ) -> Result<RepositoryCollection, GithubError> {
        let url = self.endpoint(&["user", "repos"])?;
        self.get_required(&url, params, Some(token)).await
    }

    /// `GET /users/{owner}/repos`
    pub async fn user_repositories(
        &self,
        owner: &str,
        params: &ListParams,
        token: Option<&str>,
    ) -> Result<RepositoryCollection, GithubError> {
        let url = self.endpoint(&["users", owner, "repos"])?;
        self.get_required(&url, params, token).await
    }

    // ── Single repository ────────────────────────────────────────────────────

    /// `GET /repos/{owner}/{repo}`
    pub async fn repository(
        &self,
        owner: &str,
        repo: &str,
        token: Option<&str>,
    ) -> Result<Option<Repository>, GithubError> {
        let url = self.endpoint(&["repos", owner, repo])?;
        self.get_optional(&url, &(), token).await
    }

    /// Decoded contents of a file in the default branch.
    ///
    /// Files GitHub does not inline (directories, symlinks, and blobs over
    /// 1 MB, which come back with `encoding: "none"`) are `None`.
    ///
    /// `GET /repos/{owner}/{repo}/contents/{path}`
    pub async fn file_content(
        &self,
        owner: &str,
        repo: &str,
        file: &str,
        token: Option<&str>,
    ) -> Result<Option<String>, GithubError> {
        let mut segments = vec!["repos", owner, repo, "contents"];
        segments.extend(file.split('/'));
        let url = self.endpoint(&segments)?;

        let entry: Option<ContentFile> = self.get_optional(&url, &(), token).await?;
        let Some(entry) = entry else {
            return Ok(None);
        };
        let Some(content) = entry.content else {
            return Ok(None);
        };
        match entry.encoding.as_deref() {
            None | Some("base64") => decode_content(&url, &content).map(Some),
            Some("none") => {
                debug!("{} is not served inline, treating as absent", url.path());
                Ok(None)
            }
            Some(other) => Err(GithubError::Decode {
                path: url.path().to_owned(),
                reason: format!("unsupported encoding {other:?}"),
            }),
        }
    }

    // ── Search ───────────────────────────────────────────────────────────────

    /// Number of code search hits for `query`.
    ///
    /// `GET /search/code?q=...`
    pub async fn code_search_total(
        &self,
        query: &str,
        token: Option<&str>,
    ) -> Result<u64, GithubError> {
        let url = self.endpoint(&["search", "code"])?;
        let result: CodeSearchResult = self.get_required(&url, &[("q", query)], token).await?;
        Ok(result.total_count)
    }

    // ── Transport ────────────────────────────────────────────────────────────

    /// API URL for `segments`, each appended as one percent-encoded segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, GithubError> {
        if let Some(bad) = segments.iter().find(|s| matches!(**s, "" | "." | "..")) {
            return Err(GithubError::InvalidSegment {
                segment: (*bad).to_owned(),
            });
        }

        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|()| GithubError::InvalidBaseUrl(self.api_url.to_string()))?
            .pop_if_empty()
            .extend(segments.iter().copied());
        Ok(url)
    }

    /// Send a GET request. `None` when GitHub answers 404.
    async fn get<Q: Serialize + ?Sized>(
        &self,
        url: &Url,
        query: &Q,
        token: Option<&str>,
    ) -> Result<Option<Response>, GithubError> {
        debug!("GitHub GET {}", url);

        let mut req = self
            .http
            .get(url.clone())
            .query(query)
            .header(reqwest::header::ACCEPT, ACCEPT)
            .header("X-GitHub-Api-Version", API_VERSION);
        if let Some(token) = token.or(self.server_token.as_deref()) {
            req = req.bearer_auth(token);
        }

        let resp = req.send().await?;
        if resp.status() == StatusCode::NOT_FOUND {
            debug!("GitHub GET {} -> 404", url.path());
            return Ok(None);
        }
        Ok(Some(resp))
    }

    async fn get_optional<T: DeserializeOwned>(
        &self,
        url: &Url,
        query: &(impl Serialize + ?Sized),
        token: Option<&str>,
    ) -> Result<Option<T>, GithubError> {
        match self.get(url, query, token).await? {
            Some(resp) => Ok(Some(json(url, ensure_success(url, resp)?).await?)),
            None => Ok(None),
        }
    }

    /// Like [`Self::get_optional`], but a 404 is an error.
    async fn get_required<T: DeserializeOwned>(
        &self,
        url: &Url,
        query: &(impl Serialize + ?Sized),
        token: Option<&str>,
    ) -> Result<T, GithubError> {
        self.get_optional(url, query, token)
            .await?
            .ok_or_else(|| GithubError::Status {
                status: StatusCode::NOT_FOUND.as_u16(),
                path: url.path().to_owned(),
            })
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn ensure_success(url: &Url, resp: Response) -> Result<Response, GithubError> {
    if resp.status().is_success() {
        Ok(resp)
    } else {
        Err(GithubError::Status {
            status: resp.status().as_u16(),
            path: url.path().to_owned(),
        })
    }
}

async fn json<T: DeserializeOwned>(url: &Url, resp: Response) -> Result<T, GithubError> {
    let body = resp.bytes().await?;
    serde_json::from_slice(&body).map_err(|e| GithubError::Decode {
        path: url.path().to_owned(),
        reason: e.to_string(),
    })
}

/// GitHub wraps base64 content at 60 columns.
fn decode_content(url: &Url, content: &str) -> Result<String, GithubError> {
    let compact: String = content.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = STANDARD.decode(compact).map_err(|e| GithubError::Decode {
        path: url.path().to_owned(),
        reason: e.to_string(),
    })?;
    String::from_utf8(bytes).map_err(|e| GithubError::Decode {
        path: url.path().to_owned(),
        reason: e.to_string(),
    })
}
