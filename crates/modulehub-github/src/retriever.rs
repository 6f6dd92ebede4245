//! Repository retrieval as seen by the HTTP layer.

use async_trait::async_trait;

use crate::{
    client::GithubClient,
    error::GithubError,
    types::{GithubUser, ListParams, Repository, RepositoryCollection},
};

/// Read access to the repository host.
///
/// `token` is the signed-in user's access token. Where it is optional,
/// `None` means an anonymous lookup.
#[async_trait]
pub trait RepositoryRetriever: Send + Sync {
    /// The account behind an access token; `None` if GitHub rejects it.
    async fn authenticated_user(&self, token: &str) -> Result<Option<GithubUser>, GithubError>;

    /// Repositories visible to the signed-in user.
    async fn authenticated_user_repositories(
        &self,
        token: &str,
        params: &ListParams,
    ) -> Result<RepositoryCollection, GithubError>;

    /// Repositories of a user or organization.
    async fn user_repositories(
        &self,
        owner: &str,
        params: &ListParams,
        token: Option<&str>,
    ) -> Result<RepositoryCollection, GithubError>;

    /// Metadata of `vendor/module`, `None` when the repository does not exist.
    async fn user_repository_metadata(
        &self,
        vendor: &str,
        module: &str,
        token: Option<&str>,
    ) -> Result<Option<Repository>, GithubError>;

    /// Decoded contents of a file at the repository root, `None` when missing.
    async fn repository_file_content(
        &self,
        vendor: &str,
        module: &str,
        path: &str,
    ) -> Result<Option<String>, GithubError>;

    /// Whether the repository ships a `Module` class in a `Module.php` file.
    async fn is_module(
        &self,
        repository: &Repository,
        token: Option<&str>,
    ) -> Result<bool, GithubError>;
}

/// Code search query that finds a module class in a repository.
pub fn module_class_query(full_name: &str) -> String {
    format!("repo:{full_name} \"class Module\" filename:Module.php")
}

#[async_trait]
impl RepositoryRetriever for GithubClient {
    async fn authenticated_user(&self, token: &str) -> Result<Option<GithubUser>, GithubError> {
        GithubClient::authenticated_user(self, token).await
    }

    async fn authenticated_user_repositories(
        &self,
        token: &str,
        params: &ListParams,
    ) -> Result<RepositoryCollection, GithubError> {
        GithubClient::authenticated_user_repositories(self, token, params).await
    }

    async fn user_repositories(
        &self,
        owner: &str,
        params: &ListParams,
        token: Option<&str>,
    ) -> Result<RepositoryCollection, GithubError> {
        GithubClient::user_repositories(self, owner, params, token).await
    }

    async fn user_repository_metadata(
        &self,
        vendor: &str,
        module: &str,
        token: Option<&str>,
    ) -> Result<Option<Repository>, GithubError> {
        self.repository(vendor, module, token).await
    }

    async fn repository_file_content(
        &self,
        vendor: &str,
        module: &str,
        path: &str,
    ) -> Result<Option<String>, GithubError> {
        self.file_content(vendor, module, path, None).await
    }

    async fn is_module(
        &self,
        repository: &Repository,
        token: Option<&str>,
    ) -> Result<bool, GithubError> {
        let total = self
            .code_search_total(&module_class_query(&repository.full_name), token)
            .await?;
        Ok(total > 0)
    }
}
