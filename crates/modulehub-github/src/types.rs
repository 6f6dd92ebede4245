//! GitHub wire types.
//!
//! Only the fields ModuleHub reads are modelled; serde ignores the rest.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─── Repositories ────────────────────────────────────────────────────────────

/// Repository metadata as returned by `GET /repos/{owner}/{repo}` and the
/// listing endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    pub id: i64,
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub html_url: String,
    #[serde(default)]
    pub fork: bool,
    pub owner: RepositoryOwner,
    /// Only present when the request was made with a user token.
    #[serde(default)]
    pub permissions: Option<Permissions>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub pushed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub watchers_count: u64,
    #[serde(default)]
    pub forks_count: u64,
}

impl Repository {
    /// Whether the token the repository was fetched with may push to it.
    pub fn can_push(&self) -> bool {
        self.permissions.as_ref().is_some_and(|p| p.push)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryOwner {
    pub login: String,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permissions {
    #[serde(default)]
    pub admin: bool,
    #[serde(default)]
    pub push: bool,
    #[serde(default)]
    pub pull: bool,
}

/// An ordered, countable sequence of repositories from one listing call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RepositoryCollection(Vec<Repository>);

impl RepositoryCollection {
    pub fn new(repositories: Vec<Repository>) -> Self {
        Self(repositories)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Repository> {
        self.0.iter()
    }
}

impl IntoIterator for RepositoryCollection {
    type Item = Repository;
    type IntoIter = std::vec::IntoIter<Repository>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a RepositoryCollection {
    type Item = &'a Repository;
    type IntoIter = std::slice::Iter<'a, Repository>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<Repository> for RepositoryCollection {
    fn from_iter<I: IntoIterator<Item = Repository>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// ─── Listing parameters ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RepositoryType {
    All,
    Owner,
    Public,
    Private,
    Member,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Sort {
    Created,
    Updated,
    Pushed,
    FullName,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Asc,
    Desc,
}

/// Query parameters of the repository listing endpoints. Unset fields are
/// left out of the query string so GitHub applies its own defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ListParams {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<RepositoryType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<Sort>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
}

impl ListParams {
    /// The 100 most recently updated repositories, newest first.
    pub fn most_recently_updated() -> Self {
        Self {
            kind: None,
            per_page: Some(100),
            sort: Some(Sort::Updated),
            direction: Some(Direction::Desc),
        }
    }

    pub fn with_type(mut self, kind: RepositoryType) -> Self {
        self.kind = Some(kind);
        self
    }
}

// ─── Users, contents, search ─────────────────────────────────────────────────

/// The account behind an access token (`GET /user`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GithubUser {
    pub id: i64,
    pub login: String,
    pub avatar_url: Option<String>,
}

/// A file from `GET /repos/{owner}/{repo}/contents/{path}`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ContentFile {
    pub content: Option<String>,
    pub encoding: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CodeSearchResult {
    pub total_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn listing_params_serialize_with_github_names() {
        let params = ListParams::most_recently_updated().with_type(RepositoryType::All);
        assert_eq!(
            serde_json::to_value(&params).unwrap(),
            json!({"type": "all", "per_page": 100, "sort": "updated", "direction": "desc"})
        );
        assert_eq!(
            serde_json::to_value(ListParams::default()).unwrap(),
            json!({})
        );
    }

    #[test]
    fn repository_without_permissions_cannot_be_pushed() {
        let repo: Repository = serde_json::from_value(json!({
            "id": 1,
            "name": "bar",
            "full_name": "foo/bar",
            "description": null,
            "html_url": "https://github.com/foo/bar",
            "owner": {"login": "foo", "avatar_url": null},
            "created_at": "2013-01-05T17:58:47Z",
            "updated_at": null,
            "pushed_at": null
        }))
        .unwrap();

        assert!(!repo.fork);
        assert!(!repo.can_push());
        assert_eq!(repo.stargazers_count, 0);
    }

    #[test]
    fn collection_counts_and_iterates_in_order() {
        let repo = |name: &str| Repository {
            id: 1,
            name: name.into(),
            full_name: format!("foo/{name}"),
            description: None,
            html_url: format!("https://github.com/foo/{name}"),
            fork: false,
            owner: RepositoryOwner {
                login: "foo".into(),
                avatar_url: None,
            },
            permissions: None,
            created_at: None,
            updated_at: None,
            pushed_at: None,
            stargazers_count: 0,
            watchers_count: 0,
            forks_count: 0,
        };

        let collection: RepositoryCollection = vec![repo("a"), repo("b")].into_iter().collect();
        assert_eq!(collection.len(), 2);
        let names: Vec<_> = collection.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert!(RepositoryCollection::default().is_empty());
    }
}
