//! In-memory collaborators and an app builder for handler tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::http::HeaderMap;
use axum::Router;
use chrono::Utc;
use modulehub_common::models::{
    module::{Module, NewModule},
    user::User,
    Page,
};
use modulehub_db::repository::{ModuleMapper, UserStore};
use modulehub_github::{
    types::{GithubUser, Permissions, RepositoryOwner},
    GithubError, ListParams, Repository, RepositoryCollection, RepositoryRetriever,
};
use uuid::Uuid;

use crate::{
    build_router,
    guard::{AuthenticationGuard, Identity},
    AppState, SessionSettings,
};

pub const TEST_SECRET: &str = "test-secret";
pub const TEST_COOKIE: &str = "modulehub_session";

/// A non-fork repository under `owner`.
pub fn repository(owner: &str, name: &str, push: bool) -> Repository {
    Repository {
        id: 1,
        name: name.into(),
        full_name: format!("{owner}/{name}"),
        description: Some(format!("The {name} module")),
        html_url: format!("https://github.com/{owner}/{name}"),
        fork: false,
        owner: RepositoryOwner {
            login: owner.into(),
            avatar_url: Some(format!("https://avatars.example/{owner}")),
        },
        permissions: Some(Permissions {
            admin: push,
            push,
            pull: true,
        }),
        created_at: None,
        updated_at: None,
        pushed_at: None,
        stargazers_count: 0,
        watchers_count: 0,
        forks_count: 0,
    }
}

pub fn identity() -> Identity {
    Identity {
        user_id: Uuid::now_v7(),
        login: "foo".into(),
        avatar_url: None,
        github_token: "gho_test".into(),
    }
}

// ─── Modules ─────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct FakeModules {
    records: Mutex<Vec<Module>>,
    lookups: Mutex<Vec<String>>,
}

impl FakeModules {
    pub fn insert(&self, owner: &str, name: &str) -> Module {
        let now = Utc::now();
        let module = Module {
            id: Uuid::now_v7(),
            name: name.into(),
            description: None,
            url: format!("https://github.com/{owner}/{name}"),
            owner: owner.into(),
            photo_url: None,
            created_at: now,
            updated_at: now,
        };
        self.records.lock().unwrap().push(module.clone());
        module
    }

    /// Names passed to `find_by_name`, in call order.
    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }
}

#[async_trait]
impl ModuleMapper for FakeModules {
    async fn find_by_name(&self, name: &str) -> Result<Option<Module>, sqlx::Error> {
        self.lookups.lock().unwrap().push(name.to_owned());
        Ok(self.records.lock().unwrap().iter().find(|m| m.name == name).cloned())
    }

    async fn find_by_url(&self, url: &str) -> Result<Option<Module>, sqlx::Error> {
        Ok(self.records.lock().unwrap().iter().find(|m| m.url == url).cloned())
    }

    async fn find_by_owner(&self, owner: &str) -> Result<Vec<Module>, sqlx::Error> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|m| m.owner.eq_ignore_ascii_case(owner))
            .cloned()
            .collect())
    }

    async fn upsert(&self, module: &NewModule) -> Result<Module, sqlx::Error> {
        let mut records = self.records.lock().unwrap();
        let now = Utc::now();
        if let Some(existing) = records.iter_mut().find(|m| m.url == module.url) {
            existing.name = module.name.clone();
            existing.description = module.description.clone();
            existing.owner = module.owner.clone();
            existing.photo_url = module.photo_url.clone();
            existing.updated_at = now;
            return Ok(existing.clone());
        }
        let created = Module {
            id: Uuid::now_v7(),
            name: module.name.clone(),
            description: module.description.clone(),
            url: module.url.clone(),
            owner: module.owner.clone(),
            photo_url: module.photo_url.clone(),
            created_at: now,
            updated_at: now,
        };
        records.push(created.clone());
        Ok(created)
    }

    async fn delete(&self, id: Uuid) -> Result<(), sqlx::Error> {
        self.records.lock().unwrap().retain(|m| m.id != id);
        Ok(())
    }

    async fn list(
        &self,
        page: u32,
        per_page: u32,
        query: Option<&str>,
    ) -> Result<Page<Module>, sqlx::Error> {
        let needle = query.map(str::to_lowercase);
        let matching: Vec<Module> = self
            .records
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|m| {
                needle
                    .as_deref()
                    .is_none_or(|n| m.name.to_lowercase().contains(n))
            })
            .cloned()
            .collect();
        let total = matching.len() as i64;
        let items = matching
            .into_iter()
            .skip(Page::<Module>::offset(page, per_page) as usize)
            .take(per_page as usize)
            .collect();
        Ok(Page {
            items,
            page: page.max(1),
            per_page,
            total,
        })
    }

    async fn ping(&self) -> bool {
        true
    }
}

// ─── Users ───────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct FakeUsers {
    records: Mutex<Vec<User>>,
}

#[async_trait]
impl UserStore for FakeUsers {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, sqlx::Error> {
        Ok(self.records.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }

    async fn upsert_github_user(
        &self,
        github_id: i64,
        login: &str,
        avatar_url: Option<&str>,
        github_token: &str,
    ) -> Result<User, sqlx::Error> {
        let mut records = self.records.lock().unwrap();
        let now = Utc::now();
        if let Some(existing) = records.iter_mut().find(|u| u.github_id == github_id) {
            existing.login = login.to_owned();
            existing.avatar_url = avatar_url.map(str::to_owned);
            existing.github_token = github_token.to_owned();
            existing.updated_at = now;
            return Ok(existing.clone());
        }
        let user = User {
            id: Uuid::now_v7(),
            github_id,
            login: login.to_owned(),
            avatar_url: avatar_url.map(str::to_owned),
            github_token: github_token.to_owned(),
            created_at: now,
            updated_at: now,
        };
        records.push(user.clone());
        Ok(user)
    }
}

// ─── GitHub ──────────────────────────────────────────────────────────────────

/// A call received by [`FakeRetriever`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    AuthenticatedUser,
    AuthenticatedUserRepositories { params: ListParams },
    UserRepositories { owner: String, params: ListParams },
    Metadata { vendor: String, module: String },
    FileContent { path: String },
    IsModule { full_name: String },
}

#[derive(Default)]
pub struct FakeRetriever {
    listing: Mutex<RepositoryCollection>,
    repositories: Mutex<HashMap<String, Repository>>,
    modules: Mutex<HashSet<String>>,
    users: Mutex<HashMap<String, GithubUser>>,
    files: Mutex<HashMap<String, String>>,
    broken_files: Mutex<HashSet<String>>,
    calls: Mutex<Vec<Call>>,
}

impl FakeRetriever {
    /// Returned by both listing calls.
    pub fn set_listing(&self, repositories: Vec<Repository>) {
        *self.listing.lock().unwrap() = RepositoryCollection::new(repositories);
    }

    /// Served by the metadata lookup under its full name.
    pub fn put_repository(&self, repository: Repository) {
        self.repositories
            .lock()
            .unwrap()
            .insert(repository.full_name.clone(), repository);
    }

    /// Make `owner/name` pass module detection.
    pub fn mark_module(&self, owner: &str, name: &str) {
        self.modules.lock().unwrap().insert(format!("{owner}/{name}"));
    }

    /// Accept `token` as belonging to `user`.
    pub fn put_user(&self, token: &str, user: GithubUser) {
        self.users.lock().unwrap().insert(token.to_owned(), user);
    }

    pub fn put_file(&self, vendor: &str, module: &str, path: &str, content: &str) {
        self.files
            .lock()
            .unwrap()
            .insert(format!("{vendor}/{module}/{path}"), content.to_owned());
    }

    /// Make fetching `path` fail the way an undecodable file does.
    pub fn break_file(&self, path: &str) {
        self.broken_files.lock().unwrap().insert(path.to_owned());
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl RepositoryRetriever for FakeRetriever {
    async fn authenticated_user(&self, token: &str) -> Result<Option<GithubUser>, GithubError> {
        self.record(Call::AuthenticatedUser);
        Ok(self.users.lock().unwrap().get(token).cloned())
    }

    async fn authenticated_user_repositories(
        &self,
        _token: &str,
        params: &ListParams,
    ) -> Result<RepositoryCollection, GithubError> {
        self.record(Call::AuthenticatedUserRepositories {
            params: params.clone(),
        });
        Ok(self.listing.lock().unwrap().clone())
    }

    async fn user_repositories(
        &self,
        owner: &str,
        params: &ListParams,
        _token: Option<&str>,
    ) -> Result<RepositoryCollection, GithubError> {
        self.record(Call::UserRepositories {
            owner: owner.to_owned(),
            params: params.clone(),
        });
        Ok(self.listing.lock().unwrap().clone())
    }

    async fn user_repository_metadata(
        &self,
        vendor: &str,
        module: &str,
        _token: Option<&str>,
    ) -> Result<Option<Repository>, GithubError> {
        self.record(Call::Metadata {
            vendor: vendor.to_owned(),
            module: module.to_owned(),
        });
        Ok(self
            .repositories
            .lock()
            .unwrap()
            .get(&format!("{vendor}/{module}"))
            .cloned())
    }

    async fn repository_file_content(
        &self,
        vendor: &str,
        module: &str,
        path: &str,
    ) -> Result<Option<String>, GithubError> {
        self.record(Call::FileContent {
            path: path.to_owned(),
        });
        if self.broken_files.lock().unwrap().contains(path) {
            return Err(GithubError::Decode {
                path: format!("/repos/{vendor}/{module}/contents/{path}"),
                reason: "invalid utf-8 sequence".into(),
            });
        }
        Ok(self
            .files
            .lock()
            .unwrap()
            .get(&format!("{vendor}/{module}/{path}"))
            .cloned())
    }

    async fn is_module(
        &self,
        repository: &Repository,
        _token: Option<&str>,
    ) -> Result<bool, GithubError> {
        self.record(Call::IsModule {
            full_name: repository.full_name.clone(),
        });
        Ok(self.modules.lock().unwrap().contains(&repository.full_name))
    }
}

// ─── Guard & app ─────────────────────────────────────────────────────────────

/// Guard that always answers with the same identity.
pub struct FakeGuard(pub Option<Identity>);

#[async_trait]
impl AuthenticationGuard for FakeGuard {
    async fn identity(&self, _headers: &HeaderMap) -> Option<Identity> {
        self.0.clone()
    }
}

pub struct TestApp {
    pub router: Router,
    pub modules: Arc<FakeModules>,
    pub users: Arc<FakeUsers>,
    pub github: Arc<FakeRetriever>,
}

impl TestApp {
    pub fn anonymous() -> Self {
        Self::with_identity(None)
    }

    pub fn signed_in() -> Self {
        Self::with_identity(Some(identity()))
    }

    pub fn with_identity(identity: Option<Identity>) -> Self {
        Self::with_guard(Arc::new(FakeGuard(identity)), Arc::new(FakeUsers::default()))
    }

    pub fn with_guard(guard: Arc<dyn AuthenticationGuard>, users: Arc<FakeUsers>) -> Self {
        let modules = Arc::new(FakeModules::default());
        let github = Arc::new(FakeRetriever::default());
        let state = AppState {
            modules: modules.clone(),
            users: users.clone(),
            github: github.clone(),
            guard,
            sessions: SessionSettings {
                secret: TEST_SECRET.into(),
                ttl_secs: 3600,
                cookie_name: TEST_COOKIE.into(),
                secure: false,
            },
            per_page: 2,
        };

        Self {
            router: build_router(state),
            modules,
            users,
            github,
        }
    }
}
