//! Module controller: list a user's candidate repositories, add and remove
//! modules, and show a registered module.
//!
//! Everything except `view` requires a signed-in user; anonymous visitors
//! are sent to the sign-in page with a `302`, whatever they asked for.

use axum::{
    extract::{rejection::FormRejection, Path, State},
    routing::get,
    Form, Json, Router,
};
use modulehub_common::{
    error::{ModuleHubError, ModuleHubResult},
    models::module::{Module, RepositoryForm},
    validation::{validate_repository_segment, validate_request},
};
use modulehub_github::{types::RepositoryType, ListParams, Repository, RepositoryRetriever};
use serde::Serialize;
use std::sync::Arc;

use crate::{
    dispatch::{self, not_found_body, Dispatched, USER_ROUTE},
    guard::{CurrentIdentity, Identity},
    AppState,
};

pub const CONTROLLER: &str = "modules::index";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Index,
    Organization,
    Add,
    Remove,
    View,
    NotFound,
}

impl Action {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Index => "index",
            Self::Organization => "organization",
            Self::Add => "add",
            Self::Remove => "remove",
            Self::View => "view",
            Self::NotFound => "not-found",
        }
    }
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/module", get(index))
        .route("/module/list/{owner}", get(organization))
        .route("/module/add", get(add_form).post(add))
        .route("/module/remove", get(remove_form).post(remove))
        .route("/{vendor}/{module}", get(view))
}

fn dispatched(action: Action, response: impl axum::response::IntoResponse) -> Dispatched {
    Dispatched::new(CONTROLLER, action.as_str(), response)
}

fn tagged(action: Action, result: ModuleHubResult<Dispatched>) -> Dispatched {
    dispatch::tagged(CONTROLLER, action.as_str(), result)
}

fn login_required(action: Action) -> Dispatched {
    Dispatched::redirect_to_login(CONTROLLER, action.as_str())
}

// ─── Views ───────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct RepositoryListView {
    #[serde(skip_serializing_if = "Option::is_none")]
    owner: Option<String>,
    repositories: Vec<Repository>,
}

#[derive(Serialize)]
struct FormView {
    action: &'static str,
    method: &'static str,
    fields: [&'static str; 2],
}

#[derive(Serialize)]
struct ModuleView {
    vendor: String,
    module: String,
    record: Module,
    repository: Repository,
    readme: Option<String>,
    license: Option<String>,
    composer: Option<serde_json::Value>,
}

// ─── Listing ─────────────────────────────────────────────────────────────────

/// GET /module: the signed-in user's repositories that could be registered.
async fn index(
    State(state): State<Arc<AppState>>,
    CurrentIdentity(identity): CurrentIdentity,
) -> Dispatched {
    let Some(identity) = identity else {
        return login_required(Action::Index);
    };
    tagged(Action::Index, own_candidates(&state, &identity).await)
}

async fn own_candidates(state: &AppState, identity: &Identity) -> ModuleHubResult<Dispatched> {
    let params = ListParams::most_recently_updated().with_type(RepositoryType::All);
    let repositories = state
        .github
        .authenticated_user_repositories(&identity.github_token, &params)
        .await?;
    let repositories = state
        .module_service()
        .candidates(repositories, &identity.github_token)
        .await?;

    Ok(dispatched(
        Action::Index,
        Json(RepositoryListView {
            owner: None,
            repositories,
        }),
    ))
}

/// GET /module/list/{owner}: same, for a user or organization.
async fn organization(
    State(state): State<Arc<AppState>>,
    CurrentIdentity(identity): CurrentIdentity,
    Path(owner): Path<String>,
) -> Dispatched {
    let Some(identity) = identity else {
        return login_required(Action::Organization);
    };
    tagged(
        Action::Organization,
        owner_candidates(&state, &identity, owner).await,
    )
}

async fn owner_candidates(
    state: &AppState,
    identity: &Identity,
    owner: String,
) -> ModuleHubResult<Dispatched> {
    validate_repository_segment(&owner)?;

    let repositories = state
        .github
        .user_repositories(
            &owner,
            &ListParams::most_recently_updated(),
            Some(&identity.github_token),
        )
        .await?;
    let repositories = state
        .module_service()
        .candidates(repositories, &identity.github_token)
        .await?;

    Ok(dispatched(
        Action::Organization,
        Json(RepositoryListView {
            owner: Some(owner),
            repositories,
        }),
    ))
}

// ─── Add / remove ────────────────────────────────────────────────────────────

/// GET /module/add
async fn add_form(CurrentIdentity(identity): CurrentIdentity) -> Dispatched {
    if identity.is_none() {
        return login_required(Action::Add);
    }
    dispatched(
        Action::Add,
        Json(FormView {
            action: "/module/add",
            method: "POST",
            fields: ["owner", "repo"],
        }),
    )
}

/// POST /module/add: register `owner/repo`, then back to the user page.
async fn add(
    State(state): State<Arc<AppState>>,
    CurrentIdentity(identity): CurrentIdentity,
    form: Result<Form<RepositoryForm>, FormRejection>,
) -> Dispatched {
    let Some(identity) = identity else {
        return login_required(Action::Add);
    };
    let result = async {
        let form = repository_form(form)?;
        state
            .module_service()
            .register(&form.owner, &form.repo, &identity.github_token)
            .await?;
        Ok::<_, ModuleHubError>(Dispatched::redirect(
            CONTROLLER,
            Action::Add.as_str(),
            USER_ROUTE,
        ))
    }
    .await;
    tagged(Action::Add, result)
}

/// GET /module/remove
async fn remove_form(CurrentIdentity(identity): CurrentIdentity) -> Dispatched {
    if identity.is_none() {
        return login_required(Action::Remove);
    }
    dispatched(
        Action::Remove,
        Json(FormView {
            action: "/module/remove",
            method: "POST",
            fields: ["owner", "repo"],
        }),
    )
}

/// POST /module/remove: unregister `owner/repo`, then back to the user page.
async fn remove(
    State(state): State<Arc<AppState>>,
    CurrentIdentity(identity): CurrentIdentity,
    form: Result<Form<RepositoryForm>, FormRejection>,
) -> Dispatched {
    let Some(identity) = identity else {
        return login_required(Action::Remove);
    };
    let result = async {
        let form = repository_form(form)?;
        state
            .module_service()
            .unregister(&form.owner, &form.repo, &identity.github_token)
            .await?;
        Ok::<_, ModuleHubError>(Dispatched::redirect(
            CONTROLLER,
            Action::Remove.as_str(),
            USER_ROUTE,
        ))
    }
    .await;
    tagged(Action::Remove, result)
}

fn repository_form(
    form: Result<Form<RepositoryForm>, FormRejection>,
) -> ModuleHubResult<RepositoryForm> {
    let Form(form) = form.map_err(|e| ModuleHubError::Validation {
        message: e.body_text(),
    })?;
    validate_request(&form)?;
    validate_repository_segment(&form.owner)?;
    validate_repository_segment(&form.repo)?;
    Ok(form)
}

// ─── View ────────────────────────────────────────────────────────────────────

/// GET /{vendor}/{module}: public module page.
///
/// The record lookup runs first; GitHub is only asked for metadata once the
/// module is known. Either miss renders the not-found page, and so do names
/// that could never belong to a repository.
async fn view(
    State(state): State<Arc<AppState>>,
    Path((vendor, module)): Path<(String, String)>,
) -> Dispatched {
    if validate_repository_segment(&vendor).is_err()
        || validate_repository_segment(&module).is_err()
    {
        return not_found(&vendor, &module);
    }
    tagged(Action::View, module_page(&state, vendor, module).await)
}

async fn module_page(
    state: &AppState,
    vendor: String,
    module: String,
) -> ModuleHubResult<Dispatched> {
    let Some(record) = state.modules.find_by_name(&module).await? else {
        return Ok(not_found(&vendor, &module));
    };

    let Some(repository) = state
        .github
        .user_repository_metadata(&vendor, &module, None)
        .await?
    else {
        return Ok(not_found(&vendor, &module));
    };

    let github = state.github.as_ref();
    let (readme, license, composer) = tokio::join!(
        optional_file(github, &vendor, &module, "README.md"),
        optional_file(github, &vendor, &module, "LICENSE"),
        optional_file(github, &vendor, &module, "composer.json"),
    );

    let composer = composer.and_then(|raw| match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("Ignoring unparsable composer.json of {vendor}/{module}: {e}");
            None
        }
    });

    Ok(dispatched(
        Action::View,
        Json(ModuleView {
            vendor,
            module,
            record,
            repository,
            readme,
            license,
            composer,
        }),
    ))
}

/// A file shown on the module page; any failure to fetch it means "absent".
async fn optional_file(
    github: &dyn RepositoryRetriever,
    vendor: &str,
    module: &str,
    path: &str,
) -> Option<String> {
    match github.repository_file_content(vendor, module, path).await {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!("Could not fetch {path} of {vendor}/{module}: {e}");
            None
        }
    }
}

fn not_found(vendor: &str, module: &str) -> Dispatched {
    tracing::debug!("Module {vendor}/{module} not found");
    dispatched(
        Action::NotFound,
        not_found_body(format!("Module {vendor}/{module} not found")),
    )
}
