//! User routes: sign in with a GitHub access token, sign out, and the
//! signed-in user's own modules.

use axum::{
    extract::{rejection::FormRejection, State},
    routing::get,
    Form, Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use modulehub_common::{
    error::{ModuleHubError, ModuleHubResult},
    models::{module::Module, user::LoginForm},
    session,
    validation::validate_request,
};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    dispatch::{tagged, Dispatched, USER_ROUTE},
    guard::{CurrentIdentity, Identity},
    AppState,
};

pub const CONTROLLER: &str = "users";

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/user", get(profile))
        .route("/user/login", get(login_form).post(login))
        .route("/user/logout", get(logout))
}

#[derive(Serialize)]
struct ProfileView {
    user: ProfileUser,
    modules: Vec<Module>,
}

#[derive(Serialize)]
struct ProfileUser {
    id: Uuid,
    login: String,
    avatar_url: Option<String>,
}

/// GET /user: the signed-in user and the modules they registered.
async fn profile(
    State(state): State<Arc<AppState>>,
    CurrentIdentity(identity): CurrentIdentity,
) -> Dispatched {
    let Some(identity) = identity else {
        return Dispatched::redirect_to_login(CONTROLLER, "index");
    };
    tagged(CONTROLLER, "index", profile_page(&state, identity).await)
}

async fn profile_page(state: &AppState, identity: Identity) -> ModuleHubResult<Dispatched> {
    let modules = state.modules.find_by_owner(&identity.login).await?;

    Ok(Dispatched::new(
        CONTROLLER,
        "index",
        Json(ProfileView {
            user: ProfileUser {
                id: identity.user_id,
                login: identity.login,
                avatar_url: identity.avatar_url,
            },
            modules,
        }),
    ))
}

/// GET /user/login
async fn login_form(CurrentIdentity(identity): CurrentIdentity) -> Dispatched {
    if identity.is_some() {
        return Dispatched::redirect(CONTROLLER, "login", USER_ROUTE);
    }
    Dispatched::new(
        CONTROLLER,
        "login",
        Json(serde_json::json!({
            "action": "/user/login",
            "method": "POST",
            "fields": ["token"],
        })),
    )
}

/// POST /user/login
///
/// Exchange a GitHub access token for a session cookie. The token is checked
/// against `GET /user` and kept for calls made on the user's behalf.
async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    form: Result<Form<LoginForm>, FormRejection>,
) -> Result<(CookieJar, Dispatched), Dispatched> {
    let cookie = session_cookie(&state, form)
        .await
        .map_err(|e| Dispatched::new(CONTROLLER, "login", e))?;
    Ok((
        jar.add(cookie),
        Dispatched::redirect(CONTROLLER, "login", USER_ROUTE),
    ))
}

async fn session_cookie(
    state: &AppState,
    form: Result<Form<LoginForm>, FormRejection>,
) -> ModuleHubResult<Cookie<'static>> {
    let Form(form) = form.map_err(|e| ModuleHubError::Validation {
        message: e.body_text(),
    })?;
    validate_request(&form)?;

    let github_user = state
        .github
        .authenticated_user(&form.token)
        .await?
        .ok_or(ModuleHubError::InvalidCredentials)?;

    let user = state
        .users
        .upsert_github_user(
            github_user.id,
            &github_user.login,
            github_user.avatar_url.as_deref(),
            &form.token,
        )
        .await?;

    let settings = &state.sessions;
    let token = session::issue_token(user.id, &user.login, &settings.secret, settings.ttl_secs)?;
    let max_age = i64::try_from(settings.ttl_secs)
        .map(time::Duration::seconds)
        .unwrap_or(time::Duration::MAX);

    tracing::info!("{} signed in", user.login);
    Ok(Cookie::build((settings.cookie_name.clone(), token))
        .path("/")
        .http_only(true)
        .secure(settings.secure)
        .same_site(SameSite::Lax)
        .max_age(max_age)
        .build())
}

/// GET /user/logout
async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> (CookieJar, Dispatched) {
    let jar = jar.remove(Cookie::build((state.sessions.cookie_name.clone(), "")).path("/"));
    (jar, Dispatched::redirect(CONTROLLER, "logout", "/"))
}
