//! Which controller action produced a response.
//!
//! Every controller response carries a [`Dispatch`] in its extensions and an
//! `x-dispatch-action` header. Redirects and not-found pages report the
//! action that was actually resolved, so a bounced `GET /module` still says
//! `index`.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use modulehub_common::error::ModuleHubResult;
use serde_json::json;

pub const LOGIN_ROUTE: &str = "/user/login";
pub const USER_ROUTE: &str = "/user";

pub const DISPATCH_ACTION_HEADER: &str = "x-dispatch-action";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dispatch {
    pub controller: &'static str,
    pub action: &'static str,
}

/// A controller response tagged with the action that produced it.
pub struct Dispatched {
    dispatch: Dispatch,
    response: Response,
}

impl Dispatched {
    pub fn new(controller: &'static str, action: &'static str, response: impl IntoResponse) -> Self {
        Self {
            dispatch: Dispatch { controller, action },
            response: response.into_response(),
        }
    }

    /// `302 Found` to `location`.
    pub fn redirect(controller: &'static str, action: &'static str, location: &'static str) -> Self {
        Self::new(controller, action, found(location))
    }

    /// Bounce an anonymous visitor to the sign-in page.
    pub fn redirect_to_login(controller: &'static str, action: &'static str) -> Self {
        tracing::debug!("{controller}/{action}: not authenticated, redirecting to {LOGIN_ROUTE}");
        Self::redirect(controller, action, LOGIN_ROUTE)
    }
}

impl IntoResponse for Dispatched {
    fn into_response(self) -> Response {
        let mut response = self.response;
        response
            .headers_mut()
            .insert(DISPATCH_ACTION_HEADER, HeaderValue::from_static(self.dispatch.action));
        response.extensions_mut().insert(self.dispatch);
        response
    }
}

/// Unwrap a controller result; an error becomes its usual response, tagged
/// with the same action.
pub fn tagged(
    controller: &'static str,
    action: &'static str,
    result: ModuleHubResult<Dispatched>,
) -> Dispatched {
    result.unwrap_or_else(|e| Dispatched::new(controller, action, e))
}

/// `302 Found`. axum's `Redirect` only offers 303, 307 and 308.
pub fn found(location: &'static str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}

/// JSON 404 body shared by the not-found pages.
pub fn not_found_body(message: String) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "code": 404, "error": "NOT_FOUND", "message": message })),
    )
        .into_response()
}
