//! Middleware: response hardening applied to every route.

use axum::{
    extract::Request,
    http::{header::HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};

/// Add defensive security headers to every HTTP response.
///
/// Headers applied:
/// - `X-Content-Type-Options: nosniff`: prevents MIME sniffing
/// - `X-Frame-Options: DENY`: prevents clickjacking
/// - `Referrer-Policy: strict-origin-when-cross-origin`
/// - `Content-Security-Policy`: nothing but same-origin, no framing
pub async fn security_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let h = response.headers_mut();

    macro_rules! set {
        ($name:expr, $val:expr) => {
            h.insert(HeaderName::from_static($name), HeaderValue::from_static($val));
        };
    }

    set!("x-content-type-options", "nosniff");
    set!("x-frame-options", "DENY");
    set!("referrer-policy", "strict-origin-when-cross-origin");
    set!(
        "content-security-policy",
        "default-src 'self'; img-src 'self' https://avatars.githubusercontent.com; frame-ancestors 'none'"
    );

    response
}

#[cfg(test)]
mod tests {
    use crate::testing::TestApp;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn every_response_is_hardened() {
        let app = TestApp::anonymous();
        let resp = app
            .router
            .oneshot(Request::builder().uri("/module").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(resp.headers()["x-content-type-options"], "nosniff");
        assert_eq!(resp.headers()["x-frame-options"], "DENY");
    }
}
