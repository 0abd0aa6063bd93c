//! HTTP Basic authentication middleware.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, Request, StatusCode},
    middleware::Next,
    response::Response,
};
use base64::Engine as _;

use super::routes::AppState;

const UNAUTHORIZED_BODY: &str = "401 Unauthorized!";

/// Validates `Authorization: Basic <base64(user:pass)>` against the
/// configured credentials. Returns 401 on any mismatch.
pub async fn basic_auth(
    State(state): State<Arc<AppState>>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, (StatusCode, String)> {
    let unauthorized = || (StatusCode::UNAUTHORIZED, UNAUTHORIZED_BODY.to_string());

    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(unauthorized)?;

    let encoded = header.strip_prefix("Basic ").ok_or_else(unauthorized)?;
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .map_err(|_| unauthorized())?;
    let decoded = String::from_utf8(decoded).map_err(|_| unauthorized())?;

    let (user, pass) = decoded.split_once(':').ok_or_else(unauthorized)?;
    if user != state.auth_user || pass != state.auth_pass {
        return Err(unauthorized());
    }

    Ok(next.run(req).await)
}
