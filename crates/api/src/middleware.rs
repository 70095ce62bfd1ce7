use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use storerate_auth::{Identity, JwtValidator};

use crate::app::errors::json_error;
use crate::context::CallerContext;

#[derive(Clone)]
pub struct AuthState {
    pub jwt: Arc<dyn JwtValidator>,
}

/// Attach a [`CallerContext`] to every request.
///
/// A missing `Authorization` header yields an anonymous caller; a header that
/// is present but unusable is rejected with 401 before routing.
pub async fn identity_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let caller = match extract_bearer(req.headers()).map_err(unauthorized)? {
        None => CallerContext::anonymous(),
        Some(token) => {
            let claims = state.jwt.validate(token, Utc::now()).map_err(|e| {
                tracing::debug!(error = %e, "bearer token rejected");
                unauthorized("invalid or expired token")
            })?;
            CallerContext::authenticated(Identity::from(&claims))
        }
    };

    req.extensions_mut().insert(caller);
    Ok(next.run(req).await)
}

fn unauthorized(message: &'static str) -> Response {
    json_error(StatusCode::UNAUTHORIZED, "unauthenticated", message)
}

fn extract_bearer(headers: &HeaderMap) -> Result<Option<&str>, &'static str> {
    let Some(header) = headers.get(axum::http::header::AUTHORIZATION) else {
        return Ok(None);
    };

    let header = header.to_str().map_err(|_| "malformed authorization header")?;
    let token = header
        .strip_prefix("Bearer ")
        .ok_or("authorization must use the Bearer scheme")?
        .trim();
    if token.is_empty() {
        return Err("empty bearer token");
    }

    Ok(Some(token))
}
