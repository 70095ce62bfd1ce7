use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use storerate_auth::{authorize, Operation};
use storerate_core::{DomainError, DomainResult};

use crate::app::errors;
use crate::context::CallerContext;

/// Handlers that can stop early (refused caller, bad input) return the
/// refusal as `Err`.
pub type HandlerResult = Result<axum::response::Response, axum::response::Response>;

/// Serialize `result` with `status`, or map the domain error.
pub fn respond<T: Serialize>(status: StatusCode, result: DomainResult<T>) -> axum::response::Response {
    match result {
        Ok(body) => (status, Json(body)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

/// Role check run before any path, query or body parsing, so a caller who
/// may not perform `operation` never learns which inputs would be rejected.
/// Ownership is not known yet; the service repeats the full check.
pub fn admit(caller: &CallerContext, operation: Operation) -> Result<(), axum::response::Response> {
    let identity = caller.identity();
    authorize(identity, operation, identity.map(|i| i.user_id))
        .map(|_| ())
        .map_err(|err| {
            tracing::debug!(operation = %operation, reason = %err, "request refused before parsing");
            errors::domain_error_to_response(DomainError::from(err))
        })
}
