use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use storerate_core::DomainError;

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    let status = match &err {
        DomainError::Unauthenticated => StatusCode::UNAUTHORIZED,
        DomainError::Forbidden(_) => StatusCode::FORBIDDEN,
        DomainError::NotFound(_) => StatusCode::NOT_FOUND,
        DomainError::Validation { field, rule } => {
            return (
                StatusCode::BAD_REQUEST,
                axum::Json(json!({
                    "error": err.kind(),
                    "message": rule,
                    "field": field,
                })),
            )
                .into_response();
        }
        DomainError::Conflict(_) => StatusCode::CONFLICT,
        DomainError::StorageUnavailable(msg) => {
            tracing::warn!(error = %msg, "storage unavailable");
            StatusCode::SERVICE_UNAVAILABLE
        }
    };
    json_error(status, err.kind(), err.to_string())
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_has_a_status() {
        let cases = [
            (DomainError::Unauthenticated, StatusCode::UNAUTHORIZED),
            (DomainError::forbidden("x"), StatusCode::FORBIDDEN),
            (DomainError::not_found("store"), StatusCode::NOT_FOUND),
            (DomainError::validation("name", "too short"), StatusCode::BAD_REQUEST),
            (DomainError::conflict("email taken"), StatusCode::CONFLICT),
            (DomainError::storage("pool closed"), StatusCode::SERVICE_UNAVAILABLE),
        ];
        for (err, status) in cases {
            assert_eq!(domain_error_to_response(err).status(), status);
        }
    }
}
