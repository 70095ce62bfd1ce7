use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;

use storerate_core::DomainError;

use crate::app::errors;

/// `Json<T>` whose rejections use the validation error shape (400 with
/// `field` and `message`) instead of axum's plain-text 422.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = axum::response::Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(errors::domain_error_to_response(rejection_to_error(&rejection))),
        }
    }
}

fn rejection_to_error(rejection: &JsonRejection) -> DomainError {
    let text = rejection.body_text();
    tracing::debug!(status = %rejection.status(), reason = %text, "request body rejected");
    match rejection {
        JsonRejection::MissingJsonContentType(_) => {
            DomainError::validation("body", "expected a JSON body with Content-Type: application/json")
        }
        JsonRejection::JsonSyntaxError(_) => DomainError::validation("body", "malformed JSON"),
        _ => DomainError::validation(rejection_field(&text), detail(&text)),
    }
}

/// The offending field named in a deserialization message, or `body`.
///
/// Handles `missing field `x`` and the `path: reason` form axum reports for
/// type errors.
fn rejection_field(text: &str) -> String {
    if let Some(rest) = text.split("missing field `").nth(1) {
        if let Some(name) = rest.split('`').next().filter(|n| !n.is_empty()) {
            return name.to_owned();
        }
    }
    let detail = detail(text);
    match detail.split_once(": ") {
        Some((path, _)) if !path.is_empty() && !path.contains(' ') && path != "." => {
            path.to_owned()
        }
        _ => "body".to_owned(),
    }
}

/// Drop axum's "Failed to deserialize ..." prefix.
fn detail(text: &str) -> &str {
    text.split_once("target type: ").map_or(text, |(_, rest)| rest)
}
