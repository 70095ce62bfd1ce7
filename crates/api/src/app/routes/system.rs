use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

use storerate_auth::{Operation, explain_authorization};

use crate::app::services::AppServices;
use crate::context::CallerContext;

pub async fn health(Extension(services): Extension<Arc<AppServices>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "ok",
            "backend": services.backend,
        })),
    )
}

/// Caller identity plus what it may do, judged against resources it owns.
pub async fn whoami(Extension(caller): Extension<CallerContext>) -> impl IntoResponse {
    let identity = caller.identity();
    let permissions = Operation::ALL
        .iter()
        .map(|op| explain_authorization(identity, *op, identity.map(|i| i.user_id)))
        .collect::<Vec<_>>();

    Json(serde_json::json!({
        "authenticated": identity.is_some(),
        "userId": identity.map(|i| i.user_id.to_string()),
        "role": identity.map(|i| i.role),
        "permissions": permissions,
    }))
}
