use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::{patch, post},
    Json, Router,
};

use storerate_auth::Operation;

use crate::app::dto;
use crate::app::extract::ValidJson;
use crate::app::routes::common::{admit, respond, HandlerResult};
use crate::app::services::AppServices;
use crate::context::CallerContext;

pub fn router() -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/update-password", patch(update_password))
        .route("/logout", post(logout))
}

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    ValidJson(body): ValidJson<dto::RegisterRequest>,
) -> axum::response::Response {
    let result = services.services.accounts.register(body.into_new_user()).await;
    respond(StatusCode::CREATED, result)
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    ValidJson(body): ValidJson<dto::LoginRequest>,
) -> axum::response::Response {
    let result = services.services.accounts.login(&body.email, &body.password).await;
    respond(StatusCode::OK, result)
}

pub async fn update_password(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    body: Result<ValidJson<dto::UpdatePasswordRequest>, axum::response::Response>,
) -> HandlerResult {
    admit(&caller, Operation::ChangePassword)?;
    let ValidJson(body) = body?;
    let result = services
        .services
        .accounts
        .change_password(caller.identity(), &body.new_password)
        .await
        .map(|()| serde_json::json!({ "message": "password updated" }));
    Ok(respond(StatusCode::OK, result))
}

/// Tokens are stateless; logout only confirms the caller was signed in.
pub async fn logout(Extension(caller): Extension<CallerContext>) -> axum::response::Response {
    if caller.identity().is_none() {
        return crate::app::errors::domain_error_to_response(storerate_core::DomainError::Unauthenticated);
    }
    (StatusCode::OK, Json(serde_json::json!({ "message": "logout successful" }))).into_response()
}
