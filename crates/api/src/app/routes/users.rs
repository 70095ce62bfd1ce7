use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    routing::get,
    Router,
};

use storerate_auth::Operation;

use crate::app::extract::ValidJson;
use crate::app::routes::common::{admit, respond, HandlerResult};
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::CallerContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/:id", get(get_user))
}

pub async fn create_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    body: Result<ValidJson<dto::CreateUserRequest>, axum::response::Response>,
) -> HandlerResult {
    admit(&caller, Operation::CreateUser)?;
    let ValidJson(body) = body?;
    let result = services
        .services
        .users
        .create_user(caller.identity(), body.into_new_user())
        .await;
    Ok(respond(StatusCode::CREATED, result))
}

pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Query(params): Query<dto::ListUsersParams>,
) -> HandlerResult {
    admit(&caller, Operation::ListUsers)?;
    let query = params.into_query().map_err(errors::domain_error_to_response)?;
    let result = services.services.users.list_users(caller.identity(), &query).await;
    Ok(respond(StatusCode::OK, result))
}

pub async fn get_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
) -> HandlerResult {
    admit(&caller, Operation::GetUser)?;
    let id = dto::parse_user_id(&id, "id").map_err(errors::domain_error_to_response)?;
    let result = services.services.users.get_user(caller.identity(), id).await;
    Ok(respond(StatusCode::OK, result))
}
