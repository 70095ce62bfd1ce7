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
        .route("/", get(list_stores).post(create_store))
        .route("/my-stores", get(my_stores))
        .route("/dashboard", get(owner_dashboard))
        .route("/:id", get(get_store).patch(update_store))
}

pub async fn create_store(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    body: Result<ValidJson<dto::CreateStoreRequest>, axum::response::Response>,
) -> HandlerResult {
    admit(&caller, Operation::CreateStore)?;
    let ValidJson(body) = body?;
    let input = body.into_new_store().map_err(errors::domain_error_to_response)?;
    let result = services.services.stores.create_store(caller.identity(), input).await;
    Ok(respond(StatusCode::CREATED, result))
}

pub async fn list_stores(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Query(params): Query<dto::ListStoresParams>,
) -> HandlerResult {
    admit(&caller, Operation::ListStores)?;
    let query = params.into_query().map_err(errors::domain_error_to_response)?;
    let result = services.services.stores.list_stores(caller.identity(), &query).await;
    Ok(respond(StatusCode::OK, result))
}

pub async fn get_store(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
) -> HandlerResult {
    admit(&caller, Operation::GetStore)?;
    let id = dto::parse_store_id(&id).map_err(errors::domain_error_to_response)?;
    let result = services.services.stores.get_store(caller.identity(), id).await;
    Ok(respond(StatusCode::OK, result))
}

pub async fn update_store(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
    body: Result<ValidJson<dto::UpdateStoreRequest>, axum::response::Response>,
) -> HandlerResult {
    admit(&caller, Operation::UpdateStore)?;
    let id = dto::parse_store_id(&id).map_err(errors::domain_error_to_response)?;
    let ValidJson(body) = body?;
    let result = services
        .services
        .stores
        .update_store(caller.identity(), id, body.into())
        .await;
    Ok(respond(StatusCode::OK, result))
}

/// GET /stores/my-stores - the caller's stores with their ratings
pub async fn my_stores(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
) -> axum::response::Response {
    let result = services.services.stores.list_owned_stores(caller.identity()).await;
    respond(StatusCode::OK, result)
}

/// GET /stores/dashboard - owned stores with their raters
pub async fn owner_dashboard(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
) -> axum::response::Response {
    let result = services.services.dashboard.owner_dashboard(caller.identity()).await;
    respond(StatusCode::OK, result)
}
