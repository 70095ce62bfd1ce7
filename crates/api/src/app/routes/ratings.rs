use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    routing::{get, post},
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
        .route(
            "/stores/:store_id",
            post(submit_rating).patch(update_rating).get(store_ratings),
        )
        .route("/stores/:store_id/my-rating", get(my_rating))
}

pub async fn submit_rating(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path(store_id): Path<String>,
    body: Result<ValidJson<dto::RatingRequest>, axum::response::Response>,
) -> HandlerResult {
    admit(&caller, Operation::SubmitRating)?;
    let store_id = dto::parse_store_id(&store_id).map_err(errors::domain_error_to_response)?;
    let ValidJson(body) = body?;
    let value = body.value().map_err(errors::domain_error_to_response)?;
    let result = services
        .services
        .ratings
        .submit_rating(caller.identity(), store_id, value)
        .await;
    Ok(respond(StatusCode::OK, result))
}

pub async fn update_rating(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path(store_id): Path<String>,
    body: Result<ValidJson<dto::RatingRequest>, axum::response::Response>,
) -> HandlerResult {
    admit(&caller, Operation::UpdateRating)?;
    let store_id = dto::parse_store_id(&store_id).map_err(errors::domain_error_to_response)?;
    let ValidJson(body) = body?;
    let value = body.value().map_err(errors::domain_error_to_response)?;
    let result = services
        .services
        .ratings
        .update_rating(caller.identity(), store_id, value)
        .await;
    Ok(respond(StatusCode::OK, result))
}

/// `null` when the caller has not rated the store.
pub async fn my_rating(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path(store_id): Path<String>,
) -> HandlerResult {
    admit(&caller, Operation::GetUserRating)?;
    let store_id = dto::parse_store_id(&store_id).map_err(errors::domain_error_to_response)?;
    let result = services
        .services
        .ratings
        .get_user_rating(caller.identity(), store_id)
        .await;
    Ok(respond(StatusCode::OK, result))
}

pub async fn store_ratings(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path(store_id): Path<String>,
) -> HandlerResult {
    admit(&caller, Operation::GetStoreRatings)?;
    let store_id = dto::parse_store_id(&store_id).map_err(errors::domain_error_to_response)?;
    let result = services
        .services
        .stores
        .get_store_ratings(caller.identity(), store_id)
        .await;
    Ok(respond(StatusCode::OK, result))
}
