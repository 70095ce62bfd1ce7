//! Admin routes: system dashboard.
//!
//! User and store administration lives under `/users` and `/stores`; the
//! services gate those by role.

use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, routing::get, Router};

use crate::app::routes::common::respond;
use crate::app::services::AppServices;
use crate::context::CallerContext;

pub fn router() -> Router {
    Router::new().route("/dashboard", get(dashboard))
}

/// GET /admin/dashboard - system-wide totals
pub async fn dashboard(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
) -> axum::response::Response {
    let result = services.services.dashboard.stats(caller.identity()).await;
    respond(StatusCode::OK, result)
}
