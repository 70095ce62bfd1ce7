use axum::{routing::get, Router};

pub mod admin;
pub mod auth;
pub mod common;
pub mod ratings;
pub mod stores;
pub mod system;
pub mod users;

/// Router for every endpoint behind the identity middleware.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/stores", stores::router())
        .nest("/ratings", ratings::router())
        .nest("/admin", admin::router())
}
