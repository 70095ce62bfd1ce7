//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: repository, hasher and token codec wiring
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request DTOs and query/path parsing
//! - `errors.rs`: consistent error responses
//! - `extract.rs`: JSON body extractor with validation-shaped rejections

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod extract;
pub mod routes;
pub mod services;

pub use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(services: Arc<AppServices>) -> Router {
    let auth_state = middleware::AuthState {
        jwt: services.jwt.clone(),
    };

    // Every routed request carries a CallerContext; the services decide
    // whether an anonymous caller is acceptable.
    let routed = routes::router().layer(axum::middleware::from_fn_with_state(
        auth_state,
        middleware::identity_middleware,
    ));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routed)
        .layer(ServiceBuilder::new().layer(Extension(services)))
}
