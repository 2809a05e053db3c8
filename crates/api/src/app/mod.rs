//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: credential store selection and authenticator wiring
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: request/response DTOs
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Router, response::Response, routing::get};
use tower::ServiceBuilder;

use fieldops_auth::{Authenticator, CredentialStore};

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// The authenticator shared by every handler, over a type-erased store.
pub type SharedAuthenticator = Arc<Authenticator<Arc<dyn CredentialStore>>>;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(auth: SharedAuthenticator) -> Router {
    // Protected routes: require a bearer token that resolves to an active user.
    // `route_layer` so unmatched methods still get 405 from the router.
    let protected = routes::protected_router(auth.clone()).route_layer(
        axum::middleware::from_fn_with_state(auth.clone(), middleware::auth_middleware),
    );

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::public_router(auth))
        .merge(protected)
        .layer(ServiceBuilder::new())
}

/// Run auth work (bcrypt, store round-trips) off the async workers.
pub async fn blocking<T, F>(f: F) -> Result<T, Response>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        tracing::error!(error = %e, "blocking auth task failed");
        errors::internal_error()
    })
}
