use axum::{
    Extension, Router,
    routing::{get, post},
};

use crate::app::SharedAuthenticator;

pub mod auth;
pub mod system;

/// Endpoints reachable without a resolved principal.
///
/// `/auth/refresh` reads the bearer token itself.
pub fn public_router(authenticator: SharedAuthenticator) -> Router {
    Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        .layer(Extension(authenticator))
}

/// Endpoints behind the auth middleware (`PrincipalContext` is present).
pub fn protected_router(authenticator: SharedAuthenticator) -> Router {
    Router::new()
        .route("/auth/me", get(auth::me))
        .route("/auth/change-password", post(auth::change_password))
        .route("/auth/permissions", get(auth::permissions))
        .route("/auth/permissions/:tag", get(auth::check_permission))
        .layer(Extension(authenticator))
}
