use axum::{
    Json,
    extract::{Extension, Path, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use chrono::Utc;

use fieldops_auth::Authorizer;

use crate::app::{SharedAuthenticator, blocking, dto, errors};
use crate::authz;
use crate::context::PrincipalContext;
use crate::middleware::authorization_header;

/// POST /auth/login - exchange email + password for a token
pub async fn login(
    Extension(auth): Extension<SharedAuthenticator>,
    body: Result<Json<dto::LoginRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return dto::json_rejection_to_response(rejection),
    };

    let result = match blocking(move || auth.login(&body.email, &body.password, Utc::now())).await {
        Ok(r) => r,
        Err(resp) => return resp,
    };

    match result {
        Ok(session) => (StatusCode::OK, Json(session)).into_response(),
        Err(e) => errors::login_error_to_response(e),
    }
}

/// POST /auth/refresh - new token for the bearer, no password needed
pub async fn refresh(
    Extension(auth): Extension<SharedAuthenticator>,
    headers: HeaderMap,
) -> axum::response::Response {
    let header = authorization_header(&headers);

    let result = match blocking(move || auth.refresh(header.as_deref(), Utc::now())).await {
        Ok(r) => r,
        Err(resp) => return resp,
    };

    match result {
        Ok(Some(session)) => (StatusCode::OK, Json(session)).into_response(),
        Ok(None) => errors::unauthenticated(),
        Err(e) => errors::auth_error_to_response(e),
    }
}

/// GET /auth/me - the caller's public profile
pub async fn me(Extension(principal): Extension<PrincipalContext>) -> axum::response::Response {
    (StatusCode::OK, Json(principal.user().clone())).into_response()
}

/// POST /auth/change-password
pub async fn change_password(
    Extension(auth): Extension<SharedAuthenticator>,
    Extension(principal): Extension<PrincipalContext>,
    body: Result<Json<dto::ChangePasswordRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return dto::json_rejection_to_response(rejection),
    };
    if let Err(resp) = body.validate() {
        return resp;
    }

    let user_id = principal.user_id();
    let result = match blocking(move || auth.change_password(user_id, &body.current, &body.new)).await {
        Ok(r) => r,
        Err(resp) => return resp,
    };

    match result {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "success": true, "message": "password updated" })),
        )
            .into_response(),
        Err(e) => errors::auth_error_to_response(e),
    }
}

/// GET /auth/permissions - capabilities granted to the caller's role
pub async fn permissions(Extension(principal): Extension<PrincipalContext>) -> axum::response::Response {
    (StatusCode::OK, Json(Authorizer::capabilities(principal.role()))).into_response()
}

/// GET /auth/permissions/:tag - 200 if the caller's role holds `tag`, else 403
pub async fn check_permission(
    Extension(principal): Extension<PrincipalContext>,
    Path(tag): Path<String>,
) -> axum::response::Response {
    if let Err(e) = authz::require_permission(&principal, &tag) {
        return errors::authz_error_to_response(e);
    }

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "permission": tag,
            "role": principal.role(),
            "granted": true,
        })),
    )
        .into_response()
}
