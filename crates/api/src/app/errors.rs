use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use fieldops_auth::{AuthError, AuthzError};

/// Map an auth-core error to a response.
///
/// Authentication failures all look the same from outside; the precise reason
/// has already been logged by the auth core.
pub fn auth_error_to_response(err: AuthError) -> axum::response::Response {
    match err {
        AuthError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        AuthError::Authentication(_) => unauthenticated(),
        AuthError::Store(e) => {
            tracing::error!(error = %e, "credential store failure");
            json_error(
                StatusCode::SERVICE_UNAVAILABLE,
                "store_unavailable",
                "service temporarily unavailable",
            )
        }
        AuthError::Internal(msg) => {
            tracing::error!(error = %msg, "internal auth failure");
            internal_error()
        }
    }
}

/// Login-specific mapping: credential failures say "invalid credentials".
pub fn login_error_to_response(err: AuthError) -> axum::response::Response {
    match err {
        AuthError::Authentication(_) => {
            json_error(StatusCode::UNAUTHORIZED, "unauthenticated", "invalid credentials")
        }
        other => auth_error_to_response(other),
    }
}

pub fn authz_error_to_response(err: AuthzError) -> axum::response::Response {
    json_error(StatusCode::FORBIDDEN, "forbidden", err.to_string())
}

pub fn unauthenticated() -> axum::response::Response {
    json_error(StatusCode::UNAUTHORIZED, "unauthenticated", "unauthenticated")
}

pub fn internal_error() -> axum::response::Response {
    json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "internal error")
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
