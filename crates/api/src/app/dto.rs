use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use serde::Deserialize;

use crate::app::errors;

// -------------------------
// Request DTOs
// -------------------------
//
// No `Debug` on these: they carry plaintext passwords.

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub current: String,
    pub new: String,
    pub confirm: String,
}

impl ChangePasswordRequest {
    /// Shape checks that need no store access.
    pub fn validate(&self) -> Result<(), axum::response::Response> {
        if self.new != self.confirm {
            return Err(errors::json_error(
                StatusCode::BAD_REQUEST,
                "validation_error",
                "new password and confirmation do not match",
            ));
        }
        Ok(())
    }
}

/// Any body that fails to parse is a 400, never a 422.
pub fn json_rejection_to_response(rejection: JsonRejection) -> axum::response::Response {
    errors::json_error(StatusCode::BAD_REQUEST, "validation_error", rejection.body_text())
}
