use thiserror::Error;

use crate::store::StoreError;
use crate::token::TokenError;

/// Why an authentication attempt failed.
///
/// Only ever used for logging; the public [`AuthError`] message is the same
/// for every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    /// Unknown/inactive email or wrong password (deliberately not split).
    InvalidCredentials,
    BadSignature,
    Expired,
    MalformedToken,
    InactiveUser,
}

impl AuthFailure {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthFailure::InvalidCredentials => "invalid_credentials",
            AuthFailure::BadSignature => "bad_signature",
            AuthFailure::Expired => "expired",
            AuthFailure::MalformedToken => "malformed_token",
            AuthFailure::InactiveUser => "inactive_user",
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    /// Malformed input (short password, token with wrong segment count).
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("unauthenticated")]
    Authentication(AuthFailure),

    #[error("credential store unavailable: {0}")]
    Store(#[from] StoreError),

    /// Hashing or signing failed; not caused by the caller.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthError {
    pub fn invalid_credentials() -> Self {
        Self::Authentication(AuthFailure::InvalidCredentials)
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Malformed(_) => AuthError::Validation(err.to_string()),
            TokenError::BadSignature => AuthError::Authentication(AuthFailure::BadSignature),
            TokenError::MalformedClaims(_) => AuthError::Authentication(AuthFailure::MalformedToken),
            TokenError::Expired => AuthError::Authentication(AuthFailure::Expired),
            TokenError::InvalidKey(_) | TokenError::Encode(_) => AuthError::Internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authentication_message_is_generic() {
        for failure in [
            AuthFailure::InvalidCredentials,
            AuthFailure::BadSignature,
            AuthFailure::Expired,
            AuthFailure::InactiveUser,
        ] {
            assert_eq!(AuthError::Authentication(failure).to_string(), "unauthenticated");
        }
    }

    #[test]
    fn token_errors_map_to_taxonomy() {
        assert!(matches!(AuthError::from(TokenError::Malformed(2)), AuthError::Validation(_)));
        assert!(matches!(
            AuthError::from(TokenError::Expired),
            AuthError::Authentication(AuthFailure::Expired)
        ));
        assert!(matches!(
            AuthError::from(TokenError::MalformedClaims("x".into())),
            AuthError::Authentication(AuthFailure::MalformedToken)
        ));
    }
}
