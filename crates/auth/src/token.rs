//! Compact signed access tokens (HS256 JWT).
//!
//! `base64url(header) . base64url(claims) . base64url(hmac_sha256(secret, first_two))`
//!
//! Tokens are stateless: nothing is persisted on encode, and decode is a pure
//! function of the token, the secret and `now`.

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use crate::claims::{Claims, ClaimsError, validate_claims};

const TOKEN_TYPE: &str = "JWT";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Wrong number of `.`-separated segments.
    #[error("malformed token: expected 3 segments, got {0}")]
    Malformed(usize),

    #[error("token signature mismatch")]
    BadSignature,

    /// The header or claims payload is unusable.
    #[error("malformed token payload: {0}")]
    MalformedClaims(String),

    #[error("token has expired")]
    Expired,

    #[error("invalid signing key: {0}")]
    InvalidKey(String),

    #[error("failed to encode token: {0}")]
    Encode(String),
}

/// Encodes claims into signed tokens and verifies them back.
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl core::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenCodec").finish_non_exhaustive()
    }
}

impl TokenCodec {
    pub fn new(secret: &[u8]) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::InvalidKey("secret must not be empty".into()));
        }

        // Pinned to HS256. Expiry is checked against the caller's `now` in
        // `validate_claims`, not the system clock.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["sub", "exp", "iat"]);

        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        })
    }

    pub fn encode(&self, claims: &Claims) -> Result<String, TokenError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| TokenError::Encode(e.to_string()))
    }

    /// Verify the signature, then time-check the claims against `now`.
    pub fn decode(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let segments = token.split('.').count();
        if segments != 3 {
            return Err(TokenError::Malformed(segments));
        }

        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::BadSignature,
                _ => TokenError::MalformedClaims(e.to_string()),
            })?;

        if data.header.typ.as_deref() != Some(TOKEN_TYPE) {
            return Err(TokenError::MalformedClaims(format!(
                "unsupported token type {:?}",
                data.header.typ
            )));
        }

        let claims = data.claims;
        validate_claims(&claims, now).map_err(|e| match e {
            ClaimsError::Expired => TokenError::Expired,
            ClaimsError::InvalidTimeWindow | ClaimsError::TtlOutOfRange => {
                TokenError::MalformedClaims(e.to_string())
            }
        })?;

        Ok(claims)
    }
}
