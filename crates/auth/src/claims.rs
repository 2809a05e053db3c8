use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use fieldops_core::UserId;

use crate::Role;

/// Claim set carried inside an access token.
///
/// Every field is required on decode; timestamps are unix seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user the token was issued to.
    pub sub: UserId,

    pub email: String,

    pub role: Role,

    /// Issued-at timestamp.
    #[serde(with = "chrono::serde::ts_seconds")]
    pub iat: DateTime<Utc>,

    /// Expiration timestamp (always `iat + ttl`).
    #[serde(with = "chrono::serde::ts_seconds")]
    pub exp: DateTime<Utc>,
}

impl Claims {
    /// Build the claims for a fresh token.
    ///
    /// `now` is truncated to whole seconds so the claims survive the wire
    /// format unchanged. Fails if `now + ttl` is not a representable instant.
    pub fn issue(
        sub: UserId,
        email: impl Into<String>,
        role: Role,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<Self, ClaimsError> {
        let iat = now.trunc_subsecs(0);
        let exp = iat
            .checked_add_signed(ttl)
            .ok_or(ClaimsError::TtlOutOfRange)?;
        Ok(Self {
            sub,
            email: email.into(),
            role,
            iat,
            exp,
        })
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClaimsError {
    #[error("token has expired")]
    Expired,

    #[error("invalid token time window (exp <= iat)")]
    InvalidTimeWindow,

    #[error("token lifetime overflows the calendar")]
    TtlOutOfRange,
}

/// Deterministically validate a decoded claim set against `now`.
pub fn validate_claims(claims: &Claims, now: DateTime<Utc>) -> Result<(), ClaimsError> {
    if claims.exp <= claims.iat {
        return Err(ClaimsError::InvalidTimeWindow);
    }
    if now >= claims.exp {
        return Err(ClaimsError::Expired);
    }
    Ok(())
}
