//! Environment-driven configuration for the API binary.

use chrono::Duration;
use thiserror::Error;

use fieldops_auth::AuthConfig;

const DEV_SECRET: &str = "dev-secret";

/// Upper bound for `TOKEN_TTL_SECS` (one year).
pub const MAX_TOKEN_TTL_SECS: i64 = 365 * 24 * 60 * 60;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: '{value}' ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Credentials for an admin account created at startup (in-memory store only).
#[derive(Clone)]
pub struct SeedAdmin {
    pub email: String,
    pub password: String,
}

#[derive(Clone)]
pub struct ApiConfig {
    pub auth: AuthConfig,
    pub bind_addr: String,
    pub database_url: Option<String>,
    pub seed_admin: Option<SeedAdmin>,
}

impl core::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("auth", &self.auth)
            .field("bind_addr", &self.bind_addr)
            .field("database_url", &self.database_url.as_ref().map(|_| "<set>"))
            .field("seed_admin", &self.seed_admin.as_ref().map(|s| s.email.as_str()))
            .finish()
    }
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup (used by tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = lookup("JWT_SECRET").filter(|s| !s.is_empty()).unwrap_or_else(|| {
            tracing::warn!("JWT_SECRET not set; using insecure dev default");
            DEV_SECRET.to_string()
        });

        let mut auth = AuthConfig::new(secret.into_bytes());

        if let Some(secs) = parse::<i64, _>(&lookup, "TOKEN_TTL_SECS")? {
            let ttl = Duration::try_seconds(secs)
                .filter(|_| (1..=MAX_TOKEN_TTL_SECS).contains(&secs))
                .ok_or_else(|| ConfigError::Invalid {
                    key: "TOKEN_TTL_SECS",
                    value: secs.to_string(),
                    reason: format!("must be between 1 and {MAX_TOKEN_TTL_SECS}"),
                })?;
            auth = auth.with_token_ttl(ttl);
        }
        if let Some(len) = parse::<usize, _>(&lookup, "PASSWORD_MIN_LENGTH")? {
            auth = auth.with_min_password_length(len);
        }
        if let Some(cost) = parse::<u32, _>(&lookup, "BCRYPT_COST")? {
            if !(4..=31).contains(&cost) {
                return Err(ConfigError::Invalid {
                    key: "BCRYPT_COST",
                    value: cost.to_string(),
                    reason: "must be between 4 and 31".to_string(),
                });
            }
            auth = auth.with_bcrypt_cost(cost);
        }

        let seed_admin = match (lookup("SEED_ADMIN_EMAIL"), lookup("SEED_ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(SeedAdmin { email, password }),
            _ => None,
        };

        Ok(Self {
            auth,
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:8080".to_string()),
            database_url: lookup("DATABASE_URL").filter(|s| !s.is_empty()),
            seed_admin,
        })
    }
}

fn parse<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: core::str::FromStr,
    T::Err: core::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw.trim().parse::<T>().map(Some).map_err(|e| ConfigError::Invalid {
            key,
            value: raw.clone(),
            reason: e.to_string(),
        }),
    }
}
