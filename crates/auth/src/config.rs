use chrono::Duration;

/// Runtime settings for the auth core.
///
/// The secret and TTL are fixed for the life of the process.
#[derive(Clone)]
pub struct AuthConfig {
    pub secret: Vec<u8>,
    pub token_ttl: Duration,
    pub min_password_length: usize,
    pub bcrypt_cost: u32,
}

impl AuthConfig {
    pub const DEFAULT_TOKEN_TTL_SECS: i64 = 24 * 60 * 60;
    pub const DEFAULT_MIN_PASSWORD_LENGTH: usize = 6;

    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
            token_ttl: Duration::seconds(Self::DEFAULT_TOKEN_TTL_SECS),
            min_password_length: Self::DEFAULT_MIN_PASSWORD_LENGTH,
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }

    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    pub fn with_min_password_length(mut self, len: usize) -> Self {
        self.min_password_length = len;
        self
    }

    pub fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost;
        self
    }
}

impl core::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret", &"<redacted>")
            .field("token_ttl", &self.token_ttl)
            .field("min_password_length", &self.min_password_length)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish()
    }
}
