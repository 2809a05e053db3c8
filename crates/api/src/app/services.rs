use std::sync::Arc;

use anyhow::Context;

use fieldops_auth::{Authenticator, CredentialStore, PasswordManager, Role, UserRecord};
use fieldops_core::UserId;
use fieldops_infra::credentials::InMemoryCredentialStore;
#[cfg(feature = "postgres")]
use fieldops_infra::credentials::PostgresCredentialStore;

use crate::app::SharedAuthenticator;
use crate::config::{ApiConfig, SeedAdmin};

/// Wire the authenticator over the configured credential store.
pub async fn build_services(config: &ApiConfig) -> anyhow::Result<SharedAuthenticator> {
    let store = build_store(config).await?;
    let auth = Authenticator::new(store, &config.auth).context("failed to build authenticator")?;
    Ok(Arc::new(auth))
}

async fn build_store(config: &ApiConfig) -> anyhow::Result<Arc<dyn CredentialStore>> {
    if let Some(url) = &config.database_url {
        return build_persistent_store(url).await;
    }

    tracing::warn!("DATABASE_URL not set; using in-memory credential store");
    let store = InMemoryCredentialStore::new();
    if let Some(seed) = &config.seed_admin {
        seed_admin(&store, seed, &config.auth)?;
    }
    Ok(Arc::new(store))
}

#[cfg(feature = "postgres")]
async fn build_persistent_store(url: &str) -> anyhow::Result<Arc<dyn CredentialStore>> {
    let pool = sqlx::PgPool::connect(url)
        .await
        .context("failed to connect to Postgres")?;
    tracing::info!("using Postgres credential store");
    Ok(Arc::new(PostgresCredentialStore::new(pool)))
}

#[cfg(not(feature = "postgres"))]
async fn build_persistent_store(_url: &str) -> anyhow::Result<Arc<dyn CredentialStore>> {
    anyhow::bail!("DATABASE_URL is set but this binary was built without the `postgres` feature")
}

fn seed_admin(
    store: &InMemoryCredentialStore,
    seed: &SeedAdmin,
    auth: &fieldops_auth::AuthConfig,
) -> anyhow::Result<()> {
    let hash = PasswordManager::new(auth.bcrypt_cost, auth.min_password_length)
        .hash(&seed.password)
        .context("failed to hash seed admin password")?;

    let id = UserId::new();
    store.insert(UserRecord {
        id,
        email: seed.email.clone(),
        name: "Administrator".to_string(),
        password_hash: hash,
        role: Role::Admin,
        active: true,
        last_login: None,
    })?;

    tracing::info!(user_id = %id, email = %seed.email, "seeded admin account");
    Ok(())
}
