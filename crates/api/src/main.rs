use std::sync::Arc;

use anyhow::Context;
use secrecy::ExposeSecret;

use storerate_api::app::{build_app, AppServices};
use storerate_auth::{Argon2Hasher, CredentialHasher, Hs256Jwt};
use storerate_infra::repository::postgres::create_pool;
use storerate_infra::seed::seed_demo;
use storerate_infra::{AppConfig, InMemoryRepository, PostgresRepository, Repository};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("failed to load configuration")?;
    storerate_observability::init(config.log_format);
    tracing::info!(config = ?config, "starting");

    let jwt = Arc::new(Hs256Jwt::new(
        config.jwt_secret.expose_secret().as_bytes(),
        config.token_ttl,
    ));
    let hasher: Arc<dyn CredentialHasher> = Arc::new(Argon2Hasher);

    let (repo, backend): (Arc<dyn Repository>, &'static str) = match &config.database_url {
        Some(url) => {
            let pool = create_pool(url).await.context("failed to connect to Postgres")?;
            let repo = PostgresRepository::new(pool);
            repo.migrate().await.context("failed to apply schema")?;
            (Arc::new(repo), "postgres")
        }
        None => {
            tracing::warn!("STORERATE_DATABASE_URL not set; data will not survive a restart");
            (Arc::new(InMemoryRepository::new()), "memory")
        }
    };

    if config.seed_demo {
        seed_demo(repo.as_ref(), hasher.as_ref())
            .await
            .context("failed to seed demo data")?;
    }

    let services = Arc::new(AppServices::new(repo, hasher, jwt, backend));
    let app = build_app(services);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    tracing::info!(addr = %listener.local_addr()?, backend, "listening");

    axum::serve(listener, app).await?;
    Ok(())
}
