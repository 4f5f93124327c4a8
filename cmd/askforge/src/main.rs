//! # askforge binary
//!
//! Assembles the application from adapters based on configuration and
//! compile-time features, then serves the axum router.

use std::sync::Arc;

use anyhow::Context;
use auth_adapters::JwtIdentityResolver;
use configs::{AppConfig, StoreBackend};
use domains::ForumStore;
use secrecy::ExposeSecret;
use services::Forum;
use storage_adapters::MemoryForumStore;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::load().context("failed to load configuration")?;

    let store = build_store(&config).await?;
    let forum = Forum::new(store);
    let identity = Arc::new(JwtIdentityResolver::new(
        config.auth.jwt_secret.expose_secret().as_bytes(),
    ));
    let app = api_adapters::router(api_adapters::AppState::new(forum, identity));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "askforge listening");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn build_store(config: &AppConfig) -> anyhow::Result<Arc<dyn ForumStore>> {
    if config.store.backend == StoreBackend::Memory {
        tracing::info!("using in-memory store");
        return Ok(Arc::new(MemoryForumStore::new()));
    }

    #[cfg(feature = "db-sqlite")]
    {
        tracing::info!(url = %config.store.sqlite_url, "using sqlite store");
        let store = storage_adapters::SqliteForumStore::connect(&config.store.sqlite_url)
            .await
            .context("failed to open sqlite store")?;
        return Ok(Arc::new(store));
    }

    #[cfg(not(feature = "db-sqlite"))]
    anyhow::bail!("store.backend = \"sqlite\" requires building with the db-sqlite feature")
}
