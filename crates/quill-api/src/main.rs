//! Quill API Server
//!
//! REST API server for the Quill blog backend.
//!
//! Author: hephaex@gmail.com

use anyhow::Context;
use quill_api::auth::PasswordConfig;
use quill_api::create_router;
use quill_api::state::{AppState, Stores};
use quill_api::storage::{MemoryStorage, ObjectStorage, S3Storage};
use quill_core::config::{AppConfig, LoggingConfig, StoreBackend};
use quill_core::PgStore;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = &logging.level;
        format!("quill_api={level},quill_core={level},tower_http={level}").into()
    });

    let registry = tracing_subscriber::registry().with(filter);
    if logging.json_format {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

fn load_config() -> anyhow::Result<AppConfig> {
    match std::env::var("CONFIG_FILE") {
        Ok(path) => Ok(AppConfig::from_file(&path)
            .with_context(|| format!("loading {path}"))?
            .with_env_override()?),
        Err(_) => Ok(AppConfig::from_env()?),
    }
}

async fn open_stores(config: &AppConfig) -> anyhow::Result<Stores> {
    match config.database.backend {
        StoreBackend::Postgres => {
            let store = PgStore::connect(&config.database.url, config.database.pool_size)
                .await
                .context("connecting to PostgreSQL")?;
            store.migrate().await.context("running migrations")?;
            tracing::info!("PostgreSQL store ready");
            Ok(Stores::postgres(store))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; data is lost on restart");
            Ok(Stores::memory())
        }
    }
}

fn open_storage(config: &AppConfig) -> anyhow::Result<Arc<dyn ObjectStorage>> {
    if config.storage.endpoint.is_none() {
        tracing::warn!("R2_ENDPOINT not set; uploads are kept in memory");
        return Ok(Arc::new(MemoryStorage::new(
            config.storage.public_domain.clone(),
        )));
    }

    let storage = S3Storage::new(reqwest::Client::new(), &config.storage)
        .context("configuring object storage")?;
    tracing::info!(bucket = %config.storage.bucket, "Object storage configured");
    Ok(Arc::new(storage))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = load_config()?;

    // Initialize tracing
    init_tracing(&config.logging);

    let stores = open_stores(&config).await?;
    let storage = open_storage(&config)?;
    let addr = format!("{}:{}", config.server.host, config.server.port);

    // Create application state
    let state = Arc::new(AppState::new(
        config,
        stores,
        storage,
        PasswordConfig::default(),
    ));

    // Create router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Quill API Server starting on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);
    tracing::info!("OpenAPI spec at http://{}/api-docs/openapi.json", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
