use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;

use crate::{
    app::{self, config::AppConfig},
    error::AppError,
    services::{self, translations::Translations},
    telemetry,
};

pub async fn run() -> Result<(), AppError> {
    let _ = dotenvy::dotenv();
    telemetry::init_tracing()
        .map_err(|err| AppError::Internal(format!("telemetry init failed: {}", err)))?;

    let config = AppConfig::from_env()?;
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(config.database.acquire_timeout)
        .connect(&config.database.url)
        .await
        .map_err(AppError::Database)?;

    if config.database.run_migrations {
        sqlx::migrate!().run(&pool).await?;
        tracing::info!("Database migrations applied");
    }

    let translations = Translations::load(config.translations_path.as_deref())?;
    tracing::info!(labels = translations.len(), "Translations loaded");

    let addr = config.bind_addr;
    let cache_ttl = config.list_cache_ttl;
    let state = app::state::AppState::new(pool, config, translations);
    services::maintenance::spawn_cache_purge(state.list_cache.clone(), cache_ttl);

    let app = app::router::build_router(state);

    tracing::info!(%addr, "Server listening");
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|err| AppError::Internal(format!("bind failed: {}", err)))?;
    let result = axum::serve(listener, app)
        .await
        .map_err(|err| AppError::Internal(format!("server error: {}", err)));
    telemetry::shutdown_tracing();
    result?;
    Ok(())
}
