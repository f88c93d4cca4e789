//! Storefront server: device catalog and cart service

use std::sync::Arc;

use storefront::backend::{MemoryBackend, PgBackend};
use storefront::{AppState, Config, api, logger};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    let config = Config::from_env();
    logger::init_logger(config.is_production());

    tracing::info!("Starting storefront (env: {})", config.environment);

    let http_port = config.http_port;
    let state = match config.database_url.clone() {
        Some(url) => {
            let backend = Arc::new(PgBackend::connect(&url).await?);
            tracing::info!("Connected to PostgreSQL");
            AppState::start(config, backend)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using the in-memory backend");
            AppState::start(config, Arc::new(MemoryBackend::new()))
        }
    };

    let app = api::create_router(state);

    let http_addr = format!("0.0.0.0:{http_port}");
    let listener = tokio::net::TcpListener::bind(&http_addr).await?;
    tracing::info!("storefront HTTP listening on {http_addr}");

    axum::serve(listener, app).await?;
    Ok(())
}
