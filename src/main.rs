use std::sync::Arc;
use std::time::Duration;

use playtonight::{
    config::Config,
    db::{create_pool, run_migrations, PgCatalog},
    routes::{create_router, AppState},
};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "playtonight=info,tower_http=info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = Config::from_env()?;
    let timeout = Duration::from_secs(config.catalog_timeout_secs);

    let pool = create_pool(&config.database_url, config.db_max_connections, timeout).await?;
    run_migrations(&pool).await?;

    // The vocabulary is built before serving; a catalog failure here aborts startup
    let catalog = Arc::new(PgCatalog::new(pool, timeout));
    let state = AppState::from_catalog(catalog)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to build vocabulary: {}", e))?;

    tracing::info!(
        tags = state.vocabulary.known_tags.len(),
        genres = state.vocabulary.known_genres.len(),
        "Vocabulary loaded"
    );
    if state.vocabulary.is_empty() {
        tracing::warn!("Vocabulary is empty; every refine will fall back to random picks");
    }

    let app = create_router(Arc::new(state));

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
