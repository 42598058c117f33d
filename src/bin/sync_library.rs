//! Pulls the owned-games list from Steam and adds new games to the catalog,
//! enriched with SteamSpy tags and genres, falling back to the Steam store page.

use std::time::Duration;

use playtonight::{
    config::Config,
    db::{create_pool, run_migrations, Cache, PgCatalog},
    services::{
        ingestion,
        providers::{
            MetadataChain, MetadataProvider, SteamLibrary, SteamSpyProvider, SteamStoreProvider,
        },
    },
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("playtonight=info,sync_library=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Config::from_env()?;
    let (api_key, steam_id) = config.steam_credentials()?;
    let timeout = Duration::from_secs(config.catalog_timeout_secs);

    let pool = create_pool(&config.database_url, config.db_max_connections, timeout).await?;
    run_migrations(&pool).await?;
    let catalog = PgCatalog::new(pool, timeout);

    let (cache, writer) = Cache::connect(&config.redis_url).await?;
    let library = SteamLibrary::new(api_key, config.steam_api_url.clone(), steam_id)?;
    let providers: Vec<Box<dyn MetadataProvider>> = vec![
        Box::new(SteamSpyProvider::new(cache.clone(), config.steamspy_api_url.clone())?),
        Box::new(SteamStoreProvider::new(cache, config.steam_store_url.clone())?),
    ];
    let metadata = MetadataChain::new(providers);

    let result = ingestion::sync_library(
        &catalog,
        &library,
        &metadata,
        Duration::from_millis(config.sync_delay_ms),
    )
    .await;

    writer.shutdown().await;

    let report = result?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
