use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

use crate::{
    db::CatalogStore,
    error::AppResult,
    models::{library::AppMetadata, Game},
    services::providers::{LibrarySource, MetadataProvider},
};

/// Counters for one library sync
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SyncReport {
    pub owned: usize,
    /// Already in the catalog, left untouched
    pub skipped: usize,
    pub saved: usize,
    /// Saved with empty tags and genres
    pub missing_metadata: usize,
    /// Metadata lookups that errored; those games are saved without metadata
    pub lookup_failures: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Adds newly owned games to the catalog.
///
/// Games already in the catalog are skipped. Each new game is enriched by the
/// metadata provider, waiting `delay` between lookups; a failed lookup is logged
/// and the game is stored without metadata so the next sync does not retry it.
/// Catalog write failures abort the sync.
pub async fn sync_library(
    catalog: &dyn CatalogStore,
    library: &dyn LibrarySource,
    metadata: &dyn MetadataProvider,
    delay: Duration,
) -> AppResult<SyncReport> {
    let started_at = Utc::now();

    let owned = library.owned_games().await?;
    let existing = catalog.existing_app_ids().await?;

    tracing::info!(
        owned = owned.len(),
        existing = existing.len(),
        source = library.name(),
        "Starting library sync"
    );

    let mut report = SyncReport {
        owned: owned.len(),
        skipped: 0,
        saved: 0,
        missing_metadata: 0,
        lookup_failures: 0,
        started_at,
        finished_at: started_at,
    };

    let mut first_lookup = true;
    for game in owned {
        if existing.contains(&game.app_id) {
            report.skipped += 1;
            continue;
        }

        if !first_lookup && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        first_lookup = false;

        let details = match metadata.app_details(game.app_id).await {
            Ok(details) => details,
            Err(e) => {
                tracing::warn!(
                    app_id = game.app_id,
                    provider = metadata.name(),
                    error = %e,
                    "Metadata lookup failed"
                );
                report.lookup_failures += 1;
                AppMetadata::default()
            }
        };

        if details.is_empty() {
            report.missing_metadata += 1;
        }

        let entry = Game::new(game.app_id, game.name, details.tags, details.genres)
            .with_playtime(game.playtime_minutes);
        catalog.upsert_item(&entry).await?;
        report.saved += 1;

        tracing::info!(
            app_id = entry.app_id,
            name = %entry.name,
            tags = entry.tags.len(),
            genres = entry.genres.len(),
            "Game saved"
        );
    }

    report.finished_at = Utc::now();

    tracing::info!(
        saved = report.saved,
        skipped = report.skipped,
        missing_metadata = report.missing_metadata,
        lookup_failures = report.lookup_failures,
        "Library sync finished"
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{InMemoryCatalog, MockCatalogStore};
    use crate::error::AppError;
    use crate::models::library::OwnedGame;
    use crate::services::providers::{MockLibrarySource, MockMetadataProvider};
    use std::collections::HashSet;

    fn owned(app_id: i64, name: &str, playtime: u32) -> OwnedGame {
        OwnedGame {
            app_id,
            name: name.to_string(),
            playtime_minutes: playtime,
        }
    }

    fn library(games: Vec<OwnedGame>) -> MockLibrarySource {
        let mut library = MockLibrarySource::new();
        library
            .expect_owned_games()
            .returning(move || Ok(games.clone()));
        library.expect_name().return_const("test-library");
        library
    }

    #[tokio::test]
    async fn test_sync_saves_new_games_and_skips_existing() {
        let catalog =
            InMemoryCatalog::with_games(vec![Game::new(620, "Portal 2", ["puzzle"], ["action"])]);
        let library = library(vec![
            owned(620, "Portal 2", 845),
            owned(413150, "Stardew Valley", 4000),
        ]);

        let mut metadata = MockMetadataProvider::new();
        metadata
            .expect_app_details()
            .withf(|app_id| *app_id == 413150)
            .times(1)
            .returning(|_| {
                Ok(AppMetadata {
                    tags: vec!["Farming Sim".to_string(), "Cozy".to_string()],
                    genres: vec!["RPG".to_string()],
                })
            });
        metadata.expect_name().return_const("test-metadata");

        let report = sync_library(&catalog, &library, &metadata, Duration::ZERO)
            .await
            .unwrap();

        assert_eq!(report.owned, 2);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.saved, 1);
        assert_eq!(report.missing_metadata, 0);

        let games = catalog.all_items_with_metadata().await.unwrap();
        let stardew = games.iter().find(|g| g.app_id == 413150).unwrap();
        assert_eq!(stardew.tags, vec!["farming sim", "cozy"]);
        assert_eq!(stardew.genres, vec!["rpg"]);
        assert_eq!(stardew.playtime_minutes, 4000);
    }

    #[tokio::test]
    async fn test_failed_lookup_saves_game_without_metadata() {
        let catalog = InMemoryCatalog::new();
        let library = library(vec![owned(1, "Obscure", 0)]);

        let mut metadata = MockMetadataProvider::new();
        metadata
            .expect_app_details()
            .returning(|_| Err(AppError::ExternalApi("503".to_string())));
        metadata.expect_name().return_const("test-metadata");

        let report = sync_library(&catalog, &library, &metadata, Duration::ZERO)
            .await
            .unwrap();

        assert_eq!(report.saved, 1);
        assert_eq!(report.lookup_failures, 1);
        assert_eq!(report.missing_metadata, 1);
        assert_eq!(catalog.existing_app_ids().await.unwrap(), HashSet::from([1]));
        assert!(catalog.all_items_with_metadata().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_library_failure_aborts_before_writes() {
        let catalog = MockCatalogStore::new();
        let mut library = MockLibrarySource::new();
        library
            .expect_owned_games()
            .returning(|| Err(AppError::ExternalApi("private profile".to_string())));
        let metadata = MockMetadataProvider::new();

        let result = sync_library(&catalog, &library, &metadata, Duration::ZERO).await;
        assert!(matches!(result, Err(AppError::ExternalApi(_))));
    }

    #[tokio::test]
    async fn test_catalog_write_failure_aborts_sync() {
        let mut catalog = MockCatalogStore::new();
        catalog
            .expect_existing_app_ids()
            .returning(|| Ok(HashSet::new()));
        catalog
            .expect_upsert_item()
            .times(1)
            .returning(|_| Err(AppError::StoreUnavailable("disk full".to_string())));

        let library = library(vec![owned(1, "A", 0), owned(2, "B", 0)]);
        let mut metadata = MockMetadataProvider::new();
        metadata
            .expect_app_details()
            .times(1)
            .returning(|_| Ok(AppMetadata::default()));
        metadata.expect_name().return_const("test-metadata");

        let result = sync_library(&catalog, &library, &metadata, Duration::ZERO).await;
        assert!(matches!(result, Err(AppError::StoreUnavailable(_))));
    }
}
