use std::collections::{BTreeMap, HashSet};

use rand::seq::SliceRandom;
use tokio::sync::RwLock;

use super::{CatalogFilter, CatalogStore};
use crate::{error::AppResult, models::Game};

/// Catalog store kept in process memory, for tests and local experiments
#[derive(Default)]
pub struct InMemoryCatalog {
    games: RwLock<BTreeMap<i64, Game>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a catalog pre-filled with the given games
    pub fn with_games(games: impl IntoIterator<Item = Game>) -> Self {
        let games = games.into_iter().map(|g| (g.app_id, g)).collect();
        Self {
            games: RwLock::new(games),
        }
    }
}

#[async_trait::async_trait]
impl CatalogStore for InMemoryCatalog {
    async fn find_items(&self, filter: &CatalogFilter) -> AppResult<Vec<Game>> {
        let mut matches: Vec<Game> = {
            let games = self.games.read().await;
            games.values().filter(|g| filter.accepts(g)).cloned().collect()
        };

        matches.shuffle(&mut rand::thread_rng());
        matches.truncate(filter.limit);
        Ok(matches)
    }

    async fn all_items_with_metadata(&self) -> AppResult<Vec<Game>> {
        let games = self.games.read().await;
        Ok(games.values().filter(|g| g.has_metadata()).cloned().collect())
    }

    async fn existing_app_ids(&self) -> AppResult<HashSet<i64>> {
        Ok(self.games.read().await.keys().copied().collect())
    }

    async fn upsert_item(&self, game: &Game) -> AppResult<()> {
        self.games.write().await.insert(game.app_id, game.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn library() -> InMemoryCatalog {
        InMemoryCatalog::with_games((0..150).map(|i| {
            Game::new(i, format!("Game {i}"), ["indie"], ["casual"]).with_playtime(i as u32)
        }))
    }

    #[tokio::test]
    async fn test_find_items_respects_limit() {
        let catalog = library();
        let filter = CatalogFilter::default();
        let pool = catalog.find_items(&filter).await.unwrap();
        assert_eq!(pool.len(), 100);
    }

    #[tokio::test]
    async fn test_find_items_applies_playtime_bounds() {
        let catalog = library();
        let filter = CatalogFilter {
            min_playtime: Some(10),
            max_playtime: Some(19),
            ..CatalogFilter::default()
        };
        let pool = catalog.find_items(&filter).await.unwrap();
        assert_eq!(pool.len(), 10);
        assert!(pool.iter().all(|g| (10..=19).contains(&g.playtime_minutes)));
    }

    #[tokio::test]
    async fn test_upsert_overwrites_existing_row() {
        let catalog = InMemoryCatalog::new();
        catalog
            .upsert_item(&Game::new(7, "Old", ["a"], ["b"]))
            .await
            .unwrap();
        catalog
            .upsert_item(&Game::new(7, "New", ["c"], ["d"]))
            .await
            .unwrap();

        assert_eq!(catalog.existing_app_ids().await.unwrap(), HashSet::from([7]));
        let all = catalog.all_items_with_metadata().await.unwrap();
        assert_eq!(all[0].name, "New");
        assert_eq!(all[0].tags, vec!["c"]);
    }

    #[tokio::test]
    async fn test_all_items_with_metadata_skips_incomplete() {
        let catalog = InMemoryCatalog::with_games(vec![
            Game::new(1, "Complete", ["a"], ["b"]),
            Game::new(2, "Tagless", Vec::<&str>::new(), ["b"]),
        ]);
        let all = catalog.all_items_with_metadata().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].app_id, 1);
        assert_eq!(
            catalog.existing_app_ids().await.unwrap(),
            HashSet::from([1, 2])
        );
    }
}
