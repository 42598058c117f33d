use std::collections::HashSet;

use crate::{error::AppResult, models::Game};

pub mod memory;
pub mod postgres;
pub mod redis;

pub use self::memory::InMemoryCatalog;
pub use self::postgres::{create_pool, run_migrations, PgCatalog};
pub use self::redis::{Cache, CacheKey, CacheWriterHandle};

/// Largest candidate pool a single retrieval may return
pub const POOL_CAP: usize = 100;

/// Filter for a bounded catalog retrieval. Matching rows come back in random order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogFilter {
    /// Case-insensitive substring matched against name, tags and genres
    pub substring: Option<String>,
    /// Inclusive lower playtime bound, in minutes
    pub min_playtime: Option<u32>,
    /// Inclusive upper playtime bound, in minutes
    pub max_playtime: Option<u32>,
    /// Skip games whose tags or genres are empty
    pub require_nonempty_metadata: bool,
    pub limit: usize,
}

impl Default for CatalogFilter {
    fn default() -> Self {
        Self {
            substring: None,
            min_playtime: None,
            max_playtime: None,
            require_nonempty_metadata: true,
            limit: POOL_CAP,
        }
    }
}

impl CatalogFilter {
    /// Whether a game satisfies every predicate of this filter
    pub fn accepts(&self, game: &Game) -> bool {
        if self.require_nonempty_metadata && !game.has_metadata() {
            return false;
        }
        if let Some(min) = self.min_playtime {
            if game.playtime_minutes < min {
                return false;
            }
        }
        if let Some(max) = self.max_playtime {
            if game.playtime_minutes > max {
                return false;
            }
        }
        match &self.substring {
            Some(needle) => game.matches_substring(needle),
            None => true,
        }
    }
}

/// Persistent table of owned games
///
/// Reads serve refinement and recommendation; writes only happen during library sync.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogStore: Send + Sync {
    /// Up to `filter.limit` games matching the filter, in random order
    async fn find_items(&self, filter: &CatalogFilter) -> AppResult<Vec<Game>>;

    /// Every game with non-empty tags and genres
    async fn all_items_with_metadata(&self) -> AppResult<Vec<Game>>;

    /// App ids already present in the catalog
    async fn existing_app_ids(&self) -> AppResult<HashSet<i64>>;

    /// Inserts a game or overwrites the row with the same app id
    async fn upsert_item(&self, game: &Game) -> AppResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(playtime: u32) -> Game {
        Game::new(1, "Hades", ["roguelike", "fast-paced"], ["action"]).with_playtime(playtime)
    }

    #[test]
    fn test_default_filter_requires_metadata() {
        let filter = CatalogFilter::default();
        let incomplete = Game::new(2, "Mystery", Vec::<&str>::new(), Vec::<&str>::new());
        assert!(filter.accepts(&game(0)));
        assert!(!filter.accepts(&incomplete));
        assert_eq!(filter.limit, POOL_CAP);
    }

    #[test]
    fn test_playtime_bounds_are_inclusive() {
        let filter = CatalogFilter {
            min_playtime: Some(60),
            max_playtime: Some(120),
            ..CatalogFilter::default()
        };
        assert!(filter.accepts(&game(60)));
        assert!(filter.accepts(&game(120)));
        assert!(!filter.accepts(&game(59)));
        assert!(!filter.accepts(&game(121)));
    }

    #[test]
    fn test_inverted_bounds_accept_nothing() {
        let filter = CatalogFilter {
            min_playtime: Some(500),
            max_playtime: Some(100),
            ..CatalogFilter::default()
        };
        for minutes in [0, 100, 300, 500, 1000] {
            assert!(!filter.accepts(&game(minutes)));
        }
    }

    #[test]
    fn test_substring_filter() {
        let filter = CatalogFilter {
            substring: Some("Rogue".to_string()),
            ..CatalogFilter::default()
        };
        assert!(filter.accepts(&game(0)));

        let filter = CatalogFilter {
            substring: Some("farming".to_string()),
            ..CatalogFilter::default()
        };
        assert!(!filter.accepts(&game(0)));
    }
}
