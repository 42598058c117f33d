use std::collections::BTreeSet;

use serde::Serialize;

use crate::{db::CatalogStore, error::AppResult, models::game::normalize_token};

/// Known tag and genre tokens, built once from the catalog at startup
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Vocabulary {
    pub known_tags: BTreeSet<String>,
    pub known_genres: BTreeSet<String>,
}

impl Vocabulary {
    /// Reads every game with complete metadata and unions its tokens.
    ///
    /// A failed read is returned as-is; callers abort startup rather than run
    /// with a partial vocabulary.
    pub async fn rebuild(catalog: &dyn CatalogStore) -> AppResult<Self> {
        let games = catalog.all_items_with_metadata().await?;

        let mut vocabulary = Self::default();
        for game in &games {
            vocabulary.extend(&game.tags, &game.genres);
        }

        tracing::info!(
            games = games.len(),
            tags = vocabulary.known_tags.len(),
            genres = vocabulary.known_genres.len(),
            "Vocabulary built"
        );

        Ok(vocabulary)
    }

    /// Adds tag and genre tokens, normalizing each one
    pub fn extend<T, G>(&mut self, tags: T, genres: G)
    where
        T: IntoIterator,
        T::Item: AsRef<str>,
        G: IntoIterator,
        G::Item: AsRef<str>,
    {
        self.known_tags.extend(
            tags.into_iter()
                .map(|t| normalize_token(t.as_ref()))
                .filter(|t| !t.is_empty()),
        );
        self.known_genres.extend(
            genres
                .into_iter()
                .map(|g| normalize_token(g.as_ref()))
                .filter(|g| !g.is_empty()),
        );
    }

    /// Union of tags and genres
    pub fn tokens(&self) -> BTreeSet<&str> {
        self.known_tags
            .iter()
            .chain(self.known_genres.iter())
            .map(String::as_str)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.known_tags.is_empty() && self.known_genres.is_empty()
    }
}
