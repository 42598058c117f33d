use std::collections::HashSet;
use std::future::Future;
use std::time::Duration;

use chrono::Utc;
use sqlx::{postgres::PgPoolOptions, PgPool};

use super::{CatalogFilter, CatalogStore};
use crate::{
    error::{AppError, AppResult},
    models::{game::join_tokens, Game, GameRow},
};

/// Creates a PostgreSQL connection pool
///
/// Acquiring a connection gives up after `acquire_timeout` so a dead database
/// surfaces as an error instead of a hung request.
pub async fn create_pool(
    database_url: &str,
    max_connections: u32,
    acquire_timeout: Duration,
) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(acquire_timeout)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Applies the embedded schema migrations
pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Escapes `LIKE` wildcards so the needle matches literally
fn escape_like(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len());
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Catalog store backed by the `games` table
#[derive(Clone)]
pub struct PgCatalog {
    pool: PgPool,
    timeout: Duration,
}

impl PgCatalog {
    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }

    async fn bounded<T, F>(&self, query: F) -> AppResult<T>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        match tokio::time::timeout(self.timeout, query).await {
            Ok(result) => Ok(result?),
            Err(_) => {
                tracing::warn!(timeout_ms = self.timeout.as_millis(), "Catalog query timed out");
                Err(AppError::StoreUnavailable(format!(
                    "catalog query timed out after {}ms",
                    self.timeout.as_millis()
                )))
            }
        }
    }
}

/// Converts rows, dropping those whose tokens normalize to nothing when metadata is required
fn into_games(rows: Vec<GameRow>, require_metadata: bool) -> Vec<Game> {
    rows.into_iter()
        .map(Game::from)
        .filter(|game| !require_metadata || game.has_metadata())
        .collect()
}

#[async_trait::async_trait]
impl CatalogStore for PgCatalog {
    async fn find_items(&self, filter: &CatalogFilter) -> AppResult<Vec<Game>> {
        let pattern = filter
            .substring
            .as_deref()
            .map(|needle| format!("%{}%", escape_like(needle)));
        let limit = i64::try_from(filter.limit).unwrap_or(i64::MAX);

        let rows = self
            .bounded(
                sqlx::query_as::<_, GameRow>(
                    r#"
                    SELECT app_id, name, tags, genres, playtime_minutes
                    FROM games
                    WHERE ($1::text IS NULL OR name ILIKE $1 OR tags ILIKE $1 OR genres ILIKE $1)
                      AND (NOT $2 OR (btrim(replace(tags, ',', '')) <> ''
                                  AND btrim(replace(genres, ',', '')) <> ''))
                      AND ($3::bigint IS NULL OR playtime_minutes >= $3)
                      AND ($4::bigint IS NULL OR playtime_minutes <= $4)
                    ORDER BY random()
                    LIMIT $5
                    "#,
                )
                .bind(pattern)
                .bind(filter.require_nonempty_metadata)
                .bind(filter.min_playtime.map(i64::from))
                .bind(filter.max_playtime.map(i64::from))
                .bind(limit)
                .fetch_all(&self.pool),
            )
            .await?;

        tracing::debug!(rows = rows.len(), filter = ?filter, "Catalog retrieval");

        Ok(into_games(rows, filter.require_nonempty_metadata))
    }

    async fn all_items_with_metadata(&self) -> AppResult<Vec<Game>> {
        let rows = self
            .bounded(
                sqlx::query_as::<_, GameRow>(
                    r#"
                    SELECT app_id, name, tags, genres, playtime_minutes
                    FROM games
                    WHERE btrim(replace(tags, ',', '')) <> ''
                      AND btrim(replace(genres, ',', '')) <> ''
                    "#,
                )
                .fetch_all(&self.pool),
            )
            .await?;

        Ok(into_games(rows, true))
    }

    async fn existing_app_ids(&self) -> AppResult<HashSet<i64>> {
        let ids = self
            .bounded(sqlx::query_scalar::<_, i64>("SELECT app_id FROM games").fetch_all(&self.pool))
            .await?;

        Ok(ids.into_iter().collect())
    }

    async fn upsert_item(&self, game: &Game) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO games (app_id, name, tags, genres, playtime_minutes, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (app_id) DO UPDATE SET
                name = EXCLUDED.name,
                tags = EXCLUDED.tags,
                genres = EXCLUDED.genres,
                playtime_minutes = EXCLUDED.playtime_minutes,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(game.app_id)
        .bind(&game.name)
        .bind(join_tokens(&game.tags))
        .bind(join_tokens(&game.genres))
        .bind(i64::from(game.playtime_minutes))
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like_plain_text_untouched() {
        assert_eq!(escape_like("co-op"), "co-op");
    }

    #[test]
    fn test_escape_like_wildcards() {
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("a_b"), "a\\_b");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
    }

    fn row(app_id: i64, tags: &str, genres: &str) -> GameRow {
        GameRow {
            app_id,
            name: format!("Game {}", app_id),
            tags: tags.to_string(),
            genres: genres.to_string(),
            playtime_minutes: 0,
        }
    }

    #[test]
    fn test_into_games_drops_rows_without_real_tokens() {
        let rows = vec![
            row(1, "puzzle", "indie"),
            row(2, ",", "indie"),
            row(3, "puzzle", " "),
        ];

        let games = into_games(rows.clone(), true);
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].app_id, 1);

        assert_eq!(into_games(rows, false).len(), 3);
    }
}
