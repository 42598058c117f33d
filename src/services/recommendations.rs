use std::time::Instant;

use crate::{
    db::CatalogStore,
    error::{AppError, AppResult},
    models::{RecommendRequest, Recommendation},
    services::{ranking, selector, session::SessionMemory},
};

/// Recommends games from the library.
///
/// Retrieves a candidate pool for the request's keyword and playtime bounds,
/// scores each candidate by overlap with the session's preferences and returns at
/// most `limit` of them, best first. An empty result is a valid outcome.
pub async fn recommend(
    catalog: &dyn CatalogStore,
    session: &SessionMemory,
    request: &RecommendRequest,
) -> AppResult<Vec<Recommendation>> {
    if request.limit == 0 {
        return Err(AppError::InvalidInput("limit must be at least 1".to_string()));
    }

    let start = Instant::now();

    let pool = selector::select_candidates(catalog, request).await?;
    let pool_size = pool.len();
    let preferences = session.preferences().await;

    let results = ranking::rank(pool, &preferences, request.limit, &mut rand::thread_rng());

    tracing::info!(
        query = %request.query,
        limit = request.limit,
        pool_size,
        preferences = preferences.len(),
        returned = results.len(),
        top_score = results.first().map(|r| r.score),
        elapsed_ms = start.elapsed().as_millis(),
        "Recommendations ranked"
    );

    Ok(results)
}
