use crate::{
    db::{CatalogFilter, CatalogStore, POOL_CAP},
    error::AppResult,
    models::{Game, RecommendRequest, RANDOM_QUERY},
};

/// Whether `query` means "no keyword filter"
pub fn is_random(query: &str) -> bool {
    let query = query.trim();
    query.is_empty() || query.eq_ignore_ascii_case(RANDOM_QUERY)
}

/// Builds the catalog filter for a recommendation request.
///
/// The pool size is always [`POOL_CAP`], whatever the requested limit, so the
/// ranking step has room to re-order.
pub fn build_filter(request: &RecommendRequest) -> CatalogFilter {
    let substring = (!is_random(&request.query)).then(|| request.query.trim().to_string());

    CatalogFilter {
        substring,
        min_playtime: request.min_playtime,
        max_playtime: request.max_playtime,
        require_nonempty_metadata: true,
        limit: POOL_CAP,
    }
}

/// Retrieves the candidate pool for a request. Store failures are not retried.
pub async fn select_candidates(
    catalog: &dyn CatalogStore,
    request: &RecommendRequest,
) -> AppResult<Vec<Game>> {
    let filter = build_filter(request);

    if let (Some(min), Some(max)) = (filter.min_playtime, filter.max_playtime) {
        if min > max {
            tracing::debug!(min, max, "Playtime bounds are inverted, pool will be empty");
        }
    }

    let pool = catalog.find_items(&filter).await?;

    tracing::debug!(
        keyword = ?filter.substring,
        pool_size = pool.len(),
        "Candidate pool selected"
    );

    Ok(pool)
}
