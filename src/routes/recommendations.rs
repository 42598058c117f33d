use std::sync::Arc;

use axum::{extract::State, Extension, Json};

use crate::{
    error::AppResult,
    middleware::RequestId,
    models::{RecommendRequest, Recommendation},
    services::recommendations,
};

use super::AppState;

/// Handler for recommendations endpoint
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<RecommendRequest>,
) -> AppResult<Json<Vec<Recommendation>>> {
    tracing::debug!(
        request_id = %request_id,
        query = %request.query,
        limit = request.limit,
        "Recommend request"
    );
    let picks =
        recommendations::recommend(state.catalog.as_ref(), &state.session, &request).await?;
    Ok(Json(picks))
}
