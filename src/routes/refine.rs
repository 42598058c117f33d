use std::sync::Arc;

use axum::{extract::State, Extension, Json};

use crate::{
    error::AppResult,
    middleware::RequestId,
    models::{RefineRequest, RefineResponse},
    services::refiner,
};

use super::AppState;

/// Maps free text onto known tags and genres
pub async fn refine(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<RefineRequest>,
) -> AppResult<Json<RefineResponse>> {
    tracing::debug!(request_id = %request_id, "Refine request");
    refiner::check_text(&request.text)?;
    let response = refiner::refine(&request.text, &state.vocabulary, &state.session).await;
    Ok(Json(response))
}
