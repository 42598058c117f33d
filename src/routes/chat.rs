use std::sync::Arc;

use axum::{extract::State, Extension, Json};

use crate::{
    error::AppResult,
    middleware::RequestId,
    models::{ChatRequest, ChatResponse},
    services::chat,
};

use super::AppState;

/// OpenAI-compatible chat completion that answers with one game
pub async fn completions(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<ChatRequest>,
) -> AppResult<Json<ChatResponse>> {
    tracing::debug!(
        request_id = %request_id,
        messages = request.messages.len(),
        "Chat completion request"
    );
    let response = chat::complete(
        request,
        state.catalog.as_ref(),
        &state.vocabulary,
        &state.session,
    )
    .await?;
    Ok(Json(response))
}
