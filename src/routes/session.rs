use std::sync::Arc;

use axum::{extract::State, Json};
use serde_json::{Map, Value};

use crate::{error::AppResult, services::SessionSnapshot};

use super::AppState;

pub async fn get_session(State(state): State<Arc<AppState>>) -> Json<SessionSnapshot> {
    Json(state.session.get().await)
}

/// Merges a JSON object into the session; rejected patches change nothing
pub async fn update_session(
    State(state): State<Arc<AppState>>,
    Json(patch): Json<Map<String, Value>>,
) -> AppResult<Json<SessionSnapshot>> {
    let snapshot = state.session.update(patch).await?;
    Ok(Json(snapshot))
}

pub async fn clear_preferences(State(state): State<Arc<AppState>>) -> Json<SessionSnapshot> {
    Json(state.session.clear_preferences().await)
}
