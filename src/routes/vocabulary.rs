use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, Json};
use serde::Serialize;

use crate::services::Vocabulary;

use super::AppState;

#[derive(Debug, Serialize)]
pub struct VocabularyResponse<'a> {
    pub tag_count: usize,
    pub genre_count: usize,
    #[serde(flatten)]
    pub vocabulary: &'a Vocabulary,
}

/// Known tags and genres with their sizes
pub async fn get_vocabulary(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let vocabulary = state.vocabulary.as_ref();
    Json(VocabularyResponse {
        tag_count: vocabulary.known_tags.len(),
        genre_count: vocabulary.known_genres.len(),
        vocabulary,
    })
    .into_response()
}
