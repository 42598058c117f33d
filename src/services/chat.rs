use chrono::Utc;
use uuid::Uuid;

use crate::{
    db::CatalogStore,
    error::{AppError, AppResult},
    models::{
        ChatChoice, ChatMessage, ChatRequest, ChatResponse, ChatUsage, RecommendRequest,
        Recommendation, RANDOM_QUERY,
    },
    services::{recommendations, refiner, session::SessionMemory, vocabulary::Vocabulary},
};

const DEFAULT_MODEL: &str = "playtonight";
const NO_MATCH_REPLY: &str = "I couldn't find anything in your library that matches that vibe.";

/// Assistant text for a pick, or the no-match reply
pub fn format_reply(pick: Option<&Recommendation>) -> String {
    match pick {
        Some(game) => format!(
            "🎮 Try **{}**!\nGenres: {}\nTags: {}",
            game.name,
            game.genres.join(", "),
            game.tags.join(", ")
        ),
        None => NO_MATCH_REPLY.to_string(),
    }
}

/// Answers an OpenAI-style chat request with a single game.
///
/// The last message is refined against the vocabulary. Its best confident token,
/// if any, becomes the keyword; when no game matches that keyword the pick is
/// drawn from the whole library instead. Preference scoring applies either way.
pub async fn complete(
    request: ChatRequest,
    catalog: &dyn CatalogStore,
    vocabulary: &Vocabulary,
    session: &SessionMemory,
) -> AppResult<ChatResponse> {
    let last = request
        .messages
        .last()
        .ok_or_else(|| AppError::InvalidInput("messages must not be empty".to_string()))?;

    refiner::check_text(&last.content)?;
    let refined = refiner::refine(&last.content, vocabulary, session).await;
    let keyword = match (refined.confident, refined.tokens.first()) {
        (true, Some(token)) => token.clone(),
        _ => RANDOM_QUERY.to_string(),
    };

    let mut picks = recommendations::recommend(
        catalog,
        session,
        &RecommendRequest {
            query: keyword.clone(),
            ..RecommendRequest::default()
        },
    )
    .await?;

    if picks.is_empty() && keyword != RANDOM_QUERY {
        tracing::debug!(keyword = %keyword, "No game for keyword, widening to whole library");
        picks = recommendations::recommend(catalog, session, &RecommendRequest::default()).await?;
    }

    let content = format_reply(picks.first());

    Ok(ChatResponse {
        id: format!("chatcmpl-{}", Uuid::new_v4().simple()),
        object: "chat.completion",
        created: Utc::now().timestamp(),
        model: request.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        choices: vec![ChatChoice {
            index: 0,
            message: ChatMessage {
                role: "assistant".to_string(),
                content,
            },
            finish_reason: "stop",
        }],
        usage: ChatUsage::default(),
    })
}
