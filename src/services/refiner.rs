use std::cmp::Reverse;

use crate::{
    error::{AppError, AppResult},
    models::{RefineResponse, RANDOM_QUERY},
    services::{session::SessionMemory, similarity::token_set_ratio, vocabulary::Vocabulary},
};

/// Candidates considered for confident matches
const CONFIDENT_TOP_N: usize = 10;
/// Matches must score strictly above this
const CONFIDENT_THRESHOLD: u8 = 80;
/// Candidates considered for fallback suggestions
const FALLBACK_TOP_N: usize = 5;
/// Suggestions must score strictly above this
const FALLBACK_THRESHOLD: u8 = 60;

/// Longest query text accepted; scoring is quadratic in its length
pub const MAX_TEXT_BYTES: usize = 1024;

/// Rejects query text too long to score on a request thread
pub fn check_text(text: &str) -> AppResult<()> {
    if text.len() > MAX_TEXT_BYTES {
        return Err(AppError::InvalidInput(format!(
            "text is {} bytes, at most {} allowed",
            text.len(),
            MAX_TEXT_BYTES
        )));
    }
    Ok(())
}

/// A vocabulary token and its similarity to the query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredToken {
    pub token: String,
    pub score: u8,
}

/// Scores every vocabulary token against `query`, best first
pub fn rank_tokens<'a, I>(query: &str, vocabulary: I) -> Vec<ScoredToken>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut scored: Vec<ScoredToken> = vocabulary
        .into_iter()
        .map(|token| ScoredToken {
            token: token.to_string(),
            score: token_set_ratio(query, token),
        })
        .collect();
    scored.sort_by_key(|s| Reverse(s.score));
    scored
}

/// Tokens among the first `top_n` of `ranked` scoring above `threshold`
fn select(ranked: &[ScoredToken], top_n: usize, threshold: u8) -> Vec<String> {
    ranked
        .iter()
        .take(top_n)
        .filter(|s| s.score > threshold)
        .map(|s| s.token.clone())
        .collect()
}

/// Splits already-ranked tokens into confident matches or fallback suggestions
pub fn decide(ranked: &[ScoredToken]) -> RefineResponse {
    let confident = select(ranked, CONFIDENT_TOP_N, CONFIDENT_THRESHOLD);
    if !confident.is_empty() {
        return RefineResponse {
            query: confident.join(" "),
            tokens: confident,
            confident: true,
        };
    }

    RefineResponse {
        query: RANDOM_QUERY.to_string(),
        tokens: select(ranked, FALLBACK_TOP_N, FALLBACK_THRESHOLD),
        confident: false,
    }
}

/// Maps free text onto known tags and genres.
///
/// Accepted matches (or fallback suggestions) are added to the session's
/// preferences and the text is recorded in its query history. An empty
/// vocabulary simply yields `"random"` with no suggestions.
pub async fn refine(
    text: &str,
    vocabulary: &Vocabulary,
    session: &SessionMemory,
) -> RefineResponse {
    let query = text.to_lowercase();
    let ranked = rank_tokens(&query, vocabulary.tokens());
    let response = decide(&ranked);

    session.record_query(text).await;
    let added = session.append_preferences(&response.tokens).await;

    tracing::info!(
        query = %query,
        refined = %response.query,
        confident = response.confident,
        tokens = ?response.tokens,
        new_preferences = added.len(),
        "Query refined"
    );

    response
}
