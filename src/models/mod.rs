use serde::{Deserialize, Serialize};

pub mod game;
pub mod library;

pub use game::{Game, GameRow};

/// Query value meaning "no keyword filter"
pub const RANDOM_QUERY: &str = "random";

// ============================================================================
// Refinement
// ============================================================================

/// Request to map free text onto known tags and genres
#[derive(Debug, Clone, Deserialize)]
pub struct RefineRequest {
    pub text: String,
}

/// Outcome of a refinement
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RefineResponse {
    /// Space-joined confident matches, or `"random"`
    pub query: String,
    /// Confident matches, or fallback suggestions when `confident` is false
    pub tokens: Vec<String>,
    pub confident: bool,
}

// ============================================================================
// Recommendation
// ============================================================================

/// Request for recommendations from the library
#[derive(Debug, Clone, Deserialize)]
pub struct RecommendRequest {
    /// Keyword matched against name, tags and genres; `"random"` disables it
    #[serde(default = "default_query")]
    pub query: String,
    /// Number of games to return
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub min_playtime: Option<u32>,
    #[serde(default)]
    pub max_playtime: Option<u32>,
}

fn default_query() -> String {
    RANDOM_QUERY.to_string()
}

fn default_limit() -> usize {
    1
}

impl Default for RecommendRequest {
    fn default() -> Self {
        Self {
            query: default_query(),
            limit: default_limit(),
            min_playtime: None,
            max_playtime: None,
        }
    }
}

/// A recommended game with its preference score
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Recommendation {
    pub app_id: i64,
    pub name: String,
    pub tags: Vec<String>,
    pub genres: Vec<String>,
    pub playtime_minutes: u32,
    pub score: usize,
}

impl Recommendation {
    pub fn new(game: Game, score: usize) -> Self {
        Self {
            app_id: game.app_id,
            name: game.name,
            tags: game.tags,
            genres: game.genres,
            playtime_minutes: game.playtime_minutes,
            score,
        }
    }
}

// ============================================================================
// Chat completions
// ============================================================================

/// OpenAI-style chat message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// OpenAI-style chat completion request; only the last message is read
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatChoice {
    pub index: u32,
    pub message: ChatMessage,
    pub finish_reason: &'static str,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct ChatUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub id: String,
    pub object: &'static str,
    pub created: i64,
    pub model: String,
    pub choices: Vec<ChatChoice>,
    pub usage: ChatUsage,
}
