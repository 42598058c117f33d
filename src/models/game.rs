use serde::{Deserialize, Serialize};

/// A game from the owner's library
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Game {
    /// Steam app id, unique per catalog row
    pub app_id: i64,
    /// Display name
    pub name: String,
    /// Normalized user tags (lowercase, trimmed, first-seen order)
    pub tags: Vec<String>,
    /// Normalized store genres (lowercase, trimmed, first-seen order)
    pub genres: Vec<String>,
    /// Total minutes played, 0 when unknown
    #[serde(default)]
    pub playtime_minutes: u32,
}

impl Game {
    /// Creates a game, normalizing the given tag and genre tokens
    pub fn new<T, G>(app_id: i64, name: impl Into<String>, tags: T, genres: G) -> Self
    where
        T: IntoIterator,
        T::Item: AsRef<str>,
        G: IntoIterator,
        G::Item: AsRef<str>,
    {
        Self {
            app_id,
            name: name.into(),
            tags: normalize_tokens(tags),
            genres: normalize_tokens(genres),
            playtime_minutes: 0,
        }
    }

    pub fn with_playtime(mut self, minutes: u32) -> Self {
        self.playtime_minutes = minutes;
        self
    }

    /// Both tags and genres are present
    pub fn has_metadata(&self) -> bool {
        !self.tags.is_empty() && !self.genres.is_empty()
    }

    /// Tags followed by genres
    pub fn descriptors(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().chain(self.genres.iter()).map(String::as_str)
    }

    /// Case-insensitive substring match on name, tag text or genre text
    pub fn matches_substring(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.name.to_lowercase().contains(&needle)
            || join_tokens(&self.tags).contains(&needle)
            || join_tokens(&self.genres).contains(&needle)
    }
}

/// Raw `games` row as persisted by the library sync
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct GameRow {
    pub app_id: i64,
    pub name: String,
    pub tags: String,
    pub genres: String,
    pub playtime_minutes: i64,
}

impl From<GameRow> for Game {
    fn from(row: GameRow) -> Self {
        let playtime_minutes = u32::try_from(row.playtime_minutes.max(0)).unwrap_or(u32::MAX);
        Game::new(row.app_id, row.name, split_tokens(&row.tags), split_tokens(&row.genres))
            .with_playtime(playtime_minutes)
    }
}

/// Lowercases and trims a single descriptor
pub fn normalize_token(token: &str) -> String {
    token.trim().to_lowercase()
}

/// Normalizes tokens, dropping empties and duplicates while keeping first-seen order
pub fn normalize_tokens<I>(tokens: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for token in tokens {
        let token = normalize_token(token.as_ref());
        if !token.is_empty() && !out.contains(&token) {
            out.push(token);
        }
    }
    out
}

/// Splits comma-delimited column text into raw tokens
pub fn split_tokens(text: &str) -> Vec<&str> {
    text.split(',').collect()
}

/// Joins tokens into the comma-delimited column format
pub fn join_tokens(tokens: &[String]) -> String {
    tokens.join(",")
}
