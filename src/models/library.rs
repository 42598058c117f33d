use serde::{Deserialize, Serialize};

/// A game listed in the owner's account, before enrichment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedGame {
    pub app_id: i64,
    pub name: String,
    pub playtime_minutes: u32,
}

/// Descriptors for one app from a metadata provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppMetadata {
    pub tags: Vec<String>,
    pub genres: Vec<String>,
}

impl AppMetadata {
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty() && self.genres.is_empty()
    }
}

// ============================================================================
// Steam Web API Types
// ============================================================================

/// Envelope of `IPlayerService/GetOwnedGames`
#[derive(Debug, Clone, Deserialize)]
pub struct SteamOwnedGamesResponse {
    pub response: SteamOwnedGames,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SteamOwnedGames {
    #[serde(default)]
    pub game_count: u32,
    /// Absent when the profile is private
    #[serde(default)]
    pub games: Vec<SteamGame>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SteamGame {
    pub appid: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub playtime_forever: u32,
}

impl From<SteamGame> for OwnedGame {
    fn from(game: SteamGame) -> Self {
        Self {
            app_id: game.appid,
            name: game.name.unwrap_or_else(|| "Unknown".to_string()),
            playtime_minutes: game.playtime_forever,
        }
    }
}

// ============================================================================
// SteamSpy API Types
// ============================================================================

/// `appdetails` response from SteamSpy.
///
/// `tags` is an object of tag → vote count, but SteamSpy sends `[]` for apps
/// without tags, so it is kept as raw JSON. Tags come out most-voted first.
#[derive(Debug, Clone, Deserialize)]
pub struct SteamSpyAppDetails {
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub tags: serde_json::Value,
}

impl From<SteamSpyAppDetails> for AppMetadata {
    fn from(details: SteamSpyAppDetails) -> Self {
        let tags = match details.tags {
            serde_json::Value::Object(map) => {
                let mut voted: Vec<(String, u64)> = map
                    .into_iter()
                    .map(|(tag, votes)| (tag, votes.as_u64().unwrap_or(0)))
                    .collect();
                voted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
                voted.into_iter().map(|(tag, _)| tag).collect()
            }
            _ => Vec::new(),
        };
        let genres = details
            .genre
            .map(|g| {
                g.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Self { tags, genres }
    }
}
