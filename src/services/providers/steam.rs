use reqwest::Client as HttpClient;
use std::time::Duration;

use crate::{
    error::{AppError, AppResult},
    models::library::{OwnedGame, SteamOwnedGamesResponse},
    services::providers::LibrarySource,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Owned-games listing from the Steam Web API
#[derive(Clone)]
pub struct SteamLibrary {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    steam_id: String,
}

impl SteamLibrary {
    pub fn new(api_key: String, api_url: String, steam_id: String) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http_client,
            api_key,
            api_url,
            steam_id,
        })
    }

    fn owned_games_url(&self) -> String {
        format!(
            "{}/IPlayerService/GetOwnedGames/v0001/",
            self.api_url.trim_end_matches('/')
        )
    }
}

#[async_trait::async_trait]
impl LibrarySource for SteamLibrary {
    async fn owned_games(&self) -> AppResult<Vec<OwnedGame>> {
        tracing::info!(steam_id = %self.steam_id, "Fetching owned games from Steam");

        let response = self
            .http_client
            .get(self.owned_games_url())
            .query(&[
                ("key", self.api_key.as_str()),
                ("steamid", self.steam_id.as_str()),
                ("include_appinfo", "1"),
                ("include_played_free_games", "1"),
                ("format", "json"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, "Steam owned-games request failed");
            return Err(AppError::ExternalApi(format!(
                "Steam API returned status {}: {}",
                status, body
            )));
        }

        let parsed: SteamOwnedGamesResponse = response.json().await?;
        let reported = parsed.response.game_count;
        let games: Vec<OwnedGame> = parsed.response.games.into_iter().map(Into::into).collect();

        tracing::info!(count = games.len(), reported, "Owned games fetched");

        Ok(games)
    }

    fn name(&self) -> &'static str {
        "steam"
    }
}
