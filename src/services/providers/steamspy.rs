use reqwest::Client as HttpClient;
use std::time::Duration;

use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::library::{AppMetadata, SteamSpyAppDetails},
    services::providers::MetadataProvider,
};

const DETAILS_CACHE_TTL: u64 = 604800; // 1 week
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Tags and genres from SteamSpy, cached in Redis
#[derive(Clone)]
pub struct SteamSpyProvider {
    http_client: HttpClient,
    api_url: String,
    cache: Cache,
}

impl SteamSpyProvider {
    pub fn new(cache: Cache, api_url: String) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http_client,
            api_url,
            cache,
        })
    }

    async fn fetch(&self, app_id: i64) -> AppResult<AppMetadata> {
        let app_id_param = app_id.to_string();
        let response = self
            .http_client
            .get(&self.api_url)
            .query(&[("request", "appdetails"), ("appid", app_id_param.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "SteamSpy returned status {} for app {}: {}",
                status, app_id, body
            )));
        }

        let details: SteamSpyAppDetails = response.json().await?;
        let metadata = AppMetadata::from(details);

        tracing::debug!(
            app_id,
            tags = metadata.tags.len(),
            genres = metadata.genres.len(),
            provider = "steamspy",
            "App details fetched"
        );

        Ok(metadata)
    }
}

#[async_trait::async_trait]
impl MetadataProvider for SteamSpyProvider {
    async fn app_details(&self, app_id: i64) -> AppResult<AppMetadata> {
        cached!(
            self.cache,
            CacheKey::AppDetails(app_id),
            DETAILS_CACHE_TTL,
            self.fetch(app_id)
        )
    }

    fn name(&self) -> &'static str {
        "steamspy"
    }
}
