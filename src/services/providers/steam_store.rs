use reqwest::{header::USER_AGENT, Client as HttpClient};
use scraper::{Html, Selector};
use std::time::Duration;

use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::library::AppMetadata,
    services::providers::MetadataProvider,
};

const STORE_CACHE_TTL: u64 = 604800; // 1 week
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const BROWSER_USER_AGENT: &str = "Mozilla/5.0";

const TAG_SELECTOR: &str = ".glance_tags.popular_tags a";
const GENRE_SELECTOR: &str = r#"div.details_block a[href*="genre"]"#;

/// Tags and genres scraped from the public Steam store page
#[derive(Clone)]
pub struct SteamStoreProvider {
    http_client: HttpClient,
    store_url: String,
    cache: Cache,
}

impl SteamStoreProvider {
    pub fn new(cache: Cache, store_url: String) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http_client,
            store_url,
            cache,
        })
    }

    fn app_url(&self, app_id: i64) -> String {
        format!("{}/app/{}/", self.store_url.trim_end_matches('/'), app_id)
    }

    async fn fetch(&self, app_id: i64) -> AppResult<AppMetadata> {
        let response = self
            .http_client
            .get(self.app_url(app_id))
            .header(USER_AGENT, BROWSER_USER_AGENT)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::ExternalApi(format!(
                "Steam store returned status {} for app {}",
                response.status(),
                app_id
            )));
        }

        let html = response.text().await?;
        let metadata = parse_store_page(&html)?;

        tracing::debug!(
            app_id,
            tags = metadata.tags.len(),
            genres = metadata.genres.len(),
            provider = "steam-store",
            "Store page scraped"
        );

        Ok(metadata)
    }
}

fn selector(css: &str) -> AppResult<Selector> {
    Selector::parse(css)
        .map_err(|e| AppError::Internal(format!("Invalid selector {}: {:?}", css, e)))
}

/// Extracts the popular user tags and the genre links from a store page
pub fn parse_store_page(html: &str) -> AppResult<AppMetadata> {
    let tag_selector = selector(TAG_SELECTOR)?;
    let genre_selector = selector(GENRE_SELECTOR)?;
    let document = Html::parse_document(html);

    let texts = |selector: &Selector| -> Vec<String> {
        document
            .select(selector)
            .map(|element| element.text().collect::<String>().trim().to_string())
            .filter(|text| !text.is_empty())
            .collect()
    };

    Ok(AppMetadata {
        tags: texts(&tag_selector),
        genres: texts(&genre_selector),
    })
}

#[async_trait::async_trait]
impl MetadataProvider for SteamStoreProvider {
    async fn app_details(&self, app_id: i64) -> AppResult<AppMetadata> {
        cached!(
            self.cache,
            CacheKey::StorePage(app_id),
            STORE_CACHE_TTL,
            self.fetch(app_id)
        )
    }

    fn name(&self) -> &'static str {
        "steam-store"
    }
}
