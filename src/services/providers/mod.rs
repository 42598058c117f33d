//! Library data providers used by the sync
//!
//! A [`LibrarySource`] lists the games the owner has; a [`MetadataProvider`]
//! supplies tags and genres for one app. The sync loop only sees these traits.
//! [`MetadataChain`] asks several providers in turn until one knows the app.

use crate::{
    error::AppResult,
    models::library::{AppMetadata, OwnedGame},
};

pub mod steam;
pub mod steam_store;
pub mod steamspy;

pub use steam::SteamLibrary;
pub use steam_store::SteamStoreProvider;
pub use steamspy::SteamSpyProvider;

/// Lists the games owned by the configured account
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait LibrarySource: Send + Sync {
    async fn owned_games(&self) -> AppResult<Vec<OwnedGame>>;

    /// Source name for logging
    fn name(&self) -> &'static str;
}

/// Supplies tags and genres for an app
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Metadata for one app; an app the provider knows nothing about yields empty metadata
    async fn app_details(&self, app_id: i64) -> AppResult<AppMetadata>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}

/// Tries providers in order, returning the first non-empty metadata.
///
/// A failing provider is logged and skipped. If none had anything and at least
/// one failed, the last error is returned so the caller can count the failure.
pub struct MetadataChain {
    providers: Vec<Box<dyn MetadataProvider>>,
}

impl MetadataChain {
    pub fn new(providers: Vec<Box<dyn MetadataProvider>>) -> Self {
        Self { providers }
    }
}

#[async_trait::async_trait]
impl MetadataProvider for MetadataChain {
    async fn app_details(&self, app_id: i64) -> AppResult<AppMetadata> {
        let mut last_error = None;

        for provider in &self.providers {
            match provider.app_details(app_id).await {
                Ok(details) if !details.is_empty() => return Ok(details),
                Ok(_) => {
                    tracing::debug!(app_id, provider = provider.name(), "No metadata, trying next");
                }
                Err(e) => {
                    tracing::warn!(
                        app_id,
                        provider = provider.name(),
                        error = %e,
                        "Metadata provider failed, trying next"
                    );
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) => Err(e),
            None => Ok(AppMetadata::default()),
        }
    }

    fn name(&self) -> &'static str {
        "metadata-chain"
    }
}
