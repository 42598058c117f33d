use std::sync::Arc;

use crate::{
    db::CatalogStore,
    error::AppResult,
    services::{SessionMemory, Vocabulary},
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogStore>,
    /// Built once at startup, read-only afterwards
    pub vocabulary: Arc<Vocabulary>,
    pub session: Arc<SessionMemory>,
}

impl AppState {
    /// Creates state with an empty session
    pub fn new(catalog: Arc<dyn CatalogStore>, vocabulary: Vocabulary) -> Self {
        Self {
            catalog,
            vocabulary: Arc::new(vocabulary),
            session: Arc::new(SessionMemory::new()),
        }
    }

    /// Builds the vocabulary from the catalog; fails if the catalog cannot be read
    pub async fn from_catalog(catalog: Arc<dyn CatalogStore>) -> AppResult<Self> {
        let vocabulary = Vocabulary::rebuild(catalog.as_ref()).await?;
        Ok(Self::new(catalog, vocabulary))
    }
}
